use std::fmt;

use anyhow::Result;

use crate::errors::ParseError;
use crate::shell::config::{MAX_ARGS, MAX_LINE_LEN};
use crate::shell::Shell;
use crate::sources::SourceKind;

pub mod redirect;
pub use redirect::{Redirect, Stream};

const BACKGROUND_MARKER: &str = "&";
const COMMENT_MARKER: &str = "#";

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum LineKind {
    Blank,
    Comment,
    Command,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct LineIdentifier {
    source: SourceKind,
    line_num: usize,
}

// One parsed line of input.  Built once per iteration of the interpreter
// loop and never modified afterwards.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Line {
    rawline: String,    // Does not include trailing newlines
    line_kind: LineKind,
    line_identifier: LineIdentifier,
    argv: Vec<String>,
    background: bool,
    input: Option<Redirect>,
    output: Option<Redirect>,
}

impl Line {
    pub fn new(mut rawline: String, line_num: usize, source: SourceKind) -> Result<Line, ParseError> {
        while rawline.ends_with('\n') || rawline.ends_with('\r') {
            rawline.pop();
        }

        if rawline.len() > MAX_LINE_LEN {
            return Err(ParseError::LineTooLong {
                len: rawline.len(),
                max: MAX_LINE_LEN,
            });
        }

        let mut line = Line {
            rawline,
            line_kind: LineKind::Blank,
            line_identifier: LineIdentifier { source, line_num },
            argv: Vec::new(),
            background: false,
            input: None,
            output: None,
        };

        let mut words = get_words(&line.rawline);

        match words.first() {
            None => return Ok(line),
            Some(first) if first.starts_with(COMMENT_MARKER) => {
                line.line_kind = LineKind::Comment;
                return Ok(line);
            }
            Some(_) => {}
        }

        // `&` only marks a background job as the final word
        if words.last().map(String::as_str) == Some(BACKGROUND_MARKER) {
            words.pop();
            line.background = true;
        }

        let mut words = words.into_iter();
        while let Some(word) = words.next() {
            if let Some(stream) = Stream::from_marker(&word) {
                let path = match words.next() {
                    Some(path) => Some(path),
                    None if line.background => None,
                    None => return Err(ParseError::MissingRedirectTarget(stream.marker())),
                };

                let redirect = Some(Redirect::new(stream, path));
                match stream {
                    Stream::Input => line.input = redirect,
                    Stream::Output => line.output = redirect,
                }
            } else {
                line.argv.push(word);
            }
        }

        if line.argv.len() > MAX_ARGS {
            return Err(ParseError::TooManyArguments {
                count: line.argv.len(),
                max: MAX_ARGS,
            });
        }

        if !line.argv.is_empty() {
            line.line_kind = LineKind::Command;
        }

        Ok(line)
    }

    pub fn execute(&self, smsh: &mut Shell) -> Result<()> {
        match self.line_kind {
            LineKind::Blank | LineKind::Comment => Ok(()),
            LineKind::Command => {
                if let Some(f) = smsh.get_builtin(self.command()) {
                    f(smsh, self.argv())
                } else {
                    smsh.execute_external_command(self)
                }
            }
        }
    }

    pub fn argv(&self) -> Vec<&str> {
        self.argv.iter().map(String::as_str).collect()
    }

    // Empty for blank and comment lines
    pub fn command(&self) -> &str {
        self.argv.first().map(String::as_str).unwrap_or("")
    }

    pub fn is_background(&self) -> bool {
        self.background
    }

    pub fn input(&self) -> Option<&Redirect> {
        self.input.as_ref()
    }

    pub fn output(&self) -> Option<&Redirect> {
        self.output.as_ref()
    }

    pub fn kind(&self) -> LineKind {
        self.line_kind
    }

    pub fn rawline(&self) -> &str {
        &self.rawline
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.line_identifier.source {
            SourceKind::Tty => {
                write!(f, "\tTTY line {}: {}", self.line_identifier.line_num, self.rawline)
            }
            SourceKind::Script(s) => {
                write!(
                    f,
                    "\tScript `{}` line {}: {}",
                    s, self.line_identifier.line_num, self.rawline
                )
            }
        }
    }
}

// Breaks rawline into words on spaces, tabs and newlines.
fn get_words(rawline: &str) -> Vec<String> {
    let mut words = Vec::<String>::new();
    let mut word = String::new();

    for ch in rawline.chars() {
        match ch {
            ' ' | '\t' | '\n' | '\r' => {
                if !word.is_empty() {
                    words.push(word);
                    word = String::new();
                }
            }
            _ => {
                word.push(ch);
            }
        }
    }

    if !word.is_empty() {
        words.push(word);
    }

    words
}
