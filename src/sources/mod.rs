use anyhow::Result;

use std::rc::Rc;

use super::line::Line;

pub mod script;
pub mod tty;

// Used in Line struct to identify source
#[derive(PartialEq, Eq, Clone, Debug)]
pub enum SourceKind {
    Tty,
    Script(Rc<str>), // script pathname, shared by all of its lines
}

pub trait Source {
    fn get_line(&mut self) -> Result<Option<Line>>;
    fn is_tty(&self) -> bool;
    fn print_error(&mut self) -> Result<()>;
}

// Stack of line sources; the most recently pushed source is read first
// and dropped once exhausted.
pub struct Sources {
    sources: Vec<Box<dyn Source>>,
}

impl Sources {
    pub fn new() -> Self {
        Sources { sources: vec![] }
    }

    pub fn get_line(&mut self) -> Result<Option<Line>> {
        while let Some(mut source) = self.sources.pop() {
            match source.get_line() {
                Ok(Some(line)) => {
                    self.sources.push(source);
                    return Ok(Some(line));
                }
                Ok(None) => {
                    continue;
                }
                Err(e) => {
                    self.sources.push(source);
                    return Err(e);
                }
            }
        }

        Ok(None)
    }

    pub fn push_source(&mut self, source: Box<dyn Source>) {
        self.sources.push(source)
    }

    // Reports the failing line of every non-interactive source and
    // discards it, so that a broken script does not keep running.
    pub fn backtrace(&mut self) {
        while let Some(mut source) = self.sources.pop() {
            if source.is_tty() {
                self.sources.push(source);
                break;
            } else {
                let _ = source.print_error();
            }
        }
    }
}
