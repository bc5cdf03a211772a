use anyhow::Result;
use tracing::debug;

use std::io::{self, BufRead, Stdin, Write};

use super::{Source, SourceKind};
use crate::errors::ShellError;
use crate::line::Line;

// Reads lines from stdin, printing the prompt before each one.
pub struct Tty {
    stdin: Stdin,
    prompt: String,
    line_num: usize,
}

impl Tty {
    pub fn build_source(prompt: &str) -> Box<dyn Source> {
        let stdin = io::stdin();

        Box::new(Tty {
            stdin,
            prompt: prompt.to_string(),
            line_num: 0,
        })
    }
}

impl Source for Tty {
    fn get_line(&mut self) -> Result<Option<Line>> {
        let mut buffer = Vec::<u8>::new();

        print!("{}", self.prompt);
        io::stdout().flush().map_err(ShellError::Input)?;

        let num_bytes_read = self
            .stdin
            .lock()
            .read_until(b'\n', &mut buffer)
            .map_err(ShellError::Input)?;

        if num_bytes_read == 0 {
            debug!("end of input after {} lines", self.line_num);
            return Ok(None);
        }

        self.line_num += 1;

        let text = String::from_utf8_lossy(&buffer).into_owned();

        Ok(Some(Line::new(text, self.line_num, SourceKind::Tty)?))
    }

    fn is_tty(&self) -> bool {
        true
    }

    // The failing line was typed by the user; nothing to add.
    fn print_error(&mut self) -> Result<()> {
        Ok(())
    }
}
