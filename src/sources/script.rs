use anyhow::Result;

use super::{Source, SourceKind};
use crate::line::Line;

use std::fs::read_to_string;
use std::path::PathBuf;
use std::rc::Rc;

// Start-up script: its lines run before the first prompt.
#[derive(Clone)]
pub struct Script {
    path: PathBuf,
    kind: SourceKind,
    body: Vec<String>,
    line_num: usize,
    last_line: Option<String>,
}

impl Script {
    pub fn build_source(path: PathBuf) -> Result<Box<dyn Source>> {
        let body = read_to_string(&path)?
            .lines()
            .map(|x| x.to_string())
            .collect();

        let kind = SourceKind::Script(Rc::from(path.to_string_lossy()));

        let script = Script {
            path,
            kind,
            body,
            line_num: 0,
            last_line: None,
        };

        Ok(Box::new(script))
    }
}

impl Source for Script {
    fn get_line(&mut self) -> Result<Option<Line>> {
        if self.line_num == self.body.len() {
            Ok(None)
        } else {
            let text = self.body[self.line_num].clone();
            self.line_num += 1;
            self.last_line = Some(text.clone());

            let line = Line::new(text, self.line_num, self.kind.clone())?;

            Ok(Some(line))
        }
    }

    fn is_tty(&self) -> bool {
        false
    }

    fn print_error(&mut self) -> Result<()> {
        if let Some(line) = &self.last_line {
            eprintln!("\tScript `{}` line {}: {}", self.path.display(), self.line_num, line);
        }

        Ok(())
    }
}
