use std::str::FromStr;

use crate::error::{NnError, Result};

/// Line cursor over the text model format. Tracks 1-based line numbers so
/// parse failures point at the offending line.
pub struct LineReader<'a> {
    lines: std::str::Lines<'a>,
    line: usize,
}

impl<'a> LineReader<'a> {
    pub fn new(text: &'a str) -> LineReader<'a> {
        LineReader { lines: text.lines(), line: 0 }
    }

    /// Number of the line most recently returned (0 before the first read).
    pub fn line(&self) -> usize {
        self.line
    }

    /// Returns the next line, trimmed. `what` names the expected content
    /// for the error raised at end of input.
    pub fn next_line(&mut self, what: &str) -> Result<&'a str> {
        match self.lines.next() {
            Some(text) => {
                self.line += 1;
                Ok(text.trim())
            }
            None => Err(NnError::parse(
                self.line + 1,
                format!("unexpected end of input, expected {what}"),
            )),
        }
    }

    /// Reads the next line and parses it whole as a single `T`.
    pub fn parse_next<T: FromStr>(&mut self, what: &str) -> Result<T> {
        let text = self.next_line(what)?;
        text.parse::<T>()
            .map_err(|_| NnError::parse(self.line, format!("invalid {what}: {text:?}")))
    }

    /// Fails if anything other than blank lines remains.
    pub fn finish(mut self) -> Result<()> {
        while let Some(text) = self.lines.next() {
            self.line += 1;
            if !text.trim().is_empty() {
                return Err(NnError::parse(self.line, "unexpected trailing content"));
            }
        }
        Ok(())
    }
}
