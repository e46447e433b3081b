//! Entry emission with a trailing separator

use std::io::Write;

use crate::config::LineTerminator;
use crate::entry::VisitedEntry;
use crate::error::{Error, Result};

use super::template::Template;

/// Writes included entries to a byte stream.
///
/// Each entry is rendered to a buffer first, so a failing template never
/// leaves a partial entry in the output. Paths are written as raw bytes.
pub struct EntryWriter<W: Write> {
    out: W,
    terminator: LineTerminator,
    template: Option<Template>,
    emitted: usize,
}

impl<W: Write> EntryWriter<W> {
    pub fn new(out: W, terminator: LineTerminator, template: Option<Template>) -> Self {
        Self {
            out,
            terminator,
            template,
            emitted: 0,
        }
    }

    /// Format `entry` for output without writing it.
    pub fn format(&self, entry: &VisitedEntry) -> Result<Vec<u8>> {
        match &self.template {
            Some(template) => template.render(entry),
            None => Ok(entry.path_bytes().into_owned()),
        }
    }

    /// Format and write `entry` followed by the separator.
    ///
    /// Formatting errors are returned before anything is written; write
    /// errors map to [`Error::Output`].
    pub fn emit(&mut self, entry: &VisitedEntry) -> Result<()> {
        let mut bytes = self.format(entry)?;
        bytes.push(self.terminator.as_byte());
        self.out.write_all(&bytes).map_err(Error::Output)?;
        self.emitted += 1;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.out.flush().map_err(Error::Output)
    }

    /// Number of entries written so far.
    pub fn emitted(&self) -> usize {
        self.emitted
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
