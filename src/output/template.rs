//! Field interpolation for `-i/--interpolate`
//!
//! A template is literal text with `%N%` placeholders (`N` in `0..=7`) and
//! `%%` for a literal percent sign. Fields are resolved lazily, so an entry
//! only pays for the metadata the template actually mentions.

use std::io::Write as _;
use std::time::SystemTime;

use chrono::{DateTime, Local};
use thiserror::Error;

use crate::entry::VisitedEntry;
use crate::error::{Error, Result};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Why a template could not be interpreted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error("unknown token '{sequence}' at byte {position}")]
    UnknownToken { position: usize, sequence: String },

    #[error("unterminated token at byte {position}")]
    Unterminated { position: usize },
}

/// Per-entry value a placeholder expands to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Path,
    Type,
    Size,
    LastAccess,
    LastModification,
    LastStatusChange,
    Permissions,
    Depth,
}

impl Field {
    fn from_digit(c: char) -> Option<Self> {
        Some(match c {
            '0' => Field::Path,
            '1' => Field::Type,
            '2' => Field::Size,
            '3' => Field::LastAccess,
            '4' => Field::LastModification,
            '5' => Field::LastStatusChange,
            '6' => Field::Permissions,
            '7' => Field::Depth,
            _ => return None,
        })
    }

    fn write(self, out: &mut Vec<u8>, entry: &VisitedEntry) -> Result<()> {
        // Writing into a Vec cannot fail
        let _ = match self {
            Field::Path => out.write_all(&entry.path_bytes()),
            Field::Type => write!(out, "{}", entry.kind()),
            Field::Size => write!(out, "{}", entry.size()),
            Field::LastAccess => write!(out, "{}", timestamp(entry.accessed()?)),
            Field::LastModification => write!(out, "{}", timestamp(entry.modified()?)),
            Field::LastStatusChange => write!(out, "{}", timestamp(entry.status_changed()?)),
            Field::Permissions => write!(out, "{}", entry.permissions()),
            Field::Depth => write!(out, "{}", entry.depth()),
        };
        Ok(())
    }
}

fn timestamp(time: SystemTime) -> impl std::fmt::Display {
    DateTime::<Local>::from(time).format(TIMESTAMP_FORMAT)
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Field(Field),
}

/// A parsed interpolation template.
///
/// Parsing happens once; a malformed template keeps its error and reports
/// it again for each entry it is asked to render.
#[derive(Debug, Clone)]
pub struct Template {
    source: String,
    segments: std::result::Result<Vec<Segment>, TemplateError>,
}

impl Template {
    pub fn new(source: impl Into<String>) -> Self {
        let source = source.into();
        let segments = parse(&source);
        Self { source, segments }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// The parse error, if the template is malformed.
    pub fn error(&self) -> Option<&TemplateError> {
        self.segments.as_ref().err()
    }

    /// Render the template for one entry.
    ///
    /// The result is bytes because `%0%` is copied from the path verbatim.
    pub fn render(&self, entry: &VisitedEntry) -> Result<Vec<u8>> {
        let segments = self.segments.as_ref().map_err(|e| Error::Template {
            path: entry.path().to_path_buf(),
            source: e.clone(),
        })?;

        let mut out = Vec::with_capacity(self.source.len() + 32);
        for segment in segments {
            match segment {
                Segment::Literal(text) => out.extend_from_slice(text.as_bytes()),
                Segment::Field(field) => field.write(&mut out, entry)?,
            }
        }
        Ok(out)
    }
}

fn parse(source: &str) -> std::result::Result<Vec<Segment>, TemplateError> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut chars = source.char_indices();

    while let Some((position, c)) = chars.next() {
        if c != '%' {
            literal.push(c);
            continue;
        }
        match chars.next() {
            None => return Err(TemplateError::Unterminated { position }),
            Some((_, '%')) => literal.push('%'),
            Some((_, digit)) => {
                let Some(field) = Field::from_digit(digit) else {
                    return Err(TemplateError::UnknownToken {
                        position,
                        sequence: format!("%{digit}"),
                    });
                };
                match chars.next() {
                    Some((_, '%')) => {}
                    Some((_, other)) => {
                        return Err(TemplateError::UnknownToken {
                            position,
                            sequence: format!("%{digit}{other}"),
                        });
                    }
                    None => return Err(TemplateError::Unterminated { position }),
                }
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(Segment::Field(field));
            }
        }
    }
    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    Ok(segments)
}
