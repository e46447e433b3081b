//! Error types for configuration, scanning and per-entry formatting

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::output::TemplateError;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Error, Debug)]
pub enum Error {
    // Configuration
    #[error("invalid type mask character '{0}'")]
    InvalidTypeMask(char),

    #[error("type mask is empty")]
    EmptyTypeMask,

    #[error("compiling a regular expression failed")]
    InvalidPattern(#[from] regex::Error),

    // Fatal scan errors
    #[error("cannot stat entry")]
    Stat {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot read directory")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot canonicalize path")]
    Canonicalize {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("entry has an unclassifiable file type")]
    Unclassified(PathBuf),

    #[error("writing output failed")]
    Output(#[source] io::Error),

    // Per-entry formatting
    #[error("string interpolation failed")]
    Template {
        path: PathBuf,
        #[source]
        source: TemplateError,
    },

    #[error("{field} is unavailable")]
    MetadataUnavailable {
        path: PathBuf,
        field: &'static str,
        #[source]
        source: io::Error,
    },
}

impl Error {
    /// The path this error occurred at, if applicable.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Stat { path, .. }
            | Self::ReadDir { path, .. }
            | Self::Canonicalize { path, .. }
            | Self::Template { path, .. }
            | Self::MetadataUnavailable { path, .. }
            | Self::Unclassified(path) => Some(path),
            _ => None,
        }
    }

    /// Whether the scan can continue after this error.
    ///
    /// Only per-entry formatting failures are recoverable: the entry is
    /// dropped from the output and the walk goes on.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Template { .. } | Self::MetadataUnavailable { .. })
    }

    /// Whether this error was detected while validating configuration,
    /// before any traversal started.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Self::InvalidTypeMask(_) | Self::EmptyTypeMask | Self::InvalidPattern(_)
        )
    }
}
