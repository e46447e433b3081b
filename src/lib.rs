//! Recurse - a recursive filesystem scanner
//!
//! Walks one or more roots depth-first, keeps entries matching a type mask
//! and an optional regular expression, and prints each one either as a bare
//! path or through a `%N%` interpolation template.

pub mod config;
pub mod diagnostics;
pub mod entry;
pub mod error;
pub mod output;
pub mod pattern;
pub mod runner;
pub mod scan;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use config::{LineTerminator, MatchMode, PatternConfig, PatternSyntax, ScanConfig};
pub use diagnostics::{Diagnostics, Level};
pub use entry::{EntryType, TypeMask, VisitedEntry};
pub use error::{Error, Result};
pub use output::{EntryWriter, Template, TemplateError};
pub use pattern::PathPattern;
pub use runner::{RunSummary, run};
pub use scan::{EntryFilter, ScanSummary, Visit, Visitor, Walker, scan};
