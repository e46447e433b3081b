//! Type mask and path pattern filtering

use crate::config::ScanConfig;
use crate::entry::{TypeMask, VisitedEntry};
use crate::error::Result;
use crate::pattern::PathPattern;

/// Decides which visited entries are emitted.
///
/// Filtering is a pure predicate over one entry; it never influences
/// which directories the walker descends into.
#[derive(Debug, Clone)]
pub struct EntryFilter {
    mask: TypeMask,
    pattern: Option<PathPattern>,
}

impl EntryFilter {
    /// Build the filter, compiling the configured pattern.
    ///
    /// Pattern errors surface here, before any traversal starts.
    pub fn new(config: &ScanConfig) -> Result<Self> {
        let pattern = config.pattern.as_ref().map(PathPattern::compile).transpose()?;
        Ok(Self {
            mask: config.type_mask,
            pattern,
        })
    }

    pub fn mask(&self) -> TypeMask {
        self.mask
    }

    pub fn pattern(&self) -> Option<&PathPattern> {
        self.pattern.as_ref()
    }

    /// Check if an entry passes both the type test and the pattern test
    pub fn accepts(&self, entry: &VisitedEntry) -> bool {
        if !self.mask.contains(entry.kind()) {
            return false;
        }
        match &self.pattern {
            Some(pattern) => pattern.is_match(&entry.path_bytes()),
            None => true,
        }
    }
}
