//! One complete run: filter, scan and print every root in order

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use termcolor::WriteColor;

use crate::config::ScanConfig;
use crate::diagnostics::Diagnostics;
use crate::entry::VisitedEntry;
use crate::error::{Error, Result};
use crate::output::{EntryWriter, Template};
use crate::scan::{EntryFilter, ScanSummary, Visit, Walker};

/// Totals over all roots of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub roots: usize,
    pub visited: usize,
    pub emitted: usize,
    /// Entries rejected by the filter
    pub skipped: usize,
    /// Entries that passed the filter but failed to format
    pub failed: usize,
}

/// Scan `roots` one after another and write included entries to `out`.
///
/// An empty `roots` slice scans the current directory. Configuration
/// problems are reported before anything is written. The first fatal error
/// stops the run; output produced up to that point is flushed.
pub fn run<W: Write, D: WriteColor>(
    config: &ScanConfig,
    roots: &[PathBuf],
    out: W,
    diag: &mut Diagnostics<D>,
) -> Result<RunSummary> {
    if config.type_mask.is_empty() {
        return Err(Error::EmptyTypeMask);
    }
    let filter = EntryFilter::new(config)?;
    let walker = Walker::new(config.max_depth);
    let mut writer = EntryWriter::new(
        out,
        config.line_terminator,
        config.template.as_deref().map(Template::new),
    );

    let default_root = [PathBuf::from(".")];
    let roots = if roots.is_empty() { &default_root[..] } else { roots };

    let mut total = RunSummary::default();
    for root in roots {
        let root = resolve_root(root, config.canonicalize)?;
        diag.debug(format_args!("scanning {}", root.display()));

        let mut filtered = 0;
        let mut failed = 0;
        let mut visitor = |entry: &VisitedEntry| -> Result<Visit> {
            if !filter.accepts(entry) {
                filtered += 1;
                return Ok(Visit::Skip);
            }
            match writer.emit(entry) {
                Ok(()) => Ok(Visit::Include),
                Err(err) if err.is_recoverable() => {
                    diag.entry_error(&err);
                    failed += 1;
                    Ok(Visit::Skip)
                }
                Err(err) => Err(err),
            }
        };
        let scanned = walker.scan(&root, &mut visitor);
        let flushed = writer.flush();
        let summary = scanned?;
        flushed?;

        log_summary(diag, &root, &summary, filtered, failed);
        total.roots += 1;
        total.visited += summary.visited;
        total.emitted += summary.included;
        total.skipped += filtered;
        total.failed += failed;
    }
    Ok(total)
}

fn resolve_root(root: &Path, canonicalize: bool) -> Result<PathBuf> {
    if !canonicalize {
        return Ok(root.to_path_buf());
    }
    fs::canonicalize(root).map_err(|source| Error::Canonicalize {
        path: root.to_path_buf(),
        source,
    })
}

fn log_summary<D: WriteColor>(
    diag: &mut Diagnostics<D>,
    root: &Path,
    summary: &ScanSummary,
    filtered: usize,
    failed: usize,
) {
    diag.debug(format_args!(
        "{}: visited {}, emitted {}, filtered out {}, failed to format {}",
        root.display(),
        summary.visited,
        summary.included,
        filtered,
        failed
    ));
}
