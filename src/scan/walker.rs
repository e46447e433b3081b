//! Depth-bounded, depth-first directory walk

use std::fs;
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};

use crate::entry::{EntryType, VisitedEntry};
use crate::error::{Error, Result};

/// What the visitor decided about one entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visit {
    /// Entry was emitted
    Include,
    /// Entry was filtered out; the walk continues
    Skip,
    /// Stop the whole walk
    Abort,
}

/// Callback invoked once per visited entry, in pre-order.
///
/// The decision never affects recursion: a skipped directory is still
/// descended into. Only [`Visit::Abort`] ends the walk early.
pub trait Visitor {
    fn visit(&mut self, entry: &VisitedEntry) -> Result<Visit>;
}

impl<F> Visitor for F
where
    F: FnMut(&VisitedEntry) -> Result<Visit>,
{
    fn visit(&mut self, entry: &VisitedEntry) -> Result<Visit> {
        self(entry)
    }
}

/// Counters for one scanned root.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanSummary {
    pub visited: usize,
    pub included: usize,
    pub skipped: usize,
    pub aborted: bool,
}

/// Walks a directory tree without following symlinks.
///
/// Children are visited in file name order so repeated runs over an
/// unchanged tree produce identical output.
#[derive(Debug, Clone, Copy, Default)]
pub struct Walker {
    max_depth: Option<usize>,
}

impl Walker {
    /// `None` walks the whole tree.
    pub fn new(max_depth: Option<usize>) -> Self {
        Self { max_depth }
    }

    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    /// Check if entries at `depth` may not be descended into
    pub fn at_max_depth(&self, depth: usize) -> bool {
        self.max_depth.is_some_and(|max| depth >= max)
    }

    /// Visit `root` at depth 0 and everything below it.
    ///
    /// Any stat, read or classification failure aborts the walk and is
    /// returned with the offending path.
    pub fn scan<V: Visitor + ?Sized>(&self, root: &Path, visitor: &mut V) -> Result<ScanSummary> {
        let mut summary = ScanSummary::default();
        if self
            .walk(root.to_path_buf(), 0, visitor, &mut summary)?
            .is_break()
        {
            summary.aborted = true;
        }
        Ok(summary)
    }

    fn walk<V: Visitor + ?Sized>(
        &self,
        path: PathBuf,
        depth: usize,
        visitor: &mut V,
        summary: &mut ScanSummary,
    ) -> Result<ControlFlow<()>> {
        let entry = VisitedEntry::resolve(path, depth)?;
        summary.visited += 1;

        match visitor.visit(&entry)? {
            Visit::Include => summary.included += 1,
            Visit::Skip => summary.skipped += 1,
            Visit::Abort => return Ok(ControlFlow::Break(())),
        }

        if entry.kind() != EntryType::Directory || self.at_max_depth(depth) {
            return Ok(ControlFlow::Continue(()));
        }

        for child in read_sorted(entry.path())? {
            if self.walk(child, depth + 1, visitor, summary)?.is_break() {
                return Ok(ControlFlow::Break(()));
            }
        }
        Ok(ControlFlow::Continue(()))
    }
}

/// Read the immediate children of `dir`, sorted by file name.
///
/// The directory handle is closed before this returns.
fn read_sorted(dir: &Path) -> Result<Vec<PathBuf>> {
    let read_err = |source| Error::ReadDir {
        path: dir.to_path_buf(),
        source,
    };

    let mut entries = fs::read_dir(dir)
        .map_err(read_err)?
        .collect::<std::io::Result<Vec<_>>>()
        .map_err(read_err)?;
    entries.sort_by_key(|e| e.file_name());

    Ok(entries.into_iter().map(|e| e.path()).collect())
}

/// Scan `root` with a fresh [`Walker`].
pub fn scan<V: Visitor + ?Sized>(
    root: &Path,
    max_depth: Option<usize>,
    visitor: &mut V,
) -> Result<ScanSummary> {
    Walker::new(max_depth).scan(root, visitor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TestTree;

    fn collect(tree: &TestTree, max_depth: Option<usize>) -> Vec<(String, usize, EntryType)> {
        let mut seen = Vec::new();
        let mut visitor = |entry: &VisitedEntry| -> Result<Visit> {
            let rel = entry
                .path()
                .strip_prefix(tree.path())
                .unwrap()
                .to_string_lossy()
                .into_owned();
            seen.push((rel, entry.depth(), entry.kind()));
            Ok(Visit::Skip)
        };
        scan(tree.path(), max_depth, &mut visitor).unwrap();
        seen
    }

    #[test]
    fn test_preorder_sorted_walk() {
        let tree = TestTree::new();
        tree.add_file("b.txt", "");
        tree.add_file("a/z.txt", "");
        tree.add_file("a/y.txt", "");

        let seen = collect(&tree, None);
        let names: Vec<_> = seen.iter().map(|(p, d, _)| (p.as_str(), *d)).collect();
        assert_eq!(
            names,
            vec![("", 0), ("a", 1), ("a/y.txt", 2), ("a/z.txt", 2), ("b.txt", 1)]
        );
        assert_eq!(seen[0].2, EntryType::Directory);
    }

    #[test]
    fn test_depth_bound() {
        let tree = TestTree::new();
        tree.add_file("l1/l2/l3/deep.txt", "");

        for max in 0..5 {
            let seen = collect(&tree, Some(max));
            assert!(seen.iter().all(|(_, d, _)| *d <= max));
            assert_eq!(seen.len(), (max + 1).min(5));
        }
        assert_eq!(collect(&tree, None).len(), 5);
    }

    #[test]
    fn test_depth_zero_visits_only_root() {
        let tree = TestTree::new();
        tree.add_file("a.txt", "");
        let seen = collect(&tree, Some(0));
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].1, 0);
    }

    #[test]
    #[cfg(unix)]
    fn test_symlinked_directory_is_a_leaf() {
        let tree = TestTree::new();
        tree.add_file("real/one.txt", "");
        tree.add_file("real/two.txt", "");
        tree.add_symlink("real", "link");

        let seen = collect(&tree, None);
        let link: Vec<_> = seen.iter().filter(|(p, _, _)| p.starts_with("link")).collect();
        assert_eq!(link.len(), 1);
        assert_eq!(link[0].2, EntryType::Symlink);
    }

    #[test]
    #[cfg(unix)]
    fn test_symlink_loop_terminates() {
        let tree = TestTree::new();
        tree.add_dir("sub");
        tree.add_symlink("..", "sub/parent");
        assert_eq!(collect(&tree, None).len(), 3);
    }

    #[test]
    fn test_skip_does_not_prune_recursion() {
        let tree = TestTree::new();
        tree.add_file("dir/inner.txt", "");

        let mut included = Vec::new();
        let mut visitor = |entry: &VisitedEntry| -> Result<Visit> {
            if entry.kind() == EntryType::Directory {
                return Ok(Visit::Skip);
            }
            included.push(entry.path().to_path_buf());
            Ok(Visit::Include)
        };
        let summary = scan(tree.path(), None, &mut visitor).unwrap();
        assert_eq!(included, vec![tree.path().join("dir/inner.txt")]);
        assert_eq!(summary.visited, 3);
        assert_eq!(summary.included, 1);
        assert_eq!(summary.skipped, 2);
        assert!(!summary.aborted);
    }

    #[test]
    fn test_abort_stops_walk() {
        let tree = TestTree::new();
        tree.add_file("a.txt", "");
        tree.add_file("b.txt", "");
        tree.add_file("c.txt", "");

        let mut count = 0;
        let mut visitor = |entry: &VisitedEntry| -> Result<Visit> {
            if entry.path().ends_with("b.txt") {
                return Ok(Visit::Abort);
            }
            count += 1;
            Ok(Visit::Include)
        };
        let summary = scan(tree.path(), None, &mut visitor).unwrap();
        assert!(summary.aborted);
        assert_eq!(count, 2);
        assert_eq!(summary.visited, 3);
    }

    #[test]
    fn test_visitor_error_propagates() {
        let tree = TestTree::new();
        tree.add_file("a.txt", "");
        let mut visitor = |entry: &VisitedEntry| -> Result<Visit> {
            Err(Error::Unclassified(entry.path().to_path_buf()))
        };
        let err = scan(tree.path(), None, &mut visitor).unwrap_err();
        assert_eq!(err.path(), Some(tree.path()));
    }

    #[test]
    fn test_missing_root_is_stat_error() {
        let tree = TestTree::new();
        let missing = tree.path().join("nope");
        let mut visitor = |_: &VisitedEntry| -> Result<Visit> { Ok(Visit::Include) };
        match scan(&missing, None, &mut visitor) {
            Err(Error::Stat { path, .. }) => assert_eq!(path, missing),
            other => panic!("expected Stat error, got {other:?}"),
        }
    }

    #[test]
    fn test_file_root_is_visited_at_depth_zero() {
        let tree = TestTree::new();
        let file = tree.add_file("only.txt", "");
        let mut depths = Vec::new();
        let mut visitor = |entry: &VisitedEntry| -> Result<Visit> {
            depths.push(entry.depth());
            Ok(Visit::Include)
        };
        scan(&file, None, &mut visitor).unwrap();
        assert_eq!(depths, vec![0]);
    }

    #[test]
    #[cfg(unix)]
    fn test_unreadable_directory_is_fatal() {
        use std::os::unix::fs::PermissionsExt;

        let tree = TestTree::new();
        let locked = tree.add_dir("locked");
        tree.add_file("locked/secret.txt", "");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        // Root ignores permission bits
        if fs::read_dir(&locked).is_ok() {
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let mut visitor = |_: &VisitedEntry| -> Result<Visit> { Ok(Visit::Include) };
        let result = scan(tree.path(), None, &mut visitor);
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        match result {
            Err(Error::ReadDir { path, .. }) => assert_eq!(path, locked),
            other => panic!("expected ReadDir error, got {other:?}"),
        }
    }
}
