//! Test utilities for building temporary directory trees.
//!
//! This module is only compiled for tests and benchmarks.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// A temporary directory tree for testing.
///
/// Provides methods for creating files, directories, symlinks and fifos.
/// The tree is automatically cleaned up when dropped.
pub struct TestTree {
    dir: TempDir,
}

impl TestTree {
    /// Create a new empty temporary directory.
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        Self { dir }
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Add a file, creating parent directories as needed.
    pub fn add_file(&self, path: &str, content: &str) -> PathBuf {
        let full_path = self.dir.path().join(path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dirs");
        }
        fs::write(&full_path, content).expect("Failed to write file");
        full_path
    }

    /// Add a directory, creating parents as needed.
    pub fn add_dir(&self, path: &str) -> PathBuf {
        let full_path = self.dir.path().join(path);
        fs::create_dir_all(&full_path).expect("Failed to create dir");
        full_path
    }

    /// Add a symlink at `link` pointing to `target`.
    ///
    /// `target` is stored as given, so relative targets resolve against
    /// the link's own directory.
    #[cfg(unix)]
    pub fn add_symlink(&self, target: &str, link: &str) -> PathBuf {
        let full_path = self.dir.path().join(link);
        std::os::unix::fs::symlink(target, &full_path).expect("Failed to create symlink");
        full_path
    }

    /// Add a named pipe. Returns `None` when `mkfifo` is unavailable.
    pub fn add_fifo(&self, path: &str) -> Option<PathBuf> {
        let full_path = self.dir.path().join(path);
        let status = Command::new("mkfifo").arg(&full_path).status().ok()?;
        status.success().then_some(full_path)
    }

    /// Build the tree `{a.txt, sub/b.txt, sub/link -> a.txt}`.
    #[cfg(unix)]
    pub fn with_sample_layout() -> Self {
        let tree = Self::new();
        tree.add_file("a.txt", "alpha\n");
        tree.add_file("sub/b.txt", "bravo\n");
        tree.add_symlink("../a.txt", "sub/link");
        tree
    }
}

impl Default for TestTree {
    fn default() -> Self {
        Self::new()
    }
}
