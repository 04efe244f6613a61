//! Shared test utilities.

use camino::Utf8PathBuf;
use tempfile::TempDir;

pub mod runtime;

/// Temporary directory with a UTF-8 root path.
pub struct Workspace {
    _temp_dir: TempDir,
    root: Utf8PathBuf,
}

impl Workspace {
    /// Creates an empty workspace.
    ///
    /// # Panics
    ///
    /// Panics if the temporary directory cannot be created or its path is
    /// not UTF-8.
    pub fn new() -> Self {
        let temp_dir = TempDir::new()
            .unwrap_or_else(|error| panic!("failed to create temporary directory: {error}"));
        let root = Utf8PathBuf::from_path_buf(temp_dir.path().to_path_buf())
            .unwrap_or_else(|path| panic!("temporary path is not UTF-8: {}", path.display()));
        Self {
            _temp_dir: temp_dir,
            root,
        }
    }

    /// Snapshot directory inside the workspace (not created).
    pub fn snapshot_dir(&self) -> Utf8PathBuf {
        self.root.join("outputs").join("raw")
    }

    /// Report destination inside the workspace (not created).
    pub fn report_path(&self) -> Utf8PathBuf {
        self.root.join("outputs").join("processed").join("report.csv")
    }
}
