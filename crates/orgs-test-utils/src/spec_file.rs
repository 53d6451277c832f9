//! [`TestSpecFile`]: an organization spec written to a temporary directory.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// A spec document on disk, removed when dropped.
///
/// # Example
///
/// ```rust,no_run
/// use orgs_test_utils::TestSpecFile;
///
/// let spec = TestSpecFile::yaml("master_account_id: '111111111111'\n");
/// assert!(spec.path().exists());
/// ```
pub struct TestSpecFile {
    _temp_dir: TempDir,
    path: PathBuf,
}

impl TestSpecFile {
    /// Write `contents` to `spec.yaml`.
    pub fn yaml(contents: &str) -> Self {
        Self::named("spec.yaml", contents)
    }

    /// Write `contents` to a file with the given name.
    pub fn named(file_name: &str, contents: &str) -> Self {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(file_name);
        fs::write(&path, contents)
            .unwrap_or_else(|e| panic!("Could not write {}: {}", path.display(), e));
        Self {
            _temp_dir: temp_dir,
            path,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
