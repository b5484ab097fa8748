//! Common test utilities for integration tests.
//!
//! This module provides fixture files and helpers for testing the inifile
//! library against the real filesystem.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// A realistic settings file exercising every line kind.
#[allow(dead_code)]
pub const SETTINGS: &str = "\
; Application settings
; generated by hand

[server]
host = 0.0.0.0      ; listen on all interfaces
port=8080
    timeout = 30
malformed line without separator

[database]
url = postgres://localhost/app
pool = 4
pool = 16

[server]
port = 9090
";

/// Isolated directory holding test files.
pub struct TestDir {
    /// Temporary directory (kept alive for the duration of the test)
    temp_dir: TempDir,
}

#[allow(dead_code)]
impl TestDir {
    /// Create a new empty test directory.
    pub fn new() -> Self {
        Self {
            temp_dir: tempfile::tempdir().expect("Failed to create temp dir"),
        }
    }

    /// Get the directory path.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Write `contents` to `name` inside the directory and return its path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        fs::write(&path, contents).expect("Failed to write test file");
        path
    }

    /// Write raw bytes to `name` inside the directory and return its path.
    pub fn write_bytes(&self, name: &str, contents: &[u8]) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        fs::write(&path, contents).expect("Failed to write test file");
        path
    }

    /// Read a file back as a string.
    pub fn read(&self, path: &Path) -> String {
        fs::read_to_string(path).expect("Failed to read test file")
    }

    /// Names of all entries in the directory, sorted.
    pub fn entries(&self) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(self.temp_dir.path())
            .expect("Failed to list temp dir")
            .map(|entry| {
                entry
                    .expect("Failed to read dir entry")
                    .file_name()
                    .to_string_lossy()
                    .into_owned()
            })
            .collect();
        names.sort();
        names
    }
}

impl Default for TestDir {
    fn default() -> Self {
        Self::new()
    }
}

/// Changes the working directory for the lifetime of the guard.
///
/// The working directory is process-global, so tests using this must be
/// marked `#[serial]`.
#[allow(dead_code)]
pub struct CwdGuard {
    previous: PathBuf,
}

#[allow(dead_code)]
impl CwdGuard {
    /// Switch to `dir`, remembering the current directory.
    pub fn new(dir: &Path) -> Self {
        let previous = std::env::current_dir().expect("Failed to read current dir");
        std::env::set_current_dir(dir).expect("Failed to change current dir");
        Self { previous }
    }
}

impl Drop for CwdGuard {
    fn drop(&mut self) {
        let _ = std::env::set_current_dir(&self.previous);
    }
}
