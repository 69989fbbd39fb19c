//! Common test utilities for tiller integration tests.
//!
//! Provides `TestEnv` with isolated scope-root directories so tests can run
//! in parallel without sharing any filesystem state.

#![allow(dead_code)]

use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
pub use tempfile::TempDir;

/// A test environment with isolated scope roots.
///
/// Each `TestEnv` creates four temporary directories:
/// - `base_dir`: the base framework root
/// - `common_dir`: the shared common root
/// - `pack_dir`: an extension pack root
/// - `work_dir`: scratch space for agent files and steering directories
pub struct TestEnv {
    pub base_dir: TempDir,
    pub common_dir: TempDir,
    pub pack_dir: TempDir,
    pub work_dir: TempDir,
}

impl TestEnv {
    /// Create a new test environment with isolated directories.
    pub fn new() -> Self {
        Self {
            base_dir: TempDir::new().unwrap(),
            common_dir: TempDir::new().unwrap(),
            pack_dir: TempDir::new().unwrap(),
            work_dir: TempDir::new().unwrap(),
        }
    }

    /// Get a Command for the tlr binary.
    pub fn tlr(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_tlr"));
        cmd.current_dir(self.work_dir.path());
        cmd
    }

    pub fn base(&self) -> &Path {
        self.base_dir.path()
    }

    pub fn common(&self) -> &Path {
        self.common_dir.path()
    }

    pub fn pack(&self) -> &Path {
        self.pack_dir.path()
    }

    pub fn work(&self) -> &Path {
        self.work_dir.path()
    }

    /// Write an artifact under `root/<subdir>/<file_name>`.
    pub fn write_artifact(&self, root: &Path, subdir: &str, file_name: &str, content: &str) -> PathBuf {
        let dir = root.join(subdir);
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(file_name);
        fs::write(&path, content).unwrap();
        path
    }

    /// Write a file into the scratch directory.
    pub fn write_work_file(&self, file_name: &str, content: &str) -> PathBuf {
        let path = self.work_dir.path().join(file_name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}
