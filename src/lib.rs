//! Tiller - agent definition conversion engine.
//!
//! This library provides the core functionality for the `tlr` CLI tool:
//! resolving the typed artifact dependencies of declarative agent definitions
//! across layered search scopes, and merging layered steering-rule documents
//! into one effective rule set per agent with conflict detection.

pub mod cli;
pub mod commands;
pub mod models;
pub mod resolver;
pub mod steering;

/// Library-level error type for Tiller operations.
///
/// Only genuine I/O faults and malformed caller input surface as errors.
/// Unresolvable artifact references, steering conflicts, dependency cycles,
/// and structurally invalid rule documents are all represented as data in
/// their respective reports.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type alias for Tiller operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Test utilities for building artifact trees in temporary directories.
#[cfg(test)]
pub(crate) mod test_utils {
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    use crate::models::ArtifactType;

    /// Test environment with isolated scope roots.
    ///
    /// Creates three temporary directories acting as the base-framework scope,
    /// the shared/common scope, and one extension-pack scope.
    pub struct TestEnv {
        pub base_dir: TempDir,
        pub common_dir: TempDir,
        pub pack_dir: TempDir,
    }

    impl TestEnv {
        pub fn new() -> Self {
            Self {
                base_dir: TempDir::new().unwrap(),
                common_dir: TempDir::new().unwrap(),
                pack_dir: TempDir::new().unwrap(),
            }
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

        /// Write an artifact file under `root/<type subdir>/<file_name>`.
        pub fn write_artifact(
            &self,
            root: &Path,
            artifact_type: ArtifactType,
            file_name: &str,
            content: &str,
        ) -> PathBuf {
            let dir = root.join(artifact_type.subdir());
            fs::create_dir_all(&dir).unwrap();
            let path = dir.join(file_name);
            fs::write(&path, content).unwrap();
            path
        }
    }

    impl Default for TestEnv {
        fn default() -> Self {
            Self::new()
        }
    }
}
