//! Layered search scopes for artifact resolution.
//!
//! Artifacts are searched across up to three read-only scope roots, in
//! priority order:
//!
//! 1. **Own** - the agent's extension-pack root, or the base-framework root
//!    for agents that belong to no pack
//! 2. **Common** - the shared scope, if configured
//! 3. **Base** - the base-framework root, as a fallback for extension-scoped
//!    agents only (base-framework agents never fall back into a pack)

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::models::{ArtifactType, PackManifest};

/// Which layer a scope root belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScopeKind {
    /// The agent's own extension-pack scope.
    Extension,
    /// The shared scope.
    Common,
    /// The base-framework scope.
    Base,
}

impl fmt::Display for ScopeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScopeKind::Extension => write!(f, "extension"),
            ScopeKind::Common => write!(f, "common"),
            ScopeKind::Base => write!(f, "base"),
        }
    }
}

/// Ordered, read-only scope roots for one agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeContext {
    own_kind: ScopeKind,
    own_root: PathBuf,
    common_root: Option<PathBuf>,
    /// Base-framework fallback. Present only for extension-scoped agents.
    base_fallback: Option<PathBuf>,
}

impl ScopeContext {
    /// Scope context for a base-framework agent.
    pub fn base(base_root: impl Into<PathBuf>) -> Self {
        Self {
            own_kind: ScopeKind::Base,
            own_root: base_root.into(),
            common_root: None,
            base_fallback: None,
        }
    }

    /// Scope context for an agent belonging to an extension pack.
    ///
    /// The pack root is searched first and the base root last.
    pub fn extension(pack_root: impl Into<PathBuf>, base_root: impl Into<PathBuf>) -> Self {
        Self {
            own_kind: ScopeKind::Extension,
            own_root: pack_root.into(),
            common_root: None,
            base_fallback: Some(base_root.into()),
        }
    }

    /// Add a shared/common scope root, searched between own and base.
    pub fn with_common(mut self, common_root: impl Into<PathBuf>) -> Self {
        self.common_root = Some(common_root.into());
        self
    }

    /// Whether this context belongs to an extension-scoped agent.
    pub fn is_extension(&self) -> bool {
        self.own_kind == ScopeKind::Extension
    }

    /// The agent's own scope root.
    pub fn own_root(&self) -> &Path {
        &self.own_root
    }

    /// Scope roots in search-priority order.
    pub fn roots(&self) -> Vec<(ScopeKind, &Path)> {
        let mut roots = vec![(self.own_kind, self.own_root.as_path())];
        if let Some(ref common) = self.common_root {
            roots.push((ScopeKind::Common, common.as_path()));
        }
        if let Some(ref base) = self.base_fallback {
            roots.push((ScopeKind::Base, base.as_path()));
        }
        roots
    }

    /// Directory for one artifact type within one scope root.
    pub fn type_dir(root: &Path, artifact_type: ArtifactType) -> PathBuf {
        root.join(artifact_type.subdir())
    }

    /// Stable key identifying this scope configuration, for cache keying.
    pub fn cache_key(&self) -> String {
        let mut key = format!("{}:{}", self.own_kind, self.own_root.display());
        if let Some(ref common) = self.common_root {
            key.push_str(&format!("|common:{}", common.display()));
        }
        if let Some(ref base) = self.base_fallback {
            key.push_str(&format!("|base:{}", base.display()));
        }
        key
    }

    /// Load the pack manifest from the extension root, if one is registered.
    ///
    /// A malformed manifest is logged and treated as absent: implicit
    /// dependencies are a convenience, not a correctness requirement.
    pub fn manifest(&self) -> Option<PackManifest> {
        if self.own_kind != ScopeKind::Extension {
            return None;
        }
        let path = self.own_root.join("pack.yaml");
        let content = std::fs::read_to_string(&path).ok()?;
        match serde_yaml::from_str(&content) {
            Ok(manifest) => Some(manifest),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring malformed pack manifest");
                None
            }
        }
    }
}
