//! Artifact dependency resolution across layered search scopes.
//!
//! An agent declares typed, named dependencies on auxiliary artifacts
//! (procedures, templates, checklists, data files, utilities). Artifacts are
//! searched across up to three read-only scope roots, in priority order:
//!
//! 1. **Extension** - the agent's own extension-pack root, if it has one
//! 2. **Common** - the shared scope
//! 3. **Base** - the base framework, as a fallback for pack agents only
//!
//! Declared names are normalized to canonical file names first, and
//! recognized naming-convention variants (kebab/snake swap, `core-` prefix,
//! per-type suffixes) are tried in a fixed order within each scope walk.
//!
//! Unresolvable references are an expected outcome: they come back as
//! `found = false` results carrying ranked suggestions and the full searched
//! path list, never as errors. Cycles in the resolved dependency graph are
//! warnings attached to the scan report.

pub mod graph;
pub mod metadata;
pub mod naming;
pub mod resolve;
pub mod scope;
pub mod suggest;

// Re-export commonly used types
pub use graph::{CycleWarning, DependencyGraph};
pub use metadata::{extract_references, ArtifactMetadata};
pub use resolve::{
    ArtifactResolver, CacheStatistics, ResolutionReport, ResolutionResult, TypeSummary,
};
pub use scope::{ScopeContext, ScopeKind};
pub use suggest::{Suggestion, SuggestionAction};
