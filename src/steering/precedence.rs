//! Static precedence table for steering documents.
//!
//! Every document gets an integer rank; higher rank wins a key collision.
//! Agent-specific documents (`agent-<id>.md`) outrank all generic ones, and
//! the designated diagnostic document sits strictly below everything,
//! including unlisted documents. Both boundary ranks are named constants so
//! the ordering is deliberate rather than a table artifact.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Rank for documents not in the table and not otherwise special.
pub const UNLISTED_RANK: i32 = 0;

/// Rank for the designated low-priority diagnostic document. Strictly below
/// `UNLISTED_RANK`.
pub const DIAGNOSTIC_RANK: i32 = -1;

/// Rank for an agent-specific document. Strictly above every table entry.
pub const AGENT_RANK: i32 = 100;

/// Source name of the designated diagnostic document.
pub const DIAGNOSTIC_SOURCE: &str = "diagnostics.md";

/// Generic documents in ascending precedence.
const PRECEDENCE_TABLE: &[(&str, i32)] = &[
    ("base.md", 1),
    ("product.md", 2),
    ("structure.md", 3),
    ("tech.md", 4),
    ("conventions.md", 5),
    ("project.md", 6),
];

/// Source name of the agent-specific document for an agent id.
pub fn agent_source_name(agent_id: &str) -> String {
    format!("agent-{agent_id}.md")
}

/// Precedence rank for a document source name, for a given agent.
pub fn rank_for(source_name: &str, agent_id: &str) -> i32 {
    if source_name == agent_source_name(agent_id) {
        return AGENT_RANK;
    }
    if source_name == DIAGNOSTIC_SOURCE {
        return DIAGNOSTIC_RANK;
    }
    PRECEDENCE_TABLE
        .iter()
        .find(|(name, _)| *name == source_name)
        .map(|(_, rank)| *rank)
        .unwrap_or(UNLISTED_RANK)
}

/// Precedence class of a document source, used to tag conflict types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceClass {
    /// Base-framework document (`base.md`).
    Framework,
    /// Product description document (`product.md`).
    Product,
    /// Repository structure document (`structure.md`).
    Structure,
    /// Technology stack document (`tech.md`).
    Technology,
    /// Team conventions document (`conventions.md`).
    Conventions,
    /// Project-specific document (`project.md`).
    Project,
    /// Agent-specific document (`agent-<id>.md`).
    Agent,
    /// Designated diagnostic document.
    Diagnostic,
    /// Any unlisted document.
    Custom,
}

impl fmt::Display for SourceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceClass::Framework => write!(f, "framework"),
            SourceClass::Product => write!(f, "product"),
            SourceClass::Structure => write!(f, "structure"),
            SourceClass::Technology => write!(f, "technology"),
            SourceClass::Conventions => write!(f, "conventions"),
            SourceClass::Project => write!(f, "project"),
            SourceClass::Agent => write!(f, "agent"),
            SourceClass::Diagnostic => write!(f, "diagnostic"),
            SourceClass::Custom => write!(f, "custom"),
        }
    }
}

/// Precedence class for a document source name, for a given agent.
pub fn class_for(source_name: &str, agent_id: &str) -> SourceClass {
    if source_name == agent_source_name(agent_id) {
        return SourceClass::Agent;
    }
    match source_name {
        DIAGNOSTIC_SOURCE => SourceClass::Diagnostic,
        "base.md" => SourceClass::Framework,
        "product.md" => SourceClass::Product,
        "structure.md" => SourceClass::Structure,
        "tech.md" => SourceClass::Technology,
        "conventions.md" => SourceClass::Conventions,
        "project.md" => SourceClass::Project,
        _ => SourceClass::Custom,
    }
}
