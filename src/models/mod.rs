//! Data models for Tiller entities.
//!
//! This module defines the core data structures:
//! - `ArtifactType` - The recognized kinds of auxiliary artifacts
//! - `ArtifactRef` - A typed, named dependency reference
//! - `Agent` - A declarative agent definition with commands and dependencies
//! - `AgentDependencies` - Per-type dependency name lists
//! - `PackManifest` - Extension-pack manifest with implicit dependencies
//! - `InclusionMode` - How a steering document opts into the merge

use serde::{Deserialize, Serialize};
use std::fmt;

/// The recognized artifact types an agent may depend on.
///
/// Each type maps to a fixed subdirectory within a scope root and a fixed
/// canonical file extension. Adding a type is a compiler-checked change:
/// every `match` over this enum is exhaustive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArtifactType {
    /// Step-by-step procedure document.
    Procedure,
    /// Structured document template.
    Template,
    /// Review checklist.
    Checklist,
    /// Reference data file.
    DataFile,
    /// Shared utility document.
    Utility,
}

impl ArtifactType {
    /// All recognized types, in resolution-report order.
    pub const ALL: [ArtifactType; 5] = [
        ArtifactType::Procedure,
        ArtifactType::Template,
        ArtifactType::Checklist,
        ArtifactType::DataFile,
        ArtifactType::Utility,
    ];

    /// Canonical file extension for this type (without the dot).
    pub fn extension(&self) -> &'static str {
        match self {
            ArtifactType::Procedure => "md",
            ArtifactType::Template => "yaml",
            ArtifactType::Checklist => "md",
            ArtifactType::DataFile => "md",
            ArtifactType::Utility => "md",
        }
    }

    /// Subdirectory name for this type within a scope root.
    pub fn subdir(&self) -> &'static str {
        match self {
            ArtifactType::Procedure => "procedures",
            ArtifactType::Template => "templates",
            ArtifactType::Checklist => "checklists",
            ArtifactType::DataFile => "data",
            ArtifactType::Utility => "utils",
        }
    }
}

impl fmt::Display for ArtifactType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactType::Procedure => write!(f, "procedure"),
            ArtifactType::Template => write!(f, "template"),
            ArtifactType::Checklist => write!(f, "checklist"),
            ArtifactType::DataFile => write!(f, "data-file"),
            ArtifactType::Utility => write!(f, "utility"),
        }
    }
}

impl std::str::FromStr for ArtifactType {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "procedure" => Ok(ArtifactType::Procedure),
            "template" => Ok(ArtifactType::Template),
            "checklist" => Ok(ArtifactType::Checklist),
            "data-file" | "data" => Ok(ArtifactType::DataFile),
            "utility" | "util" => Ok(ArtifactType::Utility),
            _ => Err(crate::Error::InvalidInput(format!(
                "Invalid artifact type: '{}'. Expected one of: procedure, template, checklist, data-file, utility.",
                s
            ))),
        }
    }
}

/// A typed, named dependency reference declared by an agent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArtifactRef {
    /// The artifact type.
    #[serde(rename = "type")]
    pub artifact_type: ArtifactType,
    /// The declared name (naming-convention variants are normalized at
    /// resolution time).
    pub name: String,
}

impl ArtifactRef {
    /// Create a new artifact reference.
    pub fn new(artifact_type: ArtifactType, name: impl Into<String>) -> Self {
        Self {
            artifact_type,
            name: name.into(),
        }
    }
}

impl fmt::Display for ArtifactRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.artifact_type, self.name)
    }
}

/// Per-type dependency name lists declared by an agent or a pack manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentDependencies {
    /// Procedure names.
    #[serde(default)]
    pub procedures: Vec<String>,
    /// Template names.
    #[serde(default)]
    pub templates: Vec<String>,
    /// Checklist names.
    #[serde(default)]
    pub checklists: Vec<String>,
    /// Data file names.
    #[serde(default, rename = "data")]
    pub data_files: Vec<String>,
    /// Utility names.
    #[serde(default, rename = "utils")]
    pub utilities: Vec<String>,
}

impl AgentDependencies {
    /// Flatten into an ordered list of typed references.
    ///
    /// Order is by type (`ArtifactType::ALL` order), then declaration order
    /// within each type.
    pub fn refs(&self) -> Vec<ArtifactRef> {
        let mut refs = Vec::new();
        for ty in ArtifactType::ALL {
            let names = match ty {
                ArtifactType::Procedure => &self.procedures,
                ArtifactType::Template => &self.templates,
                ArtifactType::Checklist => &self.checklists,
                ArtifactType::DataFile => &self.data_files,
                ArtifactType::Utility => &self.utilities,
            };
            for name in names {
                refs.push(ArtifactRef::new(ty, name.clone()));
            }
        }
        refs
    }

    /// Total number of declared names across all types.
    pub fn len(&self) -> usize {
        self.procedures.len()
            + self.templates.len()
            + self.checklists.len()
            + self.data_files.len()
            + self.utilities.len()
    }

    /// Check whether no dependencies are declared.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A declarative agent definition.
///
/// Agents are authored as markdown files carrying a fenced YAML block, or as
/// bare YAML files. Only the fields relevant to dependency and steering
/// resolution are modeled here; prompt bodies and command wiring belong to
/// the conversion pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    /// Agent identifier (e.g., "dev", "architect").
    pub id: String,
    /// Human-readable title.
    #[serde(default)]
    pub title: String,
    /// Optional description of the agent's purpose.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Extension pack this agent belongs to, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pack: Option<String>,
    /// Command names the agent exposes.
    #[serde(default)]
    pub commands: Vec<String>,
    /// Typed dependency references.
    #[serde(default)]
    pub dependencies: AgentDependencies,
}

impl Agent {
    /// Parse an agent definition from file content.
    ///
    /// Accepts markdown with a fenced ```yaml block (the block wins) or a
    /// bare YAML document.
    pub fn parse(content: &str) -> crate::Result<Self> {
        let yaml = extract_fenced_yaml(content).unwrap_or(content);
        let agent: Agent = serde_yaml::from_str(yaml)?;
        if agent.id.trim().is_empty() {
            return Err(crate::Error::InvalidInput(
                "Agent definition is missing an id".to_string(),
            ));
        }
        Ok(agent)
    }

    /// Load an agent definition from a file on disk.
    pub fn load(path: &std::path::Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }
}

/// Extract the first fenced ```yaml block from markdown, if present.
fn extract_fenced_yaml(content: &str) -> Option<&str> {
    let open = content.find("```yaml")?;
    let body_start = content[open..].find('\n')? + open + 1;
    let close = content[body_start..].find("```")?;
    Some(&content[body_start..body_start + close])
}

/// Extension-pack manifest, read from `pack.yaml` at the pack root.
///
/// Packs may register implicit dependencies that every agent belonging to
/// the pack receives in addition to its declared ones.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackManifest {
    /// Pack name.
    pub name: String,
    /// Implicit dependencies resolved for every agent in the pack.
    #[serde(default)]
    pub implicit_dependencies: AgentDependencies,
}

/// How a steering document opts into an agent's merge pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InclusionMode {
    /// Included for every agent.
    Always,
    /// Included when the document's match predicate matches the project
    /// context.
    Conditional,
    /// Included only when explicitly forced by the caller.
    Manual,
}

impl fmt::Display for InclusionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InclusionMode::Always => write!(f, "always"),
            InclusionMode::Conditional => write!(f, "conditional"),
            InclusionMode::Manual => write!(f, "manual"),
        }
    }
}

impl std::str::FromStr for InclusionMode {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "always" => Ok(InclusionMode::Always),
            "conditional" => Ok(InclusionMode::Conditional),
            "manual" => Ok(InclusionMode::Manual),
            _ => Err(crate::Error::InvalidInput(format!(
                "Invalid inclusion mode: '{}'. Expected 'always', 'conditional', or 'manual'.",
                s
            ))),
        }
    }
}
