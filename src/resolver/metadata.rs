//! Metadata extraction from resolved artifact content.
//!
//! Extracts the leading front-matter block, declared sub-dependencies, and a
//! type-specific "exports" outline (procedure headings, template name,
//! checklist items).
//!
//! Sub-dependency extraction from free text is **best-effort**: three marker
//! conventions are scanned (`[[name]]`, `{{name}}`, `**name**`) and their
//! hits are deduplicated by exact string only. Two conventions referring to
//! the same logical dependency under different spellings therefore yield two
//! entries; downstream resolution surfaces both rather than guessing.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::OnceLock;

use crate::models::ArtifactType;

/// Metadata extracted from one resolved artifact.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArtifactMetadata {
    /// Parsed front-matter fields, if a front-matter block was present.
    #[serde(default)]
    pub front_matter: BTreeMap<String, serde_yaml::Value>,
    /// Declared sub-dependencies, merged from front matter and in-body
    /// reference markers, deduplicated by exact string.
    #[serde(default)]
    pub sub_dependencies: Vec<String>,
    /// Type-specific outline of what the artifact provides.
    #[serde(default)]
    pub exports: Vec<String>,
}

fn marker_patterns() -> &'static [Regex; 3] {
    static PATTERNS: OnceLock<[Regex; 3]> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            // [[create-story]]
            Regex::new(r"\[\[([A-Za-z0-9][A-Za-z0-9_.-]*)\]\]").unwrap(),
            // {{story-tmpl}}
            Regex::new(r"\{\{([A-Za-z0-9][A-Za-z0-9_.-]*)\}\}").unwrap(),
            // **create-story** (file-ish tokens only: must contain - _ or .)
            Regex::new(r"\*\*([a-z0-9]+[-_.][a-z0-9_.-]*)\*\*").unwrap(),
        ]
    })
}

/// Scan free text for referenced artifact names.
///
/// Each marker convention contributes its own candidates; results keep
/// first-appearance order and are deduplicated by exact string match only.
pub fn extract_references(text: &str) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut refs = Vec::new();
    for pattern in marker_patterns() {
        for cap in pattern.captures_iter(text) {
            let name = cap[1].to_string();
            if seen.insert(name.clone()) {
                refs.push(name);
            }
        }
    }
    refs
}

/// Split a leading `---` front-matter block from the body, if present.
fn split_front_matter(content: &str) -> (Option<&str>, &str) {
    let rest = match content.strip_prefix("---\n") {
        Some(rest) => rest,
        None => return (None, content),
    };
    match rest.find("\n---") {
        Some(end) => {
            let block = &rest[..end];
            let body = rest[end + 4..].trim_start_matches('\n');
            (Some(block), body)
        }
        None => (None, content),
    }
}

/// Pull declared sub-dependency names out of parsed front matter.
fn front_matter_dependencies(fields: &BTreeMap<String, serde_yaml::Value>) -> Vec<String> {
    let mut names = Vec::new();
    if let Some(serde_yaml::Value::Sequence(items)) = fields.get("dependencies") {
        for item in items {
            if let serde_yaml::Value::String(name) = item {
                names.push(name.clone());
            }
        }
    }
    names
}

/// Markdown heading titles, in order.
fn heading_titles(body: &str) -> Vec<String> {
    body.lines()
        .filter_map(|line| {
            let trimmed = line.trim_start();
            let stripped = trimmed.trim_start_matches('#');
            if stripped.len() < trimmed.len() && stripped.starts_with(' ') {
                Some(stripped.trim().to_string())
            } else {
                None
            }
        })
        .filter(|t| !t.is_empty())
        .collect()
}

/// Checklist line items: `- [ ]`, `- [x]`, or plain `- ` bullets.
fn checklist_items(body: &str) -> Vec<String> {
    body.lines()
        .filter_map(|line| {
            let trimmed = line.trim_start();
            let item = trimmed
                .strip_prefix("- [ ] ")
                .or_else(|| trimmed.strip_prefix("- [x] "))
                .or_else(|| trimmed.strip_prefix("- "))?;
            let item = item.trim();
            (!item.is_empty()).then(|| item.to_string())
        })
        .collect()
}

/// Extract metadata from artifact content for a given type.
///
/// Template artifacts are whole-file YAML; all other types are markdown with
/// optional front matter.
pub fn extract(artifact_type: ArtifactType, content: &str) -> ArtifactMetadata {
    if artifact_type == ArtifactType::Template {
        return extract_template(content);
    }

    let (front, body) = split_front_matter(content);
    let front_matter: BTreeMap<String, serde_yaml::Value> = front
        .and_then(|block| serde_yaml::from_str(block).ok())
        .unwrap_or_default();

    let mut sub_dependencies = front_matter_dependencies(&front_matter);
    let mut seen: std::collections::HashSet<String> = sub_dependencies.iter().cloned().collect();
    for name in extract_references(body) {
        if seen.insert(name.clone()) {
            sub_dependencies.push(name);
        }
    }

    let exports = match artifact_type {
        ArtifactType::Procedure => heading_titles(body),
        ArtifactType::Checklist => checklist_items(body),
        ArtifactType::DataFile | ArtifactType::Utility => Vec::new(),
        ArtifactType::Template => unreachable!("handled above"),
    };

    ArtifactMetadata {
        front_matter,
        sub_dependencies,
        exports,
    }
}

/// Template artifacts: parse the whole file as YAML; export the top-level
/// `name` field, declare `dependencies` entries as sub-dependencies.
fn extract_template(content: &str) -> ArtifactMetadata {
    let parsed: BTreeMap<String, serde_yaml::Value> =
        serde_yaml::from_str(content).unwrap_or_default();

    let exports = match parsed.get("name") {
        Some(serde_yaml::Value::String(name)) => vec![name.clone()],
        _ => Vec::new(),
    };
    let sub_dependencies = front_matter_dependencies(&parsed);

    ArtifactMetadata {
        front_matter: parsed,
        sub_dependencies,
        exports,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_references_all_conventions() {
        let text = "Run [[create-story]] with {{story-tmpl}} and review **story-dod-checklist**.";
        let refs = extract_references(text);
        assert_eq!(refs, vec!["create-story", "story-tmpl", "story-dod-checklist"]);
    }

    #[test]
    fn test_extract_references_dedup_exact_only() {
        // Same name under two conventions collapses; different spellings of
        // the same logical dependency do not.
        let text = "[[create-story]] then {{create-story}} then {{create_story}}";
        let refs = extract_references(text);
        assert_eq!(refs, vec!["create-story", "create_story"]);
    }

    #[test]
    fn test_bold_marker_ignores_prose_emphasis() {
        let refs = extract_references("This is **important** but **not-a-word** is file-ish.");
        assert_eq!(refs, vec!["not-a-word"]);
    }

    #[test]
    fn test_front_matter_parsed_and_body_scanned() {
        let content = "---\ndependencies:\n  - elicit-requirements\nowner: core\n---\n# Create Story\n\nUses {{story-tmpl}}.\n";
        let meta = extract(ArtifactType::Procedure, content);
        assert_eq!(
            meta.sub_dependencies,
            vec!["elicit-requirements", "story-tmpl"]
        );
        assert_eq!(
            meta.front_matter.get("owner"),
            Some(&serde_yaml::Value::String("core".to_string()))
        );
    }

    #[test]
    fn test_missing_front_matter_is_fine() {
        let meta = extract(ArtifactType::Procedure, "# Title\n\nBody.\n");
        assert!(meta.front_matter.is_empty());
        assert_eq!(meta.exports, vec!["Title"]);
    }

    #[test]
    fn test_procedure_exports_headings() {
        let content = "# Create Story\n\n## Gather Context\n\ntext\n\n## Draft\n";
        let meta = extract(ArtifactType::Procedure, content);
        assert_eq!(meta.exports, vec!["Create Story", "Gather Context", "Draft"]);
    }

    #[test]
    fn test_checklist_exports_items() {
        let content = "# DoD\n\n- [ ] Tests pass\n- [x] Reviewed\n- Notes attached\n";
        let meta = extract(ArtifactType::Checklist, content);
        assert_eq!(
            meta.exports,
            vec!["Tests pass", "Reviewed", "Notes attached"]
        );
    }

    #[test]
    fn test_template_exports_name_field() {
        let content = "name: story-template\nsections:\n  - title\ndependencies:\n  - kb\n";
        let meta = extract(ArtifactType::Template, content);
        assert_eq!(meta.exports, vec!["story-template"]);
        assert_eq!(meta.sub_dependencies, vec!["kb"]);
    }

    #[test]
    fn test_unparseable_template_yields_empty_metadata() {
        let meta = extract(ArtifactType::Template, ": [ not yaml\n");
        assert!(meta.exports.is_empty());
        assert!(meta.sub_dependencies.is_empty());
    }
}
