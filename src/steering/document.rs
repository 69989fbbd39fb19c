//! Steering rule document parsing.
//!
//! Rule documents are markdown files with an optional leading `---` metadata
//! block declaring how the document opts into the merge (`inclusion`), plus
//! optional match predicates for conditional inclusion. The body is split
//! into sections on `##` headings; the slugified heading is the section key
//! and the trimmed body text is the value.
//!
//! Parsing is deliberately lenient: an unrecognized inclusion mode is kept
//! as its raw string so validation (not parsing) can report it, and the
//! document can be excluded from the merge without aborting the batch.

use globset::Glob;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::models::InclusionMode;
use crate::Result;

/// Front-matter fields of a rule document.
#[derive(Debug, Clone, Default, Deserialize)]
struct DocumentHeader {
    #[serde(default)]
    inclusion: Option<String>,
    #[serde(default, alias = "fileMatchPattern")]
    file_match: Option<String>,
    #[serde(default, alias = "agentMatch")]
    agent_match: Option<String>,
    #[serde(default, alias = "projectType")]
    project_type: Option<String>,
}

/// One parsed steering rule document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleDocument {
    /// Source file name (e.g. "tech.md"), used for precedence lookup.
    pub source_name: String,
    /// Raw inclusion mode string as authored; defaults to "always".
    pub inclusion_raw: String,
    /// File-path glob for conditional inclusion.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_match: Option<String>,
    /// Agent-id glob for conditional inclusion.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_match: Option<String>,
    /// Project-type equality predicate for conditional inclusion.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_type: Option<String>,
    /// Section key -> value, in stable key order.
    pub sections: BTreeMap<String, String>,
}

impl RuleDocument {
    /// Parse a rule document from file content.
    pub fn parse(source_name: impl Into<String>, content: &str) -> Self {
        let (header, body) = split_header(content);
        Self {
            source_name: source_name.into(),
            inclusion_raw: header
                .inclusion
                .unwrap_or_else(|| InclusionMode::Always.to_string()),
            file_match: header.file_match,
            agent_match: header.agent_match,
            project_type: header.project_type,
            sections: parse_sections(body),
        }
    }

    /// The parsed inclusion mode, if the raw string is recognized.
    pub fn inclusion_mode(&self) -> Option<InclusionMode> {
        self.inclusion_raw.parse().ok()
    }

    /// Whether the document declares any conditional-match predicate.
    pub fn has_match_predicate(&self) -> bool {
        self.file_match.is_some() || self.agent_match.is_some() || self.project_type.is_some()
    }

    /// Whether this document applies to the given agent and project context.
    ///
    /// `always` documents apply unconditionally; `conditional` documents
    /// apply when any one predicate matches; `manual` documents apply only
    /// when listed in `forced`. Documents with an unrecognized inclusion
    /// mode never apply (they are excluded as invalid by the merge pass).
    pub fn applies(&self, agent_id: &str, context: &ProjectContext, forced: &[String]) -> bool {
        match self.inclusion_mode() {
            Some(InclusionMode::Always) => true,
            Some(InclusionMode::Conditional) => self.predicate_matches(agent_id, context),
            Some(InclusionMode::Manual) => forced.iter().any(|f| f == &self.source_name),
            None => false,
        }
    }

    fn predicate_matches(&self, agent_id: &str, context: &ProjectContext) -> bool {
        if let Some(ref pattern) = self.file_match {
            if let Some(matcher) = compile_glob(pattern) {
                if context
                    .file_paths
                    .iter()
                    .any(|p| matcher.is_match(Path::new(p)))
                {
                    return true;
                }
            }
        }
        if let Some(ref pattern) = self.agent_match {
            if let Some(matcher) = compile_glob(pattern) {
                if matcher.is_match(Path::new(agent_id)) {
                    return true;
                }
            }
        }
        if let Some(ref ty) = self.project_type {
            if context.project_type.as_deref() == Some(ty.as_str()) {
                return true;
            }
        }
        false
    }
}

/// Project facts a conditional document can match against.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectContext {
    /// Files present in (or touched by) the project.
    #[serde(default)]
    pub file_paths: Vec<String>,
    /// Declared project type, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_type: Option<String>,
}

fn compile_glob(pattern: &str) -> Option<globset::GlobMatcher> {
    match Glob::new(pattern) {
        Ok(glob) => Some(glob.compile_matcher()),
        Err(e) => {
            tracing::warn!(pattern, error = %e, "ignoring unparseable match pattern");
            None
        }
    }
}

/// Split the leading `---` metadata block from the body.
fn split_header(content: &str) -> (DocumentHeader, &str) {
    if let Some(rest) = content.strip_prefix("---\n") {
        if let Some(end) = rest.find("\n---") {
            let block = &rest[..end];
            let body = rest[end + 4..].trim_start_matches('\n');
            if let Ok(header) = serde_yaml::from_str::<DocumentHeader>(block) {
                return (header, body);
            }
        }
    }
    (DocumentHeader::default(), content)
}

/// Slugify a section heading into a key: lowercase, spaces to hyphens.
fn slugify(heading: &str) -> String {
    heading
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c.is_whitespace() { '-' } else { c })
        .filter(|c| c.is_alphanumeric() || *c == '-' || *c == '_')
        .collect()
}

/// Split a body into `##`-delimited sections.
///
/// A declared section with an empty body is kept with an empty value so
/// validation can flag it.
fn parse_sections(body: &str) -> BTreeMap<String, String> {
    let mut sections = BTreeMap::new();
    let mut current: Option<(String, Vec<&str>)> = None;

    for line in body.lines() {
        if let Some(heading) = line.strip_prefix("## ") {
            if let Some((key, lines)) = current.take() {
                sections.insert(key, lines.join("\n").trim().to_string());
            }
            current = Some((slugify(heading), Vec::new()));
        } else if let Some((_, ref mut lines)) = current {
            lines.push(line);
        }
    }
    if let Some((key, lines)) = current {
        sections.insert(key, lines.join("\n").trim().to_string());
    }
    sections
}

/// Load every `.md` rule document in a directory, sorted by file name.
///
/// Sorting keeps later processing deterministic regardless of directory
/// iteration order.
pub fn load_dir(dir: &Path) -> Result<Vec<RuleDocument>> {
    let mut documents = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if !name.ends_with(".md") {
            continue;
        }
        let content = std::fs::read_to_string(entry.path())?;
        documents.push(RuleDocument::parse(name, &content));
    }
    documents.sort_by(|a, b| a.source_name.cmp(&b.source_name));
    Ok(documents)
}
