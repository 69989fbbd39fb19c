//! Command implementations for the tiller CLI.
//!
//! Each command returns a serializable result struct; the binary decides
//! whether to print it as JSON (default) or human-readable text.

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::models::{Agent, ArtifactType};
use crate::resolver::{ArtifactResolver, CacheStatistics, ResolutionReport, ResolutionResult};
use crate::resolver::scope::ScopeContext;
use crate::steering::{self, document, merge, validate, MergeOutcome, ValidationReport};
use crate::{Error, Result};

/// Command results that can be serialized to JSON or formatted for humans.
pub trait Output: Serialize {
    /// Serialize to JSON string.
    fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }

    /// Format for human-readable output.
    fn to_human(&self) -> String;
}

/// Build the scope context from CLI path flags.
///
/// A pack root makes this an extension scope with the base as fallback;
/// otherwise the base root is the primary scope. The common root layers in
/// between either way.
fn build_scope(base: PathBuf, pack: Option<PathBuf>, common: Option<PathBuf>) -> ScopeContext {
    let scope = match pack {
        Some(pack_root) => ScopeContext::extension(pack_root, base),
        None => ScopeContext::base(base),
    };
    match common {
        Some(common_root) => scope.with_common(common_root),
        None => scope,
    }
}

/// Result of `tlr resolve`.
#[derive(Debug, Clone, Serialize)]
pub struct ResolveOutput {
    #[serde(flatten)]
    pub result: ResolutionResult,
    pub cache: CacheStatistics,
}

impl Output for ResolveOutput {
    fn to_human(&self) -> String {
        let mut text = String::new();
        if let Some(ref path) = self.result.resolved_path {
            text.push_str(&format!(
                "Resolved {} '{}' -> {}\n",
                self.result.reference.artifact_type,
                self.result.reference.name,
                path.display()
            ));
        } else {
            text.push_str(&format!(
                "Not found: {} '{}'\n",
                self.result.reference.artifact_type, self.result.reference.name
            ));
            text.push_str("Searched:\n");
            for path in &self.result.searched_paths {
                text.push_str(&format!("  {}\n", path.display()));
            }
            if !self.result.suggestions.is_empty() {
                text.push_str("Suggestions:\n");
                for suggestion in &self.result.suggestions {
                    text.push_str(&format!(
                        "  {} ({}, confidence {:.2})\n",
                        suggestion.name, suggestion.action, suggestion.confidence
                    ));
                }
            }
        }
        text.trim_end().to_string()
    }
}

impl Output for ResolutionReport {
    fn to_human(&self) -> String {
        let mut text = format!(
            "Agent '{}': {} resolved, {} missing\n",
            self.agent_id, self.resolved_count, self.missing_count
        );
        for (artifact_type, summary) in &self.summary {
            text.push_str(&format!("  {artifact_type}:\n"));
            for name in &summary.resolved {
                text.push_str(&format!("    ok      {name}\n"));
            }
            for name in &summary.missing {
                text.push_str(&format!("    missing {name}\n"));
            }
        }
        for cycle in &self.cycles {
            text.push_str(&format!("  cycle: {cycle}\n"));
        }
        text.trim_end().to_string()
    }
}

impl Output for MergeOutcome {
    fn to_human(&self) -> String {
        let mut text = format!("Agent '{}': {}\n", self.agent_id, self.state);
        for (key, entry) in &self.effective {
            text.push_str(&format!(
                "  {key} <- {} (rank {})\n",
                entry.winning_source, entry.rank
            ));
        }
        for conflict in &self.conflicts {
            text.push_str(&format!(
                "  conflict: {} ({}, {}) -> kept {}\n",
                conflict.section_key,
                conflict.severity,
                conflict.conflict_type,
                conflict.resolution_decision
            ));
        }
        for source in &self.invalid_documents {
            text.push_str(&format!("  invalid: {source}\n"));
        }
        text.trim_end().to_string()
    }
}

impl Output for ValidationReport {
    fn to_human(&self) -> String {
        let mut text = format!(
            "{} file(s), {} error(s), {} warning(s)\n",
            self.files.len(),
            self.error_count,
            self.warning_count
        );
        for file in &self.files {
            let verdict = if file.valid { "ok" } else { "invalid" };
            text.push_str(&format!("  {} {}\n", verdict, file.source));
            for error in &file.errors {
                text.push_str(&format!("    error: {error}\n"));
            }
            for warning in &file.warnings {
                text.push_str(&format!("    warning: {warning}\n"));
            }
        }
        text.trim_end().to_string()
    }
}

/// Resolve a single typed artifact reference.
pub fn resolve(
    base: PathBuf,
    pack: Option<PathBuf>,
    common: Option<PathBuf>,
    artifact_type: &str,
    name: &str,
) -> Result<ResolveOutput> {
    let artifact_type: ArtifactType = artifact_type.parse()?;
    let mut resolver = ArtifactResolver::new(build_scope(base, pack, common));
    let result = resolver.resolve(artifact_type, name)?;
    Ok(ResolveOutput {
        result,
        cache: resolver.cache_statistics(),
    })
}

/// Scan every dependency an agent definition declares.
pub fn scan(
    base: PathBuf,
    pack: Option<PathBuf>,
    common: Option<PathBuf>,
    agent_path: &Path,
) -> Result<ResolutionReport> {
    let agent = Agent::load(agent_path)?;
    let mut resolver = ArtifactResolver::new(build_scope(base, pack, common));
    resolver.scan_dependencies(&agent)
}

/// Load a project context file (YAML or JSON) for conditional inclusion.
fn load_context(path: Option<&Path>) -> Result<steering::ProjectContext> {
    match path {
        None => Ok(steering::ProjectContext::default()),
        Some(path) => {
            let content = std::fs::read_to_string(path)?;
            if path.extension().is_some_and(|ext| ext == "json") {
                Ok(serde_json::from_str(&content)?)
            } else {
                Ok(serde_yaml::from_str(&content)?)
            }
        }
    }
}

/// Merge a directory of steering documents for one agent.
#[allow(clippy::too_many_arguments)]
pub fn steering_merge(
    dir: &Path,
    agent_id: &str,
    context_file: Option<&Path>,
    project_type: Option<String>,
    include: Vec<String>,
) -> Result<MergeOutcome> {
    if agent_id.trim().is_empty() {
        return Err(Error::InvalidInput("agent id cannot be empty".to_string()));
    }
    let documents = document::load_dir(dir)?;
    let mut context = load_context(context_file)?;
    if project_type.is_some() {
        context.project_type = project_type;
    }
    Ok(merge::resolve_rules(&documents, agent_id, &context, &include))
}

/// Validate every steering document in a directory.
pub fn steering_validate(dir: &Path) -> Result<ValidationReport> {
    let documents = document::load_dir(dir)?;
    Ok(validate::validate_all(&documents))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::InclusionMode;
    use crate::steering::MergeState;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_found_in_base() {
        let base = TempDir::new().unwrap();
        let dir = base.path().join("procedures");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("create-story.md"), "# Create Story\n").unwrap();

        let output = resolve(base.path().to_path_buf(), None, None, "procedure", "create-story")
            .unwrap();
        assert!(output.result.found);
        assert_eq!(output.cache.misses, 1);
        assert!(output.to_human().contains("Resolved"));
    }

    #[test]
    fn test_resolve_rejects_unknown_type() {
        let base = TempDir::new().unwrap();
        let result = resolve(base.path().to_path_buf(), None, None, "gizmo", "x");
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_scan_reports_missing() {
        let base = TempDir::new().unwrap();
        let agent_path = base.path().join("dev.md");
        fs::write(
            &agent_path,
            "```yaml\nid: dev\ntitle: Developer\ndependencies:\n  procedures:\n    - absent\n```\n",
        )
        .unwrap();

        let report = scan(base.path().to_path_buf(), None, None, &agent_path).unwrap();
        assert_eq!(report.agent_id, "dev");
        assert_eq!(report.missing_count, 1);
        assert!(report.to_human().contains("missing absent"));
    }

    #[test]
    fn test_steering_merge_from_directory() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("base.md"), "## Code Style\n\n4 spaces\n").unwrap();
        fs::write(dir.path().join("project.md"), "## Code Style\n\ntabs\n").unwrap();

        let outcome = steering_merge(dir.path(), "dev", None, None, Vec::new()).unwrap();
        assert_eq!(outcome.state, MergeState::Resolved);
        assert_eq!(outcome.effective["code-style"].value, "tabs");
        assert_eq!(outcome.effective["code-style"].inclusion, InclusionMode::Always);
    }

    #[test]
    fn test_steering_merge_rejects_empty_agent() {
        let dir = TempDir::new().unwrap();
        let result = steering_merge(dir.path(), "  ", None, None, Vec::new());
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_steering_merge_project_type_flag_overrides_context() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("web.md"),
            "---\ninclusion: conditional\nprojectType: webapp\n---\n## A\n\nx\n",
        )
        .unwrap();

        let outcome = steering_merge(
            dir.path(),
            "dev",
            None,
            Some("webapp".to_string()),
            Vec::new(),
        )
        .unwrap();
        assert!(outcome.effective.contains_key("a"));
    }

    #[test]
    fn test_steering_validate_directory() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("good.md"), "## A\n\nx\n").unwrap();
        fs::write(
            dir.path().join("bad.md"),
            "---\ninclusion: nope\n---\n## A\n\nx\n",
        )
        .unwrap();

        let report = steering_validate(dir.path()).unwrap();
        assert_eq!(report.error_count, 1);
        assert!(report.to_human().contains("invalid bad.md"));
    }
}
