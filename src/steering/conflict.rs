//! Conflict classification and resolution guidance.
//!
//! A conflict exists when two documents at equal precedence rank define the
//! same section key with different values. Severity depends on whether the
//! key is structurally sensitive; the conflict type names the precedence
//! classes of the two highest-ranked contributors. Guidance text is
//! deterministic template expansion so repeated runs produce identical
//! artifacts.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::steering::precedence::class_for;

/// Keys whose disagreement is always high severity.
pub const SENSITIVE_KEYS: &[&str] = &["code-style", "architecture", "structure", "security"];

/// How serious a conflict is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictSeverity {
    /// Contributing values are identical; nothing to resolve.
    None,
    /// Values differ on an ordinary key.
    Medium,
    /// Values differ on a structurally sensitive key.
    High,
}

impl fmt::Display for ConflictSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictSeverity::None => write!(f, "none"),
            ConflictSeverity::Medium => write!(f, "medium"),
            ConflictSeverity::High => write!(f, "high"),
        }
    }
}

/// One document's contribution to a conflicted key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributingSource {
    /// Document source name.
    pub source: String,
    /// The value it defines for the key.
    pub value: String,
    /// Its precedence rank.
    pub rank: i32,
}

/// A same-rank disagreement on one section key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictRecord {
    /// The contested section key.
    pub section_key: String,
    /// The agent whose merge pass hit the conflict.
    pub agent_id: String,
    /// Every document contributing to the collision, encounter order.
    pub contributing_sources: Vec<ContributingSource>,
    /// Computed severity.
    pub severity: ConflictSeverity,
    /// Precedence-class tag, e.g. "framework-vs-project".
    pub conflict_type: String,
    /// The automatically chosen winner (earliest-seen at the top rank).
    pub resolution_decision: String,
}

/// Compute severity for a set of contributing values on a key.
pub fn severity(section_key: &str, sources: &[ContributingSource]) -> ConflictSeverity {
    let all_equal = sources
        .windows(2)
        .all(|pair| pair[0].value == pair[1].value);
    if all_equal {
        return ConflictSeverity::None;
    }
    if SENSITIVE_KEYS.contains(&section_key) {
        ConflictSeverity::High
    } else {
        ConflictSeverity::Medium
    }
}

/// Tag a conflict by the precedence classes of its two highest-ranked
/// contributors (ties broken by source name for determinism).
pub fn conflict_type(agent_id: &str, sources: &[ContributingSource]) -> String {
    let mut ordered: Vec<&ContributingSource> = sources.iter().collect();
    ordered.sort_by(|a, b| b.rank.cmp(&a.rank).then_with(|| a.source.cmp(&b.source)));
    match ordered.as_slice() {
        [] => "unknown".to_string(),
        [only] => class_for(&only.source, agent_id).to_string(),
        [first, second, ..] => format!(
            "{}-vs-{}",
            class_for(&first.source, agent_id),
            class_for(&second.source, agent_id)
        ),
    }
}

/// Render deterministic guidance text for one conflict.
///
/// Names the key, lists each contributing source with value and rank, states
/// the chosen winner, and for high severity appends a call-to-action block.
pub fn guidance(conflict: &ConflictRecord) -> String {
    let mut text = String::new();
    text.push_str(&format!(
        "### Conflict: `{}` ({}, {})\n\n",
        conflict.section_key, conflict.severity, conflict.conflict_type
    ));
    text.push_str("Contributing sources:\n");
    for source in &conflict.contributing_sources {
        text.push_str(&format!(
            "- `{}` (rank {}): {}\n",
            source.source, source.rank, source.value
        ));
    }
    text.push_str(&format!(
        "\nChosen winner: `{}`.\n",
        conflict.resolution_decision
    ));
    if conflict.severity == ConflictSeverity::High {
        text.push_str(&format!(
            "\n**Action required**: `{}` is structurally sensitive. Align the sources above on one value, or move the key into a single higher-precedence document.\n",
            conflict.section_key
        ));
    }
    text
}

/// Aggregate per-conflict guidance into one reference document for an agent.
pub fn combined_guidance(agent_id: &str, conflicts: &[ConflictRecord]) -> Option<String> {
    if conflicts.is_empty() {
        return None;
    }
    let mut text = format!(
        "# Steering conflicts for agent `{}`\n\n{} conflict(s) detected. The effective rule map uses the winners below; review and resolve at the source.\n\n",
        agent_id,
        conflicts.len()
    );
    for conflict in conflicts {
        text.push_str(&guidance(conflict));
        text.push('\n');
    }
    Some(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(name: &str, value: &str, rank: i32) -> ContributingSource {
        ContributingSource {
            source: name.to_string(),
            value: value.to_string(),
            rank,
        }
    }

    #[test]
    fn test_identical_values_are_not_severe() {
        let sources = [source("a.md", "tabs", 2), source("b.md", "tabs", 2)];
        assert_eq!(severity("code-style", &sources), ConflictSeverity::None);
    }

    #[test]
    fn test_sensitive_key_is_high() {
        let sources = [source("a.md", "tabs", 2), source("b.md", "spaces", 2)];
        assert_eq!(severity("code-style", &sources), ConflictSeverity::High);
        assert_eq!(severity("architecture", &sources), ConflictSeverity::High);
    }

    #[test]
    fn test_ordinary_key_is_medium() {
        let sources = [source("a.md", "x", 2), source("b.md", "y", 2)];
        assert_eq!(severity("naming", &sources), ConflictSeverity::Medium);
    }

    #[test]
    fn test_conflict_type_from_top_two_classes() {
        let sources = [
            source("base.md", "4 spaces", 1),
            source("project.md", "tabs", 6),
        ];
        assert_eq!(conflict_type("dev", &sources), "project-vs-framework");
    }

    #[test]
    fn test_conflict_type_same_class() {
        let sources = [source("foo.md", "x", 0), source("bar.md", "y", 0)];
        assert_eq!(conflict_type("dev", &sources), "custom-vs-custom");
    }

    #[test]
    fn test_guidance_mentions_all_parts() {
        let conflict = ConflictRecord {
            section_key: "code-style".to_string(),
            agent_id: "dev".to_string(),
            contributing_sources: vec![
                source("foo.md", "tabs", 0),
                source("bar.md", "2 spaces", 0),
            ],
            severity: ConflictSeverity::High,
            conflict_type: "custom-vs-custom".to_string(),
            resolution_decision: "bar.md".to_string(),
        };
        let text = guidance(&conflict);
        assert!(text.contains("`code-style`"));
        assert!(text.contains("`foo.md` (rank 0): tabs"));
        assert!(text.contains("`bar.md` (rank 0): 2 spaces"));
        assert!(text.contains("Chosen winner: `bar.md`"));
        assert!(text.contains("Action required"));
    }

    #[test]
    fn test_medium_guidance_has_no_call_to_action() {
        let conflict = ConflictRecord {
            section_key: "naming".to_string(),
            agent_id: "dev".to_string(),
            contributing_sources: vec![source("a.md", "x", 0), source("b.md", "y", 0)],
            severity: ConflictSeverity::Medium,
            conflict_type: "custom-vs-custom".to_string(),
            resolution_decision: "a.md".to_string(),
        };
        assert!(!guidance(&conflict).contains("Action required"));
    }

    #[test]
    fn test_combined_guidance_empty_for_no_conflicts() {
        assert!(combined_guidance("dev", &[]).is_none());
    }
}
