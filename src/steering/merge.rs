//! Precedence merge of steering documents into one effective rule map.
//!
//! Documents are folded in ascending precedence order (ties broken by
//! source name, so equal-rank processing order is deterministic). A higher
//! rank overwrites the winner for a key; an equal rank with a different
//! value records a conflict and keeps the earlier-seen value. A conflict is
//! an annotation on the result, not a failure: the effective map is always
//! usable.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::models::InclusionMode;
use crate::steering::conflict::{self, ConflictRecord, ContributingSource};
use crate::steering::document::{ProjectContext, RuleDocument};
use crate::steering::precedence;
use crate::steering::validate;

/// The winning value for one section key, with provenance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectiveEntry {
    /// The winning value.
    pub value: String,
    /// Source name of the document that supplied it.
    pub winning_source: String,
    /// The winner's precedence rank.
    pub rank: i32,
    /// The winner's inclusion mode.
    pub inclusion: InclusionMode,
}

/// Effective rule map: section key -> winning entry.
pub type EffectiveRuleMap = BTreeMap<String, EffectiveEntry>;

/// State of one agent's merge pass.
///
/// `ConflictDetected` is not terminal in spirit: the effective map is still
/// usable, the state just flags that records need review. `Invalid` never
/// applies to the pass as a whole, only to individual excluded documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MergeState {
    /// No documents were applicable.
    Unprocessed,
    /// Merge completed with at least one same-rank conflict.
    ConflictDetected,
    /// Merge completed without conflicts.
    Resolved,
}

impl fmt::Display for MergeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MergeState::Unprocessed => write!(f, "unprocessed"),
            MergeState::ConflictDetected => write!(f, "conflict-detected"),
            MergeState::Resolved => write!(f, "resolved"),
        }
    }
}

/// Full outcome of one agent's steering resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergeOutcome {
    /// The agent the documents were merged for.
    pub agent_id: String,
    /// When the merge ran.
    pub generated_at: DateTime<Utc>,
    /// Final state of the pass.
    pub state: MergeState,
    /// The effective rule map.
    pub effective: EffectiveRuleMap,
    /// Same-rank conflicts, in section-key order.
    pub conflicts: Vec<ConflictRecord>,
    /// Structurally invalid documents excluded from the merge.
    pub invalid_documents: Vec<String>,
    /// Combined guidance document, present when conflicts exist.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guidance: Option<String>,
}

/// Filter documents down to those applicable to an agent.
///
/// `always` documents always apply; `conditional` documents apply when any
/// predicate matches the context; `manual` documents apply only when named
/// in `forced`.
pub fn load_applicable<'a>(
    documents: &'a [RuleDocument],
    agent_id: &str,
    context: &ProjectContext,
    forced: &[String],
) -> Vec<&'a RuleDocument> {
    documents
        .iter()
        .filter(|doc| doc.applies(agent_id, context, forced))
        .collect()
}

struct PendingConflict {
    sources: Vec<ContributingSource>,
    kept_source: String,
}

/// Merge applicable documents into an effective rule map plus conflicts.
pub fn merge(
    documents: &[&RuleDocument],
    agent_id: &str,
) -> (EffectiveRuleMap, Vec<ConflictRecord>) {
    let mut ordered: Vec<&RuleDocument> = documents.to_vec();
    ordered.sort_by(|a, b| {
        precedence::rank_for(&a.source_name, agent_id)
            .cmp(&precedence::rank_for(&b.source_name, agent_id))
            .then_with(|| a.source_name.cmp(&b.source_name))
    });

    let mut effective = EffectiveRuleMap::new();
    let mut pending: BTreeMap<String, PendingConflict> = BTreeMap::new();

    for doc in ordered {
        let rank = precedence::rank_for(&doc.source_name, agent_id);
        let inclusion = doc
            .inclusion_mode()
            .unwrap_or(InclusionMode::Always);

        for (key, value) in &doc.sections {
            let collision = match effective.get(key) {
                None => None,
                Some(existing) if existing.rank < rank => None,
                Some(existing) if existing.rank == rank && existing.value != *value => {
                    Some(ContributingSource {
                        source: existing.winning_source.clone(),
                        value: existing.value.clone(),
                        rank: existing.rank,
                    })
                }
                // Equal rank and equal value: not a conflict, winner stays.
                Some(_) => continue,
            };

            match collision {
                None => {
                    effective.insert(
                        key.clone(),
                        EffectiveEntry {
                            value: value.clone(),
                            winning_source: doc.source_name.clone(),
                            rank,
                            inclusion,
                        },
                    );
                }
                Some(incumbent) => {
                    // Equal rank, different value: keep the earlier-seen
                    // winner and record the collision.
                    tracing::debug!(
                        key,
                        kept = %incumbent.source,
                        contender = %doc.source_name,
                        "same-rank steering collision"
                    );
                    let entry = pending.entry(key.clone()).or_insert_with(|| PendingConflict {
                        kept_source: incumbent.source.clone(),
                        sources: vec![incumbent],
                    });
                    entry.sources.push(ContributingSource {
                        source: doc.source_name.clone(),
                        value: value.clone(),
                        rank,
                    });
                }
            }
        }
    }

    let conflicts = pending
        .into_iter()
        .map(|(key, pending)| {
            let severity = conflict::severity(&key, &pending.sources);
            let conflict_type = conflict::conflict_type(agent_id, &pending.sources);
            ConflictRecord {
                section_key: key,
                agent_id: agent_id.to_string(),
                contributing_sources: pending.sources,
                severity,
                conflict_type,
                resolution_decision: pending.kept_source,
            }
        })
        .collect();

    (effective, conflicts)
}

/// Run the full per-agent pass: validate, filter, merge, classify, and
/// generate guidance.
///
/// Structurally invalid documents are excluded individually; they never
/// abort the agent's resolution.
pub fn resolve_rules(
    documents: &[RuleDocument],
    agent_id: &str,
    context: &ProjectContext,
    forced: &[String],
) -> MergeOutcome {
    let mut valid = Vec::new();
    let mut invalid_documents = Vec::new();
    for doc in documents {
        if validate::validate_document(doc).valid {
            valid.push(doc.clone());
        } else {
            invalid_documents.push(doc.source_name.clone());
        }
    }

    let applicable = load_applicable(&valid, agent_id, context, forced);
    let processed_any = !applicable.is_empty();
    let (effective, conflicts) = merge(&applicable, agent_id);

    let state = if !processed_any {
        MergeState::Unprocessed
    } else if conflicts.is_empty() {
        MergeState::Resolved
    } else {
        MergeState::ConflictDetected
    };

    let guidance = conflict::combined_guidance(agent_id, &conflicts);

    MergeOutcome {
        agent_id: agent_id.to_string(),
        generated_at: Utc::now(),
        state,
        effective,
        conflicts,
        invalid_documents,
        guidance,
    }
}
