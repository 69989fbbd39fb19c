//! Steering rule precedence and conflict resolution.
//!
//! Steering documents are markdown files that carry behavioral rules for
//! agents. Each document opts into an agent's merge via an inclusion mode
//! (`always`, `conditional`, `manual`), and every document has a precedence
//! rank. Applicable documents are folded in ascending rank order into a
//! single effective rule map; same-rank disagreements become classified
//! conflict records with generated resolution guidance rather than errors.

pub mod conflict;
pub mod document;
pub mod merge;
pub mod precedence;
pub mod validate;

// Re-export commonly used types
pub use conflict::{ConflictRecord, ConflictSeverity, ContributingSource};
pub use document::{ProjectContext, RuleDocument};
pub use merge::{EffectiveEntry, EffectiveRuleMap, MergeOutcome, MergeState};
pub use validate::{FileValidation, ValidationReport};
