//! Structural validation of steering rule documents.
//!
//! Validation is per-file and never aborts a batch: each document gets its
//! own pass/fail verdict plus messages, and the merge simply excludes the
//! failures.

use serde::{Deserialize, Serialize};

use crate::models::InclusionMode;
use crate::steering::document::RuleDocument;

/// Verdict for one rule document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileValidation {
    /// Document source name.
    pub source: String,
    /// Whether the document may participate in a merge.
    pub valid: bool,
    /// Problems that exclude the document.
    pub errors: Vec<String>,
    /// Problems worth reporting that do not exclude it.
    pub warnings: Vec<String>,
}

/// Batch validation summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Per-file verdicts, input order.
    pub files: Vec<FileValidation>,
    /// Total errors across all files.
    pub error_count: usize,
    /// Total warnings across all files.
    pub warning_count: usize,
}

/// Validate a single rule document.
pub fn validate_document(doc: &RuleDocument) -> FileValidation {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    match doc.inclusion_mode() {
        None => {
            errors.push(format!(
                "unrecognized inclusion mode '{}'",
                doc.inclusion_raw
            ));
        }
        Some(InclusionMode::Conditional) if !doc.has_match_predicate() => {
            errors.push(
                "conditional inclusion declares no match predicate, so it can never apply"
                    .to_string(),
            );
        }
        Some(InclusionMode::Conditional) | Some(InclusionMode::Always) => {}
        Some(InclusionMode::Manual) => {
            if doc.has_match_predicate() {
                warnings.push(
                    "match predicates on a manual document are ignored".to_string(),
                );
            }
        }
    }

    for (key, value) in &doc.sections {
        if value.is_empty() {
            errors.push(format!("section '{key}' is declared but empty"));
        }
    }

    if doc.sections.is_empty() {
        warnings.push("document declares no sections".to_string());
    }

    let valid = errors.is_empty();
    if !valid {
        tracing::debug!(source = %doc.source_name, ?errors, "rule document failed validation");
    }

    FileValidation {
        source: doc.source_name.clone(),
        valid,
        errors,
        warnings,
    }
}

/// Validate a batch of documents.
pub fn validate_all(documents: &[RuleDocument]) -> ValidationReport {
    let files: Vec<FileValidation> = documents.iter().map(validate_document).collect();
    let error_count = files.iter().map(|f| f.errors.len()).sum();
    let warning_count = files.iter().map(|f| f.warnings.len()).sum();
    ValidationReport {
        files,
        error_count,
        warning_count,
    }
}
