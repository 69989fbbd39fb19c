//! Similarity-ranked suggestions for unresolvable artifact references.
//!
//! When no candidate path exists for a reference, the resolver ranks the
//! files actually present in the searched directories by normalized edit
//! distance and offers the closest matches, plus a lowest-priority
//! "create new file" fallback.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::models::ArtifactType;
use crate::resolver::naming;

/// What accepting a suggestion would do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SuggestionAction {
    /// Use an existing file in the candidate directory.
    UseExisting,
    /// Create a new file with the canonical name.
    CreateNew,
}

impl std::fmt::Display for SuggestionAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SuggestionAction::UseExisting => write!(f, "use-existing"),
            SuggestionAction::CreateNew => write!(f, "create-new"),
        }
    }
}

/// One ranked suggestion for an unresolvable reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    /// Candidate file name (or the canonical name for create-new).
    pub name: String,
    /// Directory the candidate lives in (or would be created in).
    pub directory: PathBuf,
    /// Similarity confidence in `[0, 1]`; create-new is always 0.
    pub confidence: f64,
    /// What accepting this suggestion does.
    pub action: SuggestionAction,
}

impl Suggestion {
    /// The always-appended fallback: create the artifact under its canonical
    /// name in the given directory.
    pub fn create_new(artifact_type: ArtifactType, name: &str, directory: &Path) -> Self {
        Self {
            name: naming::canonical_file_name(artifact_type, name),
            directory: directory.to_path_buf(),
            confidence: 0.0,
            action: SuggestionAction::CreateNew,
        }
    }
}

/// Maximum number of ranked matches returned (excluding the fallback).
pub const MAX_SUGGESTIONS: usize = 5;

/// Levenshtein edit distance between two strings.
pub fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

/// Similarity confidence between a target name and a candidate file name.
///
/// Computed as `(max_len - edit_distance) / max_len` over lower-cased stems
/// (extensions stripped).
pub fn confidence(target: &str, candidate: &str) -> f64 {
    let target = naming::strip_extension(target).to_lowercase();
    let candidate = naming::strip_extension(candidate).to_lowercase();
    let max_len = target.chars().count().max(candidate.chars().count());
    if max_len == 0 {
        return 0.0;
    }
    let dist = edit_distance(&target, &candidate);
    (max_len.saturating_sub(dist)) as f64 / max_len as f64
}

/// Rank candidate files from one or more directories against a target name.
///
/// Returns the top `MAX_SUGGESTIONS` by confidence (ties broken by name for
/// determinism), with the create-new fallback appended last. `fallback_dir`
/// is where a newly created artifact would live (the agent's own scope).
pub fn rank(
    artifact_type: ArtifactType,
    name: &str,
    candidates: &[(PathBuf, String)],
    fallback_dir: &Path,
) -> Vec<Suggestion> {
    let mut ranked: Vec<Suggestion> = candidates
        .iter()
        .map(|(dir, file)| Suggestion {
            name: file.clone(),
            directory: dir.clone(),
            confidence: confidence(name, file),
            action: SuggestionAction::UseExisting,
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.name.cmp(&b.name))
    });
    ranked.truncate(MAX_SUGGESTIONS);
    ranked.push(Suggestion::create_new(artifact_type, name, fallback_dir));
    ranked
}
