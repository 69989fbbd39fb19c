//! Naming-convention normalization for artifact references.
//!
//! Declared names drift across authoring conventions: kebab-case vs
//! snake_case, a `core-` prefix, and per-type suffixes like `-tmpl` or
//! `-checklist`. Resolution normalizes the declared name to its canonical
//! file name first, then tries each recognized variant in a fixed order.

use crate::models::ArtifactType;

/// Prefix recognized as a naming variant (present or absent).
const RECOGNIZED_PREFIX: &str = "core-";

/// Known file extensions stripped before appending the canonical one.
const KNOWN_EXTENSIONS: [&str; 4] = [".md", ".yaml", ".yml", ".txt"];

/// Suffix recognized as a naming variant for a given type, if any.
fn type_suffix(artifact_type: ArtifactType) -> Option<&'static str> {
    match artifact_type {
        ArtifactType::Template => Some("-tmpl"),
        ArtifactType::Checklist => Some("-checklist"),
        ArtifactType::Procedure | ArtifactType::DataFile | ArtifactType::Utility => None,
    }
}

/// Strip any known extension from a declared name.
pub fn strip_extension(name: &str) -> &str {
    for ext in KNOWN_EXTENSIONS {
        if let Some(stem) = name.strip_suffix(ext) {
            return stem;
        }
    }
    name
}

/// Normalize a declared name to its canonical file name for a type.
///
/// Strips any existing known extension, then appends the canonical one from
/// the static type table.
pub fn canonical_file_name(artifact_type: ArtifactType, name: &str) -> String {
    format!(
        "{}.{}",
        strip_extension(name.trim()),
        artifact_type.extension()
    )
}

/// Swap kebab-case and snake_case in a name stem.
///
/// A stem containing hyphens becomes snake_case; one containing underscores
/// becomes kebab-case. Stems with neither are returned unchanged.
fn swap_case_convention(stem: &str) -> String {
    if stem.contains('-') {
        stem.replace('-', "_")
    } else if stem.contains('_') {
        stem.replace('_', "-")
    } else {
        stem.to_string()
    }
}

/// Prefix/suffix variants of a stem: toggle the recognized prefix, toggle the
/// type suffix.
fn affix_variants(artifact_type: ArtifactType, stem: &str) -> Vec<String> {
    let mut variants = Vec::new();
    if let Some(bare) = stem.strip_prefix(RECOGNIZED_PREFIX) {
        variants.push(bare.to_string());
    } else {
        variants.push(format!("{}{}", RECOGNIZED_PREFIX, stem));
    }
    if let Some(suffix) = type_suffix(artifact_type) {
        if let Some(bare) = stem.strip_suffix(suffix) {
            variants.push(bare.to_string());
        } else {
            variants.push(format!("{}{}", stem, suffix));
        }
    }
    variants
}

/// All file-name variants for a declared name, canonical first.
///
/// Order: canonical name, kebab/snake swap, then prefix/suffix toggles of
/// both. Duplicates are removed preserving first occurrence, so the caller's
/// scope-priority walk stays deterministic.
pub fn file_name_variants(artifact_type: ArtifactType, name: &str) -> Vec<String> {
    let canonical_stem = strip_extension(name.trim()).to_string();
    let swapped = swap_case_convention(&canonical_stem);

    let mut stems = vec![canonical_stem.clone(), swapped.clone()];
    stems.extend(affix_variants(artifact_type, &canonical_stem));
    stems.extend(affix_variants(artifact_type, &swapped));

    let mut seen = std::collections::HashSet::new();
    stems
        .into_iter()
        .filter(|s| !s.is_empty() && seen.insert(s.clone()))
        .map(|s| format!("{}.{}", s, artifact_type.extension()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_appends_type_extension() {
        assert_eq!(
            canonical_file_name(ArtifactType::Procedure, "create-story"),
            "create-story.md"
        );
        assert_eq!(
            canonical_file_name(ArtifactType::Template, "story-tmpl"),
            "story-tmpl.yaml"
        );
    }

    #[test]
    fn test_canonical_strips_existing_extension() {
        assert_eq!(
            canonical_file_name(ArtifactType::Procedure, "create-story.md"),
            "create-story.md"
        );
        // A declared .md template still normalizes to the canonical .yaml.
        assert_eq!(
            canonical_file_name(ArtifactType::Template, "story-tmpl.md"),
            "story-tmpl.yaml"
        );
    }

    #[test]
    fn test_variants_start_with_canonical() {
        let variants = file_name_variants(ArtifactType::Procedure, "create-story");
        assert_eq!(variants[0], "create-story.md");
    }

    #[test]
    fn test_variants_include_snake_case_swap() {
        let variants = file_name_variants(ArtifactType::Procedure, "create-story");
        assert!(variants.contains(&"create_story.md".to_string()));
    }

    #[test]
    fn test_variants_include_prefix_toggle() {
        let with = file_name_variants(ArtifactType::Procedure, "create-story");
        assert!(with.contains(&"core-create-story.md".to_string()));

        let without = file_name_variants(ArtifactType::Procedure, "core-create-story");
        assert!(without.contains(&"create-story.md".to_string()));
    }

    #[test]
    fn test_variants_include_type_suffix_toggle() {
        let variants = file_name_variants(ArtifactType::Template, "story");
        assert!(variants.contains(&"story-tmpl.yaml".to_string()));

        let variants = file_name_variants(ArtifactType::Template, "story-tmpl");
        assert!(variants.contains(&"story.yaml".to_string()));

        let variants = file_name_variants(ArtifactType::Checklist, "story-dod");
        assert!(variants.contains(&"story-dod-checklist.md".to_string()));
    }

    #[test]
    fn test_variants_deduplicated() {
        // A stem without hyphens or underscores swaps to itself.
        let variants = file_name_variants(ArtifactType::Procedure, "kb");
        let unique: std::collections::HashSet<_> = variants.iter().collect();
        assert_eq!(unique.len(), variants.len());
    }
}
