//! Artifact dependency resolution.
//!
//! `ArtifactResolver` turns typed, named references into resolved artifacts
//! or actionable diagnostics. It owns its cache and statistics explicitly:
//! lifecycle is `new -> resolve* -> clear_cache/drop`, with no ambient state.
//!
//! Missing artifacts are an expected, recoverable outcome and are returned
//! as `found = false` results with ranked suggestions, never as errors. Only
//! genuine I/O faults (permissions, disk errors) propagate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io;
use std::path::PathBuf;

use crate::models::{Agent, ArtifactRef, ArtifactType};
use crate::resolver::graph::{CycleWarning, DependencyGraph};
use crate::resolver::metadata::{self, ArtifactMetadata};
use crate::resolver::naming;
use crate::resolver::scope::ScopeContext;
use crate::resolver::suggest::{self, Suggestion};
use crate::Result;

/// Outcome of resolving one artifact reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolutionResult {
    /// The reference that was resolved.
    pub reference: ArtifactRef,
    /// Whether a concrete file was found.
    pub found: bool,
    /// The first existing path on the search list, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_path: Option<PathBuf>,
    /// Raw file content of the resolved artifact.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_content: Option<String>,
    /// Extracted metadata of the resolved artifact.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ArtifactMetadata>,
    /// Every path walked during the search, in order, for diagnostics.
    pub searched_paths: Vec<PathBuf>,
    /// Ranked suggestions, populated when `found` is false.
    pub suggestions: Vec<Suggestion>,
}

/// Cache introspection counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStatistics {
    /// Number of cached resolution results.
    pub entries: usize,
    /// Lookups answered from the cache.
    pub hits: u64,
    /// Lookups that computed a fresh result.
    pub misses: u64,
    /// Filesystem existence checks performed across all lookups.
    pub existence_checks: u64,
}

/// Per-type breakdown of a dependency scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeSummary {
    /// Names that resolved to a file.
    pub resolved: Vec<String>,
    /// Names that did not resolve.
    pub missing: Vec<String>,
}

/// Full dependency-scan report for one agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolutionReport {
    /// The scanned agent's id.
    pub agent_id: String,
    /// When the scan ran.
    pub generated_at: DateTime<Utc>,
    /// Per-reference resolution results, declared order (implicit pack
    /// dependencies appended after declared ones).
    pub results: Vec<ResolutionResult>,
    /// Resolved/missing names grouped by type.
    pub summary: BTreeMap<ArtifactType, TypeSummary>,
    /// Count of resolved references.
    pub resolved_count: usize,
    /// Count of unresolvable references.
    pub missing_count: usize,
    /// Dependency cycles found across resolved artifacts' sub-dependencies.
    pub cycles: Vec<CycleWarning>,
}

/// Resolver for one agent's scope context.
///
/// The scope is fixed at construction, so the cache key `(type, canonical
/// file name)` is implicitly scoped. Cached results are immutable once
/// created and invalidated only by [`ArtifactResolver::clear_cache`].
#[derive(Debug)]
pub struct ArtifactResolver {
    scope: ScopeContext,
    cache: HashMap<(ArtifactType, String), ResolutionResult>,
    stats: CacheStatistics,
}

impl ArtifactResolver {
    /// Create a resolver for a scope context.
    pub fn new(scope: ScopeContext) -> Self {
        Self {
            scope,
            cache: HashMap::new(),
            stats: CacheStatistics::default(),
        }
    }

    /// The scope context this resolver searches.
    pub fn scope(&self) -> &ScopeContext {
        &self.scope
    }

    /// Resolve one artifact reference.
    ///
    /// Walks the ordered candidate-path list (scope priority within each
    /// naming variant, canonical variant first); the first existing path
    /// wins. Repeat calls with the same type and name return the cached
    /// result without touching the filesystem.
    ///
    /// # Errors
    ///
    /// Only on genuine I/O faults while reading an existing file. A missing
    /// artifact is a `found = false` result, not an error.
    pub fn resolve(&mut self, artifact_type: ArtifactType, name: &str) -> Result<ResolutionResult> {
        let canonical = naming::canonical_file_name(artifact_type, name);
        let key = (artifact_type, canonical);

        if let Some(cached) = self.cache.get(&key) {
            self.stats.hits += 1;
            tracing::debug!(r#type = %artifact_type, name, "resolve cache hit");
            return Ok(cached.clone());
        }
        self.stats.misses += 1;

        let reference = ArtifactRef::new(artifact_type, name);
        let mut searched_paths = Vec::new();
        let mut resolved_path = None;

        // Scope-priority order is preserved within each naming variant.
        'walk: for file_name in naming::file_name_variants(artifact_type, name) {
            for (_, root) in self.scope.roots() {
                let candidate = ScopeContext::type_dir(root, artifact_type).join(&file_name);
                self.stats.existence_checks += 1;
                let exists = candidate.exists();
                searched_paths.push(candidate.clone());
                if exists {
                    resolved_path = Some(candidate);
                    break 'walk;
                }
            }
        }

        let result = match resolved_path {
            Some(path) => {
                let raw_content = fs::read_to_string(&path)?;
                let metadata = metadata::extract(artifact_type, &raw_content);
                tracing::debug!(r#type = %artifact_type, name, path = %path.display(), "resolved");
                ResolutionResult {
                    reference,
                    found: true,
                    resolved_path: Some(path),
                    raw_content: Some(raw_content),
                    metadata: Some(metadata),
                    searched_paths,
                    suggestions: Vec::new(),
                }
            }
            None => {
                let suggestions = self.suggest_for(artifact_type, name, &searched_paths)?;
                tracing::debug!(r#type = %artifact_type, name, "unresolved, offering suggestions");
                ResolutionResult {
                    reference,
                    found: false,
                    resolved_path: None,
                    raw_content: None,
                    metadata: None,
                    searched_paths,
                    suggestions,
                }
            }
        };

        self.cache.insert(key, result.clone());
        Ok(result)
    }

    /// Gather candidate files from every searched directory that exists and
    /// rank them against the target name.
    fn suggest_for(
        &self,
        artifact_type: ArtifactType,
        name: &str,
        searched_paths: &[PathBuf],
    ) -> Result<Vec<Suggestion>> {
        let mut dirs: Vec<PathBuf> = Vec::new();
        for path in searched_paths {
            if let Some(dir) = path.parent() {
                if !dirs.iter().any(|d| d == dir) {
                    dirs.push(dir.to_path_buf());
                }
            }
        }

        let extension = artifact_type.extension();
        let mut candidates: Vec<(PathBuf, String)> = Vec::new();
        for dir in &dirs {
            let entries = match fs::read_dir(dir) {
                Ok(entries) => entries,
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            };
            let mut names: Vec<String> = Vec::new();
            for entry in entries {
                let entry = entry?;
                let file_name = entry.file_name().to_string_lossy().into_owned();
                if file_name.ends_with(&format!(".{extension}")) {
                    names.push(file_name);
                }
            }
            names.sort();
            candidates.extend(names.into_iter().map(|n| (dir.clone(), n)));
        }

        let fallback_dir = ScopeContext::type_dir(self.scope.own_root(), artifact_type);
        Ok(suggest::rank(
            artifact_type,
            name,
            &candidates,
            &fallback_dir,
        ))
    }

    /// Resolve an agent's full dependency set.
    ///
    /// Resolves every declared dependency plus the implicit dependencies of
    /// the agent's pack manifest (if registered), aggregates resolved and
    /// missing names per type, and runs cycle detection over the union of
    /// resolved artifacts' declared sub-dependencies.
    pub fn scan_dependencies(&mut self, agent: &Agent) -> Result<ResolutionReport> {
        let mut refs = agent.dependencies.refs();
        if let Some(manifest) = self.scope.manifest() {
            for implicit in manifest.implicit_dependencies.refs() {
                if !refs.contains(&implicit) {
                    refs.push(implicit);
                }
            }
        }

        let mut results = Vec::with_capacity(refs.len());
        let mut summary: BTreeMap<ArtifactType, TypeSummary> = BTreeMap::new();
        let mut graph = DependencyGraph::new();
        graph.add_node(agent.id.clone());

        // Sub-dependencies are followed transitively so cycles spanning
        // several artifacts are visible. Sub-dependency names carry no type;
        // they are resolved as the referencing artifact's type.
        let mut visited: std::collections::HashSet<(ArtifactType, String)> =
            std::collections::HashSet::new();

        for reference in &refs {
            let result = self.resolve(reference.artifact_type, &reference.name)?;
            let stem = naming::strip_extension(&reference.name).to_string();
            let entry = summary.entry(reference.artifact_type).or_default();
            if result.found {
                entry.resolved.push(reference.name.clone());
            } else {
                entry.missing.push(reference.name.clone());
            }

            graph.add_edge(agent.id.clone(), stem.clone());
            visited.insert((reference.artifact_type, stem.clone()));

            let mut queue: Vec<(ArtifactType, String)> = Vec::new();
            if let Some(ref meta) = result.metadata {
                for sub in &meta.sub_dependencies {
                    let sub_stem = naming::strip_extension(sub).to_string();
                    graph.add_edge(stem.clone(), sub_stem.clone());
                    queue.push((reference.artifact_type, sub_stem));
                }
            }
            while let Some((ty, sub_stem)) = queue.pop() {
                if !visited.insert((ty, sub_stem.clone())) {
                    continue;
                }
                let sub_result = self.resolve(ty, &sub_stem)?;
                if let Some(ref meta) = sub_result.metadata {
                    for nested in &meta.sub_dependencies {
                        let nested_stem = naming::strip_extension(nested).to_string();
                        graph.add_edge(sub_stem.clone(), nested_stem.clone());
                        queue.push((ty, nested_stem));
                    }
                }
            }
            results.push(result);
        }

        let resolved_count = results.iter().filter(|r| r.found).count();
        let missing_count = results.len() - resolved_count;
        let cycles = graph.find_cycles(&agent.id);

        Ok(ResolutionReport {
            agent_id: agent.id.clone(),
            generated_at: Utc::now(),
            results,
            summary,
            resolved_count,
            missing_count,
            cycles,
        })
    }

    /// Current cache counters.
    pub fn cache_statistics(&self) -> CacheStatistics {
        CacheStatistics {
            entries: self.cache.len(),
            ..self.stats
        }
    }

    /// Drop all cached results and reset counters.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
        self.stats = CacheStatistics::default();
    }
}
