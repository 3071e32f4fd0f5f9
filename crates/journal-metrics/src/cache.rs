//! Per-run metadata cache.
//!
//! Every map is a `moka` future cache without capacity bound or TTL: entries
//! live exactly as long as the run that created them. Lookups of the same key
//! coalesce onto one initializing future, so a DOI is fetched at most once
//! per run no matter how many tasks ask for it concurrently.

use std::collections::HashMap;
use std::future::Future;

use moka::future::Cache;

use crate::models::{CitingEdge, GraphWork, RegistryWork, WorkRecord};

/// Concurrent caches for one analysis run.
#[derive(Clone)]
pub struct MetadataCache {
    registry: Cache<String, RegistryWork>,
    graph: Cache<String, GraphWork>,
    unified: Cache<String, WorkRecord>,
    citing: Cache<String, Vec<CitingEdge>>,
    journals: Cache<String, String>,
}

impl MetadataCache {
    /// Create empty caches.
    #[must_use]
    pub fn new() -> Self {
        Self {
            registry: Cache::builder().name("registry").build(),
            graph: Cache::builder().name("graph").build(),
            unified: Cache::builder().name("unified").build(),
            citing: Cache::builder().name("citing").build(),
            journals: Cache::builder().name("journals").build(),
        }
    }

    /// Cached registry record, or the result of `fetch`. `None` is not stored.
    pub async fn registry_with<F>(&self, doi: &str, fetch: F) -> Option<RegistryWork>
    where
        F: Future<Output = Option<RegistryWork>>,
    {
        self.registry.optionally_get_with(doi.to_string(), fetch).await
    }

    /// Cached graph record, or the result of `fetch`. `None` is not stored.
    pub async fn graph_with<F>(&self, doi: &str, fetch: F) -> Option<GraphWork>
    where
        F: Future<Output = Option<GraphWork>>,
    {
        self.graph.optionally_get_with(doi.to_string(), fetch).await
    }

    /// Cached journal name, or the result of `fetch`. `None` is not stored.
    pub async fn journal_with<F>(&self, issn: &str, fetch: F) -> Option<String>
    where
        F: Future<Output = Option<String>>,
    {
        self.journals.optionally_get_with(issn.to_string(), fetch).await
    }

    /// Cached unified record, or the result of `build` (always stored).
    pub async fn unified_with<F>(&self, doi: &str, build: F) -> WorkRecord
    where
        F: Future<Output = WorkRecord>,
    {
        self.unified.get_with(doi.to_string(), build).await
    }

    /// Cached citing edges, or the result of `build` (always stored).
    pub async fn citing_with<F>(&self, doi: &str, build: F) -> Vec<CitingEdge>
    where
        F: Future<Output = Vec<CitingEdge>>,
    {
        self.citing.get_with(doi.to_string(), build).await
    }

    /// Registry record if already cached.
    pub async fn registry(&self, doi: &str) -> Option<RegistryWork> {
        self.registry.get(doi).await
    }

    /// Graph record if already cached.
    pub async fn graph(&self, doi: &str) -> Option<GraphWork> {
        self.graph.get(doi).await
    }

    /// Citing edges if already cached.
    pub async fn citing(&self, doi: &str) -> Option<Vec<CitingEdge>> {
        self.citing.get(doi).await
    }

    /// Entry counts per map: registry, graph, unified, citing, journals.
    #[must_use]
    pub fn entry_counts(&self) -> [u64; 5] {
        [
            self.registry.entry_count(),
            self.graph.entry_count(),
            self.unified.entry_count(),
            self.citing.entry_count(),
            self.journals.entry_count(),
        ]
    }

    /// Copy every map into a plain, immutable snapshot.
    #[must_use]
    pub fn snapshot(&self) -> MetadataSnapshot {
        fn collect<V: Clone + Send + Sync + 'static>(cache: &Cache<String, V>) -> HashMap<String, V> {
            cache.iter().map(|(k, v)| (k.as_ref().clone(), v)).collect()
        }

        MetadataSnapshot {
            registry: collect(&self.registry),
            graph: collect(&self.graph),
            unified: collect(&self.unified),
            citing: collect(&self.citing),
            journals: collect(&self.journals),
        }
    }
}

impl Default for MetadataCache {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MetadataCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let [registry, graph, unified, citing, journals] = self.entry_counts();
        f.debug_struct("MetadataCache")
            .field("registry", &registry)
            .field("graph", &graph)
            .field("unified", &unified)
            .field("citing", &citing)
            .field("journals", &journals)
            .finish()
    }
}

/// Immutable copy of the caches, taken after the fetch stages.
#[derive(Debug, Clone, Default)]
pub struct MetadataSnapshot {
    /// DOI → registry record.
    pub registry: HashMap<String, RegistryWork>,
    /// DOI → graph record.
    pub graph: HashMap<String, GraphWork>,
    /// DOI → unified record.
    pub unified: HashMap<String, WorkRecord>,
    /// Analyzed DOI → citing edges.
    pub citing: HashMap<String, Vec<CitingEdge>>,
    /// ISSN → journal name.
    pub journals: HashMap<String, String>,
}

impl MetadataSnapshot {
    /// Citing edges of an analyzed DOI (empty when unknown).
    #[must_use]
    pub fn citing_of(&self, doi: &str) -> &[CitingEdge] {
        self.citing.get(doi).map_or(&[], Vec::as_slice)
    }

    /// Registry publication year of any cached DOI.
    #[must_use]
    pub fn registry_year(&self, doi: &str) -> Option<i32> {
        self.registry.get(doi).and_then(RegistryWork::published_year)
    }
}
