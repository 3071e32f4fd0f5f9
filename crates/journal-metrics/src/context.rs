//! Per-run analysis context: client plus cache, with cache-through lookups.

use tracing::{debug, instrument};
use uuid::Uuid;

use crate::cache::{MetadataCache, MetadataSnapshot};
use crate::client::ScholarlyClient;
use crate::config::Config;
use crate::error::ClientResult;
use crate::models::{CitingEdge, GraphWork, RegistryWork, WorkRecord, normalize_doi};

/// Everything one analysis run shares across its tasks.
///
/// Clones share the client and the cache. Dropping the last clone discards
/// the cached metadata.
#[derive(Debug, Clone)]
pub struct AnalysisContext {
    run_id: Uuid,
    client: ScholarlyClient,
    cache: MetadataCache,
    config: Config,
}

impl AnalysisContext {
    /// Create a context with a fresh cache.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built.
    pub fn new(config: Config) -> ClientResult<Self> {
        let client = ScholarlyClient::new(&config)?;
        Ok(Self::with_client(config, client))
    }

    /// Create a context around an existing client.
    #[must_use]
    pub fn with_client(config: Config, client: ScholarlyClient) -> Self {
        Self { run_id: Uuid::new_v4(), client, cache: MetadataCache::new(), config }
    }

    /// Run identifier, carried in log spans.
    #[must_use]
    pub const fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Underlying client.
    #[must_use]
    pub const fn client(&self) -> &ScholarlyClient {
        &self.client
    }

    /// Underlying cache.
    #[must_use]
    pub const fn cache(&self) -> &MetadataCache {
        &self.cache
    }

    /// Run configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Immutable copy of everything fetched so far.
    #[must_use]
    pub fn snapshot(&self) -> MetadataSnapshot {
        self.cache.snapshot()
    }

    /// Registry record for a normalized DOI, fetched at most once.
    pub async fn registry_work(&self, doi: &str) -> Option<RegistryWork> {
        self.cache.registry_with(doi, self.client.registry_work(doi)).await
    }

    /// Graph record for a normalized DOI, fetched at most once.
    pub async fn graph_work(&self, doi: &str) -> Option<GraphWork> {
        self.cache.graph_with(doi, self.client.graph_work(doi)).await
    }

    /// Store a registry record obtained from a listing so it is not fetched again.
    pub async fn prime_registry(&self, doi: &str, work: RegistryWork) {
        self.cache.registry_with(doi, async { Some(work) }).await;
    }

    /// Journal name for an ISSN, fetched at most once per run.
    pub async fn journal_name(&self, issn: &str) -> Option<String> {
        self.cache.journal_with(issn, self.client.journal_name(issn)).await
    }

    /// Both halves of a DOI.
    ///
    /// Inputs that do not normalize to a DOI yield a record without halves.
    #[instrument(skip(self), fields(run_id = %self.run_id))]
    pub async fn unified_metadata(&self, doi: &str) -> WorkRecord {
        let Some(doi) = normalize_doi(doi) else {
            return WorkRecord::empty(doi.trim());
        };

        self.cache
            .unified_with(&doi, async {
                let (registry, graph) = tokio::join!(self.registry_work(&doi), self.graph_work(&doi));
                WorkRecord { doi: doi.clone(), registry, graph }
            })
            .await
    }

    /// Works citing an analyzed DOI, each with both of its halves resolved.
    ///
    /// Works whose graph half is missing or reports no citations get an empty
    /// list without a listing request.
    #[instrument(skip(self), fields(run_id = %self.run_id))]
    pub async fn citing_edges(&self, doi: &str) -> Vec<CitingEdge> {
        let Some(doi) = normalize_doi(doi) else {
            return Vec::new();
        };

        self.cache.citing_with(&doi, self.discover_citing(&doi)).await
    }

    async fn discover_citing(&self, cited_doi: &str) -> Vec<CitingEdge> {
        let Some(graph) = self.graph_work(cited_doi).await else {
            return Vec::new();
        };
        if graph.citations() == 0 {
            return Vec::new();
        }
        let Some(work_id) = graph.work_id() else {
            return Vec::new();
        };

        let citing = self.client.citing_works(work_id).await;
        let mut edges = Vec::with_capacity(citing.len());

        for work in citing {
            let Some(citing_doi) = work.normalized_doi() else {
                continue;
            };
            let pub_date = work.publication_date.clone();
            // The listing already carries the full graph record.
            let (registry, graph) = tokio::join!(
                self.registry_work(&citing_doi),
                self.cache.graph_with(&citing_doi, async { Some(work) })
            );
            edges.push(CitingEdge {
                doi: citing_doi,
                cited_doi: cited_doi.to_string(),
                pub_date,
                registry,
                graph,
            });
        }

        debug!(cited_doi, edges = edges.len(), "Resolved citing works");
        edges
    }
}
