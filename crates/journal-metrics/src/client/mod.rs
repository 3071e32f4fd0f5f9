//! Works registry and scholarly graph API client.
//!
//! Provides async HTTP fetches with:
//! - Connection pooling via reqwest
//! - A sliding-window rate limit shared by every request
//! - An adaptive delay after each attempt (reset on success, escalated on failure)
//! - A fixed attempt budget per request; exhaustion yields `None` or an empty list
//!
//! Nothing here returns an error to the caller: per-attempt failures are
//! logged and retried, and a request that never succeeds becomes "no data".

mod delayer;
mod rate_limiter;

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument, warn};
use url::Url;

pub use delayer::AdaptiveDelayer;
pub use rate_limiter::RateLimiter;

use crate::config::{Config, api};
use crate::error::{ClientError, ClientResult};
use crate::models::{GraphWork, RegistryWork};

/// Client for both upstream APIs.
///
/// Cloning is cheap and clones share the rate limiter and delayer.
#[derive(Clone)]
pub struct ScholarlyClient {
    /// Pooled HTTP client.
    http: reqwest::Client,

    /// Request rate ceiling shared by all callers.
    limiter: Arc<RateLimiter>,

    /// Backoff cursor shared by all callers.
    delayer: Arc<AdaptiveDelayer>,

    /// Works registry base URL.
    registry_api_url: String,

    /// Scholarly graph base URL.
    graph_api_url: String,

    /// Contact address for the registry's `mailto` parameter.
    mailto: String,

    registry_timeout: Duration,
    graph_timeout: Duration,
    retries: u32,
    registry_rows: u32,
    graph_per_page: u32,
}

/// One page of a cursor-paginated listing.
struct Page {
    items: Vec<Value>,
    next_cursor: Option<String>,
}

#[derive(Deserialize)]
struct RegistryEnvelope<T> {
    message: T,
}

#[derive(Deserialize)]
struct RegistryList {
    #[serde(default)]
    items: Vec<Value>,
    #[serde(rename = "next-cursor", default)]
    next_cursor: Option<String>,
}

#[derive(Deserialize, Default)]
struct GraphMeta {
    #[serde(default)]
    count: Option<u64>,
    #[serde(default)]
    next_cursor: Option<String>,
}

#[derive(Deserialize)]
struct GraphList {
    #[serde(default)]
    results: Vec<Value>,
    #[serde(default)]
    meta: GraphMeta,
}

#[derive(Deserialize)]
struct SourceList {
    #[serde(default)]
    meta: GraphMeta,
    #[serde(default)]
    results: Vec<SourceSummary>,
}

#[derive(Deserialize)]
struct SourceSummary {
    #[serde(default)]
    display_name: Option<String>,
}

impl ScholarlyClient {
    /// Create a new client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails.
    pub fn new(config: &Config) -> ClientResult<Self> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent())
            .connect_timeout(config.connect_timeout)
            .pool_max_idle_per_host(api::MAX_KEEPALIVE)
            .pool_idle_timeout(api::KEEPALIVE_EXPIRY)
            .gzip(true)
            .build()?;

        Url::parse(&config.registry_api_url)?;
        Url::parse(&config.graph_api_url)?;

        Ok(Self {
            http,
            limiter: Arc::new(RateLimiter::new(config.requests_per_second)),
            delayer: Arc::new(AdaptiveDelayer::new(config.delays.clone())),
            registry_api_url: config.registry_api_url.trim_end_matches('/').to_string(),
            graph_api_url: config.graph_api_url.trim_end_matches('/').to_string(),
            mailto: config.mailto.clone(),
            registry_timeout: config.registry_timeout,
            graph_timeout: config.graph_timeout,
            retries: config.retries.max(1),
            registry_rows: config.registry_rows,
            graph_per_page: config.graph_per_page,
        })
    }

    /// Shared rate limiter.
    #[must_use]
    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    /// Shared adaptive delayer.
    #[must_use]
    pub fn delayer(&self) -> &AdaptiveDelayer {
        &self.delayer
    }

    /// Journal display name for an ISSN.
    ///
    /// A response is accepted only when the source listing reports at least
    /// one match.
    #[instrument(skip(self))]
    pub async fn journal_name(&self, issn: &str) -> Option<String> {
        let mut url = self.url(&self.graph_api_url, "sources")?;
        url.query_pairs_mut().append_pair("filter", &format!("issn:{issn}"));

        let sources: SourceList = self
            .get_with_retry(&url, self.graph_timeout, |list: &SourceList| {
                let found = list.meta.count.unwrap_or(0) > 0
                    && list.results.first().is_some_and(|s| s.display_name.is_some());
                if found { Ok(()) } else { Err(ClientError::rejected("no source for ISSN")) }
            })
            .await?;

        sources.results.into_iter().next().and_then(|s| s.display_name)
    }

    /// Registry record for a DOI.
    #[instrument(skip(self))]
    pub async fn registry_work(&self, doi: &str) -> Option<RegistryWork> {
        if is_blank_doi(doi) {
            return None;
        }
        let url = self.url(&self.registry_api_url, &format!("works/{doi}"))?;

        let envelope = self
            .get_with_retry(&url, self.registry_timeout, accept_any::<RegistryEnvelope<RegistryWork>>)
            .await?;
        Some(envelope.message)
    }

    /// Graph record for a DOI (bare or in URL form).
    #[instrument(skip(self))]
    pub async fn graph_work(&self, doi: &str) -> Option<GraphWork> {
        if is_blank_doi(doi) {
            return None;
        }
        let doi_url =
            if doi.starts_with("http") { doi.to_string() } else { format!("https://doi.org/{doi}") };
        let url = self.url(&self.graph_api_url, &format!("works/{doi_url}"))?;

        self.get_with_retry(&url, self.graph_timeout, accept_any::<GraphWork>).await
    }

    /// All registry works of a journal published between two dates.
    ///
    /// Dates are `YYYY-MM-DD`. Pages are fetched in order until the listing is
    /// exhausted or a page fails every attempt; items gathered so far are kept.
    #[instrument(skip(self))]
    pub async fn works_by_issn(&self, issn: &str, from: &str, until: &str) -> Vec<RegistryWork> {
        let Some(mut url) = self.url(&self.registry_api_url, "works") else {
            return Vec::new();
        };
        url.query_pairs_mut()
            .append_pair("filter", &format!("issn:{issn},from-pub-date:{from},until-pub-date:{until}"))
            .append_pair("rows", &self.registry_rows.to_string())
            .append_pair("mailto", &self.mailto);

        let works: Vec<RegistryWork> = self
            .paginate(&url, self.registry_timeout, |page: RegistryEnvelope<RegistryList>| Page {
                items: page.message.items,
                next_cursor: page.message.next_cursor,
            })
            .await;

        debug!(count = works.len(), "Fetched registry works");
        works
    }

    /// All graph works citing the graph work `work_id` (e.g. `W2741809807`).
    #[instrument(skip(self))]
    pub async fn citing_works(&self, work_id: &str) -> Vec<GraphWork> {
        let Some(mut url) = self.url(&self.graph_api_url, "works") else {
            return Vec::new();
        };
        url.query_pairs_mut()
            .append_pair("filter", &format!("cites:{work_id}"))
            .append_pair("per-page", &self.graph_per_page.to_string());

        self.paginate(&url, self.graph_timeout, |page: GraphList| Page {
            items: page.results,
            next_cursor: page.meta.next_cursor,
        })
        .await
    }

    /// Walk a cursor-paginated listing starting at cursor `*`.
    ///
    /// Stops when a page exhausts its attempts, when the cursor is absent or
    /// repeats, or when a page has no items. Items that do not decode as `T`
    /// are skipped.
    async fn paginate<P, T, F>(&self, base: &Url, timeout: Duration, split: F) -> Vec<T>
    where
        P: DeserializeOwned,
        T: DeserializeOwned,
        F: Fn(P) -> Page,
    {
        let mut items = Vec::new();
        let mut cursor = "*".to_string();
        let mut pages = 0_usize;
        let mut undecodable = 0_usize;

        loop {
            let mut url = base.clone();
            url.query_pairs_mut().append_pair("cursor", &cursor);

            let Some(page) = self.get_with_retry(&url, timeout, accept_any::<P>).await else {
                warn!(pages, items = items.len(), "Page failed every attempt, keeping items so far");
                break;
            };
            let Page { items: raw, next_cursor } = split(page);
            pages += 1;

            let page_len = raw.len();
            for value in raw {
                match serde_json::from_value::<T>(value) {
                    Ok(item) => items.push(item),
                    Err(e) => {
                        undecodable += 1;
                        debug!(error = %e, "Skipping undecodable item");
                    }
                }
            }

            if page_len == 0 {
                break;
            }
            match next_cursor.filter(|c| !c.is_empty()) {
                Some(next) if next == cursor => {
                    warn!(%cursor, "Cursor repeated, stopping pagination");
                    break;
                }
                Some(next) => cursor = next,
                None => break,
            }
        }

        if undecodable > 0 {
            warn!(undecodable, "Skipped undecodable items");
        }
        debug!(pages, items = items.len(), "Pagination finished");
        items
    }

    /// Fetch and decode `url`, retrying up to the configured attempt budget.
    ///
    /// Every attempt waits on the rate limiter first. A decoded payload must
    /// also pass `accept`; a rejected payload counts as a failed attempt.
    async fn get_with_retry<T, F>(&self, url: &Url, timeout: Duration, accept: F) -> Option<T>
    where
        T: DeserializeOwned,
        F: Fn(&T) -> ClientResult<()>,
    {
        for attempt in 1..=self.retries {
            self.limiter.wait_if_needed().await;

            let outcome = match self.get_once::<T>(url, timeout).await {
                Ok(value) => accept(&value).map(|()| value),
                Err(e) => Err(e),
            };

            match outcome {
                Ok(value) => {
                    self.delayer.wait(true).await;
                    return Some(value);
                }
                Err(e) => {
                    debug!(
                        %url,
                        attempt,
                        retryable = e.is_retryable(),
                        error = %e,
                        "Request attempt failed"
                    );
                    self.delayer.wait(false).await;
                }
            }
        }

        warn!(%url, attempts = self.retries, "Request failed every attempt");
        None
    }

    /// One GET with status mapping and JSON decoding.
    async fn get_once<T: DeserializeOwned>(&self, url: &Url, timeout: Duration) -> ClientResult<T> {
        let response = self.http.get(url.clone()).timeout(timeout).send().await?;
        let response = handle_response(response).await?;
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    fn url(&self, base: &str, path: &str) -> Option<Url> {
        Url::parse(&format!("{base}/{path}"))
            .inspect_err(|e| warn!(base, path, error = %e, "Could not build request URL"))
            .ok()
    }
}

fn accept_any<T>(_: &T) -> ClientResult<()> {
    Ok(())
}

fn is_blank_doi(doi: &str) -> bool {
    let doi = doi.trim();
    doi.is_empty() || doi == "N/A"
}

/// Map non-success status codes to errors.
async fn handle_response(response: reqwest::Response) -> ClientResult<reqwest::Response> {
    let status = response.status();

    if status == reqwest::StatusCode::OK {
        return Ok(response);
    }

    match status.as_u16() {
        429 => {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok())
                .unwrap_or(60);

            Err(ClientError::rate_limited(retry_after))
        }
        404 => {
            let resource = response.url().path().to_string();
            Err(ClientError::not_found(resource))
        }
        500..=599 => {
            let text = response.text().await.unwrap_or_default();
            Err(ClientError::server(status.as_u16(), text))
        }
        _ => {
            let text = response.text().await.unwrap_or_default();
            Err(ClientError::UnexpectedStatus { status: status.as_u16(), message: text })
        }
    }
}

impl std::fmt::Debug for ScholarlyClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScholarlyClient")
            .field("registry_api_url", &self.registry_api_url)
            .field("graph_api_url", &self.graph_api_url)
            .field("retries", &self.retries)
            .finish_non_exhaustive()
    }
}
