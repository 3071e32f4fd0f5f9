//! Configuration for the journal metrics pipeline.

use std::time::Duration;

/// API configuration constants.
pub mod api {
    use std::time::Duration;

    /// Works registry (Crossref) base URL.
    pub const REGISTRY_API: &str = "https://api.crossref.org";

    /// Scholarly graph (OpenAlex) base URL.
    pub const GRAPH_API: &str = "https://api.openalex.org";

    /// Contact address sent to the registry's polite pool.
    pub const DEFAULT_MAILTO: &str = "your.email@example.com";

    /// Registry request timeout.
    pub const REGISTRY_TIMEOUT: Duration = Duration::from_secs(15);

    /// Graph request timeout.
    pub const GRAPH_TIMEOUT: Duration = Duration::from_secs(10);

    /// Connection timeout.
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Requests allowed in any trailing one-second window.
    pub const REQUESTS_PER_SECOND: usize = 8;

    /// Attempts per fetch before giving up.
    pub const RETRIES: u32 = 3;

    /// Concurrent fetch tasks per dispatch stage.
    pub const MAX_WORKERS: usize = 5;

    /// Adaptive delay ladder in milliseconds.
    pub const DELAYS_MS: [u64; 7] = [200, 500, 700, 1000, 1300, 1500, 2000];

    /// Registry page size for works-by-ISSN listing.
    pub const REGISTRY_ROWS: u32 = 1000;

    /// Graph page size for citing-works listing.
    pub const GRAPH_PER_PAGE: u32 = 100;

    /// Maximum rows written per report sheet.
    pub const MAX_REPORT_ROWS: usize = 10_000;

    /// Maximum keepalive connections.
    pub const MAX_KEEPALIVE: usize = 10;

    /// Keepalive expiry.
    pub const KEEPALIVE_EXPIRY: Duration = Duration::from_secs(30);
}

/// Pipeline configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Contact e-mail for the registry's User-Agent and `mailto` parameter.
    pub mailto: String,

    /// Base URL of the works registry (for testing with mock servers).
    pub registry_api_url: String,

    /// Base URL of the scholarly graph (for testing with mock servers).
    pub graph_api_url: String,

    /// Registry request timeout.
    pub registry_timeout: Duration,

    /// Graph request timeout.
    pub graph_timeout: Duration,

    /// Connection timeout.
    pub connect_timeout: Duration,

    /// Requests per trailing second across all callers.
    pub requests_per_second: usize,

    /// Attempts per fetch.
    pub retries: u32,

    /// Ascending adaptive delay table.
    pub delays: Vec<Duration>,

    /// Concurrent fetch tasks.
    pub max_workers: usize,

    /// Registry page size.
    pub registry_rows: u32,

    /// Graph page size.
    pub graph_per_page: u32,

    /// Row cap per report sheet.
    pub max_report_rows: usize,
}

impl Config {
    /// Create a configuration with the given contact address.
    #[must_use]
    pub fn new(mailto: Option<String>) -> Self {
        Self {
            mailto: mailto.unwrap_or_else(|| api::DEFAULT_MAILTO.to_string()),
            registry_api_url: api::REGISTRY_API.to_string(),
            graph_api_url: api::GRAPH_API.to_string(),
            registry_timeout: api::REGISTRY_TIMEOUT,
            graph_timeout: api::GRAPH_TIMEOUT,
            connect_timeout: api::CONNECT_TIMEOUT,
            requests_per_second: api::REQUESTS_PER_SECOND,
            retries: api::RETRIES,
            delays: api::DELAYS_MS.iter().copied().map(Duration::from_millis).collect(),
            max_workers: api::MAX_WORKERS,
            registry_rows: api::REGISTRY_ROWS,
            graph_per_page: api::GRAPH_PER_PAGE,
            max_report_rows: api::MAX_REPORT_ROWS,
        }
    }

    /// Create a test configuration with both APIs behind one mock server.
    #[must_use]
    pub fn for_testing(base_url: &str) -> Self {
        Self {
            mailto: "test@example.com".to_string(),
            registry_api_url: format!("{}/registry", base_url),
            graph_api_url: format!("{}/graph", base_url),
            registry_timeout: Duration::from_secs(5),
            graph_timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(2),
            requests_per_second: 1000,
            retries: api::RETRIES,
            delays: vec![Duration::from_millis(1), Duration::from_millis(2)],
            max_workers: api::MAX_WORKERS,
            registry_rows: api::REGISTRY_ROWS,
            graph_per_page: api::GRAPH_PER_PAGE,
            max_report_rows: api::MAX_REPORT_ROWS,
        }
    }

    /// Create configuration from environment variables.
    ///
    /// Reads `JOURNAL_METRICS_MAILTO`, `JOURNAL_METRICS_REGISTRY_URL` and
    /// `JOURNAL_METRICS_GRAPH_URL`.
    pub fn from_env() -> anyhow::Result<Self> {
        let mut config = Self::new(std::env::var("JOURNAL_METRICS_MAILTO").ok());
        if let Ok(url) = std::env::var("JOURNAL_METRICS_REGISTRY_URL") {
            url::Url::parse(&url)?;
            config.registry_api_url = url.trim_end_matches('/').to_string();
        }
        if let Ok(url) = std::env::var("JOURNAL_METRICS_GRAPH_URL") {
            url::Url::parse(&url)?;
            config.graph_api_url = url.trim_end_matches('/').to_string();
        }
        Ok(config)
    }

    /// User-Agent sent to the registry's polite pool.
    #[must_use]
    pub fn user_agent(&self) -> String {
        format!("journal-metrics/{} (mailto:{})", env!("CARGO_PKG_VERSION"), self.mailto)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.mailto, api::DEFAULT_MAILTO);
        assert_eq!(config.requests_per_second, 8);
        assert_eq!(config.retries, 3);
        assert_eq!(config.max_workers, 5);
        assert_eq!(config.delays.first(), Some(&Duration::from_millis(200)));
        assert_eq!(config.delays.last(), Some(&Duration::from_secs(2)));
    }

    #[test]
    fn test_delay_table_is_ascending() {
        let config = Config::default();
        assert!(config.delays.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_config_for_testing_points_at_mock() {
        let config = Config::for_testing("http://127.0.0.1:9999");
        assert_eq!(config.registry_api_url, "http://127.0.0.1:9999/registry");
        assert_eq!(config.graph_api_url, "http://127.0.0.1:9999/graph");
    }

    #[test]
    fn test_user_agent_carries_mailto() {
        let config = Config::new(Some("me@uni.edu".to_string()));
        assert!(config.user_agent().contains("mailto:me@uni.edu"));
    }
}
