//! Error types for the journal metrics pipeline.
//!
//! Uses `thiserror` for structured error handling with automatic `From` implementations.

use std::time::Duration;

/// Errors from a single HTTP attempt.
///
/// These never escape the fetch layer: the retry loop logs them and turns an
/// exhausted attempt budget into a sentinel value.
#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    /// HTTP transport error (connection, DNS, TLS, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Request URL could not be built
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Rate limited by the upstream API (429 response)
    #[error("Rate limited, retry after {retry_after:?}")]
    RateLimited {
        /// Suggested wait time before retry
        retry_after: Duration,
    },

    /// Resource not found (404 response)
    #[error("Resource not found: {resource}")]
    NotFound {
        /// Description of the missing resource
        resource: String,
    },

    /// JSON parsing error
    #[error("Failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),

    /// Server error (5xx response)
    #[error("Server error ({status}): {message}")]
    Server {
        /// HTTP status code
        status: u16,
        /// Error message
        message: String,
    },

    /// Unexpected HTTP status
    #[error("Unexpected status {status}: {message}")]
    UnexpectedStatus {
        /// HTTP status code
        status: u16,
        /// Response body or message
        message: String,
    },

    /// Successful response whose payload was not usable
    #[error("Rejected response: {0}")]
    Rejected(String),
}

impl ClientError {
    /// Create a rate limited error with retry-after duration.
    #[must_use]
    pub fn rate_limited(seconds: u64) -> Self {
        Self::RateLimited { retry_after: Duration::from_secs(seconds) }
    }

    /// Create a not found error.
    #[must_use]
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound { resource: resource.into() }
    }

    /// Create a server error.
    #[must_use]
    pub fn server(status: u16, message: impl Into<String>) -> Self {
        Self::Server { status, message: message.into() }
    }

    /// Create a rejected-payload error.
    #[must_use]
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected(message.into())
    }

    /// Returns true if another attempt could plausibly succeed.
    ///
    /// The fetch layer retries every failure regardless; this only shapes the
    /// log level.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            Self::RateLimited { .. } | Self::Server { .. } => true,
            _ => false,
        }
    }
}

/// Period expression parsing failure.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PeriodError {
    /// No component of the expression produced a valid year
    #[error("No valid years in period expression (warnings: {})", warnings.join("; "))]
    NoValidYears {
        /// Per-part warnings collected while parsing
        warnings: Vec<String>,
    },
}

/// Errors from running an analysis.
#[derive(thiserror::Error, Debug)]
pub enum AnalysisError {
    /// Invalid period expression
    #[error("Invalid period: {0}")]
    Period(#[from] PeriodError),

    /// Nothing to analyze
    #[error("No ISSN given")]
    NoIssns,

    /// HTTP client could not be built
    #[error("Client setup failed: {0}")]
    Client(#[from] ClientError),

    /// Report serialization failed
    #[error("Report error: {0}")]
    Report(String),

    /// Output could not be written
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AnalysisError {
    /// Create a report error.
    #[must_use]
    pub fn report(message: impl Into<String>) -> Self {
        Self::Report(message.into())
    }

    /// Convert to a user-friendly message for the CLI.
    #[must_use]
    pub fn to_user_message(&self) -> String {
        match self {
            Self::Period(PeriodError::NoValidYears { warnings }) if !warnings.is_empty() => {
                format!(
                    "No valid years in period. Use YYYY or YYYY-YYYY between 1900 and 2100 ({})",
                    warnings.join("; ")
                )
            }
            Self::NoIssns => "Provide at least one ISSN with --issn".to_string(),
            _ => self.to_string(),
        }
    }
}

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Result type alias for analysis operations.
pub type AnalysisResult<T> = Result<T, AnalysisError>;
