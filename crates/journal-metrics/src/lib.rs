//! Journal Metrics
//!
//! Bibliometric reports for scholarly journals, built from a works registry
//! (Crossref) and a scholarly graph (OpenAlex). Given ISSNs and a period, the
//! pipeline lists the journal's works, resolves their metadata and citing
//! works, and computes citation, authorship, timing and keyword metrics.
//!
//! # Features
//!
//! - **Bounded fan-out**: metadata requests run on a fixed number of workers
//! - **Rate-limited**: sliding-window limiter plus adaptive backoff
//! - **Cached**: every DOI is fetched at most once per run
//! - **Resilient**: missing upstream data degrades to "no data", never to an error
//!
//! # Example
//!
//! ```no_run
//! use journal_metrics::{AnalysisContext, AnalysisMode, Config, Pipeline, Workbook};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let max_rows = config.max_report_rows;
//!     let pipeline = Pipeline::new(AnalysisContext::new(config)?, journal_metrics::pipeline::current_year());
//!
//!     let mode = AnalysisMode::Batch { issns: vec!["0028-0836".into()], period: "2022-2023".into() };
//!     let run = pipeline.run(&mode).await?;
//!     let workbook = Workbook::from_run(&run, max_rows);
//!     println!("{} sheets", workbook.sheets.len());
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod client;
pub mod config;
pub mod context;
pub mod dispatch;
pub mod error;
pub mod formatters;
pub mod metrics;
pub mod models;
pub mod pipeline;
pub mod report;

pub use client::ScholarlyClient;
pub use config::Config;
pub use context::AnalysisContext;
pub use error::{AnalysisError, ClientError, PeriodError};
pub use pipeline::{AnalysisMode, AnalysisRun, JournalAnalysis, Pipeline};
pub use report::{Sheet, Workbook};
