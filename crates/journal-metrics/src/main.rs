//! Journal Metrics - Entry Point
//!
//! Runs one analysis and writes the report as JSON or Markdown.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use journal_metrics::formatters::{format_run_json, format_run_markdown, format_workbook_json, format_workbook_markdown};
use journal_metrics::{AnalysisContext, AnalysisMode, Config, Pipeline, Workbook, pipeline::current_year};

/// Rows per sheet shown in Markdown output.
const MARKDOWN_ROWS: usize = 20;

#[derive(Parser, Debug)]
#[command(name = "journal-metrics")]
#[command(about = "Bibliometric journal reports from Crossref and OpenAlex metadata")]
#[command(version)]
struct Cli {
    /// Journal ISSN (repeat for several journals)
    #[arg(long = "issn", required = true)]
    issns: Vec<String>,

    /// Period expression for batch mode, e.g. 2020-2022,2024
    #[arg(long, required_unless_present = "windows", conflicts_with = "windows")]
    period: Option<String>,

    /// Period window for windowed mode (repeat for several windows)
    #[arg(long = "window")]
    windows: Vec<String>,

    /// Output file (stdout when omitted)
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(long, default_value = "json")]
    format: OutputFormat,

    /// Contact address sent to the registry's polite pool
    #[arg(long, env = "JOURNAL_METRICS_MAILTO")]
    mailto: Option<String>,

    /// Concurrent metadata workers
    #[arg(long)]
    workers: Option<usize>,

    /// Maximum requests per second
    #[arg(long)]
    rate_limit: Option<usize>,

    /// Maximum rows per report sheet
    #[arg(long)]
    max_rows: Option<usize>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    /// Run metadata, journal summaries and every sheet as JSON
    #[default]
    Json,
    /// Human-readable summary with sheet tables
    Markdown,
}

impl Cli {
    fn mode(&self) -> anyhow::Result<AnalysisMode> {
        if self.windows.is_empty() {
            return Ok(AnalysisMode::Batch {
                issns: self.issns.clone(),
                period: self.period.clone().unwrap_or_default(),
            });
        }
        match self.issns.as_slice() {
            [issn] => Ok(AnalysisMode::Windowed { issn: issn.clone(), windows: self.windows.clone() }),
            _ => anyhow::bail!("--window analyzes exactly one journal; pass a single --issn"),
        }
    }

    fn config(&self) -> anyhow::Result<Config> {
        let mut config = Config::from_env()?;
        if let Some(mailto) = &self.mailto {
            config.mailto.clone_from(mailto);
        }
        if let Some(workers) = self.workers {
            config.max_workers = workers.max(1);
        }
        if let Some(rate) = self.rate_limit {
            config.requests_per_second = rate.max(1);
        }
        if let Some(rows) = self.max_rows {
            config.max_report_rows = rows;
        }
        Ok(config)
    }
}

// Logs go to stderr so stdout carries only the report.
fn init_tracing(log_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if json {
        subscriber.with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr)).init();
    } else {
        subscriber.with(tracing_subscriber::fmt::layer().compact().with_writer(std::io::stderr)).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    init_tracing(&cli.log_level, cli.json_logs);

    let mode = cli.mode()?;
    let config = cli.config()?;
    let max_rows = config.max_report_rows;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        workers = config.max_workers,
        rate_limit = config.requests_per_second,
        "Starting journal metrics analysis"
    );

    let ctx = AnalysisContext::new(config)?;
    let pipeline = Pipeline::new(ctx, current_year());

    let rendered = match pipeline.run(&mode).await {
        Ok(run) => {
            let workbook = Workbook::from_run(&run, max_rows);
            match cli.format {
                OutputFormat::Json => serde_json::to_string_pretty(&format_run_json(&run, &workbook))?,
                OutputFormat::Markdown => format_run_markdown(&run, &workbook, MARKDOWN_ROWS),
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "Analysis failed");
            let workbook = Workbook::error_report(&e.to_user_message());
            match cli.format {
                OutputFormat::Json => serde_json::to_string_pretty(&format_workbook_json(&workbook))?,
                OutputFormat::Markdown => format_workbook_markdown(&workbook, MARKDOWN_ROWS),
            }
        }
    };

    match &cli.output {
        Some(path) => {
            tokio::fs::write(path, rendered)
                .await
                .with_context(|| format!("failed to write report to {}", path.display()))?;
            tracing::info!(path = %path.display(), "Report written");
        }
        None => println!("{rendered}"),
    }

    Ok(())
}
