//! Journal analysis pipeline.
//!
//! One flow serves both modes: a batch of ISSNs over one period, or one ISSN
//! over several year windows. Per journal and period the stages are
//!
//! 1. list works by ISSN and period, then validate them
//! 2. resolve unified metadata of every analyzed DOI (bounded fan-out)
//! 3. discover citing edges of every analyzed DOI (bounded fan-out)
//! 4. snapshot the cache and run every aggregator on the snapshot
//!
//! A stage finishes before the next one starts. All windows of one run share
//! the same context, so a DOI seen in one window is not fetched again.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::context::AnalysisContext;
use crate::dispatch::dispatch;
use crate::error::{AnalysisError, AnalysisResult, PeriodError};
use crate::metrics::{
    Accumulation, CitationStats, DescriptiveStats, FastMetrics, FirstCitation, KeywordReport, Overlap,
    Reviewers, Seasonality, authors, citations, descriptive, keywords, timing,
};
use crate::models::{CitingEdge, Period, WorkRecord, doi_prefix, normalize_issn, parse_period, validate_registry_items};

/// Label used when the graph does not know an ISSN.
pub const JOURNAL_NOT_FOUND: &str = "Journal not found";

/// What to analyze.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisMode {
    /// Several journals over one period expression.
    Batch {
        /// Journal ISSNs.
        issns: Vec<String>,
        /// Period expression such as `2020-2022,2024`.
        period: String,
    },
    /// One journal over several period expressions.
    Windowed {
        /// Journal ISSN.
        issn: String,
        /// One period expression per window.
        windows: Vec<String>,
    },
}

/// Everything computed for one journal and period.
#[derive(Debug, Clone, Serialize)]
pub struct JournalAnalysis {
    /// ISSN as given.
    pub issn: String,
    /// Journal name from the graph, or [`JOURNAL_NOT_FOUND`].
    pub journal_name: String,
    /// Period label (`2020` or `2020-2024`).
    pub period: String,
    /// Registry items listed for the ISSN and period.
    pub fetched: usize,
    /// Items that passed validation.
    pub validated: usize,
    /// Items dropped by validation.
    pub skipped: usize,
    /// DOI prefix of the journal.
    pub journal_prefix: String,
    /// Analyzed works in listing order.
    pub analyzed: Vec<WorkRecord>,
    /// Citing edges in analyzed order.
    pub citing: Vec<CitingEdge>,
    /// Distinct citing DOIs.
    pub unique_citing: usize,
    /// Statistics of the analyzed works.
    pub analyzed_stats: DescriptiveStats,
    /// Statistics of the citing works.
    pub citing_stats: DescriptiveStats,
    /// Citation counts and H-index.
    pub citation_stats: CitationStats,
    /// Shared authors or institutions.
    pub overlaps: Vec<Overlap>,
    /// Time to first citation.
    pub first_citation: FirstCitation,
    /// Citation accumulation curves.
    pub accumulation: Accumulation,
    /// Fast metric bundle.
    pub fast_metrics: FastMetrics,
    /// Citation seasonality.
    pub seasonality: Seasonality,
    /// Reviewer candidates.
    pub reviewers: Reviewers,
    /// Title keywords.
    pub keywords: KeywordReport,
}

/// Result of one pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisRun {
    /// Run identifier.
    pub run_id: Uuid,
    /// When the run finished.
    pub generated_at: DateTime<Utc>,
    /// One entry per journal and period with data.
    pub journals: Vec<JournalAnalysis>,
    /// Problems that did not stop the run.
    pub warnings: Vec<String>,
}

/// Current calendar year (UTC).
#[must_use]
pub fn current_year() -> i32 {
    Utc::now().year()
}

/// Runs analyses against one [`AnalysisContext`].
#[derive(Debug, Clone)]
pub struct Pipeline {
    ctx: AnalysisContext,
    current_year: i32,
}

impl Pipeline {
    /// Create a pipeline; `current_year` anchors every age-based metric.
    #[must_use]
    pub fn new(ctx: AnalysisContext, current_year: i32) -> Self {
        Self { ctx, current_year }
    }

    /// Underlying context.
    #[must_use]
    pub const fn context(&self) -> &AnalysisContext {
        &self.ctx
    }

    /// Run an analysis.
    ///
    /// # Errors
    ///
    /// Returns an error when no ISSN is given or no period expression yields a
    /// valid year. Missing upstream data never fails the run.
    #[instrument(skip(self), fields(run_id = %self.ctx.run_id()))]
    pub async fn run(&self, mode: &AnalysisMode) -> AnalysisResult<AnalysisRun> {
        let mut warnings = Vec::new();
        let mut jobs: Vec<(String, Period)> = Vec::new();

        match mode {
            AnalysisMode::Batch { issns, period } => {
                let issns: Vec<&String> = issns.iter().filter(|i| !i.trim().is_empty()).collect();
                if issns.is_empty() {
                    return Err(AnalysisError::NoIssns);
                }
                let period = parse_period(period)?;
                warnings.extend(period.warnings.iter().cloned());
                jobs.extend(issns.into_iter().map(|issn| (issn.trim().to_string(), period.clone())));
            }
            AnalysisMode::Windowed { issn, windows } => {
                if issn.trim().is_empty() {
                    return Err(AnalysisError::NoIssns);
                }
                let mut window_warnings = Vec::new();
                for window in windows {
                    match parse_period(window) {
                        Ok(period) => {
                            warnings.extend(period.warnings.iter().cloned());
                            jobs.push((issn.trim().to_string(), period));
                        }
                        Err(PeriodError::NoValidYears { warnings: w }) => {
                            warn!(window, "Skipping window without valid years");
                            window_warnings.extend(w);
                        }
                    }
                }
                if jobs.is_empty() {
                    return Err(PeriodError::NoValidYears { warnings: window_warnings }.into());
                }
                warnings.extend(window_warnings);
            }
        }

        let mut journals = Vec::with_capacity(jobs.len());
        for (issn, period) in jobs {
            match self.analyze_journal(&issn, &period).await {
                Some(analysis) => journals.push(analysis),
                None => warnings.push(format!("No works found for ISSN {issn} in {period}")),
            }
        }

        info!(journals = journals.len(), warnings = warnings.len(), "Analysis run complete");
        Ok(AnalysisRun { run_id: self.ctx.run_id(), generated_at: Utc::now(), journals, warnings })
    }

    /// Analyze one journal over one period; `None` when nothing is listed.
    #[instrument(skip(self, period), fields(run_id = %self.ctx.run_id(), period = %period))]
    pub async fn analyze_journal(&self, issn: &str, period: &Period) -> Option<JournalAnalysis> {
        let journal_name = self.ctx.journal_name(issn).await.unwrap_or_else(|| JOURNAL_NOT_FOUND.to_string());

        let items = self.ctx.client().works_by_issn(issn, &period.from_date(), &period.until_date()).await;
        if items.is_empty() {
            warn!(issn, "No works listed for ISSN and period");
            return None;
        }
        let fetched = items.len();

        let validated = validate_registry_items(items);
        let journal_prefix = validated.works.first().map(|(doi, _)| doi_prefix(doi)).unwrap_or_default();
        let dois = validated.dois();
        let skipped = validated.skipped;
        for (doi, work) in validated.works {
            self.ctx.prime_registry(&doi, work).await;
        }
        info!(issn, fetched, validated = dois.len(), skipped, "Validated listed works");

        let workers = self.ctx.config().max_workers;
        let unified = dispatch(dois.clone(), workers, "unified_metadata", |doi: String| {
            let ctx = self.ctx.clone();
            async move { ctx.unified_metadata(&doi).await }
        })
        .await;
        let mut by_doi: HashMap<String, WorkRecord> = unified.into_iter().map(|r| (r.doi.clone(), r)).collect();
        let analyzed: Vec<WorkRecord> = dois.iter().filter_map(|doi| by_doi.remove(doi)).collect();
        info!(issn, works = analyzed.len(), "Resolved analyzed metadata");

        let edges = dispatch(dois.clone(), workers, "citing_edges", |doi: String| {
            let ctx = self.ctx.clone();
            async move {
                let edges = ctx.citing_edges(&doi).await;
                (doi, edges)
            }
        })
        .await;
        let mut edges_by_doi: HashMap<String, Vec<CitingEdge>> = edges.into_iter().collect();
        let citing: Vec<CitingEdge> = dois.iter().filter_map(|doi| edges_by_doi.remove(doi)).flatten().collect();
        let unique_citing = citing.iter().map(|e| e.doi.as_str()).collect::<HashSet<_>>().len();
        info!(issn, edges = citing.len(), unique_citing, "Resolved citing works");

        let snapshot = self.ctx.snapshot();
        let citing_records: Vec<WorkRecord> = citing.iter().map(CitingEdge::to_record).collect();

        let analyzed_stats = descriptive::describe(&analyzed, true, &journal_prefix);
        let citing_stats = descriptive::describe(&citing_records, false, "");
        let citation_stats = CitationStats::compute(&analyzed, &snapshot);
        let overlaps = authors::overlaps(&analyzed, &snapshot);
        let first_citation = timing::first_citation(&analyzed, &snapshot);
        let accumulation = citations::accumulation(&analyzed, &snapshot);
        let fast_metrics =
            FastMetrics::compute(&analyzed, &citing, &snapshot, &normalize_issn(issn), self.current_year);
        let seasonality = timing::seasonality(&analyzed, &snapshot, first_citation.median_days);
        let reviewers = authors::reviewer_candidates(&analyzed, &citing, &overlaps);
        let keywords = keywords::title_keywords(&analyzed, &citing);

        info!(issn, h_index = citation_stats.h_index, "Computed metrics");

        Some(JournalAnalysis {
            issn: issn.to_string(),
            journal_name,
            period: period.to_string(),
            fetched,
            validated: dois.len(),
            skipped,
            journal_prefix,
            analyzed,
            citing,
            unique_citing,
            analyzed_stats,
            citing_stats,
            citation_stats,
            overlaps,
            first_citation,
            accumulation,
            fast_metrics,
            seasonality,
            reviewers,
            keywords,
        })
    }
}
