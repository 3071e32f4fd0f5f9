//! Report assembly: named tabular sheets built from an [`AnalysisRun`].
//!
//! A [`Workbook`] is the in-memory equivalent of a multi-sheet spreadsheet.
//! Cells are JSON values so the formatters can render them without knowing
//! which metric produced them. Assembly never fails outward: any internal
//! inconsistency is logged and replaced by a one-sheet error report.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use serde_json::{Value, json};
use tracing::{error, info};

use crate::error::{AnalysisError, AnalysisResult};
use crate::metrics::authors::normalize_author_name;
use crate::metrics::keywords::KeywordKind;
use crate::metrics::{DescriptiveStats, most_common, round_to};
use crate::models::{CitingEdge, GraphWork, RegistryWork, WorkRecord};
use crate::pipeline::{AnalysisRun, JOURNAL_NOT_FOUND, JournalAnalysis};

/// Characters of the journal name kept in sheet names.
const LABEL_CHARS: usize = 15;

const ARTICLE_COLUMNS: [&str; 13] = [
    "DOI",
    "Title",
    "Authors",
    "Affiliations",
    "Countries",
    "Publication_Year",
    "Journal",
    "Publisher",
    "ISSN",
    "Reference_Count",
    "Citations",
    "Author_Count",
    "Work_Type",
];

const COMPARATIVE_COLUMNS: [&str; 12] = [
    "Journal",
    "Period",
    "n_items",
    "total_citations",
    "h_index",
    "avg_citations_per_article",
    "self_cites_pct",
    "multi_country_pct",
    "unique_affiliations_count",
    "unique_countries_count",
    "ref_mean",
    "auth_mean",
];

/// One named table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sheet {
    /// Unique sheet name.
    pub name: String,
    /// Column headers.
    pub columns: Vec<String>,
    /// Rows, each as wide as `columns`.
    pub rows: Vec<Vec<Value>>,
    /// Rows dropped by the row cap.
    pub truncated_rows: usize,
    #[serde(skip)]
    max_rows: usize,
}

impl Sheet {
    /// Empty sheet without a row cap.
    #[must_use]
    pub fn new(name: impl Into<String>, columns: &[&str]) -> Self {
        Self::capped(name, columns, usize::MAX)
    }

    /// Empty sheet keeping at most `max_rows` rows.
    #[must_use]
    pub fn capped(name: impl Into<String>, columns: &[&str], max_rows: usize) -> Self {
        Self {
            name: name.into(),
            columns: columns.iter().map(|c| (*c).to_string()).collect(),
            rows: Vec::new(),
            truncated_rows: 0,
            max_rows,
        }
    }

    /// Append a row; rows past the cap are counted, not stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the row width differs from the header width.
    pub fn push_row(&mut self, row: Vec<Value>) -> AnalysisResult<()> {
        if row.len() != self.columns.len() {
            return Err(AnalysisError::report(format!(
                "sheet '{}' expects {} columns, got {}",
                self.name,
                self.columns.len(),
                row.len()
            )));
        }
        if self.rows.len() >= self.max_rows {
            self.truncated_rows += 1;
        } else {
            self.rows.push(row);
        }
        Ok(())
    }

    /// Whether the sheet has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn metrics(name: String, rows: Vec<(&str, Value)>) -> AnalysisResult<Self> {
        let mut sheet = Self::new(name, &["Metric", "Value"]);
        for (metric, value) in rows {
            sheet.push_row(vec![json!(metric), value])?;
        }
        Ok(sheet)
    }
}

/// Ordered collection of sheets.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Workbook {
    /// Sheets in display order.
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    /// Build the report for a run, falling back to [`Workbook::error_report`].
    #[must_use]
    pub fn from_run(run: &AnalysisRun, max_rows: usize) -> Self {
        match Self::try_build(run, max_rows) {
            Ok(workbook) => workbook,
            Err(e) => {
                error!(error = %e, "Report assembly failed");
                Self::error_report(&e.to_string())
            }
        }
    }

    /// Build the report for a run.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::Report`] when a sheet is malformed or two
    /// sheets share a name.
    pub fn try_build(run: &AnalysisRun, max_rows: usize) -> AnalysisResult<Self> {
        let mut workbook = Self::default();
        let labels = journal_labels(&run.journals);

        if !run.journals.is_empty() {
            let mut comparative = Sheet::new("Comparative_Statistics", &COMPARATIVE_COLUMNS);
            for (journal, label) in run.journals.iter().zip(&labels) {
                comparative.push_row(comparative_row(journal, label))?;
            }
            workbook.push(comparative)?;
        }

        for (journal, label) in run.journals.iter().zip(&labels) {
            for sheet in journal_sheets(journal, label, max_rows)? {
                workbook.push(sheet)?;
            }
        }

        if workbook.sheets.is_empty() {
            let mut summary = Sheet::new("Summary", &["Status", "Message"]);
            summary.push_row(vec![
                json!("Analysis completed"),
                json!("No data matched the criteria. Check ISSN and period."),
            ])?;
            workbook.push(summary)?;
        }

        if !run.warnings.is_empty() {
            let mut warnings = Sheet::new("Warnings", &["Warning"]);
            for warning in &run.warnings {
                warnings.push_row(vec![json!(warning)])?;
            }
            workbook.push(warnings)?;
        }

        info!(sheets = workbook.sheets.len(), "Report assembled");
        Ok(workbook)
    }

    /// One-sheet report describing a failure.
    #[must_use]
    pub fn error_report(message: &str) -> Self {
        let sheet = Sheet {
            name: "Information".to_string(),
            columns: vec!["Error".to_string(), "Recommendation".to_string()],
            rows: vec![vec![json!(message), json!("Check the ISSN and period, then run the analysis again.")]],
            truncated_rows: 0,
            max_rows: usize::MAX,
        };
        Self { sheets: vec![sheet] }
    }

    /// Sheet by name.
    #[must_use]
    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    fn push(&mut self, sheet: Sheet) -> AnalysisResult<()> {
        if self.sheet(&sheet.name).is_some() {
            return Err(AnalysisError::report(format!("duplicate sheet name '{}'", sheet.name)));
        }
        self.sheets.push(sheet);
        Ok(())
    }
}

/// Truncate to at most `max` characters.
fn clip(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

/// Distinct sheet-name prefixes, one per journal analysis.
///
/// Windowed runs repeat the ISSN, so the period is appended when an ISSN
/// occurs more than once.
fn journal_labels(journals: &[JournalAnalysis]) -> Vec<String> {
    let mut per_issn: HashMap<&str, usize> = HashMap::new();
    for journal in journals {
        *per_issn.entry(journal.issn.as_str()).or_default() += 1;
    }

    let mut taken = HashSet::new();
    journals
        .iter()
        .map(|journal| {
            let name = if journal.journal_name == JOURNAL_NOT_FOUND { &journal.issn } else { &journal.journal_name };
            let mut base = clip(name.trim(), LABEL_CHARS).trim_end().replace(' ', "_");
            if per_issn.get(journal.issn.as_str()).copied().unwrap_or(0) > 1 {
                base = format!("{base}_{}", journal.period);
            }
            let mut label = base.clone();
            let mut n = 2;
            while !taken.insert(label.clone()) {
                label = format!("{base}~{n}");
                n += 1;
            }
            label
        })
        .collect()
}

fn comparative_row(journal: &JournalAnalysis, label: &str) -> Vec<Value> {
    let stats = &journal.analyzed_stats;
    let cites = &journal.citation_stats;
    vec![
        json!(label),
        json!(journal.period),
        json!(stats.n_items),
        json!(cites.total_citations),
        json!(cites.h_index),
        json!(round_to(cites.mean_citations, 2)),
        json!(stats.self_cites_pct),
        json!(stats.multi_country_pct),
        json!(stats.unique_affiliations),
        json!(stats.unique_countries),
        json!(stats.references.mean),
        json!(stats.authors_per_work.mean),
    ]
}

fn journal_sheets(journal: &JournalAnalysis, label: &str, max_rows: usize) -> AnalysisResult<Vec<Sheet>> {
    let name = |suffix: &str| format!("{label}_{suffix}");
    let mut sheets = Vec::new();

    let mut analyzed = Sheet::capped(name("Analyzed"), &ARTICLE_COLUMNS, max_rows);
    for record in journal.analyzed.iter().filter(|r| r.has_data()) {
        analyzed.push_row(article_row(record))?;
    }
    sheets.push(analyzed);

    let mut citing_columns = vec!["Cited_DOI"];
    citing_columns.extend(ARTICLE_COLUMNS);
    let mut citing = Sheet::capped(name("Citing"), &citing_columns, max_rows);
    for edge in &journal.citing {
        citing.push_row(citing_row(edge))?;
    }
    sheets.push(citing);

    sheets.push(statistics_sheet(journal, name("Statistics"))?);
    sheets.push(citing_stats_sheet(journal, name("Citing_Stats"))?);

    let mut overlaps = Sheet::capped(
        name("Overlaps"),
        &[
            "Analyzed_DOI",
            "Citing_DOI",
            "Common_Authors",
            "Common_Affiliations",
            "Common_Authors_Count",
            "Common_Affiliations_Count",
        ],
        max_rows,
    );
    for overlap in &journal.overlaps {
        overlaps.push_row(vec![
            json!(overlap.analyzed_doi),
            json!(overlap.citing_doi),
            json!(overlap.common_authors.join("; ")),
            json!(overlap.common_affiliations.join("; ")),
            json!(overlap.common_authors.len()),
            json!(overlap.common_affiliations.len()),
        ])?;
    }
    sheets.push(overlaps);

    let mut first = Sheet::capped(
        name("First_Citation"),
        &["Analyzed_DOI", "Citing_DOI", "Analyzed_Date", "First_Citation_Date", "Days", "Same_Prefix", "Same_Date"],
        max_rows,
    );
    for detail in &journal.first_citation.details {
        first.push_row(vec![
            json!(detail.analyzed_doi),
            json!(detail.citing_doi),
            json!(detail.analyzed_date.to_string()),
            json!(detail.first_citation_date.to_string()),
            json!(detail.days),
            json!(detail.same_prefix),
            json!(detail.same_date),
        ])?;
    }
    sheets.push(first);

    let mut yearly = Sheet::new(name("Yearly_Citations"), &["Year", "Citations"]);
    for point in &journal.accumulation.yearly_citations {
        yearly.push_row(vec![json!(point.year), json!(point.citations)])?;
    }
    sheets.push(yearly);

    let mut curves = Sheet::new(
        name("Accumulation"),
        &["Publication_Year", "Years_Since_Publication", "Cumulative_Citations"],
    );
    for (year, points) in &journal.accumulation.curves {
        for point in points {
            curves.push_row(vec![
                json!(year),
                json!(point.years_since_publication),
                json!(point.cumulative_citations),
            ])?;
        }
    }
    sheets.push(curves);

    let (analyzed_stats, citing_stats) = (&journal.analyzed_stats, &journal.citing_stats);
    let mut authors = Sheet::capped(name("Authors"), &["Side", "Author", "Works"], max_rows);
    for (side, stats) in [("Analyzed", analyzed_stats), ("Citing", citing_stats)] {
        for (author, count) in normalized_authors(stats) {
            authors.push_row(vec![json!(side), json!(author), json!(count)])?;
        }
    }
    sheets.push(authors);

    let tables: [(&str, &str, fn(&DescriptiveStats) -> &[(String, usize)]); 4] = [
        ("Affiliations", "Affiliation", |s| s.affiliations.as_slice()),
        ("Countries", "Country", |s| s.countries.as_slice()),
        ("Journals", "Journal", |s| s.journals.as_slice()),
        ("Publishers", "Publisher", |s| s.publishers.as_slice()),
    ];
    for (suffix, column, table) in tables {
        let mut sheet = Sheet::capped(name(suffix), &["Side", column, "Count"], max_rows);
        for (side, stats) in [("Analyzed", analyzed_stats), ("Citing", citing_stats)] {
            for (value, count) in table(stats) {
                sheet.push_row(vec![json!(side), json!(value), json!(count)])?;
            }
        }
        sheets.push(sheet);
    }

    sheets.push(fast_metrics_sheet(journal, name("Fast_Metrics"))?);

    let mut concepts = Sheet::new(name("Top_Concepts"), &["Concept", "Mentions"]);
    for (concept, mentions) in &journal.fast_metrics.dbi.top_concepts {
        concepts.push_row(vec![json!(concept), json!(mentions)])?;
    }
    sheets.push(concepts);

    let mut keywords = Sheet::new(
        name("Keywords"),
        &["Rank", "Type", "Keyword", "Norm_Analyzed", "Norm_Citing", "Total_Norm", "Ratio"],
    );
    for row in &journal.keywords.normalized {
        keywords.push_row(vec![
            json!(row.rank),
            json!(keyword_kind_label(row.kind)),
            json!(row.keyword),
            json!(row.norm_analyzed),
            json!(row.norm_citing),
            json!(row.total_norm),
            json!(row.ratio),
        ])?;
    }
    sheets.push(keywords);

    let season = &journal.seasonality;
    let mut months = Sheet::new(name("Seasonality"), &["Month", "Citations", "Publications"]);
    if season.total_citations > 0 || !season.publication_months.is_empty() {
        for month in 1..=12 {
            months.push_row(vec![
                json!(month),
                json!(season.citation_months.get(&month).copied().unwrap_or(0)),
                json!(season.publication_months.get(&month).copied().unwrap_or(0)),
            ])?;
        }
    }
    sheets.push(months);

    let mut optimal = Sheet::new(
        name("Optimal_Months"),
        &["Citation_Month", "Citation_Count", "Recommended_Publication_Month"],
    );
    for advice in &season.optimal_months {
        optimal.push_row(vec![
            json!(advice.citation_month),
            json!(advice.citation_count),
            json!(advice.recommended_publication_month),
        ])?;
    }
    sheets.push(optimal);

    let mut reviewers = Sheet::capped(name("Reviewers"), &["Author", "Citation_Count", "Citing_DOIs"], max_rows);
    for candidate in &journal.reviewers.candidates {
        reviewers.push_row(vec![
            json!(candidate.author),
            json!(candidate.citation_count),
            json!(clip(&candidate.citing_dois.join("; "), 500)),
        ])?;
    }
    sheets.push(reviewers);

    // Metric sheets always have rows; list sheets only when non-empty.
    Ok(sheets.into_iter().filter(|s| !s.is_empty()).collect())
}

fn keyword_kind_label(kind: KeywordKind) -> &'static str {
    match kind {
        KeywordKind::Content => "Content",
        KeywordKind::Compound => "Compound",
        KeywordKind::Scientific => "Scientific",
    }
}

/// Author table with names reduced to `Family I.` and counts merged.
fn normalized_authors(stats: &DescriptiveStats) -> Vec<(String, usize)> {
    let mut merged: HashMap<String, usize> = HashMap::new();
    for (author, count) in &stats.authors {
        *merged.entry(normalize_author_name(author)).or_default() += count;
    }
    most_common(&merged)
}

fn article_row(record: &WorkRecord) -> Vec<Value> {
    let registry = record.registry.as_ref();
    let graph = record.graph.as_ref();
    let venue = graph.and_then(GraphWork::venue);

    let authors = match registry.map(RegistryWork::author_full_names) {
        Some(names) if !names.is_empty() => names.join("; "),
        _ => graph
            .map(|g| g.author_names().into_iter().filter(|n| *n != "Unknown").collect::<Vec<_>>().join("; "))
            .unwrap_or_default(),
    };
    let affiliations = graph.map(|g| g.affiliations().into_iter().collect::<Vec<_>>().join("; ")).unwrap_or_default();
    let countries = graph.map(|g| g.countries().into_iter().collect::<Vec<_>>().join("; ")).unwrap_or_default();

    let journal = registry
        .and_then(RegistryWork::container_title_text)
        .or_else(|| venue.and_then(|v| v.name()))
        .unwrap_or("");
    let publisher = registry
        .and_then(RegistryWork::publisher_text)
        .or_else(|| venue.and_then(|v| v.publisher_name()))
        .unwrap_or("");
    let issn = match registry.filter(|r| !r.issn.is_empty()) {
        Some(r) => r.issn.join(", "),
        None => venue.map(|v| v.all_issns().join(", ")).unwrap_or_default(),
    };

    let reference_count = registry.map(|r| r.reference_count.map_or(r.reference.len(), |n| n as usize));
    let author_count = match registry {
        Some(r) if !r.author.is_empty() => r.author.len(),
        _ => graph.map_or(0, |g| g.authorships.len()),
    };
    let work_type = registry
        .and_then(|r| r.work_type.as_deref())
        .or_else(|| graph.and_then(|g| g.work_type.as_deref()))
        .unwrap_or("");

    vec![
        json!(clip(&record.doi, 100)),
        json!(clip(record.title().unwrap_or("No title"), 200)),
        json!(clip(&authors, 300)),
        json!(clip(&affiliations, 500)),
        json!(clip(&countries, 100)),
        json!(record.published_year().or_else(|| graph.and_then(|g| g.publication_year))),
        json!(clip(journal, 100)),
        json!(clip(publisher, 100)),
        json!(clip(&issn, 50)),
        json!(reference_count),
        json!(graph.map(GraphWork::citations)),
        json!(author_count),
        json!(clip(work_type, 50)),
    ]
}

fn citing_row(edge: &CitingEdge) -> Vec<Value> {
    let mut row = vec![json!(edge.cited_doi)];
    row.extend(article_row(&edge.to_record()));
    row
}

fn statistics_sheet(journal: &JournalAnalysis, name: String) -> AnalysisResult<Sheet> {
    let stats = &journal.analyzed_stats;
    Sheet::metrics(
        name,
        vec![
            ("ISSN", json!(journal.issn)),
            ("Journal", json!(journal.journal_name)),
            ("Period", json!(journal.period)),
            ("Works Listed", json!(journal.fetched)),
            ("Works Validated", json!(journal.validated)),
            ("Works Skipped", json!(journal.skipped)),
            ("Journal DOI Prefix", json!(journal.journal_prefix)),
            ("Total Articles", json!(stats.n_items)),
            ("Total References", json!(stats.total_refs)),
            ("References with DOI", json!(stats.refs_with_doi)),
            ("Self-Citations Percentage", json!(format!("{:.1}%", stats.self_cites_pct))),
            ("Average References", json!(stats.references.mean)),
            ("Median References", json!(stats.references.median)),
            ("Average Authors", json!(stats.authors_per_work.mean)),
            ("Single-Author Articles", json!(stats.single_author_works)),
            ("Large-Team Articles", json!(stats.large_team_works)),
            ("International Collaboration %", json!(format!("{:.1}%", stats.multi_country_pct))),
            ("Unique Affiliations", json!(stats.unique_affiliations)),
            ("Unique Countries", json!(stats.unique_countries)),
            ("Articles with 10+ Citations", json!(stats.citation_bands.cited_10)),
            ("Articles with 20+ Citations", json!(stats.citation_bands.cited_20)),
            ("Articles with 30+ Citations", json!(stats.citation_bands.cited_30)),
            ("Articles with 50+ Citations", json!(stats.citation_bands.cited_50)),
        ],
    )
}

fn citing_stats_sheet(journal: &JournalAnalysis, name: String) -> AnalysisResult<Sheet> {
    let cites = &journal.citation_stats;
    let first = &journal.first_citation;
    Sheet::metrics(
        name,
        vec![
            ("H-index", json!(cites.h_index)),
            ("Total Citations", json!(cites.total_citations)),
            ("Average Citations per Article", json!(round_to(cites.mean_citations, 2))),
            ("Articles with Citations", json!(cites.works_with_citations)),
            ("Articles without Citations", json!(cites.works_without_citations)),
            ("Citing Edges", json!(journal.citing.len())),
            ("Unique Citing Works", json!(journal.unique_citing)),
            ("Citing Works Described", json!(journal.citing_stats.n_items)),
            ("Median Days to First Citation", json!(first.median_days)),
            ("Mean Days to First Citation", json!(round_to(first.mean_days, 1))),
            ("Fastest First Citation (days)", json!(first.min_days)),
            ("Slowest First Citation (days)", json!(first.max_days)),
            ("Years with Citations", json!(journal.accumulation.years_covered)),
        ],
    )
}

fn fast_metrics_sheet(journal: &JournalAnalysis, name: String) -> AnalysisResult<Sheet> {
    let m = &journal.fast_metrics;
    Sheet::metrics(
        name,
        vec![
            ("Reference Age Median (years)", json!(m.reference_age.median)),
            ("Reference Age Mean (years)", json!(m.reference_age.mean)),
            ("Reference Age P25", json!(m.reference_age.p25)),
            ("Reference Age P75", json!(m.reference_age.p75)),
            ("References with Year", json!(m.reference_age.count)),
            ("Journal Self-Citation Rate %", json!(m.jscr.rate)),
            ("Journal Self-Citations", json!(m.jscr.self_cites)),
            ("Citing Edges Checked", json!(m.jscr.total_cites)),
            ("Cited Half-Life Median (years)", json!(m.half_life.median)),
            ("Cited Half-Life Mean (years)", json!(m.half_life.mean)),
            ("FWCI", json!(m.fwci.fwci)),
            ("FWCI Method", json!(m.fwci.method)),
            ("FWCI Expected Citations", json!(m.fwci.expected_cites)),
            ("FWCI Concepts Analyzed", json!(m.fwci.concepts_analyzed)),
            ("Citation Velocity", json!(m.velocity.velocity)),
            ("Works with Velocity", json!(m.velocity.count)),
            ("OA Citation Premium %", json!(m.oa_premium.premium)),
            ("OA Works", json!(m.oa_premium.oa_works)),
            ("Non-OA Works", json!(m.oa_premium.non_oa_works)),
            ("Elite Index %", json!(m.elite.elite_index)),
            ("Elite Threshold (citations)", json!(m.elite.threshold)),
            ("Elite Works", json!(m.elite.elite_works)),
            ("Author Gini", json!(m.author_gini.gini)),
            ("Distinct Authors", json!(m.author_gini.total_authors)),
            ("Diversity Balance Index", json!(m.dbi.dbi)),
            ("Unique Concepts", json!(m.dbi.unique_concepts)),
            ("Data Quality Score %", json!(m.data_quality_score)),
        ],
    )
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;
    use crate::metrics::{CitationStats, FastMetrics};
    use crate::models::{RegistryAuthor, Venue};

    fn run(journals: Vec<JournalAnalysis>, warnings: Vec<String>) -> AnalysisRun {
        AnalysisRun { run_id: Uuid::new_v4(), generated_at: Utc::now(), journals, warnings }
    }

    fn journal(name: &str, issn: &str, period: &str, analyzed: Vec<WorkRecord>) -> JournalAnalysis {
        JournalAnalysis {
            issn: issn.to_string(),
            journal_name: name.to_string(),
            period: period.to_string(),
            fetched: analyzed.len(),
            validated: analyzed.len(),
            skipped: 0,
            journal_prefix: "10.1000".to_string(),
            analyzed_stats: crate::metrics::descriptive::describe(&analyzed, true, "10.1000"),
            citation_stats: CitationStats { h_index: 1, total_citations: 3, ..Default::default() },
            analyzed,
            citing: Vec::new(),
            unique_citing: 0,
            citing_stats: DescriptiveStats::default(),
            overlaps: Vec::new(),
            first_citation: Default::default(),
            accumulation: Default::default(),
            fast_metrics: FastMetrics::default(),
            seasonality: Default::default(),
            reviewers: Default::default(),
            keywords: Default::default(),
        }
    }

    fn registry_record(doi: &str) -> WorkRecord {
        WorkRecord {
            doi: doi.to_string(),
            registry: Some(RegistryWork {
                title: vec!["A study".to_string()],
                author: vec![RegistryAuthor {
                    given: Some("Ada".to_string()),
                    family: Some("Lovelace".to_string()),
                    name: None,
                }],
                container_title: vec!["Journal of Tests".to_string()],
                issn: vec!["1234-5678".to_string()],
                ..Default::default()
            }),
            graph: None,
        }
    }

    #[test]
    fn test_empty_run_yields_summary() {
        let workbook = Workbook::from_run(&run(Vec::new(), Vec::new()), 100);
        assert_eq!(workbook.sheets.len(), 1);
        let summary = workbook.sheet("Summary").unwrap();
        assert_eq!(summary.rows[0][0], json!("Analysis completed"));
    }

    #[test]
    fn test_warnings_sheet() {
        let workbook = Workbook::from_run(&run(Vec::new(), vec!["'1800' out of range".to_string()]), 100);
        assert_eq!(workbook.sheets.len(), 2);
        assert_eq!(workbook.sheet("Warnings").unwrap().rows.len(), 1);
    }

    #[test]
    fn test_journal_sheets() {
        let analysis = journal("Journal of Tests", "1234-5678", "2020", vec![registry_record("10.1000/a")]);
        let workbook = Workbook::try_build(&run(vec![analysis], Vec::new()), 100).unwrap();

        let comparative = workbook.sheet("Comparative_Statistics").unwrap();
        assert_eq!(comparative.rows[0][0], json!("Journal_of_Test"));
        assert_eq!(comparative.rows[0][4], json!(1));

        let analyzed = workbook.sheet("Journal_of_Test_Analyzed").unwrap();
        assert_eq!(analyzed.columns.len(), 13);
        let row = &analyzed.rows[0];
        assert_eq!(row[1], json!("A study"));
        assert_eq!(row[2], json!("Ada Lovelace"));
        assert_eq!(row[6], json!("Journal of Tests"));
        assert_eq!(row[8], json!("1234-5678"));
        assert_eq!(row[10], Value::Null);

        assert!(workbook.sheet("Journal_of_Test_Statistics").is_some());
        assert!(workbook.sheet("Journal_of_Test_Citing_Stats").is_some());
        assert!(workbook.sheet("Journal_of_Test_Fast_Metrics").is_some());
        assert!(workbook.sheet("Journal_of_Test_Citing").is_none());
        assert!(workbook.sheet("Journal_of_Test_Overlaps").is_none());

        let authors = workbook.sheet("Journal_of_Test_Authors").unwrap();
        assert_eq!(authors.rows[0], vec![json!("Analyzed"), json!("Lovelace A."), json!(1)]);
    }

    #[test]
    fn test_windowed_labels_carry_period() {
        let journals = vec![
            journal("Journal of Tests", "1234-5678", "2020", vec![registry_record("10.1000/a")]),
            journal("Journal of Tests", "1234-5678", "2021", vec![registry_record("10.1000/b")]),
        ];
        let workbook = Workbook::try_build(&run(journals, Vec::new()), 100).unwrap();
        assert!(workbook.sheet("Journal_of_Test_2020_Analyzed").is_some());
        assert!(workbook.sheet("Journal_of_Test_2021_Analyzed").is_some());
    }

    #[test]
    fn test_colliding_labels_are_deduplicated() {
        let journals = vec![
            journal(JOURNAL_NOT_FOUND, "1234-5678", "2020", Vec::new()),
            journal("1234-5678", "9999-0000", "2020", Vec::new()),
        ];
        let workbook = Workbook::try_build(&run(journals, Vec::new()), 100).unwrap();
        assert!(workbook.sheet("1234-5678_Statistics").is_some());
        assert!(workbook.sheet("1234-5678~2_Statistics").is_some());
    }

    #[test]
    fn test_row_cap_counts_truncated_rows() {
        let records = (0..5).map(|i| registry_record(&format!("10.1000/{i}"))).collect();
        let analysis = journal("J", "1234-5678", "2020", records);
        let workbook = Workbook::try_build(&run(vec![analysis], Vec::new()), 3).unwrap();
        let analyzed = workbook.sheet("J_Analyzed").unwrap();
        assert_eq!(analyzed.rows.len(), 3);
        assert_eq!(analyzed.truncated_rows, 2);
    }

    #[test]
    fn test_push_row_rejects_wrong_width() {
        let mut sheet = Sheet::new("S", &["A", "B"]);
        let err = sheet.push_row(vec![json!(1)]).unwrap_err();
        assert!(matches!(err, AnalysisError::Report(_)));
    }

    #[test]
    fn test_error_report() {
        let workbook = Workbook::error_report("boom");
        let sheet = workbook.sheet("Information").unwrap();
        assert_eq!(sheet.columns, vec!["Error", "Recommendation"]);
        assert_eq!(sheet.rows[0][0], json!("boom"));
    }

    #[test]
    fn test_article_row_falls_back_to_graph() {
        let record = WorkRecord {
            doi: "10.2/x".to_string(),
            registry: None,
            graph: Some(GraphWork {
                title: Some("Graph title".to_string()),
                cited_by_count: 4,
                host_venue: Some(Venue {
                    display_name: Some("Graph Journal".to_string()),
                    issn: vec!["1111-2222".to_string()],
                    ..Default::default()
                }),
                ..Default::default()
            }),
        };
        let row = article_row(&record);
        assert_eq!(row[1], json!("Graph title"));
        assert_eq!(row[6], json!("Graph Journal"));
        assert_eq!(row[8], json!("1111-2222"));
        assert_eq!(row[9], Value::Null);
        assert_eq!(row[10], json!(4));
    }

    #[test]
    fn test_clip_counts_chars() {
        assert_eq!(clip("héllo", 2), "hé");
        assert_eq!(clip("ab", 10), "ab");
    }
}
