//! Markdown output formatting.

use serde_json::Value;

use crate::pipeline::{AnalysisRun, JournalAnalysis};
use crate::report::{Sheet, Workbook};

/// Render one cell; pipes are escaped so tables stay aligned.
fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.replace('|', "\\|").replace('\n', " "),
        other => other.to_string(),
    }
}

/// Format a sheet as a Markdown table, showing at most `max_rows` rows.
#[must_use]
pub fn format_sheet_markdown(sheet: &Sheet, max_rows: usize) -> String {
    let mut output = format!("### {}\n\n", sheet.name);

    if sheet.rows.is_empty() {
        output.push_str("No rows.\n");
        return output;
    }

    output.push_str(&format!("| {} |\n", sheet.columns.join(" | ")));
    output.push_str(&format!("|{}\n", " --- |".repeat(sheet.columns.len())));

    for row in sheet.rows.iter().take(max_rows) {
        let cells: Vec<String> = row.iter().map(cell_text).collect();
        output.push_str(&format!("| {} |\n", cells.join(" | ")));
    }

    let hidden = sheet.rows.len().saturating_sub(max_rows) + sheet.truncated_rows;
    if hidden > 0 {
        output.push_str(&format!("\n_{hidden} more rows not shown._\n"));
    }

    output
}

/// Format the headline numbers of one journal analysis.
#[must_use]
pub fn format_journal_markdown(journal: &JournalAnalysis) -> String {
    let mut output = format!("## {} ({}, {})\n\n", journal.journal_name, journal.issn, journal.period);

    let stats = &journal.citation_stats;
    output.push_str(&format!(
        "**Articles**: {} | **Citing works**: {} | **H-index**: {} | **Citations**: {}\n\n",
        journal.analyzed.len(),
        journal.unique_citing,
        stats.h_index,
        stats.total_citations
    ));

    if journal.skipped > 0 {
        output.push_str(&format!("**Skipped records**: {}\n\n", journal.skipped));
    }

    let fast = &journal.fast_metrics;
    let mut lines = vec![
        format!("- FWCI: {:.2} ({})", fast.fwci.fwci, fwci_method_label(journal)),
        format!("- Journal self-citation rate: {:.2}%", fast.jscr.rate),
        format!("- Citation velocity: {:.2}", fast.velocity.velocity),
        format!("- Author Gini: {:.3}", fast.author_gini.gini),
        format!("- Diversity balance index: {:.3}", fast.dbi.dbi),
        format!("- Data quality score: {:.1}%", fast.data_quality_score),
    ];
    if let Some(median) = fast.half_life.median {
        lines.push(format!("- Cited half-life: {median} years"));
    }
    if let Some(median) = fast.reference_age.median {
        lines.push(format!("- Median reference age: {median} years"));
    }
    if journal.first_citation.count > 0 {
        lines.push(format!("- Median days to first citation: {:.1}", journal.first_citation.median_days));
    }
    output.push_str(&lines.join("\n"));
    output.push_str("\n\n");

    if !journal.reviewers.candidates.is_empty() {
        let names: Vec<&str> =
            journal.reviewers.candidates.iter().take(5).map(|c| c.author.as_str()).collect();
        output.push_str(&format!("**Reviewer candidates**: {}\n\n", names.join(", ")));
    }

    output
}

fn fwci_method_label(journal: &JournalAnalysis) -> String {
    serde_json::to_value(journal.fast_metrics.fwci.method)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default()
}

/// Format a whole run: journal summaries, warnings, then every sheet.
#[must_use]
pub fn format_run_markdown(run: &AnalysisRun, workbook: &Workbook, max_rows: usize) -> String {
    let mut output = format!(
        "# Journal Metrics Report\n\n**Run**: {} | **Generated**: {}\n\n",
        run.run_id,
        run.generated_at.format("%Y-%m-%d %H:%M UTC")
    );

    if run.journals.is_empty() {
        output.push_str("No journals analyzed.\n\n");
    }

    for journal in &run.journals {
        output.push_str(&format_journal_markdown(journal));
        output.push_str("---\n\n");
    }

    if !run.warnings.is_empty() {
        output.push_str("## Warnings\n\n");
        for warning in &run.warnings {
            output.push_str(&format!("- {warning}\n"));
        }
        output.push('\n');
    }

    output.push_str(&format_workbook_markdown(workbook, max_rows));
    output
}

/// Format every sheet of a workbook.
#[must_use]
pub fn format_workbook_markdown(workbook: &Workbook, max_rows: usize) -> String {
    workbook.sheets.iter().map(|s| format_sheet_markdown(s, max_rows)).collect::<Vec<_>>().join("\n")
}
