//! JSON output formatting.

use serde_json::{Map, Value, json};

use crate::pipeline::{AnalysisRun, JournalAnalysis};
use crate::report::{Sheet, Workbook};

/// Rows of a sheet as objects keyed by column name.
#[must_use]
pub fn sheet_records(sheet: &Sheet) -> Vec<Value> {
    sheet
        .rows
        .iter()
        .map(|row| {
            let record: Map<String, Value> =
                sheet.columns.iter().cloned().zip(row.iter().cloned()).collect();
            Value::Object(record)
        })
        .collect()
}

/// One sheet with its column order and records.
#[must_use]
pub fn format_sheet_json(sheet: &Sheet) -> Value {
    let mut obj = json!({
        "name": sheet.name,
        "columns": sheet.columns,
        "rows": sheet_records(sheet),
    });

    if sheet.truncated_rows > 0 {
        obj["truncatedRows"] = json!(sheet.truncated_rows);
    }

    obj
}

/// Every sheet of a workbook.
#[must_use]
pub fn format_workbook_json(workbook: &Workbook) -> Value {
    json!({
        "sheets": workbook.sheets.iter().map(format_sheet_json).collect::<Vec<_>>(),
    })
}

/// Headline numbers of one journal analysis.
#[must_use]
pub fn compact_journal(journal: &JournalAnalysis) -> Value {
    let fast = &journal.fast_metrics;
    let mut obj = json!({
        "issn": journal.issn,
        "journal": journal.journal_name,
        "period": journal.period,
        "articles": journal.analyzed.len(),
        "citingWorks": journal.unique_citing,
        "hIndex": journal.citation_stats.h_index,
        "totalCitations": journal.citation_stats.total_citations,
        "fwci": fast.fwci.fwci,
        "jscr": fast.jscr.rate,
        "dataQuality": fast.data_quality_score,
    });

    if journal.skipped > 0 {
        obj["skipped"] = json!(journal.skipped);
    }

    if let Some(median) = fast.half_life.median {
        obj["citedHalfLife"] = json!(median);
    }

    if journal.first_citation.count > 0 {
        obj["medianDaysToFirstCitation"] = json!(journal.first_citation.median_days);
    }

    obj
}

/// Complete report document: run metadata, journal summaries and sheets.
#[must_use]
pub fn format_run_json(run: &AnalysisRun, workbook: &Workbook) -> Value {
    let mut obj = json!({
        "runId": run.run_id.to_string(),
        "generatedAt": run.generated_at.to_rfc3339(),
        "journals": run.journals.iter().map(compact_journal).collect::<Vec<_>>(),
        "sheets": workbook.sheets.iter().map(format_sheet_json).collect::<Vec<_>>(),
    });

    if !run.warnings.is_empty() {
        obj["warnings"] = json!(run.warnings);
    }

    obj
}
