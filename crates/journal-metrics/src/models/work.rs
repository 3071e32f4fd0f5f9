//! Unified work records, citing edges and input validation.

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};

use super::graph::GraphWork;
use super::identifiers::normalize_doi;
use super::registry::RegistryWork;

/// Merged registry and graph metadata for one DOI.
///
/// Either half may be missing; every consumer has to cope with that.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkRecord {
    /// Normalized DOI.
    pub doi: String,

    /// Works registry half.
    #[serde(default)]
    pub registry: Option<RegistryWork>,

    /// Scholarly graph half.
    #[serde(default)]
    pub graph: Option<GraphWork>,
}

impl WorkRecord {
    /// Record with neither half.
    #[must_use]
    pub fn empty(doi: impl Into<String>) -> Self {
        Self { doi: doi.into(), registry: None, graph: None }
    }

    /// Title from the registry, else from the graph.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.registry
            .as_ref()
            .and_then(RegistryWork::title_text)
            .or_else(|| self.graph.as_ref().and_then(GraphWork::title_text))
    }

    /// Registry publication year.
    #[must_use]
    pub fn published_year(&self) -> Option<i32> {
        self.registry.as_ref().and_then(RegistryWork::published_year)
    }

    /// Graph citation count (0 without a graph half).
    #[must_use]
    pub fn citations(&self) -> u64 {
        self.graph.as_ref().map_or(0, GraphWork::citations)
    }

    /// Whether any metadata was resolved.
    #[must_use]
    pub const fn has_data(&self) -> bool {
        self.registry.is_some() || self.graph.is_some()
    }
}

/// "Work `doi` cites analyzed work `cited_doi`", with the citing work's metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CitingEdge {
    /// Normalized DOI of the citing work.
    pub doi: String,

    /// Normalized DOI of the analyzed (cited) work.
    pub cited_doi: String,

    /// Citing publication date as reported by the graph.
    #[serde(default)]
    pub pub_date: Option<String>,

    /// Citing registry half.
    #[serde(default)]
    pub registry: Option<RegistryWork>,

    /// Citing graph half.
    #[serde(default)]
    pub graph: Option<GraphWork>,
}

impl CitingEdge {
    /// Citing year: graph `publication_year`, else the leading year of the date.
    #[must_use]
    pub fn citing_year(&self) -> Option<i32> {
        self.graph
            .as_ref()
            .and_then(|g| g.publication_year)
            .filter(|y| *y > 0)
            .or_else(|| self.pub_date.as_deref()?.get(..4)?.parse().ok())
    }

    /// Citing date parsed from an ISO date or RFC 3339 datetime.
    #[must_use]
    pub fn citation_date(&self) -> Option<NaiveDate> {
        parse_iso_date(self.pub_date.as_deref()?)
    }

    /// Title from the registry, else from the graph.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.registry
            .as_ref()
            .and_then(RegistryWork::title_text)
            .or_else(|| self.graph.as_ref().and_then(GraphWork::title_text))
    }

    /// View of the citing work as a [`WorkRecord`].
    #[must_use]
    pub fn to_record(&self) -> WorkRecord {
        WorkRecord { doi: self.doi.clone(), registry: self.registry.clone(), graph: self.graph.clone() }
    }
}

/// Parse `YYYY-MM-DD`, optionally followed by a time part.
#[must_use]
pub fn parse_iso_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(&raw.replace('Z', "+00:00")) {
        return Some(dt.date_naive());
    }
    raw.get(..10).and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
}

/// Registry items that passed validation.
#[derive(Debug, Clone, Default)]
pub struct ValidatedWorks {
    /// `(normalized DOI, record)` in input order.
    pub works: Vec<(String, RegistryWork)>,

    /// Items dropped by validation.
    pub skipped: usize,
}

impl ValidatedWorks {
    /// Normalized DOIs in input order.
    #[must_use]
    pub fn dois(&self) -> Vec<String> {
        self.works.iter().map(|(doi, _)| doi.clone()).collect()
    }
}

/// Keep registry items that have a valid DOI and a `created` year ≥ 1900.
pub fn validate_registry_items(items: Vec<RegistryWork>) -> ValidatedWorks {
    let mut validated = ValidatedWorks::default();

    for mut item in items {
        let Some(doi) = item.doi.as_deref().and_then(normalize_doi) else {
            validated.skipped += 1;
            continue;
        };
        if item.created_year().is_none_or(|y| y < 1900) {
            validated.skipped += 1;
            continue;
        }
        item.doi = Some(doi.clone());
        validated.works.push((doi, item));
    }

    if validated.skipped > 0 {
        tracing::warn!(skipped = validated.skipped, "Skipped invalid registry items");
    }

    validated
}
