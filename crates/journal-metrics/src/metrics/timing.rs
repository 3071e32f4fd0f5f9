//! Time to first citation and citation seasonality.

use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use super::{mean, median, most_common};
use crate::cache::MetadataSnapshot;
use crate::models::{WorkRecord, doi_prefix};

/// Citation months considered for publication advice.
const TOP_CITATION_MONTHS: usize = 3;

/// First citation of one analyzed work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FirstCitationDetail {
    /// Analyzed DOI.
    pub analyzed_doi: String,
    /// Earliest citing DOI.
    pub citing_doi: String,
    /// Publication date of the analyzed work.
    pub analyzed_date: NaiveDate,
    /// Date of the earliest citation.
    pub first_citation_date: NaiveDate,
    /// Days in between.
    pub days: i64,
    /// Both DOIs share a registrant prefix.
    pub same_prefix: bool,
    /// Both dates are equal.
    pub same_date: bool,
}

/// Distribution of days to first citation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FirstCitation {
    /// Fastest first citation.
    pub min_days: i64,
    /// Slowest first citation.
    pub max_days: i64,
    /// Mean days.
    pub mean_days: f64,
    /// Median days.
    pub median_days: f64,
    /// Works with timing data.
    pub count: usize,
    /// Per-work details.
    pub details: Vec<FirstCitationDetail>,
}

/// Days from publication to the earliest dated citation of each analyzed work.
///
/// A first citation from the same DOI prefix on the publication date itself is
/// treated as an editorial note and skipped, as are citations dated before
/// publication. The editorial-note test is a heuristic.
#[must_use]
pub fn first_citation(analyzed: &[WorkRecord], snapshot: &MetadataSnapshot) -> FirstCitation {
    let mut details = Vec::new();

    for work in analyzed {
        let Some(published) = work.registry.as_ref().and_then(|r| r.published_date()) else {
            continue;
        };
        let earliest = snapshot
            .citing_of(&work.doi)
            .iter()
            .filter_map(|e| Some((e.citation_date()?, e.doi.as_str())))
            .min_by_key(|(date, _)| *date);
        let Some((cited_on, citing_doi)) = earliest else { continue };

        let days = (cited_on - published).num_days();
        let same_prefix = doi_prefix(&work.doi) == doi_prefix(citing_doi);
        let same_date = cited_on == published;
        if (same_prefix && same_date) || days < 0 {
            continue;
        }

        details.push(FirstCitationDetail {
            analyzed_doi: work.doi.clone(),
            citing_doi: citing_doi.to_string(),
            analyzed_date: published,
            first_citation_date: cited_on,
            days,
            same_prefix,
            same_date,
        });
    }

    if details.is_empty() {
        return FirstCitation::default();
    }

    let days: Vec<f64> = details.iter().map(|d| d.days as f64).collect();
    FirstCitation {
        min_days: details.iter().map(|d| d.days).min().unwrap_or(0),
        max_days: details.iter().map(|d| d.days).max().unwrap_or(0),
        mean_days: mean(&days).unwrap_or(0.0),
        median_days: median(&days).unwrap_or(0.0),
        count: details.len(),
        details,
    }
}

/// Suggested publication month for a high-citation month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptimalMonth {
    /// Month (1–12) with many citations.
    pub citation_month: u32,
    /// Citations dated in that month.
    pub citation_count: usize,
    /// Month (1–12) to publish in.
    pub recommended_publication_month: u32,
}

/// Month histograms of citations and publications.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Seasonality {
    /// Month → citations.
    pub citation_months: BTreeMap<u32, usize>,
    /// Month → analyzed works published.
    pub publication_months: BTreeMap<u32, usize>,
    /// Advice for the busiest citation months.
    pub optimal_months: Vec<OptimalMonth>,
    /// Dated citations.
    pub total_citations: usize,
}

/// Month to publish in so the median first citation lands in `citation_month`.
fn recommended_month(citation_month: u32, median_days: f64) -> u32 {
    let months_back = (median_days / 30.0).floor() as i64;
    match (i64::from(citation_month) - months_back).rem_euclid(12) {
        0 => 12,
        m => m as u32,
    }
}

/// Seasonality of citations, with publication advice when the median time to
/// first citation is positive.
#[must_use]
pub fn seasonality(analyzed: &[WorkRecord], snapshot: &MetadataSnapshot, median_days: f64) -> Seasonality {
    let mut by_month: HashMap<u32, usize> = HashMap::new();
    let mut publication_months = BTreeMap::new();

    for work in analyzed {
        for date in snapshot.citing_of(&work.doi).iter().filter_map(|e| e.citation_date()) {
            *by_month.entry(date.month()).or_default() += 1;
        }
        if let Some(month) = work.registry.as_ref().and_then(|r| r.published_month()) {
            *publication_months.entry(month).or_default() += 1;
        }
    }

    let optimal_months = if median_days > 0.0 {
        most_common(&by_month)
            .into_iter()
            .take(TOP_CITATION_MONTHS)
            .map(|(month, count)| OptimalMonth {
                citation_month: month,
                citation_count: count,
                recommended_publication_month: recommended_month(month, median_days),
            })
            .collect()
    } else {
        Vec::new()
    };

    Seasonality {
        total_citations: by_month.values().sum(),
        citation_months: by_month.into_iter().collect(),
        publication_months,
        optimal_months,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::tests_support::{analyzed_work, edge, snapshot_with};
    use crate::models::DateParts;

    fn published_on(doi: &str, parts: &[i32]) -> WorkRecord {
        let mut work = analyzed_work(doi, Some(parts[0]));
        work.registry.as_mut().unwrap().published = Some(DateParts::from_parts(parts));
        work
    }

    #[test]
    fn test_first_citation_stats() {
        let works = vec![published_on("10.1/a", &[2020, 1, 1]), published_on("10.1/b", &[2020, 3])];
        let snapshot = snapshot_with(&[
            ("10.1/a", vec![edge("10.2/late", "10.1/a", "2020-03-01"), edge("10.2/early", "10.1/a", "2020-01-11")]),
            ("10.1/b", vec![edge("10.3/x", "10.1/b", "2020-04-30T12:00:00Z")]),
        ]);

        let timing = first_citation(&works, &snapshot);
        assert_eq!(timing.count, 2);
        assert_eq!(timing.min_days, 10);
        assert_eq!(timing.max_days, 60);
        assert_eq!(timing.mean_days, 35.0);
        assert_eq!(timing.median_days, 35.0);
        assert_eq!(timing.details[0].citing_doi, "10.2/early");
        assert!(!timing.details[0].same_prefix);
    }

    #[test]
    fn test_first_citation_excludes_editorial_notes_and_negative() {
        let works = vec![published_on("10.1/a", &[2020, 5, 1]), published_on("10.1/b", &[2020, 5, 1])];
        let snapshot = snapshot_with(&[
            ("10.1/a", vec![edge("10.1/note", "10.1/a", "2020-05-01")]),
            ("10.1/b", vec![edge("10.2/x", "10.1/b", "2019-12-31")]),
        ]);

        let timing = first_citation(&works, &snapshot);
        assert_eq!(timing, FirstCitation::default());
    }

    #[test]
    fn test_first_citation_skips_invalid_dates() {
        let works = vec![published_on("10.1/a", &[2021, 2, 30])];
        let snapshot = snapshot_with(&[("10.1/a", vec![edge("10.2/x", "10.1/a", "2021-06-01")])]);
        assert_eq!(first_citation(&works, &snapshot).count, 0);
    }

    #[test]
    fn test_recommended_month_wraps() {
        assert_eq!(recommended_month(3, 90.0), 12);
        assert_eq!(recommended_month(2, 90.0), 11);
        assert_eq!(recommended_month(6, 45.0), 5);
        assert_eq!(recommended_month(12, 10.0), 12);
    }

    #[test]
    fn test_seasonality() {
        let works = vec![published_on("10.1/a", &[2020, 1, 1]), published_on("10.1/b", &[2020])];
        let snapshot = snapshot_with(&[(
            "10.1/a",
            vec![
                edge("10.2/1", "10.1/a", "2020-06-01"),
                edge("10.2/2", "10.1/a", "2021-06-15"),
                edge("10.2/3", "10.1/a", "2021-09-15"),
                edge("10.2/4", "10.1/a", "not a date"),
            ],
        )]);

        let season = seasonality(&works, &snapshot, 60.0);
        assert_eq!(season.total_citations, 3);
        assert_eq!(season.citation_months.get(&6), Some(&2));
        assert_eq!(season.publication_months.get(&1), Some(&1));
        assert_eq!(season.publication_months.len(), 1);
        assert_eq!(season.optimal_months.len(), 2);
        assert_eq!(season.optimal_months[0].citation_month, 6);
        assert_eq!(season.optimal_months[0].recommended_publication_month, 4);

        assert!(seasonality(&works, &snapshot, 0.0).optimal_months.is_empty());
    }
}
