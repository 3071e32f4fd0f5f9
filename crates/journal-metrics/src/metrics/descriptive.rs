//! Descriptive statistics of a metadata list (analyzed works or citing works).

use std::collections::HashMap;

use serde::Serialize;

use super::{most_common, round_to};
use crate::models::{RegistryAuthor, WorkRecord, doi_prefix};

/// Citation thresholds counted for analyzed works.
const CITATION_THRESHOLDS: [u64; 4] = [10, 20, 30, 50];

/// Authors above which a work counts as large-team.
const LARGE_TEAM: usize = 10;

/// Min, max, mean and median of a per-work count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CountSummary {
    /// Smallest value.
    pub min: usize,
    /// Largest value.
    pub max: usize,
    /// Mean, 2 decimals.
    pub mean: f64,
    /// Upper median (middle element of the sorted values).
    pub median: usize,
}

impl CountSummary {
    fn of(values: &[usize]) -> Self {
        if values.is_empty() {
            return Self::default();
        }
        let mut sorted = values.to_vec();
        sorted.sort_unstable();
        Self {
            min: sorted[0],
            max: sorted[sorted.len() - 1],
            mean: round_to(sorted.iter().sum::<usize>() as f64 / sorted.len() as f64, 2),
            median: sorted[sorted.len() / 2],
        }
    }
}

/// Works at or above each citation threshold.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CitationBands {
    /// At least 10 citations.
    pub cited_10: usize,
    /// At least 20 citations.
    pub cited_20: usize,
    /// At least 30 citations.
    pub cited_30: usize,
    /// At least 50 citations.
    pub cited_50: usize,
}

/// Descriptive statistics of one metadata list.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DescriptiveStats {
    /// Records in the list.
    pub n_items: usize,
    /// Deposited references.
    pub total_refs: usize,
    /// References with a DOI.
    pub refs_with_doi: usize,
    /// Share of references with a DOI, 2 decimals.
    pub refs_with_doi_pct: f64,
    /// References without a DOI.
    pub refs_without_doi: usize,
    /// Share of references without a DOI, 2 decimals.
    pub refs_without_doi_pct: f64,
    /// References whose DOI prefix equals the journal prefix.
    pub self_cites: usize,
    /// Share of self-citing references, 2 decimals.
    pub self_cites_pct: f64,
    /// References per work.
    pub references: CountSummary,
    /// Authors per work.
    pub authors_per_work: CountSummary,
    /// Works with exactly one author.
    pub single_author_works: usize,
    /// Works with more than ten authors.
    pub large_team_works: usize,
    /// Author frequency, most frequent first.
    pub authors: Vec<(String, usize)>,
    /// Affiliation frequency, most frequent first.
    pub affiliations: Vec<(String, usize)>,
    /// Country frequency, most frequent first.
    pub countries: Vec<(String, usize)>,
    /// Works with one country.
    pub single_country_works: usize,
    /// Share of single-country works, 2 decimals.
    pub single_country_pct: f64,
    /// Works with several countries.
    pub multi_country_works: usize,
    /// Share of multi-country works, 2 decimals.
    pub multi_country_pct: f64,
    /// Works without country data.
    pub no_country_works: usize,
    /// Share of works without country data, 2 decimals.
    pub no_country_pct: f64,
    /// Affiliation mentions (distinct per work).
    pub total_affiliations: usize,
    /// Distinct affiliations.
    pub unique_affiliations: usize,
    /// Distinct countries.
    pub unique_countries: usize,
    /// Journal frequency, most frequent first.
    pub journals: Vec<(String, usize)>,
    /// Publisher frequency, most frequent first.
    pub publishers: Vec<(String, usize)>,
    /// Citation bands; only filled for analyzed lists.
    pub citation_bands: CitationBands,
}

fn pct(part: usize, whole: usize) -> f64 {
    if whole == 0 { 0.0 } else { round_to(part as f64 / whole as f64 * 100.0, 2) }
}

/// Descriptive statistics of `records`.
///
/// `journal_prefix` marks self-citing references; pass an empty prefix for
/// citing lists. Citation bands are only counted when `is_analyzed` is set.
#[must_use]
pub fn describe(records: &[WorkRecord], is_analyzed: bool, journal_prefix: &str) -> DescriptiveStats {
    let mut stats = DescriptiveStats { n_items: records.len(), ..DescriptiveStats::default() };

    let mut ref_counts = Vec::new();
    let mut author_counts = Vec::new();
    let mut author_freq: HashMap<String, usize> = HashMap::new();
    let mut affiliation_freq: HashMap<String, usize> = HashMap::new();
    let mut country_freq: HashMap<String, usize> = HashMap::new();
    let mut journal_freq: HashMap<String, usize> = HashMap::new();
    let mut publisher_freq: HashMap<String, usize> = HashMap::new();

    for record in records {
        if let Some(registry) = &record.registry {
            stats.total_refs += registry.reference.len();
            for reference in &registry.reference {
                match reference.doi_text() {
                    Some(doi) => {
                        stats.refs_with_doi += 1;
                        if !journal_prefix.is_empty() && doi_prefix(doi) == journal_prefix {
                            stats.self_cites += 1;
                        }
                    }
                    None => stats.refs_without_doi += 1,
                }
            }
            ref_counts.push(registry.reference.len());

            let n_authors = registry.author.len();
            author_counts.push(n_authors);
            if n_authors == 1 {
                stats.single_author_works += 1;
            }
            if n_authors > LARGE_TEAM {
                stats.large_team_works += 1;
            }
            for name in registry.author.iter().map(RegistryAuthor::short_name) {
                *author_freq.entry(name).or_default() += 1;
            }

            if let Some(journal) = registry.container_title_text() {
                *journal_freq.entry(journal.to_string()).or_default() += 1;
            }
            if let Some(publisher) = registry.publisher_text() {
                *publisher_freq.entry(publisher.to_string()).or_default() += 1;
            }
        }

        if let Some(graph) = &record.graph {
            let affiliations = graph.affiliations();
            let countries = graph.countries();
            stats.total_affiliations += affiliations.len();
            for affiliation in affiliations {
                *affiliation_freq.entry(affiliation.to_string()).or_default() += 1;
            }
            match countries.len() {
                0 => stats.no_country_works += 1,
                1 => stats.single_country_works += 1,
                _ => stats.multi_country_works += 1,
            }
            for country in countries {
                *country_freq.entry(country).or_default() += 1;
            }

            if let Some(venue) = graph.venue() {
                if let Some(name) = venue.name() {
                    journal_freq.entry(name.to_string()).or_insert(1);
                }
                if let Some(publisher) = venue.publisher_name() {
                    publisher_freq.entry(publisher.to_string()).or_insert(1);
                }
            }

            if is_analyzed {
                let cites = graph.citations();
                let bands = &mut stats.citation_bands;
                let [t10, t20, t30, t50] = CITATION_THRESHOLDS;
                bands.cited_10 += usize::from(cites >= t10);
                bands.cited_20 += usize::from(cites >= t20);
                bands.cited_30 += usize::from(cites >= t30);
                bands.cited_50 += usize::from(cites >= t50);
            }
        }
    }

    stats.refs_with_doi_pct = pct(stats.refs_with_doi, stats.total_refs);
    stats.refs_without_doi_pct = pct(stats.refs_without_doi, stats.total_refs);
    stats.self_cites_pct = pct(stats.self_cites, stats.total_refs);
    stats.references = CountSummary::of(&ref_counts);
    stats.authors_per_work = CountSummary::of(&author_counts);

    stats.single_country_pct = pct(stats.single_country_works, stats.n_items);
    stats.multi_country_pct = pct(stats.multi_country_works, stats.n_items);
    stats.no_country_pct = pct(stats.no_country_works, stats.n_items);
    stats.unique_affiliations = affiliation_freq.len();
    stats.unique_countries = country_freq.len();

    stats.authors = most_common(&author_freq);
    stats.affiliations = most_common(&affiliation_freq);
    stats.countries = most_common(&country_freq);
    stats.journals = most_common(&journal_freq);
    stats.publishers = most_common(&publisher_freq);

    stats
}
