//! Metric aggregation over fetched metadata.
//!
//! Every aggregator is a pure function of the analyzed records, the citing
//! edges and a [`MetadataSnapshot`]. None of them do I/O, and all of them
//! treat a missing registry or graph half as "no contribution" rather than
//! an error. The current year is passed in explicitly.

pub mod authors;
pub mod citations;
pub mod concepts;
pub mod descriptive;
pub mod impact;
pub mod jscr;
pub mod keywords;
pub mod references;
pub mod timing;

use std::collections::HashMap;
use std::hash::Hash;

use serde::Serialize;

use crate::cache::MetadataSnapshot;
use crate::models::{CitingEdge, WorkRecord};

pub use authors::{AuthorGini, Overlap, ReviewerCandidate, Reviewers};
pub use citations::{Accumulation, CitationStats, HalfLife, Velocity};
pub use concepts::Dbi;
pub use descriptive::DescriptiveStats;
pub use impact::{EliteIndex, Fwci, FwciMethod, OaPremium};
pub use jscr::Jscr;
pub use keywords::{KeywordReport, NormalizedKeyword};
pub use references::ReferenceAge;
pub use timing::{FirstCitation, Seasonality};

/// The "fast" metric bundle computed without further API requests.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FastMetrics {
    /// Reference age.
    pub reference_age: ReferenceAge,
    /// Journal self-citation rate.
    pub jscr: Jscr,
    /// Cited half-life.
    pub half_life: HalfLife,
    /// Field-weighted citation impact.
    pub fwci: Fwci,
    /// Early citation velocity.
    pub velocity: Velocity,
    /// Open access citation premium.
    pub oa_premium: OaPremium,
    /// Share of highly cited works.
    pub elite: EliteIndex,
    /// Inequality of publications per author.
    pub author_gini: AuthorGini,
    /// Thematic diversity.
    pub dbi: Dbi,
    /// Percentage of quality indicators with data, 1 decimal.
    pub data_quality_score: f64,
}

impl FastMetrics {
    /// Compute every fast metric for one analyzed set.
    #[must_use]
    pub fn compute(
        analyzed: &[WorkRecord],
        citing: &[CitingEdge],
        snapshot: &MetadataSnapshot,
        journal_issn: &str,
        current_year: i32,
    ) -> Self {
        let mut metrics = Self {
            reference_age: references::reference_age(analyzed, snapshot, current_year),
            jscr: jscr::jscr(citing, journal_issn),
            half_life: citations::cited_half_life(analyzed, snapshot),
            fwci: impact::fwci(analyzed),
            velocity: citations::velocity(analyzed, snapshot, current_year),
            oa_premium: impact::oa_premium(analyzed),
            elite: impact::elite_index(analyzed),
            author_gini: authors::author_gini(analyzed),
            dbi: concepts::dbi(analyzed),
            data_quality_score: 0.0,
        };
        metrics.data_quality_score = metrics.quality_score();
        metrics
    }

    /// Share of the seven data indicators that are nonzero.
    fn quality_score(&self) -> f64 {
        let indicators = [
            self.reference_age.count > 0,
            self.jscr.total_cites > 0,
            self.half_life.count > 0,
            self.velocity.count > 0,
            self.oa_premium.oa_works > 0 || self.oa_premium.non_oa_works > 0,
            self.author_gini.total_authors > 0,
            self.dbi.unique_concepts > 0,
        ];
        let present = indicators.iter().filter(|&&ok| ok).count();
        round_to(present as f64 / indicators.len() as f64 * 100.0, 1)
    }
}

/// Round half away from zero to `decimals` places.
#[must_use]
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10_f64.powi(decimals);
    (value * factor).round() / factor
}

/// Arithmetic mean; `None` for an empty slice.
#[must_use]
pub fn mean(values: &[f64]) -> Option<f64> {
    (!values.is_empty()).then(|| values.iter().sum::<f64>() / values.len() as f64)
}

/// Median (average of the middle pair for even lengths).
#[must_use]
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    Some(if sorted.len() % 2 == 0 { (sorted[mid - 1] + sorted[mid]) / 2.0 } else { sorted[mid] })
}

/// Percentile with linear interpolation between closest ranks.
#[must_use]
pub fn percentile(values: &[f64], pct: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let rank = pct.clamp(0.0, 100.0) / 100.0 * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * (rank - lo as f64))
}

/// Population standard deviation.
#[must_use]
pub fn std_dev(values: &[f64]) -> Option<f64> {
    let m = mean(values)?;
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    Some(var.sqrt())
}

/// Frequency table sorted by descending count, ties by key.
#[must_use]
pub fn most_common<K: Ord + Hash + Clone>(counts: &HashMap<K, usize>) -> Vec<(K, usize)> {
    let mut entries: Vec<(K, usize)> = counts.iter().map(|(k, v)| (k.clone(), *v)).collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    entries
}
