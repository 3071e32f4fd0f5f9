//! Citation impact of analyzed works: FWCI, open access premium, elite share.
//!
//! All three read `cited_by_count` from the graph half and ignore works
//! without one.

use std::collections::BTreeMap;

use serde::Serialize;

use super::{mean, round_to, std_dev};
use crate::models::{GraphWork, WorkRecord};

/// Concepts per work that feed the expected-citation baseline.
const TOP_CONCEPTS: usize = 3;

/// How the FWCI baseline was derived.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FwciMethod {
    /// Concept averages weighted by concept score.
    ConceptBased,
    /// Fixed expectation per work type.
    TypeBased,
    /// One expected citation per work.
    Fallback,
    /// Works exist but none is cited or none has graph data.
    NoCitations,
    /// No analyzed works.
    #[default]
    NoData,
}

/// Field-weighted citation impact.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Fwci {
    /// Actual over expected citations, 2 decimals.
    pub fwci: f64,
    /// Actual citations.
    pub total_cites: u64,
    /// Expected citations, 2 decimals.
    pub expected_cites: f64,
    /// Works carrying concepts.
    pub works_with_concepts: usize,
    /// Distinct concepts in the baseline.
    pub concepts_analyzed: usize,
    /// Baseline method.
    pub method: FwciMethod,
}

#[derive(Default)]
struct ConceptTally {
    cites: u64,
    works: usize,
    score: f64,
}

fn type_expectation(work: &GraphWork) -> f64 {
    match work.work_type.as_deref() {
        Some("review") => 2.0,
        Some("conference") => 0.7,
        Some("book") => 0.5,
        Some("other") => 0.8,
        _ => 1.0,
    }
}

/// Actual citations against a baseline built from the works' own concepts,
/// or from their types when no concepts were tagged.
#[must_use]
pub fn fwci(analyzed: &[WorkRecord]) -> Fwci {
    if analyzed.is_empty() {
        return Fwci::default();
    }

    // Works without a graph half count as uncited.
    let graphs: Vec<&GraphWork> = analyzed.iter().filter_map(|w| w.graph.as_ref()).collect();
    let total_cites: u64 = graphs.iter().map(|g| g.citations()).sum();
    if total_cites == 0 {
        return Fwci { method: FwciMethod::NoCitations, ..Fwci::default() };
    }

    let mut concepts: BTreeMap<&str, ConceptTally> = BTreeMap::new();
    let mut works_with_concepts = 0;
    for graph in &graphs {
        if graph.concepts.is_empty() {
            continue;
        }
        works_with_concepts += 1;
        for concept in graph.concepts_by_score().into_iter().take(TOP_CONCEPTS) {
            let tally = concepts.entry(concept.name().unwrap_or("Unknown")).or_default();
            tally.cites += graph.citations();
            tally.works += 1;
            tally.score += concept.score_value();
        }
    }

    let (mut expected, mut method) = if concepts.is_empty() {
        (graphs.iter().map(|g| type_expectation(g)).sum(), FwciMethod::TypeBased)
    } else {
        let sum = concepts
            .values()
            .map(|t| {
                let works = t.works as f64;
                (t.cites as f64 / works) * (t.score / works)
            })
            .sum();
        (sum, FwciMethod::ConceptBased)
    };

    if expected == 0.0 {
        expected = graphs.len() as f64;
        method = FwciMethod::Fallback;
    }

    Fwci {
        fwci: round_to(total_cites as f64 / expected, 2),
        total_cites,
        expected_cites: round_to(expected, 2),
        works_with_concepts,
        concepts_analyzed: concepts.len(),
        method,
    }
}

/// Citation advantage of open access works.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OaPremium {
    /// Percentage difference of the OA mean over the non-OA mean, 1 decimal.
    pub premium: f64,
    /// Open access works.
    pub oa_works: usize,
    /// Other works.
    pub non_oa_works: usize,
    /// Mean citations of OA works, 1 decimal.
    pub oa_mean: f64,
    /// Mean citations of other works, 1 decimal.
    pub non_oa_mean: f64,
}

/// Compare mean citations of open access and closed works.
#[must_use]
pub fn oa_premium(analyzed: &[WorkRecord]) -> OaPremium {
    let (oa, closed): (Vec<&GraphWork>, Vec<&GraphWork>) =
        analyzed.iter().filter_map(|w| w.graph.as_ref()).partition(|g| g.is_oa());

    let cites = |works: &[&GraphWork]| works.iter().map(|g| g.citations() as f64).collect::<Vec<_>>();
    let oa_mean = mean(&cites(&oa)).unwrap_or(0.0);
    let non_oa_mean = mean(&cites(&closed)).unwrap_or(0.0);
    let premium = if non_oa_mean > 0.0 { (oa_mean - non_oa_mean) / non_oa_mean * 100.0 } else { 0.0 };

    OaPremium {
        premium: round_to(premium, 1),
        oa_works: oa.len(),
        non_oa_works: closed.len(),
        oa_mean: round_to(oa_mean, 1),
        non_oa_mean: round_to(non_oa_mean, 1),
    }
}

/// Share of works cited at least one standard deviation above the mean.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EliteIndex {
    /// Percentage of elite works, 2 decimals.
    pub elite_index: f64,
    /// Works at or above the threshold.
    pub elite_works: usize,
    /// Works with graph data.
    pub total_works: usize,
    /// Citation threshold, truncated.
    pub threshold: i64,
}

/// Elite share relative to the analyzed set itself, not to a global baseline.
#[must_use]
pub fn elite_index(analyzed: &[WorkRecord]) -> EliteIndex {
    let citations: Vec<f64> =
        analyzed.iter().filter_map(|w| w.graph.as_ref()).map(|g| g.citations() as f64).collect();

    let max = citations.iter().copied().fold(0.0, f64::max);
    if citations.is_empty() || max == 0.0 {
        return EliteIndex { total_works: citations.len(), ..EliteIndex::default() };
    }

    let threshold = if citations.len() > 1 {
        mean(&citations).unwrap_or(0.0) + std_dev(&citations).unwrap_or(0.0)
    } else {
        max
    };
    let elite_works = citations.iter().filter(|&&c| c >= threshold).count();

    EliteIndex {
        elite_index: round_to(elite_works as f64 / citations.len() as f64 * 100.0, 2),
        elite_works,
        total_works: citations.len(),
        threshold: threshold.trunc() as i64,
    }
}
