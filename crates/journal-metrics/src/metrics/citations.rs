//! Citation counts, H-index, accumulation, half-life and velocity.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use super::{mean, median, round_to};
use crate::cache::MetadataSnapshot;
use crate::models::WorkRecord;

/// Longest span, in years, searched for the citation half-life.
const HALF_LIFE_HORIZON: i32 = 50;

/// Years after publication that count as "early" citations.
const VELOCITY_WINDOW: i32 = 2;

/// Largest `h` such that `h` works have at least `h` citations each.
#[must_use]
pub fn h_index(counts: &[usize]) -> usize {
    let mut sorted = counts.to_vec();
    sorted.sort_unstable_by(|a, b| b.cmp(a));
    sorted.iter().enumerate().take_while(|(i, c)| **c > *i).count()
}

/// Citation counts per analyzed work, from discovered citing edges.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CitationStats {
    /// H-index over citing-edge counts.
    pub h_index: usize,
    /// Sum of citing edges.
    pub total_citations: usize,
    /// Mean citing edges per work.
    pub mean_citations: f64,
    /// Most citing edges of any work.
    pub max_citations: usize,
    /// Fewest citing edges of any work.
    pub min_citations: usize,
    /// Works with at least one citing edge.
    pub works_with_citations: usize,
    /// Works without citing edges.
    pub works_without_citations: usize,
}

impl CitationStats {
    /// Count citing edges for every analyzed work.
    #[must_use]
    pub fn compute(analyzed: &[WorkRecord], snapshot: &MetadataSnapshot) -> Self {
        let counts: Vec<usize> = analyzed.iter().map(|w| snapshot.citing_of(&w.doi).len()).collect();
        let total: usize = counts.iter().sum();
        let as_f64: Vec<f64> = counts.iter().map(|&c| c as f64).collect();

        Self {
            h_index: h_index(&counts),
            total_citations: total,
            mean_citations: round_to(mean(&as_f64).unwrap_or(0.0), 2),
            max_citations: counts.iter().copied().max().unwrap_or(0),
            min_citations: counts.iter().copied().min().unwrap_or(0),
            works_with_citations: counts.iter().filter(|&&c| c > 0).count(),
            works_without_citations: counts.iter().filter(|&&c| c == 0).count(),
        }
    }
}

/// One point of a cumulative citation curve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccumulationPoint {
    /// Years since publication.
    pub years_since_publication: i32,
    /// Citations received up to and including that year.
    pub cumulative_citations: usize,
}

/// Citations received per calendar year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct YearCount {
    /// Calendar year.
    pub year: i32,
    /// Citing edges dated that year.
    pub citations: usize,
}

/// How quickly works of each publication year gather citations.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Accumulation {
    /// Publication year → cumulative curve.
    pub curves: BTreeMap<i32, Vec<AccumulationPoint>>,
    /// Citations per calendar year.
    pub yearly_citations: Vec<YearCount>,
    /// Number of distinct citing years.
    pub years_covered: usize,
}

/// Build cumulative citation curves grouped by publication year.
///
/// Only citing edges with a graph half count, and only when they are dated
/// no earlier than the cited work.
#[must_use]
pub fn accumulation(analyzed: &[WorkRecord], snapshot: &MetadataSnapshot) -> Accumulation {
    let mut per_offset: BTreeMap<i32, BTreeMap<i32, usize>> = BTreeMap::new();
    let mut yearly: BTreeMap<i32, usize> = BTreeMap::new();

    for work in analyzed {
        let Some(pub_year) = work.published_year() else { continue };

        for edge in snapshot.citing_of(&work.doi) {
            let Some(cite_year) = edge.graph.as_ref().and_then(|g| g.publication_year) else {
                continue;
            };
            if cite_year < pub_year {
                continue;
            }
            *yearly.entry(cite_year).or_default() += 1;
            *per_offset.entry(pub_year).or_default().entry(cite_year - pub_year).or_default() += 1;
        }
    }

    let curves = per_offset
        .into_iter()
        .map(|(pub_year, offsets)| {
            let mut running = 0;
            let curve = offsets
                .into_iter()
                .map(|(offset, count)| {
                    running += count;
                    AccumulationPoint { years_since_publication: offset, cumulative_citations: running }
                })
                .collect();
            (pub_year, curve)
        })
        .collect();

    Accumulation {
        curves,
        years_covered: yearly.len(),
        yearly_citations: yearly.into_iter().map(|(year, citations)| YearCount { year, citations }).collect(),
    }
}

/// Cited half-life across analyzed works.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HalfLife {
    /// Median half-life in whole years.
    pub median: Option<i64>,
    /// Mean half-life, 1 decimal.
    pub mean: Option<f64>,
    /// Works with a half-life.
    pub count: usize,
}

/// Years until each analyzed work received half of its dated citations.
#[must_use]
pub fn cited_half_life(analyzed: &[WorkRecord], snapshot: &MetadataSnapshot) -> HalfLife {
    let mut half_lives = Vec::new();

    for work in analyzed {
        let Some(pub_year) = work.published_year() else { continue };
        let edges = snapshot.citing_of(&work.doi);
        if edges.is_empty() {
            continue;
        }

        let mut per_year: HashMap<i32, usize> = HashMap::new();
        for year in edges.iter().filter_map(|e| e.citing_year()) {
            *per_year.entry(year).or_default() += 1;
        }
        let total: usize = per_year.values().sum();
        if total == 0 {
            continue;
        }

        let target = total as f64 / 2.0;
        let mut cumulative = 0;
        for year in pub_year..pub_year + HALF_LIFE_HORIZON {
            cumulative += per_year.get(&year).copied().unwrap_or(0);
            if cumulative as f64 >= target {
                half_lives.push(f64::from(year - pub_year));
                break;
            }
        }
    }

    HalfLife {
        median: median(&half_lives).map(|m| m.trunc() as i64),
        mean: mean(&half_lives).map(|m| round_to(m, 1)),
        count: half_lives.len(),
    }
}

/// Early citation velocity.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Velocity {
    /// Mean early citations per year, 2 decimals.
    pub velocity: f64,
    /// Works old enough to be measured.
    pub count: usize,
}

/// Citations per year within two years of publication.
///
/// Works published less than two years before `current_year` are left out.
#[must_use]
pub fn velocity(analyzed: &[WorkRecord], snapshot: &MetadataSnapshot, current_year: i32) -> Velocity {
    let velocities: Vec<f64> = analyzed
        .iter()
        .filter_map(|work| {
            let pub_year = work.published_year()?;
            if current_year - pub_year < VELOCITY_WINDOW {
                return None;
            }
            let early = snapshot
                .citing_of(&work.doi)
                .iter()
                .filter_map(|e| e.citing_year())
                .filter(|&y| y > 0 && y <= pub_year + VELOCITY_WINDOW)
                .count();
            Some(early as f64 / f64::from(VELOCITY_WINDOW))
        })
        .collect();

    Velocity { velocity: round_to(mean(&velocities).unwrap_or(0.0), 2), count: velocities.len() }
}
