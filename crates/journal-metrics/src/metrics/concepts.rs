//! Thematic diversity of analyzed works.

use std::collections::HashMap;

use serde::Serialize;

use super::{most_common, round_to};
use crate::models::WorkRecord;

/// Concepts read from each work, in graph order.
const CONCEPTS_PER_WORK: usize = 10;

/// Concepts listed in the report.
const TOP_CONCEPTS: usize = 10;

/// Diversity balance index: normalized Shannon entropy of concept mentions.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Dbi {
    /// Index in [0, 1], 3 decimals.
    pub dbi: f64,
    /// Distinct concepts.
    pub unique_concepts: usize,
    /// Concept mentions.
    pub total_mentions: usize,
    /// Most frequent concepts.
    pub top_concepts: Vec<(String, usize)>,
}

/// Diversity of concepts across analyzed graph halves.
#[must_use]
pub fn dbi(analyzed: &[WorkRecord]) -> Dbi {
    let mut freq: HashMap<String, usize> = HashMap::new();
    for graph in analyzed.iter().filter_map(|w| w.graph.as_ref()) {
        for name in graph.concepts.iter().take(CONCEPTS_PER_WORK).filter_map(|c| c.name()) {
            *freq.entry(name.to_string()).or_default() += 1;
        }
    }

    let total: usize = freq.values().sum();
    if total == 0 {
        return Dbi::default();
    }

    let shannon: f64 = freq
        .values()
        .map(|&count| count as f64 / total as f64)
        .filter(|p| *p > 0.0)
        .map(|p| -p * p.ln())
        .sum();
    let max_shannon = (freq.len() as f64).ln();
    let index = if max_shannon > 0.0 { shannon / max_shannon } else { 0.0 };

    let mut top_concepts = most_common(&freq);
    top_concepts.truncate(TOP_CONCEPTS);

    Dbi { dbi: round_to(index, 3), unique_concepts: freq.len(), total_mentions: total, top_concepts }
}
