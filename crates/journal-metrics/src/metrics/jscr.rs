//! Journal self-citation rate.

use serde::Serialize;

use super::round_to;
use crate::models::{CitingEdge, normalize_issn};

/// Share of citing edges published in the analyzed journal itself.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Jscr {
    /// Citing edges from the same journal.
    pub self_cites: usize,
    /// All citing edges.
    pub total_cites: usize,
    /// Percentage, 2 decimals.
    pub rate: f64,
}

fn is_self_citation(edge: &CitingEdge, target: &str) -> bool {
    let venue_match = edge
        .graph
        .as_ref()
        .is_some_and(|g| g.venue_issns().into_iter().any(|issn| normalize_issn(issn) == target));

    venue_match
        || edge
            .registry
            .as_ref()
            .is_some_and(|r| r.issn.iter().any(|issn| normalize_issn(issn) == target))
}

/// Journal self-citation rate over all citing edges.
#[must_use]
pub fn jscr(citing: &[CitingEdge], journal_issn: &str) -> Jscr {
    let target = normalize_issn(journal_issn);
    let total_cites = citing.len();
    if total_cites == 0 || target.is_empty() {
        return Jscr { total_cites, ..Jscr::default() };
    }

    let self_cites = citing.iter().filter(|e| is_self_citation(e, &target)).count();
    Jscr { self_cites, total_cites, rate: round_to(self_cites as f64 / total_cites as f64 * 100.0, 2) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GraphWork, RegistryWork, Venue};

    fn graph_edge(issns: &[&str]) -> CitingEdge {
        CitingEdge {
            graph: Some(GraphWork {
                host_venue: Some(Venue {
                    display_name: Some("J".to_string()),
                    issn: issns.iter().map(|s| (*s).to_string()).collect(),
                    ..Default::default()
                }),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_jscr_matches_normalized_issn() {
        let registry_only = CitingEdge {
            registry: Some(RegistryWork { issn: vec!["1234-567x".to_string()], ..Default::default() }),
            ..Default::default()
        };
        let citing = vec![graph_edge(&["1234567X"]), graph_edge(&["9999-0000"]), registry_only, CitingEdge::default()];

        let result = jscr(&citing, "1234-567X");
        assert_eq!(result.self_cites, 2);
        assert_eq!(result.total_cites, 4);
        assert_eq!(result.rate, 50.0);
    }

    #[test]
    fn test_jscr_empty() {
        let result = jscr(&[], "1234-5678");
        assert_eq!(result, Jscr::default());
    }

    #[test]
    fn test_jscr_no_match_is_zero() {
        let result = jscr(&[graph_edge(&["0000-0001"])], "1234-5678");
        assert_eq!(result.rate, 0.0);
        assert_eq!(result.total_cites, 1);
    }
}
