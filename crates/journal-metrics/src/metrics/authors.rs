//! Author-level metrics: publication inequality, overlaps between analyzed
//! and citing works, and reviewer candidates.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use super::{mean, median, most_common, round_to};
use crate::cache::MetadataSnapshot;
use crate::models::{CitingEdge, GraphWork, WorkRecord};

/// Placeholder name for authorships without a display name.
const UNKNOWN_AUTHOR: &str = "Unknown";

static INITIAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Z]\.").expect("valid initial regex pattern"));

/// Inequality of publication counts among graph author ids.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AuthorGini {
    /// Gini coefficient, 3 decimals.
    pub gini: f64,
    /// Distinct author ids.
    pub total_authors: usize,
    /// Mean works per author, 2 decimals.
    pub mean_papers: f64,
    /// Median works per author, truncated.
    pub median_papers: i64,
}

/// Gini coefficient of a list of non-negative counts (0 for fewer than two).
#[must_use]
pub fn gini(counts: &[usize]) -> f64 {
    if counts.len() < 2 {
        return 0.0;
    }
    let mut sorted = counts.to_vec();
    sorted.sort_unstable();

    let n = sorted.len() as f64;
    let mut running = 0.0;
    let mut cumulative_sum = 0.0;
    for &c in &sorted {
        running += c as f64;
        cumulative_sum += running;
    }
    if running == 0.0 {
        return 0.0;
    }
    (n + 1.0 - 2.0 * cumulative_sum / running) / n
}

/// Author Gini over the graph authorships of analyzed works.
#[must_use]
pub fn author_gini(analyzed: &[WorkRecord]) -> AuthorGini {
    let mut per_author: HashMap<&str, usize> = HashMap::new();
    for graph in analyzed.iter().filter_map(|w| w.graph.as_ref()) {
        for id in graph.author_ids() {
            *per_author.entry(id).or_default() += 1;
        }
    }

    if per_author.len() < 2 {
        return AuthorGini { total_authors: per_author.len(), ..AuthorGini::default() };
    }

    let counts: Vec<usize> = per_author.values().copied().collect();
    let as_f64: Vec<f64> = counts.iter().map(|&c| c as f64).collect();

    AuthorGini {
        gini: round_to(gini(&counts), 3),
        total_authors: counts.len(),
        mean_papers: round_to(mean(&as_f64).unwrap_or(0.0), 2),
        median_papers: median(&as_f64).map_or(0, |m| m.trunc() as i64),
    }
}

/// Shared authors or institutions between an analyzed work and one of its
/// citing works.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Overlap {
    /// Analyzed DOI.
    pub analyzed_doi: String,
    /// Citing DOI.
    pub citing_doi: String,
    /// Author names on both works, sorted.
    pub common_authors: Vec<String>,
    /// Institutions on both works, sorted.
    pub common_affiliations: Vec<String>,
}

fn named_authors(graph: &GraphWork) -> BTreeSet<&str> {
    graph.author_names().into_iter().filter(|n| *n != UNKNOWN_AUTHOR).collect()
}

/// Analyzed/citing pairs that share at least one author or institution.
#[must_use]
pub fn overlaps(analyzed: &[WorkRecord], snapshot: &MetadataSnapshot) -> Vec<Overlap> {
    let mut found = Vec::new();

    for work in analyzed.iter().filter(|w| !w.doi.is_empty()) {
        let (authors, affiliations) = work
            .graph
            .as_ref()
            .map(|g| (named_authors(g), g.affiliations()))
            .unwrap_or_default();

        for edge in snapshot.citing_of(&work.doi) {
            let Some(citing) = edge.graph.as_ref() else { continue };

            let common_authors: Vec<String> =
                named_authors(citing).intersection(&authors).map(|s| (*s).to_string()).collect();
            let common_affiliations: Vec<String> =
                citing.affiliations().intersection(&affiliations).map(|s| (*s).to_string()).collect();

            if !common_authors.is_empty() || !common_affiliations.is_empty() {
                found.push(Overlap {
                    analyzed_doi: work.doi.clone(),
                    citing_doi: edge.doi.clone(),
                    common_authors,
                    common_affiliations,
                });
            }
        }
    }

    found
}

/// One citing author who never published in the analyzed set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewerCandidate {
    /// Author display name.
    pub author: String,
    /// Citing edges the author appears on.
    pub citation_count: usize,
    /// Those citing DOIs.
    pub citing_dois: Vec<String>,
}

/// Reviewer candidates plus the sizes of the excluded sets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Reviewers {
    /// Candidates citing more than once, most frequent first.
    pub candidates: Vec<ReviewerCandidate>,
    /// Distinct authors of analyzed works.
    pub journal_authors: usize,
    /// Distinct authors found in overlaps.
    pub overlap_authors: usize,
}

/// Citing authors who are neither journal authors nor overlap authors and
/// appear on more than one citing edge.
#[must_use]
pub fn reviewer_candidates(analyzed: &[WorkRecord], citing: &[CitingEdge], overlaps: &[Overlap]) -> Reviewers {
    let journal_authors: HashSet<&str> = analyzed
        .iter()
        .filter_map(|w| w.graph.as_ref())
        .flat_map(GraphWork::author_names)
        .collect();
    let overlap_authors: HashSet<&str> =
        overlaps.iter().flat_map(|o| o.common_authors.iter().map(String::as_str)).collect();

    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut dois: HashMap<String, Vec<String>> = HashMap::new();
    for edge in citing {
        let Some(graph) = edge.graph.as_ref() else { continue };
        for author in graph.author_names() {
            if author == UNKNOWN_AUTHOR || journal_authors.contains(author) || overlap_authors.contains(author) {
                continue;
            }
            *counts.entry(author.to_string()).or_default() += 1;
            dois.entry(author.to_string()).or_default().push(edge.doi.clone());
        }
    }

    let candidates = most_common(&counts)
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(author, citation_count)| {
            let citing_dois = dois.remove(&author).unwrap_or_default();
            ReviewerCandidate { author, citation_count, citing_dois }
        })
        .collect();

    Reviewers { candidates, journal_authors: journal_authors.len(), overlap_authors: overlap_authors.len() }
}

/// Reduce `Family I.N.` to `Family I.` and repair doubled dots.
///
/// Names with a single part come back unchanged.
#[must_use]
pub fn normalize_author_name(name: &str) -> String {
    let name = name.replace("..", ".");
    let mut parts = name.split_whitespace();
    let (Some(surname), Some(initials)) = (parts.next(), parts.next()) else {
        return name;
    };

    let dotted = if initials.contains('.') {
        INITIAL_RE.find(initials).map(|m| m.as_str().to_string())
    } else {
        None
    };
    let first_initial =
        dotted.unwrap_or_else(|| initials.chars().next().map(|c| format!("{c}.")).unwrap_or_default());

    format!("{surname} {first_initial}").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::tests_support::{graph_work, snapshot_with};
    use crate::models::{AuthorInfo, Authorship, Institution};

    fn authorship(id: &str, name: &str, institution: Option<&str>) -> Authorship {
        Authorship {
            author: Some(AuthorInfo { id: Some(id.to_string()), display_name: Some(name.to_string()) }),
            institutions: institution
                .map(|i| vec![Institution { display_name: Some(i.to_string()), country_code: None }])
                .unwrap_or_default(),
        }
    }

    fn authored(authors: Vec<Authorship>) -> GraphWork {
        GraphWork { authorships: authors, ..Default::default() }
    }

    fn citing_edge(doi: &str, cited: &str, authors: Vec<Authorship>) -> CitingEdge {
        CitingEdge {
            doi: doi.to_string(),
            cited_doi: cited.to_string(),
            graph: Some(authored(authors)),
            ..Default::default()
        }
    }

    #[test]
    fn test_gini_values() {
        assert_eq!(gini(&[1, 1, 1, 1]), 0.0);
        assert_eq!(gini(&[5]), 0.0);
        assert!(gini(&[1, 1, 1, 9]) > gini(&[1, 2, 3, 4]));
        assert_eq!(round_to(gini(&[0, 0, 0, 4]), 3), 0.75);
    }

    #[test]
    fn test_author_gini() {
        let works = vec![
            graph_work("10.1/a", authored(vec![authorship("A1", "Ada", None), authorship("A2", "Bob", None)])),
            graph_work("10.1/b", authored(vec![authorship("A1", "Ada", None)])),
            graph_work("10.1/c", authored(vec![authorship("A1", "Ada", None)])),
        ];

        let result = author_gini(&works);
        assert_eq!(result.total_authors, 2);
        assert_eq!(result.gini, 0.25);
        assert_eq!(result.mean_papers, 2.0);
        assert_eq!(result.median_papers, 2);
    }

    #[test]
    fn test_author_gini_single_author() {
        let works = vec![graph_work("10.1/a", authored(vec![authorship("A1", "Ada", None)]))];
        let result = author_gini(&works);
        assert_eq!(result.gini, 0.0);
        assert_eq!(result.total_authors, 1);
    }

    #[test]
    fn test_overlaps_by_author_and_affiliation() {
        let analyzed = vec![graph_work(
            "10.1/a",
            authored(vec![authorship("A1", "Ada", Some("Uni X")), authorship("A2", "Bob", None)]),
        )];
        let snapshot = snapshot_with(&[(
            "10.1/a",
            vec![
                citing_edge("10.2/x", "10.1/a", vec![authorship("A9", "Zed", Some("Uni X"))]),
                citing_edge("10.2/y", "10.1/a", vec![authorship("A2", "Bob", None)]),
                citing_edge("10.2/z", "10.1/a", vec![authorship("A8", "Eve", Some("Uni Y"))]),
            ],
        )]);

        let found = overlaps(&analyzed, &snapshot);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].citing_doi, "10.2/x");
        assert_eq!(found[0].common_affiliations, vec!["Uni X"]);
        assert!(found[0].common_authors.is_empty());
        assert_eq!(found[1].common_authors, vec!["Bob"]);
    }

    #[test]
    fn test_reviewer_candidates() {
        let analyzed = vec![graph_work("10.1/a", authored(vec![authorship("A1", "Ada", None)]))];
        let citing = vec![
            citing_edge("10.2/x", "10.1/a", vec![authorship("A5", "Carol", None), authorship("A1", "Ada", None)]),
            citing_edge("10.2/y", "10.1/a", vec![authorship("A5", "Carol", None), authorship("A6", "Dan", None)]),
            citing_edge("10.2/z", "10.1/a", vec![authorship("A6", "Dan", None), authorship("A7", "Erin", None)]),
            citing_edge("10.2/w", "10.1/a", vec![authorship("A7", "Erin", None)]),
        ];
        let overlap = Overlap {
            analyzed_doi: "10.1/a".to_string(),
            citing_doi: "10.2/z".to_string(),
            common_authors: vec!["Erin".to_string()],
            common_affiliations: Vec::new(),
        };

        let reviewers = reviewer_candidates(&analyzed, &citing, &[overlap]);
        let names: Vec<&str> = reviewers.candidates.iter().map(|c| c.author.as_str()).collect();
        assert_eq!(names, vec!["Carol", "Dan"]);
        assert_eq!(reviewers.candidates[0].citing_dois, vec!["10.2/x", "10.2/y"]);
        assert_eq!(reviewers.journal_authors, 1);
        assert_eq!(reviewers.overlap_authors, 1);
    }

    #[test]
    fn test_normalize_author_name() {
        assert_eq!(normalize_author_name("Pikalova E..Y."), "Pikalova E.");
        assert_eq!(normalize_author_name("Smith JR"), "Smith J.");
        assert_eq!(normalize_author_name("Lovelace A.M."), "Lovelace A.");
        assert_eq!(normalize_author_name("Plato"), "Plato");
        assert_eq!(normalize_author_name(""), "");
    }
}
