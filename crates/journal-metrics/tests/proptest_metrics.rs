//! Property-based tests for input parsing and metric bounds.

use proptest::prelude::*;

use journal_metrics::metrics::authors::gini;
use journal_metrics::metrics::citations::h_index;
use journal_metrics::metrics::jscr::jscr;
use journal_metrics::models::{CitingEdge, GraphWork, Venue, normalize_doi, parse_period};

/// Citing edge hosted by a venue with the given ISSN.
fn edge_in(issn: &str) -> CitingEdge {
    CitingEdge {
        graph: Some(GraphWork {
            host_venue: Some(Venue { issn: vec![issn.to_string()], ..Default::default() }),
            ..Default::default()
        }),
        ..Default::default()
    }
}

proptest! {
    /// A valid range parses to exactly its years.
    #[test]
    fn period_range_is_inclusive(start in 1900i32..=2100, len in 0i32..30) {
        let end = (start + len).min(2100);
        let period = parse_period(&format!("{start}-{end}")).unwrap();

        prop_assert_eq!(period.years, (start..=end).collect::<Vec<_>>());
        prop_assert!(period.warnings.is_empty());
    }

    /// Out-of-range years are dropped with one warning each.
    #[test]
    fn period_drops_out_of_range(year in 2101i32..10_000) {
        let period = parse_period(&format!("2020, {year}")).unwrap();

        prop_assert_eq!(period.years, vec![2020]);
        prop_assert_eq!(period.warnings.len(), 1);
    }

    /// Parsing never panics and yields sorted distinct years in range.
    #[test]
    fn period_parse_is_total(expr in "[0-9, -]{0,30}") {
        if let Ok(period) = parse_period(&expr) {
            prop_assert!(!period.years.is_empty());
            prop_assert!(period.years.windows(2).all(|w| w[0] < w[1]));
            prop_assert!(period.years.iter().all(|y| (1900..=2100).contains(y)));
        }
    }

    /// Normalized DOIs are lowercase, trimmed, start with `10.` and are stable.
    #[test]
    fn doi_normalization(
        suffix in "[A-Za-z0-9./_-]{1,30}",
        prefix in prop::sample::select(vec!["", "https://doi.org/", "doi:", "http://dx.doi.org/"]),
        pad in " {0,3}",
    ) {
        let raw = format!("{pad}{prefix}10.{suffix}{pad}");
        let doi = normalize_doi(&raw).unwrap();

        prop_assert!(doi.starts_with("10."));
        prop_assert_eq!(doi.trim(), doi.as_str());
        prop_assert_eq!(doi.to_lowercase(), doi.clone());
        prop_assert_eq!(normalize_doi(&doi), Some(doi));
    }

    /// Strings without a DOI are rejected.
    #[test]
    fn doi_rejects_non_doi(raw in "[a-z ]{0,20}") {
        prop_assert!(normalize_doi(&raw).is_none());
    }

    /// The H-index satisfies its definition and ignores order.
    #[test]
    fn h_index_definition(mut counts in prop::collection::vec(0usize..200, 0..60)) {
        let h = h_index(&counts);

        prop_assert!(h <= counts.len());
        prop_assert!(counts.iter().filter(|&&c| c >= h).count() >= h);
        prop_assert!(counts.iter().filter(|&&c| c > h).count() < h + 1);

        counts.reverse();
        prop_assert_eq!(h_index(&counts), h);
    }

    /// Equal counts have no inequality; any counts stay within [0, 1).
    #[test]
    fn gini_bounds(value in 1usize..50, n in 1usize..30, counts in prop::collection::vec(0usize..100, 0..40)) {
        prop_assert!(gini(&vec![value; n]).abs() < 1e-9);

        let g = gini(&counts);
        prop_assert!(g > -1e-9);
        prop_assert!(g < 1.0);
    }

    /// The self-citation rate is a percentage.
    #[test]
    fn jscr_is_a_percentage(own in prop::collection::vec(any::<bool>(), 1..40)) {
        let edges: Vec<CitingEdge> =
            own.iter().map(|&o| edge_in(if o { "1234-5678" } else { "9999-0000" })).collect();
        let result = jscr(&edges, "1234-5678");

        prop_assert!((0.0..=100.0).contains(&result.rate));
        prop_assert_eq!(result.total_cites, edges.len());
        prop_assert_eq!(result.self_cites, own.iter().filter(|&&o| o).count());
        if result.self_cites == 0 {
            prop_assert_eq!(result.rate, 0.0);
        }
    }
}
