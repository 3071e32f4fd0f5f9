//! Aggregators over records with missing halves.

use journal_metrics::cache::MetadataSnapshot;
use journal_metrics::metrics::{
    CitationStats, FastMetrics, FwciMethod, authors, citations, descriptive, keywords, timing,
};
use journal_metrics::models::{CitingEdge, DateParts, Reference, RegistryAuthor, RegistryWork, WorkRecord};

fn registry_only(doi: &str) -> WorkRecord {
    WorkRecord {
        doi: doi.to_string(),
        registry: Some(RegistryWork {
            doi: Some(doi.to_string()),
            title: vec!["Sparse metadata in practice".to_string()],
            author: vec![RegistryAuthor {
                given: Some("Ada".to_string()),
                family: Some("Lovelace".to_string()),
                name: None,
            }],
            reference: vec![Reference { doi: Some("10.1000/x".to_string()), year: Some("2010".to_string()), unstructured: None }],
            published: Some(DateParts::from_parts(&[2020, 5, 1])),
            created: Some(DateParts::from_parts(&[2020, 4, 1])),
            ..Default::default()
        }),
        graph: None,
    }
}

#[test]
fn test_registry_only_record_passes_every_aggregator() {
    let analyzed = vec![registry_only("10.1000/a"), WorkRecord::empty("10.1000/b")];
    let citing = vec![CitingEdge { doi: "10.2/c".to_string(), cited_doi: "10.1000/a".to_string(), ..Default::default() }];
    let snapshot = MetadataSnapshot {
        citing: [("10.1000/a".to_string(), citing.clone())].into_iter().collect(),
        ..Default::default()
    };

    let stats = descriptive::describe(&analyzed, true, "10.1000");
    assert_eq!(stats.n_items, 2);
    assert_eq!(stats.self_cites, 1);
    assert_eq!(stats.no_country_works, 0);

    let cites = CitationStats::compute(&analyzed, &snapshot);
    assert_eq!(cites.h_index, 1);

    assert!(authors::overlaps(&analyzed, &snapshot).is_empty());
    assert!(authors::reviewer_candidates(&analyzed, &citing, &[]).candidates.is_empty());

    let first = timing::first_citation(&analyzed, &snapshot);
    assert_eq!(first.count, 0);
    let season = timing::seasonality(&analyzed, &snapshot, first.median_days);
    assert_eq!(season.total_citations, 0);
    assert_eq!(season.publication_months.get(&5), Some(&1));

    let curves = citations::accumulation(&analyzed, &snapshot);
    assert!(curves.curves.is_empty());

    let fast = FastMetrics::compute(&analyzed, &citing, &snapshot, "1234-5678", 2024);
    assert_eq!(fast.fwci.method, FwciMethod::NoCitations);
    assert_eq!(fast.reference_age.count, 1);
    assert_eq!(fast.reference_age.median, Some(14));
    assert_eq!(fast.jscr.total_cites, 1);
    assert_eq!(fast.jscr.rate, 0.0);
    assert_eq!(fast.author_gini.total_authors, 0);
    assert!(fast.data_quality_score > 0.0);

    let report = keywords::title_keywords(&analyzed, &citing);
    assert_eq!(report.analyzed.total_titles, 1);
    assert_eq!(report.citing.total_titles, 0);
}

#[test]
fn test_empty_inputs() {
    let snapshot = MetadataSnapshot::default();
    let fast = FastMetrics::compute(&[], &[], &snapshot, "", 2024);
    assert_eq!(fast.data_quality_score, 0.0);
    assert_eq!(CitationStats::compute(&[], &snapshot).h_index, 0);
    assert_eq!(descriptive::describe(&[], false, "").n_items, 0);
}
