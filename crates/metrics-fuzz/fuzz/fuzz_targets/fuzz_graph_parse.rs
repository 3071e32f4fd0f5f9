#![no_main]

use journal_metrics::models::{CitingEdge, GraphWork};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(work) = serde_json::from_slice::<GraphWork>(data) {
        let _ = work.normalized_doi();
        let _ = work.venue_issns();
        let _ = work.countries();
        let _ = work.concepts_by_score();

        let edge = CitingEdge {
            doi: "10.0/fuzz".to_string(),
            cited_doi: "10.0/cited".to_string(),
            pub_date: work.publication_date.clone(),
            registry: None,
            graph: Some(work),
        };
        let _ = edge.citation_date();
        let _ = edge.citing_year();
    }
});
