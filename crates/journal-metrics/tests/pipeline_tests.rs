//! End-to-end pipeline tests against a mocked registry and graph.

use serde_json::{Value, json};
use wiremock::matchers::{method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use journal_metrics::formatters::{format_run_json, format_run_markdown};
use journal_metrics::{AnalysisContext, AnalysisMode, Config, Pipeline, Workbook};

const ISSN: &str = "1234-5678";

fn setup_pipeline(mock_server: &MockServer) -> Pipeline {
    let ctx = AnalysisContext::new(Config::for_testing(&mock_server.uri())).unwrap();
    Pipeline::new(ctx, 2024)
}

fn registry_item(doi: &str, published: &[i32], author: (&str, &str), issn: &str) -> Value {
    json!({
        "DOI": doi,
        "title": [format!("Deep learning for proteins {doi}")],
        "author": [{"given": author.0, "family": author.1}],
        "reference": [{"DOI": "10.1000/old", "year": "2015"}, {"unstructured": "A book", "year": 2018}],
        "container-title": ["Journal of Tests"],
        "ISSN": [issn],
        "publisher": "Test Press",
        "published": {"date-parts": [published]},
        "created": {"date-parts": [[published[0], 1, 1]]},
        "type": "journal-article"
    })
}

fn authorship(name: &str, institution: &str, country: &str) -> Value {
    json!({
        "author": {"display_name": name},
        "institutions": [{"display_name": institution, "country_code": country}]
    })
}

/// Mount a journal with two analyzed works; only the first one is cited.
async fn mount_journal(mock_server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/graph/sources"))
        .and(query_param("filter", format!("issn:{ISSN}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "meta": {"count": 1},
            "results": [{"display_name": "Journal of Tests"}]
        })))
        .mount(mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/registry/works"))
        .and(query_param("cursor", "*"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": {
                "items": [
                    registry_item("10.1000/A", &[2020, 1, 15], ("Ada", "Lovelace"), ISSN),
                    registry_item("10.1000/b", &[2020, 6, 1], ("Alan", "Turing"), ISSN),
                    {"title": ["No DOI here"]}
                ],
                "next-cursor": "end"
            }
        })))
        .mount(mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/registry/works"))
        .and(query_param("cursor", "end"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": {"items": []}})))
        .mount(mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path_regex(r"^/graph/works/.*10\.1000/a$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "https://openalex.org/W1",
            "doi": "https://doi.org/10.1000/a",
            "publication_year": 2020,
            "cited_by_count": 2,
            "host_venue": {"display_name": "Journal of Tests", "issn": [ISSN]},
            "open_access": {"is_oa": true},
            "concepts": [{"display_name": "Biology", "score": 0.9}],
            "authorships": [authorship("Ada Lovelace", "Test University", "GB")],
            "type": "article"
        })))
        .expect(1)
        .mount(mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/graph/works/.*10\.1000/b$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "https://openalex.org/W2",
            "doi": "https://doi.org/10.1000/b",
            "publication_year": 2020,
            "cited_by_count": 0,
            "authorships": [authorship("Alan Turing", "Other University", "GB")]
        })))
        .expect(1)
        .mount(mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/graph/works"))
        .and(query_param("filter", "cites:W1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "meta": {"count": 2, "next_cursor": null},
            "results": [
                {
                    "id": "https://openalex.org/W10",
                    "doi": "https://doi.org/10.1000/c",
                    "title": "Protein folding follow-up",
                    "publication_date": "2020-03-01",
                    "publication_year": 2020,
                    "primary_location": {"source": {"display_name": "Journal of Tests", "issn": [ISSN]}},
                    "authorships": [authorship("Ada Lovelace", "Test University", "GB")]
                },
                {
                    "id": "https://openalex.org/W11",
                    "doi": "https://doi.org/10.2000/D",
                    "title": "Deep learning survey",
                    "publication_date": "2021-02-01",
                    "publication_year": 2021,
                    "host_venue": {"display_name": "Other Journal", "issn": ["9999-0000"]},
                    "authorships": [authorship("Grace Hopper", "Navy Lab", "US")]
                }
            ]
        })))
        .expect(1)
        .mount(mock_server)
        .await;
    // Listing records already carry the graph half of citing works.
    Mock::given(method("GET"))
        .and(path_regex(r"^/graph/works/.*10\.(1000/c|2000/d)$"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/registry/works/10.2000/d"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": registry_item("10.2000/d", &[2021, 2, 1], ("Grace", "Hopper"), "9999-0000")
        })))
        .expect(1)
        .mount(mock_server)
        .await;
}

#[tokio::test]
async fn test_batch_run_end_to_end() {
    let mock_server = MockServer::start().await;
    mount_journal(&mock_server).await;

    let pipeline = setup_pipeline(&mock_server);
    let mode = AnalysisMode::Batch { issns: vec![ISSN.to_string()], period: "2020".to_string() };
    let run = pipeline.run(&mode).await.unwrap();

    assert_eq!(run.journals.len(), 1);
    assert!(run.warnings.is_empty());
    let journal = &run.journals[0];

    assert_eq!(journal.journal_name, "Journal of Tests");
    assert_eq!(journal.period, "2020");
    assert_eq!(journal.fetched, 3);
    assert_eq!(journal.validated, 2);
    assert_eq!(journal.skipped, 1);
    assert_eq!(journal.journal_prefix, "10.1000");

    let dois: Vec<&str> = journal.analyzed.iter().map(|w| w.doi.as_str()).collect();
    assert_eq!(dois, vec!["10.1000/a", "10.1000/b"]);
    assert!(journal.analyzed.iter().all(|w| w.registry.is_some() && w.graph.is_some()));

    assert_eq!(journal.citing.len(), 2);
    assert_eq!(journal.unique_citing, 2);
    assert_eq!(journal.citing[1].doi, "10.2000/d");
    assert!(journal.citing[0].registry.is_none());
    assert!(journal.citing[1].registry.is_some());

    assert_eq!(journal.citation_stats.h_index, 1);
    assert_eq!(journal.citation_stats.total_citations, 2);
    assert_eq!(journal.citation_stats.works_without_citations, 1);

    assert_eq!(journal.fast_metrics.jscr.self_cites, 1);
    assert_eq!(journal.fast_metrics.jscr.rate, 50.0);

    assert_eq!(journal.first_citation.count, 1);
    let first = &journal.first_citation.details[0];
    assert_eq!(first.citing_doi, "10.1000/c");
    assert_eq!(first.days, 46);
    assert!(first.same_prefix);

    assert_eq!(journal.overlaps.len(), 1);
    assert_eq!(journal.overlaps[0].common_authors, vec!["Ada Lovelace".to_string()]);

    let years: Vec<(i32, usize)> =
        journal.accumulation.yearly_citations.iter().map(|y| (y.year, y.citations)).collect();
    assert_eq!(years, vec![(2020, 1), (2021, 1)]);

    assert_eq!(journal.analyzed_stats.total_refs, 4);
    assert_eq!(journal.analyzed_stats.self_cites, 2);
    assert_eq!(journal.citing_stats.n_items, 2);
}

#[tokio::test]
async fn test_report_from_run() {
    let mock_server = MockServer::start().await;
    mount_journal(&mock_server).await;

    let pipeline = setup_pipeline(&mock_server);
    let mode = AnalysisMode::Batch { issns: vec![ISSN.to_string()], period: "2020".to_string() };
    let run = pipeline.run(&mode).await.unwrap();
    let workbook = Workbook::from_run(&run, 100);

    let analyzed = workbook.sheet("Journal_of_Test_Analyzed").unwrap();
    assert_eq!(analyzed.rows.len(), 2);
    assert_eq!(workbook.sheet("Journal_of_Test_Citing").unwrap().rows.len(), 2);
    assert_eq!(workbook.sheet("Journal_of_Test_Overlaps").unwrap().rows.len(), 1);
    assert!(workbook.sheet("Comparative_Statistics").is_some());

    let doc = format_run_json(&run, &workbook);
    assert_eq!(doc["journals"][0]["hIndex"], 1);
    assert_eq!(doc["journals"][0]["skipped"], 1);

    let markdown = format_run_markdown(&run, &workbook, 5);
    assert!(markdown.contains("## Journal of Tests (1234-5678, 2020)"));
    assert!(markdown.contains("### Journal_of_Test_Analyzed"));
}

#[tokio::test]
async fn test_windows_share_the_cache() {
    let mock_server = MockServer::start().await;
    mount_journal(&mock_server).await;

    let pipeline = setup_pipeline(&mock_server);
    let mode = AnalysisMode::Windowed {
        issn: ISSN.to_string(),
        windows: vec!["2020".to_string(), "2019-2020".to_string(), "1800".to_string()],
    };
    let run = pipeline.run(&mode).await.unwrap();

    assert_eq!(run.journals.len(), 2);
    assert_eq!(run.journals[1].period, "2019-2020");
    assert_eq!(run.journals[0].citation_stats.h_index, run.journals[1].citation_stats.h_index);
    assert_eq!(run.warnings.len(), 1);
    // Graph mocks verify on drop that each DOI was fetched once.
}

#[tokio::test]
async fn test_unknown_journal_still_runs() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/registry/works"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": {"items": []}})))
        .mount(&mock_server)
        .await;

    let pipeline = setup_pipeline(&mock_server);
    let mode = AnalysisMode::Batch { issns: vec!["0000-0000".to_string()], period: "2020".to_string() };
    let run = pipeline.run(&mode).await.unwrap();

    assert!(run.journals.is_empty());
    assert_eq!(run.warnings, vec!["No works found for ISSN 0000-0000 in 2020".to_string()]);

    let workbook = Workbook::from_run(&run, 100);
    assert!(workbook.sheet("Summary").is_some());
    assert!(workbook.sheet("Warnings").is_some());
}
