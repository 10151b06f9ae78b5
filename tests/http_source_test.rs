//! `HttpApiSource` against a mock HTTP server: request shape, response
//! mapping, and the blocked/parse error split.

use httpmock::prelude::*;
use jobscout::adapters::HttpApiSource;
use jobscout::domain::ports::Source;
use jobscout::utils::error::SourceError;
use serde_json::json;

fn source_for(server: &MockServer) -> HttpApiSource {
    HttpApiSource::new(
        "boardone",
        "BoardOne",
        &server.url("/api/search"),
        true,
    )
}

#[tokio::test]
async fn test_search_maps_response_and_sends_query_params() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/api/search")
            .query_param("q", "rust engineer")
            .query_param("limit", "20")
            .query_param("location", "Berlin");
        then.status(200).json_body(json!([
            {
                "title": "Senior Rust Engineer",
                "url": "https://boardone.example.com/jobs/42",
                "company": "Acme Robotics",
                "location": "Berlin",
                "description": "Rust services.",
                "id": "42"
            },
            {
                "title": "Rust Developer",
                "url": "https://boardone.example.com/jobs/43"
            }
        ]));
    });

    let source = source_for(&server);
    let postings = source
        .search("rust engineer", Some("Berlin"), 20)
        .await
        .unwrap();
    mock.assert();

    assert_eq!(postings.len(), 2);
    assert_eq!(postings[0].title, "Senior Rust Engineer");
    assert_eq!(postings[0].source, "boardone");
    assert_eq!(postings[0].company, "Acme Robotics");
    assert_eq!(postings[0].link, "https://boardone.example.com/jobs/42");
    assert_eq!(postings[0].posting_id.as_deref(), Some("42"));
    // Optional wire fields default to empty.
    assert_eq!(postings[1].company, "");
    assert_eq!(postings[1].description, "");
    assert_eq!(postings[1].posting_id, None);
}

#[tokio::test]
async fn test_search_omits_location_param_when_unscoped() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/api/search")
            .query_param("q", "rust")
            .matches(|req| {
                req.query_params
                    .as_ref()
                    .map_or(true, |params| params.iter().all(|(k, _)| k != "location"))
            });
        then.status(200).json_body(json!([]));
    });

    let source = source_for(&server);
    let postings = source.search("rust", None, 20).await.unwrap();
    mock.assert();
    assert!(postings.is_empty());
}

#[tokio::test]
async fn test_search_truncates_to_limit() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/search");
        then.status(200).json_body(json!([
            {"title": "A", "url": "https://b.example.com/1"},
            {"title": "B", "url": "https://b.example.com/2"},
            {"title": "C", "url": "https://b.example.com/3"}
        ]));
    });

    let source = source_for(&server);
    let postings = source.search("rust", None, 2).await.unwrap();
    assert_eq!(postings.len(), 2);
}

#[tokio::test]
async fn test_forbidden_and_rate_limit_report_blocked() {
    for status in [403, 429] {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/search");
            then.status(status);
        });

        let source = source_for(&server);
        let err = source.search("rust", None, 20).await.unwrap_err();
        match err {
            SourceError::BlockedError { message } => {
                assert!(message.contains(&status.to_string()))
            }
            other => panic!("expected blocked for HTTP {}, got {:?}", status, other),
        }
    }
}

#[tokio::test]
async fn test_server_error_and_bad_json_report_parse_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/search").query_param("q", "boom");
        then.status(500);
    });
    server.mock(|when, then| {
        when.method(GET).path("/api/search").query_param("q", "mangled");
        then.status(200).body("<html>not json</html>");
    });

    let source = source_for(&server);
    assert!(matches!(
        source.search("boom", None, 20).await.unwrap_err(),
        SourceError::ParseError { .. }
    ));
    assert!(matches!(
        source.search("mangled", None, 20).await.unwrap_err(),
        SourceError::ParseError { .. }
    ));
}

#[tokio::test]
async fn test_detail_fetch_returns_full_description() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/api/detail/42");
        then.status(200)
            .json_body(json!({"description": "Full posting text."}));
    });

    let source = source_for(&server).with_detail_endpoint(&server.url("/api/detail"));
    let mut posting = jobscout::domain::model::RawPosting {
        title: "Senior Rust Engineer".to_string(),
        source: "boardone".to_string(),
        company: String::new(),
        location: String::new(),
        link: "https://boardone.example.com/jobs/42".to_string(),
        description: String::new(),
        posting_id: Some("42".to_string()),
    };

    let fetched = source.fetch_full_description(&posting).await.unwrap();
    mock.assert();
    assert_eq!(fetched.as_deref(), Some("Full posting text."));

    // Without a posting id there is nothing to fetch.
    posting.posting_id = None;
    let fetched = source.fetch_full_description(&posting).await.unwrap();
    assert_eq!(fetched, None);
}

#[tokio::test]
async fn test_detail_fetch_without_endpoint_is_a_noop() {
    let server = MockServer::start();
    let source = source_for(&server);
    let posting = jobscout::domain::model::RawPosting {
        title: "Dev".to_string(),
        source: "boardone".to_string(),
        company: String::new(),
        location: String::new(),
        link: "https://boardone.example.com/jobs/1".to_string(),
        description: String::new(),
        posting_id: Some("1".to_string()),
    };
    assert_eq!(source.fetch_full_description(&posting).await.unwrap(), None);
}
