use crawlio_client::api::{ApiClient, CrawlOptions, API_KEY_HEADER};
use crawlio_client::report::save_result;
use mockito::{Matcher, Server};
use serde_json::{json, Value};

// Nothing listens on port 1, so requests fail at connect time.
const UNREACHABLE: &str = "http://127.0.0.1:1";

fn client_for(server: &Server) -> ApiClient {
    ApiClient::new(&server.url()).expect("client should build")
}

#[test]
fn register_stores_returned_api_key() {
    let mut server = Server::new();
    let mock = server
        .mock("POST", "/api/auth/register")
        .match_body(Matcher::Json(json!({
            "email": "ada@example.com",
            "password": "s3cret",
            "first_name": "Ada",
            "last_name": "Lovelace"
        })))
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(r#"{"api_key":"0IsGoeQuG0jpWgG5","user":{"id":1}}"#)
        .create();

    let mut api = client_for(&server);
    assert!(api.register("ada@example.com", "s3cret", "Ada", "Lovelace"));
    assert_eq!(api.api_key(), Some("0IsGoeQuG0jpWgG5"));
    assert!(api.has_api_key());
    mock.assert();
}

#[test]
fn register_without_api_key_in_response_fails() {
    let mut server = Server::new();
    server
        .mock("POST", "/api/auth/register")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"message":"created"}"#)
        .create();

    let mut api = client_for(&server);
    assert!(!api.register("a@example.com", "pw", "A", "B"));
    assert_eq!(api.api_key(), None);
}

#[test]
fn failed_register_keeps_existing_key() {
    let mut server = Server::new();
    server
        .mock("POST", "/api/auth/register")
        .with_status(409)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error":"email already registered"}"#)
        .create();

    let mut api = client_for(&server);
    api.set_api_key("earlier-key");
    assert!(!api.register("a@example.com", "pw", "A", "B"));
    assert_eq!(api.api_key(), Some("earlier-key"));
}

#[test]
fn register_with_non_json_body_fails() {
    let mut server = Server::new();
    server
        .mock("POST", "/api/auth/register")
        .with_status(200)
        .with_body("<html>ok</html>")
        .create();

    let mut api = client_for(&server);
    assert!(!api.register("a@example.com", "pw", "A", "B"));
    assert!(!api.has_api_key());
}

#[test]
fn crawl_and_history_without_key_make_no_request() {
    let mut server = Server::new();
    let crawl = server.mock("POST", "/api/crawl/url").expect(0).create();
    let history = server.mock("GET", "/api/crawl/history").expect(0).create();

    let api = client_for(&server);
    assert!(api
        .crawl("https://www.wikipedia.org/", Some(&CrawlOptions::full_page()))
        .is_none());
    assert!(api.fetch_history().is_none());

    crawl.assert();
    history.assert();
}

#[test]
fn empty_key_counts_as_missing() {
    let mut server = Server::new();
    let crawl = server.mock("POST", "/api/crawl/url").expect(0).create();

    let mut api = client_for(&server);
    api.set_api_key("");
    assert!(!api.has_api_key());
    assert!(api.crawl("https://example.com", None).is_none());
    crawl.assert();
}

#[test]
fn crawl_returns_document_verbatim_and_saves_it() {
    let body = json!({
        "data": {
            "text": "Wikipedia – Die freie Enzyklopädie",
            "links": ["https://en.wikipedia.org/"],
            "sections": [{"title": "Main"}]
        },
        "metadata": {
            "finalUrl": "https://www.wikipedia.org/",
            "loadTime": 640,
            "contentLength": 52110
        }
    });

    let mut server = Server::new();
    let mock = server
        .mock("POST", "/api/crawl/url")
        .match_header(API_KEY_HEADER, "test-key")
        .match_header("content-type", "application/json")
        .match_body(Matcher::Json(json!({
            "url": "https://www.wikipedia.org/",
            "options": {
                "extractText": true,
                "extractLinks": true,
                "extractMeta": true,
                "screenshot": false
            }
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body.to_string())
        .create();

    let mut api = client_for(&server);
    api.set_api_key("test-key");
    let result = api
        .crawl("https://www.wikipedia.org/", Some(&CrawlOptions::full_page()))
        .expect("crawl should succeed");
    assert_eq!(result, body);
    mock.assert();

    let dir = tempfile::tempdir().unwrap();
    let path = save_result(&result, dir.path(), "crawl_result", 1_717_000_000).unwrap();
    let saved: Value = serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
    assert_eq!(saved, body);
}

#[test]
fn crawl_without_options_sends_only_url() {
    let mut server = Server::new();
    let mock = server
        .mock("POST", "/api/crawl/url")
        .match_body(Matcher::Json(json!({"url": "https://example.com"})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"data":{},"metadata":{}}"#)
        .expect(2)
        .create();

    let mut api = client_for(&server);
    api.set_api_key("k");
    assert!(api.crawl("https://example.com", None).is_some());
    assert!(api
        .crawl("https://example.com", Some(&CrawlOptions::default()))
        .is_some());
    mock.assert();
}

#[test]
fn crawl_error_status_returns_none() {
    let mut server = Server::new();
    let mock = server
        .mock("POST", "/api/crawl/url")
        .with_status(401)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error":"invalid api key"}"#)
        .create();

    let mut api = client_for(&server);
    api.set_api_key("revoked");
    assert!(api.crawl("https://example.com", None).is_none());
    mock.assert();
}

#[test]
fn crawl_server_error_with_text_body_returns_none() {
    let mut server = Server::new();
    server
        .mock("POST", "/api/crawl/url")
        .with_status(502)
        .with_body("Bad Gateway")
        .create();

    let mut api = client_for(&server);
    api.set_api_key("k");
    assert!(api.crawl("https://example.com", None).is_none());
}

#[test]
fn history_sends_key_and_returns_jobs() {
    let mut server = Server::new();
    let mock = server
        .mock("GET", "/api/crawl/history")
        .match_header(API_KEY_HEADER, "hist-key")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"jobs":[{"job_id":"j1","created_at":"2024-05-01T10:00:00Z"}]}"#)
        .create();

    let mut api = client_for(&server);
    api.set_api_key("hist-key");
    let history = api.fetch_history().expect("history should load");
    assert_eq!(history["jobs"][0]["job_id"], "j1");
    mock.assert();
}

#[test]
fn history_error_status_returns_none() {
    let mut server = Server::new();
    server
        .mock("GET", "/api/crawl/history")
        .with_status(500)
        .create();

    let mut api = client_for(&server);
    api.set_api_key("k");
    assert!(api.fetch_history().is_none());
}

#[test]
fn connection_errors_are_reported_as_failures() {
    let mut api = ApiClient::new(UNREACHABLE).unwrap();
    assert!(!api.register("a@example.com", "pw", "A", "B"));
    assert!(!api.has_api_key());

    api.set_api_key("k");
    assert!(api.crawl("https://example.com", None).is_none());
    assert!(api.fetch_history().is_none());
}

#[test]
fn trailing_slash_in_base_url_still_hits_api_paths() {
    let mut server = Server::new();
    let mock = server
        .mock("GET", "/api/crawl/history")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"jobs":[]}"#)
        .create();

    let mut api = ApiClient::new(&format!("{}/", server.url())).unwrap();
    api.set_api_key("k");
    assert!(api.fetch_history().is_some());
    mock.assert();
}
