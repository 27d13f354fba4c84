//! Tests for the redirect handler and HTTP server
//!
//! These tests verify:
//! - Hits redirect with 302 to the stored destination
//! - Misses follow the configured miss policy
//! - Store failures become 500 responses, not redirects
//! - The end-to-end startup scenario over a real socket

mod common;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use common::{pairs, write_maps};
use tempfile::TempDir;
use tokio::net::TcpListener;
use tower::ServiceExt;
use urlshort::http::{self, AppState, Decision};
use urlshort::merge::{merge_all, Source};
use urlshort::{Config, MissPolicy, Store};

// =============================================================================
// Helper Functions
// =============================================================================

/// Store seeded with the `/a`, `/b` scenario: defaults, then YAML, then JSON
fn scenario_store(temp: &TempDir) -> Store {
    let store = Store::open(temp.path().join("bolt.db")).unwrap();
    merge_all(
        &store,
        "default",
        [
            Source::new("defaults", pairs(&[("/a", "http://x")])),
            Source::new("yaml", pairs(&[("/b", "http://y")])),
            Source::new("json", pairs(&[("/a", "http://z")])),
        ],
    )
    .unwrap();
    store
}

fn app(store: Store, config: &Config) -> Router {
    http::router(AppState::new(Arc::new(store), config), config)
}

async fn send(app: Router, method: &str, uri: &str) -> axum::response::Response {
    app.oneshot(
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

fn location(response: &axum::response::Response) -> Option<&str> {
    response
        .headers()
        .get(header::LOCATION)
        .map(|v| v.to_str().unwrap())
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

// =============================================================================
// Redirect Tests
// =============================================================================

#[tokio::test]
async fn test_hit_redirects_to_destination() {
    let temp = TempDir::new().unwrap();
    let app = app(scenario_store(&temp), &Config::default());

    let response = send(app.clone(), "GET", "/a").await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), Some("http://z"));

    let response = send(app, "GET", "/b").await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), Some("http://y"));
}

#[tokio::test]
async fn test_any_method_is_a_lookup() {
    let temp = TempDir::new().unwrap();
    let app = app(scenario_store(&temp), &Config::default());

    let response = send(app, "POST", "/b").await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), Some("http://y"));
}

#[tokio::test]
async fn test_query_string_is_not_part_of_key() {
    let temp = TempDir::new().unwrap();
    let app = app(scenario_store(&temp), &Config::default());

    let response = send(app, "GET", "/b?utm=1").await;

    assert_eq!(location(&response), Some("http://y"));
}

#[tokio::test]
async fn test_percent_encoded_path_matches_decoded_key() {
    let temp = TempDir::new().unwrap();
    let store = scenario_store(&temp);
    store
        .put_all(
            "default",
            &pairs(&[("/café", "http://cafe"), ("/a b", "http://space")]),
        )
        .unwrap();
    let app = app(store, &Config::default());

    let response = send(app.clone(), "GET", "/caf%C3%A9").await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), Some("http://cafe"));

    let response = send(app, "GET", "/a%20b").await;
    assert_eq!(location(&response), Some("http://space"));
}

#[tokio::test]
async fn test_path_decoding_to_invalid_utf8_is_400() {
    let temp = TempDir::new().unwrap();
    let app = app(scenario_store(&temp), &Config::default());

    let response = send(app, "GET", "/%FF%FE").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(location(&response), None);
}

// =============================================================================
// Miss Policy Tests
// =============================================================================

#[tokio::test]
async fn test_miss_redirects_to_fallback() {
    let temp = TempDir::new().unwrap();
    let app = app(scenario_store(&temp), &Config::default());

    let response = send(app, "GET", "/c").await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), Some("/"));
}

#[tokio::test]
async fn test_fallback_location_itself_is_not_found() {
    let temp = TempDir::new().unwrap();
    let app = app(scenario_store(&temp), &Config::default());

    let response = send(app, "GET", "/").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(location(&response), None);
}

#[tokio::test]
async fn test_not_found_policy() {
    let temp = TempDir::new().unwrap();
    let config = Config::builder().miss_policy(MissPolicy::NotFound).build();
    let app = app(scenario_store(&temp), &config);

    let response = send(app, "GET", "/c").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(location(&response), None);
}

#[tokio::test]
async fn test_custom_fallback_location() {
    let temp = TempDir::new().unwrap();
    let config = Config::builder().fallback_location("/home").build();
    let app = app(scenario_store(&temp), &config);

    let response = send(app, "GET", "/c").await;

    assert_eq!(location(&response), Some("/home"));
}

#[tokio::test]
async fn test_empty_destination_counts_as_miss() {
    let temp = TempDir::new().unwrap();
    let store = scenario_store(&temp);
    store.put("default", b"/empty", b"").unwrap();
    let app = app(store, &Config::default());

    let response = send(app, "GET", "/empty").await;

    assert_eq!(location(&response), Some("/"));
}

// =============================================================================
// Error Tests
// =============================================================================

#[tokio::test]
async fn test_store_error_is_500_without_redirect() {
    let temp = TempDir::new().unwrap();
    let store = Store::open(temp.path().join("bolt.db")).unwrap();
    // bucket never created
    let app = app(store, &Config::default());

    let response = send(app, "GET", "/a").await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(location(&response), None);
    assert!(body_text(response).await.contains("Bucket not found: default"));
}

#[tokio::test]
async fn test_invalid_destination_is_500() {
    let temp = TempDir::new().unwrap();
    let store = scenario_store(&temp);
    store.put("default", b"/bad", b"http://x\r\nSet-Cookie: a=b").unwrap();
    let app = app(store, &Config::default());

    let response = send(app, "GET", "/bad").await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(location(&response), None);
}

#[tokio::test]
async fn test_router_with_request_timeout_still_redirects() {
    let temp = TempDir::new().unwrap();
    let config = Config::builder().request_timeout_ms(5_000).build();
    let app = app(scenario_store(&temp), &config);

    let response = send(app, "GET", "/b").await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), Some("http://y"));
}

#[test]
fn test_decide_without_http() {
    let temp = TempDir::new().unwrap();
    let state = AppState::new(Arc::new(scenario_store(&temp)), &Config::default());

    assert_eq!(state.decide("/a").unwrap(), Decision::Redirect("http://z".into()));
    assert_eq!(state.decide("/c").unwrap(), Decision::Fallback("/".into()));
    assert_eq!(state.decide("/").unwrap(), Decision::NotFound);
}

// =============================================================================
// End-to-End Tests
// =============================================================================

#[tokio::test]
async fn test_end_to_end_over_socket() {
    let temp = TempDir::new().unwrap();
    let config = write_maps(
        temp.path(),
        "- path: /b\n  url: http://y\n",
        r#"[{"path": "/a", "url": "http://z"}]"#,
    );

    let store = Store::open(&config.store_path).unwrap();
    urlshort::merge::seed(&store, &config).unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
    let server = tokio::spawn(http::serve(listener, app(store, &config), async move {
        let _ = stop_rx.await;
    }));

    let client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();

    for (path, status, expected) in [
        ("/a", 302, Some("http://z")),
        ("/b", 302, Some("http://y")),
        ("/c", 302, Some("/")),
        ("/urlshort-godoc", 302, Some("https://godoc.org/github.com/gophercises/urlshort")),
        ("/", 404, None),
    ] {
        let response = client
            .get(format!("http://{}{}", addr, path))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), status, "path {}", path);
        assert_eq!(
            response
                .headers()
                .get("location")
                .map(|v| v.to_str().unwrap()),
            expected,
            "path {}",
            path
        );
    }

    drop(client);
    stop_tx.send(()).unwrap();
    server.await.unwrap().unwrap();
}
