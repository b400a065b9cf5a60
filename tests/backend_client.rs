//! Page rendering over the real HTTP backend client.

use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::{Request, StatusCode};

use storefront_ssr::config::{Environment, SsrConfig};
use storefront_ssr::http::{AppRuntime, HttpServer};

mod common;
use common::{body_text, get, send, set_cookies, start_programmable_backend, MockReply, RecordedRequest};

fn config_for(backend: &str) -> SsrConfig {
    let mut config = SsrConfig {
        environment: Environment::Production,
        ..SsrConfig::default()
    };
    config.backend.base_url = backend.to_string();
    config.backend.connect_timeout_secs = 1;
    config
}

fn json(body: &str) -> MockReply {
    MockReply::ok(body).header("content-type", "application/json")
}

/// Canned backend replies keyed by endpoint path.
fn reply_for(request: &RecordedRequest) -> MockReply {
    let path = request.target.split('?').next().unwrap_or_default();
    match path {
        "/api/v2/content/pageByUrl" => json(
            r#"{"page":{"type":"ContentPage","fields":{"title":"About us"},"widgets":[]}}"#,
        )
        .header("set-cookie", "SessionId=s1; Path=/")
        .header("set-cookie", "CurrentCartId=c%3B1; Path=/"),
        "/api/v1/siteMessages" => json(r#"{"siteMessages":[]}"#),
        "/api/v1/translationDictionaries" => json(r#"{"translationDictionaries":[]}"#),
        p if p.starts_with("/api/") => json("{}"),
        _ => MockReply {
            status: 404,
            headers: Vec::new(),
            body: String::new(),
        },
    }
}

#[tokio::test]
async fn backend_cookies_and_lookup_query_cross_the_wire() {
    let seen: Arc<Mutex<Vec<RecordedRequest>>> = Arc::default();
    let recorder = seen.clone();
    let backend = start_programmable_backend(move |request| {
        let reply = reply_for(&request);
        recorder.lock().unwrap().push(request);
        async move { reply }
    })
    .await;

    let runtime = AppRuntime::from_config(config_for(&format!("http://{backend}"))).unwrap();
    let server = HttpServer::new(runtime);

    let request = Request::builder()
        .uri("/Content/Page/42")
        .header("cookie", "Existing=a%20b")
        .body(Body::empty())
        .unwrap();
    let response = send(&server, request).await;

    assert_eq!(response.status(), StatusCode::OK);
    let cookies = set_cookies(&response);
    assert!(cookies.iter().any(|c| c.starts_with("SessionId=s1")), "{cookies:?}");
    assert!(cookies.iter().any(|c| c.starts_with("CurrentCartId=c%3B1")), "{cookies:?}");
    assert!(body_text(response).await.contains("<title>About us</title>"));

    let seen = seen.lock().unwrap();
    let lookup = seen
        .iter()
        .find(|r| r.target.starts_with("/api/v2/content/pageByUrl"))
        .expect("page lookup reached the backend");
    assert!(lookup.target.contains("url=%2FContent%2FPage%2F42"));
    assert!(lookup.target.contains("bypassfilters=true"));
    assert_eq!(lookup.header("cookie"), Some("Existing=a%20b"));

    let theme = seen
        .iter()
        .find(|r| r.target.starts_with("/api/v2/content/theme"))
        .expect("theme reached the backend");
    let theme_cookies = theme.header("cookie").unwrap_or_default();
    assert!(theme_cookies.contains("SessionId=s1"));
    assert!(theme_cookies.contains("Existing=a%20b"));
}

#[tokio::test]
async fn unreachable_backend_still_renders_document() {
    let closed = {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };

    let runtime = AppRuntime::from_config(config_for(&format!("http://{closed}"))).unwrap();
    let server = HttpServer::new(runtime);

    let response = send(&server, get("/Catalog/Shoes")).await;

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.ends_with("</body></html>"));
    assert!(html.contains("unhandled-error"));
}
