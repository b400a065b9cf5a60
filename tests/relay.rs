//! Live-socket relay tests against a raw-TCP mock backend.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use storefront_ssr::backend::testing::FakeContentApi;
use storefront_ssr::config::{Environment, SsrConfig};
use storefront_ssr::lifecycle::Shutdown;

mod common;
use common::{server_with, start_programmable_backend, MockReply, RecordedRequest};

async fn start_host(backend: std::net::SocketAddr) -> (std::net::SocketAddr, Shutdown) {
    let mut config = SsrConfig {
        environment: Environment::Production,
        ..SsrConfig::default()
    };
    config.backend.base_url = format!("http://{backend}");
    config.timeouts.relay_secs = 2;

    let server = server_with(Arc::new(FakeContentApi::default()), config);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.clone();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });
    tokio::time::sleep(Duration::from_millis(50)).await;
    (addr, shutdown)
}

fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}

#[tokio::test]
async fn relay_endpoint_is_forwarded_verbatim() {
    let seen: Arc<Mutex<Vec<RecordedRequest>>> = Arc::default();
    let recorder = seen.clone();
    let backend = start_programmable_backend(move |request| {
        recorder.lock().unwrap().push(request);
        async { MockReply::ok(r#"{"cartId":"1"}"#).header("content-type", "application/json") }
    })
    .await;
    let (host, shutdown) = start_host(backend).await;

    let response = client()
        .post(format!("http://{host}/api/v1/carts/current?expand=cartLines"))
        .header("x-forwarded-for", "10.0.0.1, 192.168.0.9")
        .header("cookie", "CurrentCartId=abc")
        .body("payload")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "application/json"
    );
    assert_eq!(response.text().await.unwrap(), r#"{"cartId":"1"}"#);

    let seen = seen.lock().unwrap();
    let request = &seen[0];
    assert_eq!(request.method, "POST");
    assert_eq!(request.target, "/api/v1/carts/current?expand=cartLines");
    assert_eq!(request.header("cookie"), Some("CurrentCartId=abc"));
    assert_eq!(request.header("x-forwarded-for"), Some("192.168.0.9"));
    assert_eq!(request.header("x-forwarded-host"), Some(host.to_string().as_str()));
    assert_eq!(request.body, b"payload");

    shutdown.trigger();
}

#[tokio::test]
async fn sitemap_is_relayed_with_backend_status() {
    let backend = start_programmable_backend(|request| async move {
        if request.target == "/sitemap-products.xml" {
            MockReply {
                status: 404,
                headers: Vec::new(),
                body: "missing".to_string(),
            }
        } else {
            MockReply::ok("unexpected")
        }
    })
    .await;
    let (host, shutdown) = start_host(backend).await;

    let response = client()
        .get(format!("http://{host}/Sitemap-Products.xml"))
        .send()
        .await
        .unwrap();

    // Path casing is preserved on the way out; the mock only knows lowercase.
    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), "unexpected");

    let response = client()
        .get(format!("http://{host}/sitemap-products.xml"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);

    shutdown.trigger();
}

#[tokio::test]
async fn unreachable_backend_yields_bad_gateway() {
    // Bind and drop to get a port nobody listens on.
    let backend = {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };
    let (host, shutdown) = start_host(backend).await;

    let response = client()
        .get(format!("http://{host}/api/v1/websites/current"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 502);
    shutdown.trigger();
}
