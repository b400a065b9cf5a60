//! Verbatim forwarding of relay-endpoint and sitemap requests to the backend.
//!
//! # Responsibilities
//! - Rebuild the request against the backend base URL (path and query kept)
//! - Strip hop-by-hop headers in both directions
//! - Stream the backend's reply back unchanged otherwise
//!
//! # Design Decisions
//! - No retries: relayed requests may not be idempotent
//! - A single deadline covers connect and response head

use std::time::Duration;

use axum::body::Body;
use axum::http::header::{CONNECTION, HOST};
use axum::http::{HeaderMap, HeaderName, HeaderValue, Request, Uri};
use axum::response::Response;
use hyper::body::Incoming;

use crate::error::SsrError;
use crate::handlers::HandlerContext;
use crate::http::request::IncomingRequest;

const HOP_BY_HOP: [&str; 8] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Remove hop-by-hop headers, including any named by `Connection`.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let listed: Vec<HeaderName> = headers
        .get_all(CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();
    for name in listed {
        headers.remove(name);
    }
    for name in HOP_BY_HOP {
        headers.remove(name);
    }
}

/// Backend URI for a relayed path and query.
pub fn upstream_uri(base_url: &str, original_url: &str) -> Result<Uri, SsrError> {
    format!("{}{}", base_url.trim_end_matches('/'), original_url)
        .parse::<Uri>()
        .map_err(|e| SsrError::Relay(format!("invalid upstream URI: {e}")))
}

pub async fn relay(ctx: &HandlerContext<'_>, request: IncomingRequest) -> Result<Response, SsrError> {
    let config = &ctx.runtime.config;
    let uri = upstream_uri(&config.backend.base_url, &request.original_url)?;

    let mut headers = request.headers.clone();
    strip_hop_by_hop(&mut headers);
    if let Some(host) = headers.remove(HOST) {
        headers.insert(HeaderName::from_static("x-forwarded-host"), host);
    }
    if let Some(ip) = ctx
        .request_context
        .client_ip
        .as_deref()
        .and_then(|ip| HeaderValue::from_str(ip).ok())
    {
        headers.insert(HeaderName::from_static("x-forwarded-for"), ip);
    }

    let mut upstream = Request::builder()
        .method(request.method.clone())
        .uri(uri)
        .body(Body::from(request.body))
        .map_err(|e| SsrError::Relay(e.to_string()))?;
    *upstream.headers_mut() = headers;

    tracing::debug!(
        request_id = %request.request_id,
        method = %request.method,
        url = %request.original_url,
        "Relaying request"
    );

    let deadline = Duration::from_secs(config.timeouts.relay_secs);
    let response: hyper::Response<Incoming> = match tokio::time::timeout(
        deadline,
        ctx.runtime.relay.request(upstream),
    )
    .await
    {
        Ok(Ok(response)) => response,
        Ok(Err(e)) => return Err(SsrError::Relay(e.to_string())),
        Err(_) => {
            return Err(SsrError::Relay(format!(
                "no response within {}s",
                config.timeouts.relay_secs
            )))
        }
    };

    let (mut parts, body) = response.into_parts();
    strip_hop_by_hop(&mut parts.headers);
    Ok(Response::from_parts(parts, Body::new(body)))
}
