//! Request handling and request-scoped context.
//!
//! # Responsibilities
//! - Capture the incoming request once (method, path, headers, cookies, query, body)
//! - Normalize the client address from the forwarded-for chain
//! - Build the absolute URL of the request
//!
//! # Design Decisions
//! - `IncomingRequest` is immutable for the duration of a request
//! - Cookie values are decoded here, once
//! - Request ID is taken from the `x-request-id` layer output

use std::collections::BTreeMap;
use std::net::SocketAddr;

use axum::body::{Body, Bytes};
use axum::extract::ConnectInfo;
use axum::http::header::{COOKIE, HOST};
use axum::http::{HeaderMap, HeaderName, HeaderValue, Method, Request};

use crate::error::SsrError;
use crate::session::cookies::parse_cookie_header;

pub const X_REQUEST_ID: &str = "x-request-id";

/// A browser request as seen by the dispatcher.
#[derive(Debug, Clone)]
pub struct IncomingRequest {
    pub method: Method,
    /// Path without query.
    pub path: String,
    /// Path and query, as received.
    pub original_url: String,
    pub headers: HeaderMap,
    /// Decoded cookie values.
    pub cookies: BTreeMap<String, String>,
    pub query: Vec<(String, String)>,
    pub body: Bytes,
    pub remote_addr: Option<SocketAddr>,
    pub request_id: String,
}

impl IncomingRequest {
    /// Capture an axum request, buffering at most `max_body` bytes of body.
    pub async fn from_http(request: Request<Body>, max_body: usize) -> Result<Self, SsrError> {
        let (parts, body) = request.into_parts();
        let body = axum::body::to_bytes(body, max_body)
            .await
            .map_err(|e| SsrError::Body(e.to_string()))?;

        let remote_addr = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);
        let original_url = parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| parts.uri.path().to_string());

        Ok(Self::assemble(
            parts.method,
            &original_url,
            parts.headers,
            body,
            remote_addr,
        ))
    }

    fn assemble(
        method: Method,
        original_url: &str,
        headers: HeaderMap,
        body: Bytes,
        remote_addr: Option<SocketAddr>,
    ) -> Self {
        let (path, query_string) = match original_url.split_once('?') {
            Some((path, query)) => (path, query),
            None => (original_url, ""),
        };

        let cookie_header = headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect::<Vec<_>>()
            .join("; ");
        let cookies = parse_cookie_header(&cookie_header);

        let query = url::form_urlencoded::parse(query_string.as_bytes())
            .into_owned()
            .collect();

        let request_id = headers
            .get(X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("unknown")
            .to_string();

        Self {
            method,
            path: if path.is_empty() { "/".to_string() } else { path.to_string() },
            original_url: original_url.to_string(),
            headers,
            cookies,
            query,
            body,
            remote_addr,
            request_id,
        }
    }

    /// Start building a request for `url` (path plus optional query).
    pub fn builder(url: &str) -> IncomingRequestBuilder {
        IncomingRequestBuilder {
            method: Method::GET,
            url: url.to_string(),
            headers: HeaderMap::new(),
            cookies: Vec::new(),
            body: Bytes::new(),
            remote_addr: None,
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Decoded value of a request cookie. Empty values count as missing.
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies
            .get(name)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    /// Whether a query parameter with this name (any case) is present.
    pub fn has_query_param(&self, name: &str) -> bool {
        self.query.iter().any(|(k, _)| k.eq_ignore_ascii_case(name))
    }

    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Everything from `?` on, or an empty string.
    pub fn query_suffix(&self) -> &str {
        self.original_url
            .find('?')
            .map(|i| &self.original_url[i..])
            .unwrap_or("")
    }
}

/// Builder used by tests and internal callers.
#[derive(Debug)]
pub struct IncomingRequestBuilder {
    method: Method,
    url: String,
    headers: HeaderMap,
    cookies: Vec<(String, String)>,
    body: Bytes,
    remote_addr: Option<SocketAddr>,
}

impl IncomingRequestBuilder {
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Add a header. Invalid names or values are skipped.
    pub fn header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            self.headers.append(name, value);
        }
        self
    }

    /// Add a cookie with a decoded value.
    pub fn cookie(mut self, name: &str, value: &str) -> Self {
        self.cookies.push((name.to_string(), value.to_string()));
        self
    }

    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn remote_addr(mut self, addr: SocketAddr) -> Self {
        self.remote_addr = Some(addr);
        self
    }

    pub fn build(self) -> IncomingRequest {
        let mut request = IncomingRequest::assemble(
            self.method,
            &self.url,
            self.headers,
            self.body,
            self.remote_addr,
        );
        for (name, value) in self.cookies {
            request.cookies.insert(name, value);
        }
        request
    }
}

/// Request-scoped context initialised before routing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    /// Backend domain the request is served against.
    pub domain: String,
    /// Normalized client address.
    pub client_ip: Option<String>,
    /// Absolute URL of the request.
    pub url: String,
}

impl RequestContext {
    pub fn new(request: &IncomingRequest, domain: &str) -> Self {
        Self {
            domain: domain.to_string(),
            client_ip: normalize_client_ip(&request.headers, request.remote_addr),
            url: absolute_url(request),
        }
    }
}

/// Last hop of the `x-forwarded-for` chain, else the socket peer.
pub fn normalize_client_ip(headers: &HeaderMap, remote_addr: Option<SocketAddr>) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|chain| chain.rsplit(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .map(str::to_string)
        .or_else(|| remote_addr.map(|addr| addr.ip().to_string()))
}

fn absolute_url(request: &IncomingRequest) -> String {
    let scheme = request
        .header("x-forwarded-proto")
        .and_then(|p| p.split(',').next())
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .unwrap_or("http");
    let host = request
        .headers
        .get(HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");
    format!("{scheme}://{host}{}", request.original_url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_ip_is_last_forwarded_hop() {
        let req = IncomingRequest::builder("/")
            .header("x-forwarded-for", "10.0.0.1, 192.168.1.5 ")
            .remote_addr("127.0.0.1:9999".parse().unwrap())
            .build();
        assert_eq!(
            normalize_client_ip(&req.headers, req.remote_addr).as_deref(),
            Some("192.168.1.5")
        );
    }

    #[test]
    fn client_ip_falls_back_to_peer() {
        let req = IncomingRequest::builder("/")
            .header("x-forwarded-for", " ")
            .remote_addr("127.0.0.1:9999".parse().unwrap())
            .build();
        assert_eq!(
            normalize_client_ip(&req.headers, req.remote_addr).as_deref(),
            Some("127.0.0.1")
        );
    }

    #[test]
    fn context_builds_absolute_url() {
        let req = IncomingRequest::builder("/Catalog/Shoes?page=2")
            .header("host", "shop.example")
            .header("x-forwarded-proto", "https")
            .build();
        let ctx = RequestContext::new(&req, "http://backend");
        assert_eq!(ctx.url, "https://shop.example/Catalog/Shoes?page=2");
        assert_eq!(ctx.domain, "http://backend");
    }

    #[test]
    fn query_and_cookies_are_parsed() {
        let req = IncomingRequest::builder("/p?DisableSSR=1&x=a%20b")
            .header("cookie", "a=1; b=two%20words")
            .build();
        assert_eq!(req.path, "/p");
        assert!(req.has_query_param("disablessr"));
        assert_eq!(req.query_param("x"), Some("a b"));
        assert_eq!(req.cookie("b"), Some("two words"));
        assert_eq!(req.query_suffix(), "?DisableSSR=1&x=a%20b");
    }

    #[test]
    fn empty_cookie_counts_as_missing() {
        let req = IncomingRequest::builder("/")
            .header("cookie", "SetContextLanguageCode=; ContentMode=Editing")
            .build();
        assert_eq!(req.cookie("SetContextLanguageCode"), None);
        assert_eq!(req.cookie("ContentMode"), Some("Editing"));
    }

    #[tokio::test]
    async fn from_http_reads_connect_info_and_body() {
        let mut http = Request::builder()
            .method("POST")
            .uri("/api/v1/carts?x=1")
            .header(X_REQUEST_ID, "req-1")
            .body(Body::from("payload"))
            .unwrap();
        http.extensions_mut()
            .insert(ConnectInfo("10.1.1.1:1234".parse::<SocketAddr>().unwrap()));

        let req = IncomingRequest::from_http(http, 1024).await.unwrap();
        assert_eq!(req.method, Method::POST);
        assert_eq!(req.original_url, "/api/v1/carts?x=1");
        assert_eq!(req.body, Bytes::from("payload"));
        assert_eq!(req.request_id, "req-1");
        assert_eq!(req.remote_addr.unwrap().port(), 1234);
    }
}
