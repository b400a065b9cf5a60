//! Backend API payloads and error definitions.

use axum::http::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::session::SessionCookieSet;

/// Errors that can occur while talking to the backend content API.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Connection failed or the request could not be sent.
    #[error("Backend request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// The backend answered with a non-success status.
    #[error("Backend returned {status} for {endpoint}")]
    Status { endpoint: String, status: u16 },

    /// The response body could not be decoded.
    #[error("Invalid response from {endpoint}: {message}")]
    Decode { endpoint: String, message: String },

    /// The configured base URL cannot be joined with an endpoint.
    #[error("Invalid backend URL: {0}")]
    InvalidUrl(String),

    /// Local input for a backend call could not be prepared.
    #[error("Backend call not possible: {0}")]
    Unavailable(String),
}

pub type BackendResult<T> = Result<T, BackendError>;

/// Headers that are forwarded from the browser request to backend calls.
pub const FORWARDED_HEADERS: [&str; 4] = [
    "x-forwarded-for",
    "user-agent",
    "accept-language",
    "x-forwarded-proto",
];

/// Identity of the browser request, replayed on every backend call made for it.
#[derive(Debug, Clone, Default)]
pub struct ApiSession {
    pub headers: HeaderMap,
    pub cookies: SessionCookieSet,
}

impl ApiSession {
    /// Keep the forwarded subset of `headers`, overriding `x-forwarded-for`
    /// with the normalized client address.
    pub fn new(headers: &HeaderMap, client_ip: Option<&str>, cookies: SessionCookieSet) -> Self {
        let mut forwarded = HeaderMap::new();
        for name in FORWARDED_HEADERS {
            if let Some(value) = headers.get(name) {
                forwarded.insert(HeaderName::from_static(name), value.clone());
            }
        }
        if let Some(ip) = client_ip.and_then(|ip| HeaderValue::from_str(ip).ok()) {
            forwarded.insert(HeaderName::from_static("x-forwarded-for"), ip);
        }
        Self {
            headers: forwarded,
            cookies,
        }
    }

    /// Same forwarded headers, different cookie set.
    pub fn with_cookies(&self, cookies: SessionCookieSet) -> Self {
        Self {
            headers: self.headers.clone(),
            cookies,
        }
    }
}

/// Page lookup result as returned by the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RetrievePageResult {
    pub page: Option<Value>,
    pub status_code: Option<u16>,
    pub redirect_to: Option<String>,
}

/// A page lookup together with the cookies the backend issued.
#[derive(Debug, Clone, Default)]
pub struct PageByUrlResponse {
    pub result: RetrievePageResult,
    /// Raw `Set-Cookie` header values, in order.
    pub set_cookies: Vec<String>,
}

/// One localized site message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteMessage {
    pub name: String,
    pub message: String,
    #[serde(default)]
    pub language_code: Option<String>,
}

/// One translation dictionary entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationEntry {
    pub keyword: String,
    pub translation: String,
    #[serde(default)]
    pub language_code: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SiteMessageCollection {
    #[serde(default)]
    pub site_messages: Vec<SiteMessage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TranslationDictionaryCollection {
    #[serde(default)]
    pub translation_dictionaries: Vec<TranslationEntry>,
}

/// A CMS page template submitted during site generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageTemplate {
    pub path: String,
    pub content: Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_keeps_forwarded_subset_and_normalized_ip() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("1.1.1.1, 2.2.2.2"));
        headers.insert("user-agent", HeaderValue::from_static("test"));
        headers.insert("authorization", HeaderValue::from_static("secret"));

        let session = ApiSession::new(&headers, Some("2.2.2.2"), SessionCookieSet::default());

        assert_eq!(session.headers.get("x-forwarded-for").unwrap(), "2.2.2.2");
        assert_eq!(session.headers.get("user-agent").unwrap(), "test");
        assert!(session.headers.get("authorization").is_none());
    }

    #[test]
    fn page_result_tolerates_missing_fields() {
        let result: RetrievePageResult =
            serde_json::from_str(r#"{"page": {"id": "1"}, "extra": 1}"#).unwrap();
        assert!(result.page.is_some());
        assert_eq!(result.status_code, None);
        assert_eq!(result.redirect_to, None);
    }
}
