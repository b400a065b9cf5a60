//! HTTP client for the backend content API.
//!
//! # Responsibilities
//! - Build endpoint URLs from the configured base URL
//! - Replay the browser's forwarded headers and session cookies
//! - Map transport/status/decode failures to `BackendError`
//! - Collect backend-issued `Set-Cookie` headers from page lookups

use std::time::Duration;

use async_trait::async_trait;
use axum::http::header::{COOKIE, SET_COOKIE};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use url::Url;

use crate::backend::types::{SiteMessageCollection, TranslationDictionaryCollection};
use crate::backend::{
    ApiSession, BackendError, BackendResult, ContentApi, PageByUrlResponse, RetrievePageResult,
    SiteGenerator, SiteMessage, TranslationEntry,
};
use crate::bootstrap::templates::TemplateStore;
use crate::config::BackendConfig;
use crate::observability::metrics;

pub mod endpoints {
    pub const PAGE_BY_URL: &str = "/api/v2/content/pageByUrl";
    pub const PAGE_URL: &str = "/api/v2/content/pageUrl";
    pub const THEME: &str = "/api/v2/content/theme";
    pub const ROBOTS: &str = "/api/v2/content/robotsTxt";
    pub const SITE_MESSAGES: &str = "/api/v1/siteMessages";
    pub const TRANSLATION_DICTIONARIES: &str = "/api/v1/translationDictionaries";
    pub const SESSION: &str = "/api/v1/sessions/current";
    pub const WEBSITE: &str = "/api/v1/websites/current";
    pub const SETTINGS: &str = "/api/v1/settings";
    pub const SITE_GENERATION: &str = "/api/internal/contentadmin/siteGeneration";
    pub const TRANSLATION_GENERATION: &str = "/api/internal/contentadmin/translationGeneration";
}

/// `ContentApi` and `SiteGenerator` backed by the real backend over HTTP.
#[derive(Debug, Clone)]
pub struct HttpContentApi {
    client: Client,
    base_url: Url,
    templates: TemplateStore,
}

impl HttpContentApi {
    pub fn new(config: &BackendConfig, templates: TemplateStore) -> BackendResult<Self> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| BackendError::InvalidUrl(format!("{}: {}", config.base_url, e)))?;

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|source| BackendError::Transport {
                endpoint: config.base_url.clone(),
                source,
            })?;

        Ok(Self {
            client,
            base_url,
            templates,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str, query: &[(&str, &str)]) -> BackendResult<Url> {
        let mut url = self
            .base_url
            .join(path)
            .map_err(|e| BackendError::InvalidUrl(format!("{path}: {e}")))?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    fn get(&self, url: Url, session: &ApiSession) -> RequestBuilder {
        let mut request = self.client.get(url).headers(session.headers.clone());
        if let Some(cookies) = session.cookies.to_header_value() {
            request = request.header(COOKIE, cookies);
        }
        request
    }

    async fn send(&self, request: RequestBuilder, endpoint: &str) -> BackendResult<Response> {
        let response = request.send().await.map_err(|source| {
            metrics::record_backend_failure(endpoint);
            BackendError::Transport {
                endpoint: endpoint.to_string(),
                source,
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            metrics::record_backend_failure(endpoint);
            return Err(BackendError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response)
    }

    async fn decode<T: DeserializeOwned>(response: Response, endpoint: &str) -> BackendResult<T> {
        response.json::<T>().await.map_err(|e| BackendError::Decode {
            endpoint: endpoint.to_string(),
            message: e.to_string(),
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        session: &ApiSession,
    ) -> BackendResult<T> {
        let url = self.endpoint(path, query)?;
        let response = self.send(self.get(url, session), path).await?;
        Self::decode(response, path).await
    }

    async fn post_json(&self, path: &str, body: &Value) -> BackendResult<()> {
        let url = self.endpoint(path, &[])?;
        self.send(self.client.post(url).json(body), path).await?;
        Ok(())
    }
}

#[async_trait]
impl ContentApi for HttpContentApi {
    async fn page_by_url(
        &self,
        url: &str,
        bypass_filters: bool,
        session: &ApiSession,
    ) -> BackendResult<PageByUrlResponse> {
        let mut query = vec![("url", url)];
        if bypass_filters {
            query.push(("bypassfilters", "true"));
        }
        let endpoint = self.endpoint(endpoints::PAGE_BY_URL, &query)?;
        let response = self
            .send(self.get(endpoint, session), endpoints::PAGE_BY_URL)
            .await?;

        let set_cookies = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .map(str::to_string)
            .collect();
        let result: RetrievePageResult = Self::decode(response, endpoints::PAGE_BY_URL).await?;

        Ok(PageByUrlResponse {
            result,
            set_cookies,
        })
    }

    async fn page_url_by_type(
        &self,
        page_type: &str,
        session: &ApiSession,
    ) -> BackendResult<Option<String>> {
        let value: Value = self
            .get_json(endpoints::PAGE_URL, &[("pageType", page_type)], session)
            .await?;
        let url = match value {
            Value::String(url) => Some(url),
            Value::Object(map) => map.get("url").and_then(Value::as_str).map(str::to_string),
            _ => None,
        };
        Ok(url.filter(|u| !u.is_empty()))
    }

    async fn site_messages(
        &self,
        language_code: Option<&str>,
        session: &ApiSession,
    ) -> BackendResult<Vec<SiteMessage>> {
        // Language-neutral messages are requested alongside the language's own.
        let languages = language_code.map(|code| format!("{code},null"));
        let query: Vec<(&str, &str)> = languages
            .as_deref()
            .map(|l| vec![("languageCode", l)])
            .unwrap_or_default();
        let collection: SiteMessageCollection = self
            .get_json(endpoints::SITE_MESSAGES, &query, session)
            .await?;
        Ok(collection.site_messages)
    }

    async fn translation_dictionaries(
        &self,
        language_code: Option<&str>,
        page_size: u32,
        session: &ApiSession,
    ) -> BackendResult<Vec<TranslationEntry>> {
        let page_size = page_size.to_string();
        let mut query = vec![("pageSize", page_size.as_str())];
        if let Some(code) = language_code {
            query.push(("languageCode", code));
        }
        let collection: TranslationDictionaryCollection = self
            .get_json(endpoints::TRANSLATION_DICTIONARIES, &query, session)
            .await?;
        Ok(collection.translation_dictionaries)
    }

    async fn theme(&self, session: &ApiSession) -> BackendResult<Value> {
        self.get_json(endpoints::THEME, &[], session).await
    }

    async fn session_context(&self, session: &ApiSession) -> BackendResult<Value> {
        let (session_value, website, settings) = tokio::try_join!(
            self.get_json::<Value>(endpoints::SESSION, &[], session),
            self.get_json::<Value>(endpoints::WEBSITE, &[], session),
            self.get_json::<Value>(endpoints::SETTINGS, &[], session),
        )?;
        Ok(json!({
            "session": session_value,
            "website": website,
            "settings": settings,
        }))
    }

    async fn robots_txt(&self, session: &ApiSession) -> BackendResult<String> {
        let url = self.endpoint(endpoints::ROBOTS, &[])?;
        let response = self.send(self.get(url, session), endpoints::ROBOTS).await?;
        response.text().await.map_err(|e| BackendError::Decode {
            endpoint: endpoints::ROBOTS.to_string(),
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl SiteGenerator for HttpContentApi {
    async fn generate_site_if_needed(&self) -> BackendResult<()> {
        let templates = self
            .templates
            .load_all()
            .await
            .map_err(|e| BackendError::Unavailable(e.to_string()))?;
        tracing::debug!(templates = templates.len(), "Submitting templates for site generation");
        self.post_json(endpoints::SITE_GENERATION, &json!({ "templates": templates }))
            .await
    }

    async fn generate_translations(&self) -> BackendResult<()> {
        self.post_json(endpoints::TRANSLATION_GENERATION, &json!({}))
            .await
    }
}
