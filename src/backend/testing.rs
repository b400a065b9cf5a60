//! In-memory `ContentApi` / `SiteGenerator` used by tests.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use serde_json::Value;

use crate::backend::{
    ApiSession, BackendError, BackendResult, ContentApi, PageByUrlResponse, RetrievePageResult,
    SiteGenerator, SiteMessage, TranslationEntry,
};
use crate::render::{RenderContext, ShellContext, Store};

fn unavailable(endpoint: &str) -> BackendError {
    BackendError::Status {
        endpoint: endpoint.to_string(),
        status: 503,
    }
}

/// Canned backend. Unset responses fail with a 503.
#[derive(Debug, Default)]
pub struct FakeContentApi {
    pub page: Option<RetrievePageResult>,
    pub set_cookies: Vec<String>,
    pub page_urls: BTreeMap<String, String>,
    pub site_messages: Vec<SiteMessage>,
    pub translations: Vec<TranslationEntry>,
    pub theme: Option<Value>,
    pub context: Option<Value>,
    pub robots: Option<String>,
    pub fail_site_generation: bool,
    pub fail_translation_generation: bool,
    pub site_generations: AtomicUsize,
    pub translation_generations: AtomicUsize,
    pub page_lookups: AtomicUsize,
    pub(crate) page_sessions: Mutex<Vec<ApiSession>>,
    pub(crate) page_requests: Mutex<Vec<(String, bool)>>,
    pub(crate) message_languages: Mutex<Vec<Option<String>>>,
}

impl FakeContentApi {
    pub fn with_page(mut self, page: RetrievePageResult) -> Self {
        self.page = Some(page);
        self
    }

    pub fn with_set_cookie(mut self, header: &str) -> Self {
        self.set_cookies.push(header.to_string());
        self
    }

    pub fn with_page_url(mut self, page_type: &str, url: &str) -> Self {
        self.page_urls.insert(page_type.to_string(), url.to_string());
        self
    }

    pub fn with_theme(mut self, theme: Value) -> Self {
        self.theme = Some(theme);
        self
    }

    pub fn with_robots(mut self, robots: &str) -> Self {
        self.robots = Some(robots.to_string());
        self
    }

    pub fn with_site_message(mut self, name: &str, message: &str, language: Option<&str>) -> Self {
        self.site_messages.push(SiteMessage {
            name: name.to_string(),
            message: message.to_string(),
            language_code: language.map(str::to_string),
        });
        self
    }

    /// Make site generation fail with a 503.
    pub fn failing_site_generation(mut self) -> Self {
        self.fail_site_generation = true;
        self
    }

    pub fn with_context(mut self, context: Value) -> Self {
        self.context = Some(context);
        self
    }

    /// Sessions that page lookups were made with, in call order.
    pub fn page_sessions(&self) -> Vec<ApiSession> {
        self.page_sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Language codes site messages were requested with, in call order.
    pub fn message_languages(&self) -> Vec<Option<String>> {
        self.message_languages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// `(url, bypass_filters)` of every page lookup, in call order.
    pub fn page_requests(&self) -> Vec<(String, bool)> {
        self.page_requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl ContentApi for FakeContentApi {
    async fn page_by_url(
        &self,
        url: &str,
        bypass_filters: bool,
        session: &ApiSession,
    ) -> BackendResult<PageByUrlResponse> {
        self.page_lookups.fetch_add(1, Ordering::SeqCst);
        self.page_requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((url.to_string(), bypass_filters));
        self.page_sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(session.clone());
        let result = self.page.clone().ok_or_else(|| unavailable("pageByUrl"))?;
        Ok(PageByUrlResponse {
            result,
            set_cookies: self.set_cookies.clone(),
        })
    }

    async fn page_url_by_type(
        &self,
        page_type: &str,
        _session: &ApiSession,
    ) -> BackendResult<Option<String>> {
        Ok(self.page_urls.get(page_type).cloned())
    }

    async fn site_messages(
        &self,
        language_code: Option<&str>,
        _session: &ApiSession,
    ) -> BackendResult<Vec<SiteMessage>> {
        self.message_languages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(language_code.map(str::to_string));
        Ok(self.site_messages.clone())
    }

    async fn translation_dictionaries(
        &self,
        _language_code: Option<&str>,
        _page_size: u32,
        _session: &ApiSession,
    ) -> BackendResult<Vec<TranslationEntry>> {
        Ok(self.translations.clone())
    }

    async fn theme(&self, _session: &ApiSession) -> BackendResult<Value> {
        self.theme.clone().ok_or_else(|| unavailable("theme"))
    }

    async fn session_context(&self, _session: &ApiSession) -> BackendResult<Value> {
        self.context.clone().ok_or_else(|| unavailable("sessions/current"))
    }

    async fn robots_txt(&self, _session: &ApiSession) -> BackendResult<String> {
        self.robots.clone().ok_or_else(|| unavailable("robotsTxt"))
    }
}

#[async_trait]
impl SiteGenerator for FakeContentApi {
    async fn generate_site_if_needed(&self) -> BackendResult<()> {
        self.site_generations.fetch_add(1, Ordering::SeqCst);
        if self.fail_site_generation {
            return Err(unavailable("siteGeneration"));
        }
        Ok(())
    }

    async fn generate_translations(&self) -> BackendResult<()> {
        self.translation_generations.fetch_add(1, Ordering::SeqCst);
        if self.fail_translation_generation {
            return Err(unavailable("translationGeneration"));
        }
        Ok(())
    }
}

/// A render context over `api` with an empty store and no localization.
pub fn test_context(api: Arc<dyn ContentApi>, location: &str) -> Arc<RenderContext> {
    Arc::new(RenderContext {
        store: Arc::new(Store::new()),
        api,
        session: Arc::new(ApiSession::default()),
        location: location.to_string(),
        shell: ShellContext::default(),
        theme: Arc::new(Value::Null),
        site_messages: Arc::default(),
        translations: Arc::default(),
    })
}
