//! Backend content API subsystem.
//!
//! # Data Flow
//! ```text
//! page path / render tree / handlers
//!     → ContentApi (trait seam, faked in tests)
//!     → client.rs (reqwest, forwards ApiSession headers + cookies)
//!     → backend service
//!
//! bootstrap
//!     → SiteGenerator (content + translation generation)
//! ```
//!
//! # Design Decisions
//! - Every call is independently fallible; callers decide whether a
//!   failure is fatal, logged, or replaced by a default
//! - No per-call deadline: the render loop waits for whatever it queued

pub mod client;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;
pub mod types;

use async_trait::async_trait;
use serde_json::Value;

pub use client::HttpContentApi;
pub use types::{
    ApiSession, BackendError, BackendResult, PageByUrlResponse, PageTemplate, RetrievePageResult,
    SiteMessage, TranslationEntry,
};

/// Read access to the backend content API on behalf of one browser request.
#[async_trait]
pub trait ContentApi: Send + Sync {
    /// Look up the page for a URL; also returns backend-issued cookies.
    async fn page_by_url(
        &self,
        url: &str,
        bypass_filters: bool,
        session: &ApiSession,
    ) -> BackendResult<PageByUrlResponse>;

    /// Resolve the URL of the page of a given type.
    async fn page_url_by_type(
        &self,
        page_type: &str,
        session: &ApiSession,
    ) -> BackendResult<Option<String>>;

    async fn site_messages(
        &self,
        language_code: Option<&str>,
        session: &ApiSession,
    ) -> BackendResult<Vec<SiteMessage>>;

    async fn translation_dictionaries(
        &self,
        language_code: Option<&str>,
        page_size: u32,
        session: &ApiSession,
    ) -> BackendResult<Vec<TranslationEntry>>;

    async fn theme(&self, session: &ApiSession) -> BackendResult<Value>;

    /// Session, website and settings for the request, as one object.
    async fn session_context(&self, session: &ApiSession) -> BackendResult<Value>;

    async fn robots_txt(&self, session: &ApiSession) -> BackendResult<String>;
}

/// Process-level generation steps run by the bootstrap.
#[async_trait]
pub trait SiteGenerator: Send + Sync {
    /// Create content structure from templates when the site has none.
    async fn generate_site_if_needed(&self) -> BackendResult<()>;

    async fn generate_translations(&self) -> BackendResult<()>;
}
