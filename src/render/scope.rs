//! What a component tree sees while it renders.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use serde_json::Value;

use crate::backend::{ApiSession, ContentApi};
use crate::render::queue::PendingQueue;
use crate::render::store::Store;
use crate::render::styles::StyleSheet;

/// A component tree that renders synchronously to an HTML fragment.
///
/// Rendering may queue asynchronous work through [`RenderScope::track`]; the
/// engine awaits it and renders again.
pub trait Renderable: Send + Sync {
    fn render(&self, scope: &RenderScope<'_>) -> String;
}

/// Shell-embedding flags exposed to the storefront tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShellContext {
    pub is_editing: bool,
    pub is_current_page: bool,
    pub is_in_shell: bool,
}

/// Page metadata a component publishes for the document head.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMetadata {
    pub title: Option<String>,
    pub open_graph_title: Option<String>,
    pub open_graph_image: Option<String>,
    pub open_graph_url: Option<String>,
    pub meta_keywords: Option<String>,
    pub meta_description: Option<String>,
    pub canonical_url: Option<String>,
}

pub type Dictionary = BTreeMap<String, String>;

/// Request-scoped collaborators shared by the tree and its pending operations.
pub struct RenderContext {
    pub store: Arc<Store>,
    pub api: Arc<dyn ContentApi>,
    pub session: Arc<ApiSession>,
    /// Path and query of the request being rendered.
    pub location: String,
    pub shell: ShellContext,
    pub theme: Arc<Value>,
    pub site_messages: Arc<Dictionary>,
    pub translations: Arc<Dictionary>,
}

impl RenderContext {
    /// Translate `keyword`, falling back to the keyword itself.
    pub fn translate(&self, keyword: &str) -> String {
        self.translations
            .get(keyword)
            .cloned()
            .unwrap_or_else(|| keyword.to_string())
    }

    pub fn site_message(&self, name: &str) -> Option<&str> {
        self.site_messages.get(name).map(String::as_str)
    }
}

/// Mutable state of one convergence run.
#[derive(Debug)]
pub struct RenderCycleState {
    pub queue: PendingQueue,
    redirect_to: Mutex<Option<String>>,
    status_code: Mutex<Option<u16>>,
    metadata: Mutex<Option<PageMetadata>>,
}

impl RenderCycleState {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            queue: PendingQueue::new(url),
            redirect_to: Mutex::new(None),
            status_code: Mutex::new(None),
            metadata: Mutex::new(None),
        }
    }

    pub fn redirect_to(&self) -> Option<String> {
        self.redirect_to
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn status_code(&self) -> Option<u16> {
        *self.status_code.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn metadata(&self) -> Option<PageMetadata> {
        self.metadata
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Handle passed to [`Renderable::render`] for one pass.
pub struct RenderScope<'a> {
    context: &'a Arc<RenderContext>,
    state: &'a RenderCycleState,
    styles: &'a StyleSheet,
}

impl<'a> RenderScope<'a> {
    pub fn new(
        context: &'a Arc<RenderContext>,
        state: &'a RenderCycleState,
        styles: &'a StyleSheet,
    ) -> Self {
        Self {
            context,
            state,
            styles,
        }
    }

    pub fn context(&self) -> &Arc<RenderContext> {
        self.context
    }

    pub fn store(&self) -> &Arc<Store> {
        &self.context.store
    }

    /// Queue asynchronous work; the tree is rendered again once it completes.
    #[track_caller]
    pub fn track<F>(&self, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.state.queue.track(future);
    }

    /// Whether queued work is currently logged with its call site.
    pub fn is_tracing_origins(&self) -> bool {
        self.state.queue.is_tracing_origins()
    }

    /// Ask for the request to be answered with a redirect instead of a page.
    pub fn redirect(&self, location: impl Into<String>) {
        *self
            .state
            .redirect_to
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(location.into());
    }

    pub fn set_status(&self, status: u16) {
        *self
            .state
            .status_code
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(status);
    }

    pub fn set_metadata(&self, metadata: PageMetadata) {
        *self
            .state
            .metadata
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(metadata);
    }

    /// Emit a CSS rule for the current pass.
    pub fn style(&self, rule: impl Into<String>) {
        self.styles.insert(rule);
    }
}
