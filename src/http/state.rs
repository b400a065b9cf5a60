//! Shared application state.
//!
//! # Responsibilities
//! - Bundle everything built from one configuration into an `AppRuntime`
//! - Hold the runtime behind `ArcSwap` so config reloads swap it atomically
//! - Hold process-scoped state (bootstrap flags, start time) outside the swap
//!
//! # Design Decisions
//! - A request loads the runtime once and uses that snapshot throughout
//! - The backend client is built once per runtime and shared by all requests

use std::sync::Arc;
use std::time::Instant;

use arc_swap::ArcSwap;
use axum::body::Body;
use hyper_util::client::legacy::{connect::HttpConnector, Client};
use hyper_util::rt::TokioExecutor;
use thiserror::Error;

use crate::backend::{BackendError, ContentApi, HttpContentApi, SiteGenerator};
use crate::bootstrap::{Bootstrap, TemplateStore};
use crate::config::SsrConfig;
use crate::handlers::{build_route_table, Handler};
use crate::render::ConvergenceEngine;
use crate::routing::RouteTable;

/// Client used to relay requests verbatim to the backend.
pub type RelayClient = Client<HttpConnector, Body>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("Invalid route pattern: {0}")]
    Route(#[from] regex::Error),
}

/// Everything derived from one configuration.
pub struct AppRuntime {
    pub config: SsrConfig,
    pub routes: RouteTable<Handler>,
    pub api: Arc<dyn ContentApi>,
    pub generator: Arc<dyn SiteGenerator>,
    pub templates: TemplateStore,
    pub relay: RelayClient,
    pub engine: ConvergenceEngine,
}

impl AppRuntime {
    /// Build a runtime talking to the configured backend over HTTP.
    pub fn from_config(config: SsrConfig) -> Result<Self, RuntimeError> {
        let templates = TemplateStore::new(&config.templates.dir);
        let client = Arc::new(HttpContentApi::new(&config.backend, templates)?);
        Self::with_backend(config, client.clone(), client)
    }

    /// Build a runtime over explicit backend collaborators.
    pub fn with_backend(
        config: SsrConfig,
        api: Arc<dyn ContentApi>,
        generator: Arc<dyn SiteGenerator>,
    ) -> Result<Self, RuntimeError> {
        let routes = build_route_table(&config.relay)?;
        let relay = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        Ok(Self {
            templates: TemplateStore::new(&config.templates.dir),
            engine: ConvergenceEngine::from_config(&config.render),
            routes,
            api,
            generator,
            relay,
            config,
        })
    }
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub runtime: Arc<ArcSwap<AppRuntime>>,
    pub bootstrap: Arc<Bootstrap>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(runtime: AppRuntime) -> Self {
        Self {
            runtime: Arc::new(ArcSwap::from_pointee(runtime)),
            bootstrap: Arc::new(Bootstrap::new()),
            started_at: Instant::now(),
        }
    }

    /// Replace the runtime; in-flight requests keep the one they loaded.
    pub fn swap_runtime(&self, runtime: AppRuntime) {
        self.runtime.store(Arc::new(runtime));
    }
}
