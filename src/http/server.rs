//! HTTP server setup and request dispatch.
//!
//! # Responsibilities
//! - Create Axum Router: `/dist` static bundles, everything else to the dispatcher
//! - Wire up middleware (request ID, tracing)
//! - Dispatch requests through the route table or to the page path
//! - Apply configuration updates by swapping the runtime
//! - Serve until shutdown, draining in-flight requests

use std::net::SocketAddr;
use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::{IntoResponse, Response},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::mpsc::UnboundedReceiver;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::config::SsrConfig;
use crate::handlers::HandlerContext;
use crate::http::page::render_page;
use crate::http::request::{IncomingRequest, RequestContext, X_REQUEST_ID};
use crate::http::state::{AppRuntime, AppState};
use crate::lifecycle::Shutdown;
use crate::observability::metrics;

/// HTTP server for the SSR host.
pub struct HttpServer {
    state: AppState,
    updates: Option<UnboundedReceiver<SsrConfig>>,
}

impl HttpServer {
    pub fn new(runtime: AppRuntime) -> Self {
        Self {
            state: AppState::new(runtime),
            updates: None,
        }
    }

    /// Apply configurations received on `updates` while serving.
    pub fn with_config_updates(mut self, updates: UnboundedReceiver<SsrConfig>) -> Self {
        self.updates = Some(updates);
        self
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// The Axum router with all middleware layers.
    pub fn router(&self) -> Router {
        build_router(self.state.clone())
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener, shutdown: Shutdown) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        if let Some(updates) = self.updates {
            tokio::spawn(apply_config_updates(self.state.clone(), updates, shutdown.clone()));
        }

        let app = build_router(self.state).into_make_service_with_connect_info::<SocketAddr>();
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown.notified())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

fn build_router(state: AppState) -> Router {
    let dist_dir = state.runtime.load().config.assets.dist_dir.clone();
    Router::new()
        .nest_service("/dist", ServeDir::new(dist_dir))
        .fallback(dispatch_handler)
        .with_state(state)
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
            let request_id = request
                .headers()
                .get(X_REQUEST_ID)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("unknown");
            tracing::info_span!(
                "request",
                request_id = %request_id,
                method = %request.method(),
                path = %request.uri().path(),
            )
        }))
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

async fn dispatch_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    dispatch(&state, request).await
}

/// Route one request: matched handler, else the page path.
pub async fn dispatch(state: &AppState, request: Request<Body>) -> Response {
    let start = Instant::now();
    let runtime = state.runtime.load_full();

    let request = match IncomingRequest::from_http(request, runtime.config.listener.max_body_size).await {
        Ok(request) => request,
        Err(e) => {
            metrics::record_request("rejected", e.status().as_u16(), start);
            return e.into_response();
        }
    };

    let ctx = HandlerContext {
        runtime: &runtime,
        bootstrap: &state.bootstrap,
        started_at: state.started_at,
        request_context: RequestContext::new(&request, &runtime.config.backend.base_url),
    };

    let (kind, result) = match runtime.routes.match_path(&request.path).copied() {
        Some(handler) => (handler.name(), handler.handle(&ctx, request).await),
        None => ("page", render_page(&ctx, request).await),
    };

    let response = result.unwrap_or_else(IntoResponse::into_response);
    tracing::debug!(
        kind,
        url = %ctx.request_context.url,
        client_ip = ctx.request_context.client_ip.as_deref().unwrap_or("-"),
        status = %response.status(),
        "Request handled"
    );
    metrics::record_request(kind, response.status().as_u16(), start);
    response
}

async fn apply_config_updates(
    state: AppState,
    mut updates: UnboundedReceiver<SsrConfig>,
    shutdown: Shutdown,
) {
    let mut stop = shutdown.subscribe();
    loop {
        tokio::select! {
            _ = stop.recv() => break,
            update = updates.recv() => {
                let Some(config) = update else { break };
                match AppRuntime::from_config(config) {
                    Ok(runtime) => {
                        state.swap_runtime(runtime);
                        tracing::info!("Configuration applied");
                    }
                    Err(e) => tracing::error!(error = %e, "Rejected configuration update"),
                }
            }
        }
    }
}
