//! Health and diagnostics endpoints.

use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::handlers::HandlerContext;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Serialize)]
struct Health {
    status: &'static str,
    version: &'static str,
}

pub fn health() -> Response {
    Json(Health {
        status: "ok",
        version: VERSION,
    })
    .into_response()
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Diagnostics<'a> {
    version: &'static str,
    environment: String,
    uptime_seconds: u64,
    backend: &'a str,
    site_generation_checked: bool,
    translation_generation_tried: bool,
    relay_endpoints: &'a [String],
    routes: usize,
}

pub fn diagnostics(ctx: &HandlerContext<'_>) -> Response {
    let config = &ctx.runtime.config;
    Json(Diagnostics {
        version: VERSION,
        environment: config.environment.to_string(),
        uptime_seconds: ctx.started_at.elapsed().as_secs(),
        backend: &config.backend.base_url,
        site_generation_checked: ctx.bootstrap.site_checked(),
        translation_generation_tried: ctx.bootstrap.translations_tried(),
        relay_endpoints: &config.relay.endpoints,
        routes: ctx.runtime.routes.len(),
    })
    .into_response()
}
