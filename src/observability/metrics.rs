//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define SSR metrics (requests, latency, render passes, backend failures)
//! - Expose Prometheus-compatible metrics endpoint
//!
//! # Metrics
//! - `ssr_requests_total` (counter): requests by kind, status
//! - `ssr_request_duration_seconds` (histogram): latency distribution by kind
//! - `ssr_render_passes` (histogram): await cycles per converged render
//! - `ssr_render_unconverged_total` (counter): renders that hit the cycle cap
//! - `ssr_backend_failures_total` (counter): failed backend calls by call
//!
//! # Design Decisions
//! - Recording is a no-op until an exporter is installed
//! - Labels are low-cardinality: request kind, status, backend call name

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter listening on `addr`.
///
/// Must run inside a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record a finished request. `kind` is the handler that served it.
pub fn record_request(kind: &'static str, status: u16, start: Instant) {
    ::metrics::counter!(
        "ssr_requests_total",
        "kind" => kind,
        "status" => status.to_string()
    )
    .increment(1);
    ::metrics::histogram!("ssr_request_duration_seconds", "kind" => kind)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_render(cycles: usize, converged: bool) {
    ::metrics::histogram!("ssr_render_passes").record(cycles as f64);
    if !converged {
        ::metrics::counter!("ssr_render_unconverged_total").increment(1);
    }
}

pub fn record_backend_failure(call: &str) {
    ::metrics::counter!("ssr_backend_failures_total", "call" => call.to_string()).increment(1);
}
