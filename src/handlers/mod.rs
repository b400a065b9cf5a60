//! Route handlers that answer without rendering.
//!
//! # Data Flow
//! ```text
//! RouteTable<Handler> match
//!     → status.rs  (health, diagnostics)
//!     → content.rs (robots.txt, CMS templates, legacy redirects)
//!     → relay.rs   (sitemaps and relay endpoints forwarded to the backend)
//! no match
//!     → http::page (render path)
//! ```
//!
//! # Design Decisions
//! - Registration order is precedence: fixed paths, sitemap, relay
//!   prefixes, then legacy redirects
//! - Handlers see the runtime snapshot loaded by the dispatcher

pub mod content;
pub mod relay;
pub mod status;

use std::time::Instant;

use axum::response::Response;

use crate::backend::ApiSession;
use crate::bootstrap::Bootstrap;
use crate::config::RelayConfig;
use crate::error::SsrError;
use crate::http::request::{IncomingRequest, RequestContext};
use crate::http::state::AppRuntime;
use crate::routing::RouteTable;
use crate::session::SessionCookieSet;

pub const HEALTH_PATH: &str = "/.spire/health";
pub const DIAGNOSTICS_PATH: &str = "/.spire/diagnostics";
pub const ROBOTS_PATH: &str = "/robots.txt";
pub const TEMPLATE_PATHS_PATH: &str = "/.spire/content/getTemplatePaths";
pub const TEMPLATE_PATH: &str = "/.spire/content/getTemplate";
pub const SITEMAP_PATTERN: &str = r"^/sitemap.*\.xml";
pub const REDIRECT_TO_PATTERN: &str = r"^/redirectTo/";

/// Non-render route targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handler {
    Health,
    Diagnostics,
    Robots,
    TemplatePaths,
    Template,
    Relay,
    RedirectTo,
}

impl Handler {
    /// Label used in logs and metrics.
    pub fn name(self) -> &'static str {
        match self {
            Handler::Health => "health",
            Handler::Diagnostics => "diagnostics",
            Handler::Robots => "robots",
            Handler::TemplatePaths => "template_paths",
            Handler::Template => "template",
            Handler::Relay => "relay",
            Handler::RedirectTo => "redirect_to",
        }
    }

    pub async fn handle(
        self,
        ctx: &HandlerContext<'_>,
        request: IncomingRequest,
    ) -> Result<Response, SsrError> {
        match self {
            Handler::Health => Ok(status::health()),
            Handler::Diagnostics => Ok(status::diagnostics(ctx)),
            Handler::Robots => content::robots(ctx, &request).await,
            Handler::TemplatePaths => content::template_paths(ctx).await,
            Handler::Template => content::template(ctx, &request).await,
            Handler::Relay => relay::relay(ctx, request).await,
            Handler::RedirectTo => Ok(content::redirect_to(ctx, &request).await),
        }
    }
}

/// Per-request view handed to handlers and the page path.
pub struct HandlerContext<'a> {
    pub runtime: &'a AppRuntime,
    pub bootstrap: &'a Bootstrap,
    pub started_at: Instant,
    pub request_context: RequestContext,
}

impl HandlerContext<'_> {
    /// Backend session carrying the request's forwarded headers and cookies.
    pub fn api_session(&self, request: &IncomingRequest) -> ApiSession {
        ApiSession::new(
            &request.headers,
            self.request_context.client_ip.as_deref(),
            SessionCookieSet::from_request(&request.cookies),
        )
    }
}

/// The route table in precedence order.
pub fn build_route_table(relay: &RelayConfig) -> Result<RouteTable<Handler>, regex::Error> {
    let mut table = RouteTable::new();
    table
        .add_exact(HEALTH_PATH, Handler::Health)
        .add_exact(DIAGNOSTICS_PATH, Handler::Diagnostics)
        .add_exact(ROBOTS_PATH, Handler::Robots)
        .add_exact(TEMPLATE_PATHS_PATH, Handler::TemplatePaths)
        .add_exact(TEMPLATE_PATH, Handler::Template)
        .add_pattern(SITEMAP_PATTERN, Handler::Relay)?;
    for endpoint in &relay.endpoints {
        table.add_pattern(
            &format!("^/{}(/|$)", regex::escape(endpoint)),
            Handler::Relay,
        )?;
    }
    table.add_pattern(REDIRECT_TO_PATTERN, Handler::RedirectTo)?;
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> RouteTable<Handler> {
        build_route_table(&RelayConfig::default()).unwrap()
    }

    #[test]
    fn fixed_paths_are_matched_case_insensitively() {
        let table = table();
        assert_eq!(table.match_path("/robots.txt"), Some(&Handler::Robots));
        assert_eq!(table.match_path("/.Spire/Health"), Some(&Handler::Health));
        assert_eq!(
            table.match_path("/.spire/content/gettemplate"),
            Some(&Handler::Template)
        );
    }

    #[test]
    fn sitemaps_and_relay_endpoints_are_relayed() {
        let table = table();
        assert_eq!(table.match_path("/sitemap-products.xml"), Some(&Handler::Relay));
        assert_eq!(table.match_path("/api/v1/carts/current"), Some(&Handler::Relay));
        assert_eq!(table.match_path("/Identity"), Some(&Handler::Relay));
        assert_eq!(table.match_path("/favicon.ico"), Some(&Handler::Relay));
        assert_eq!(table.match_path("/faviconXico"), None);
        assert_eq!(table.match_path("/apis"), None);
    }

    #[test]
    fn legacy_redirects_and_pages() {
        let table = table();
        assert_eq!(
            table.match_path("/RedirectTo/MyListDetailPage"),
            Some(&Handler::RedirectTo)
        );
        assert_eq!(table.match_path("/Catalog/Shoes"), None);
        assert_eq!(table.match_path("/ContentAdmin/Page/1"), None);
    }
}
