//! Backend-sourced content served outside the render path.

use axum::http::header::CONTENT_TYPE;
use axum::http::HeaderValue;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::bootstrap::TemplateError;
use crate::error::SsrError;
use crate::handlers::HandlerContext;
use crate::http::request::IncomingRequest;
use crate::http::response::OutgoingResponse;

const REDIRECT_PREFIX_LEN: usize = "/RedirectTo/".len();

/// Page types renamed since the classic storefront.
const LEGACY_PAGE_TYPES: &[(&str, &str)] = &[("MyListDetailPage", "MyListsDetailsPage")];

pub fn resolve_legacy_page_type(page_type: &str) -> &str {
    LEGACY_PAGE_TYPES
        .iter()
        .find(|(legacy, _)| *legacy == page_type)
        .map(|(_, current)| *current)
        .unwrap_or(page_type)
}

pub async fn robots(ctx: &HandlerContext<'_>, request: &IncomingRequest) -> Result<Response, SsrError> {
    let session = ctx.api_session(request);
    let body = ctx.runtime.api.robots_txt(&session).await?;
    Ok((
        [(CONTENT_TYPE, HeaderValue::from_static("text/plain; charset=utf-8"))],
        body,
    )
        .into_response())
}

pub async fn template_paths(ctx: &HandlerContext<'_>) -> Result<Response, SsrError> {
    Ok(Json(ctx.runtime.templates.template_paths().await?).into_response())
}

pub async fn template(ctx: &HandlerContext<'_>, request: &IncomingRequest) -> Result<Response, SsrError> {
    let path = request
        .query_param("path")
        .ok_or_else(|| TemplateError::InvalidPath(String::new()))?;
    let content = ctx.runtime.templates.template(path).await?;
    Ok((
        [(CONTENT_TYPE, HeaderValue::from_static("application/json"))],
        content,
    )
        .into_response())
}

/// `/RedirectTo/<PageType>`: redirect to the current URL of a page type,
/// keeping the query string. Unknown types go to `/`.
pub async fn redirect_to(ctx: &HandlerContext<'_>, request: &IncomingRequest) -> Response {
    let page_type = request.path.get(REDIRECT_PREFIX_LEN..).unwrap_or_default();
    let page_type = resolve_legacy_page_type(page_type);
    let session = ctx.api_session(request);

    let destination = match ctx.runtime.api.page_url_by_type(page_type, &session).await {
        Ok(Some(url)) => url,
        Ok(None) => "/".to_string(),
        Err(e) => {
            tracing::warn!(page_type = %page_type, error = %e, "Page URL lookup failed");
            "/".to_string()
        }
    };
    OutgoingResponse::new().redirect(&format!("{destination}{}", request.query_suffix()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_names_are_mapped() {
        assert_eq!(resolve_legacy_page_type("MyListDetailPage"), "MyListsDetailsPage");
        assert_eq!(resolve_legacy_page_type("CartPage"), "CartPage");
    }
}
