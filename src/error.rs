//! Request-level error type.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::backend::BackendError;
use crate::bootstrap::templates::TemplateError;

/// Errors that abort a request.
#[derive(Debug, Error)]
pub enum SsrError {
    /// Content generation failed outside production.
    #[error("Site generation failed: {0}")]
    SiteGeneration(#[source] BackendError),

    /// A backend call whose result the route cannot do without.
    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Template(#[from] TemplateError),

    /// The request body could not be read.
    #[error("Request body rejected: {0}")]
    Body(String),

    /// Relaying a request to the backend failed.
    #[error("Relay failed: {0}")]
    Relay(String),
}

impl SsrError {
    pub fn status(&self) -> StatusCode {
        match self {
            SsrError::Body(_) => StatusCode::PAYLOAD_TOO_LARGE,
            SsrError::Relay(_) | SsrError::Backend(_) => StatusCode::BAD_GATEWAY,
            SsrError::Template(TemplateError::InvalidPath(_)) => StatusCode::BAD_REQUEST,
            SsrError::Template(TemplateError::NotFound(_)) => StatusCode::NOT_FOUND,
            SsrError::Template(_) | SsrError::SiteGeneration(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for SsrError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(error = %self, "Request rejected");
        }
        (status, self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_error_class() {
        let generation = SsrError::SiteGeneration(BackendError::Status {
            endpoint: "siteGeneration".into(),
            status: 500,
        });
        assert_eq!(generation.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            SsrError::Template(TemplateError::NotFound("x".into())).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(SsrError::Relay("down".into()).status(), StatusCode::BAD_GATEWAY);
    }
}
