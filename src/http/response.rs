//! Response building.
//!
//! # Responsibilities
//! - Accumulate status, headers and `Set-Cookie` directives while a page is produced
//! - Finalize with exactly one terminal action (HTML body or redirect)
//!
//! # Design Decisions
//! - Terminal actions consume the builder, so a response cannot be sent twice
//! - Cookies are an ordered list; the same name may appear for different paths

use axum::body::Body;
use axum::http::header::{CONTENT_TYPE, LOCATION, SET_COOKIE};
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::Response;

use crate::session::ResponseCookie;

/// A response under construction.
#[derive(Debug, Default)]
pub struct OutgoingResponse {
    status: Option<StatusCode>,
    headers: HeaderMap,
    cookies: Vec<ResponseCookie>,
}

impl OutgoingResponse {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the status code. Invalid codes are ignored.
    pub fn status(&mut self, code: u16) -> &mut Self {
        match StatusCode::from_u16(code) {
            Ok(status) => self.status = Some(status),
            Err(_) => tracing::warn!(code, "Ignoring invalid status code"),
        }
        self
    }

    pub fn header(&mut self, name: HeaderName, value: HeaderValue) -> &mut Self {
        self.headers.insert(name, value);
        self
    }

    pub fn cookie(&mut self, cookie: ResponseCookie) -> &mut Self {
        self.cookies.push(cookie);
        self
    }

    pub fn cookies(&self) -> &[ResponseCookie] {
        &self.cookies
    }

    pub fn current_status(&self) -> StatusCode {
        self.status.unwrap_or(StatusCode::OK)
    }

    /// Finalize with an HTML document.
    pub fn send_html(self, html: String) -> Response {
        let status = self.current_status();
        let mut response = self.finish(Body::from(html), status);
        response.headers_mut().insert(
            CONTENT_TYPE,
            HeaderValue::from_static("text/html; charset=utf-8"),
        );
        response
    }

    /// Finalize with a redirect.
    ///
    /// A previously set 3xx status is kept; anything else becomes 302 Found.
    pub fn redirect(self, location: &str) -> Response {
        let status = self
            .status
            .filter(|s| s.is_redirection())
            .unwrap_or(StatusCode::FOUND);
        let mut response = self.finish(Body::empty(), status);
        match HeaderValue::from_str(location) {
            Ok(value) => {
                response.headers_mut().insert(LOCATION, value);
            }
            Err(_) => {
                tracing::warn!(location = %location, "Redirect target is not a valid header value");
                *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
            }
        }
        response
    }

    fn finish(self, body: Body, status: StatusCode) -> Response {
        let mut response = Response::new(body);
        *response.status_mut() = status;
        *response.headers_mut() = self.headers;
        for cookie in &self.cookies {
            match HeaderValue::from_str(&cookie.to_header_value()) {
                Ok(value) => {
                    response.headers_mut().append(SET_COOKIE, value);
                }
                Err(_) => tracing::warn!(cookie = %cookie.name, "Dropping unrepresentable cookie"),
            }
        }
        response
    }
}
