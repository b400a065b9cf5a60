//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, trace span)
//!     → request.rs (capture request, request-scoped context)
//!     → routing table match → handlers
//!       or page.rs (bootstrap, session bridge, convergence, document)
//!     → response.rs (status, Set-Cookie, HTML or redirect)
//!     → Send to client
//! ```

pub mod page;
pub mod request;
pub mod response;
pub mod server;
pub mod state;

pub use request::{IncomingRequest, RequestContext, X_REQUEST_ID};
pub use response::OutgoingResponse;
pub use server::{dispatch, HttpServer};
pub use state::{AppRuntime, AppState, RuntimeError};
