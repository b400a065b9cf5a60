//! Storefront server-side rendering library.

pub mod app;
pub mod backend;
pub mod bootstrap;
pub mod config;
pub mod document;
pub mod error;
pub mod handlers;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod render;
pub mod routing;
pub mod session;

pub use config::SsrConfig;
pub use error::SsrError;
pub use http::{AppRuntime, HttpServer};
pub use lifecycle::Shutdown;
