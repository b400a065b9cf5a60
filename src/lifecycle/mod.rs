//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Validate → Init logging/metrics → Build runtime → Bind listener
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Shutdown::trigger
//!
//! Shutdown (shutdown.rs):
//!     Trigger → server stops accepting, drains in-flight requests
//!             → config reload loop exits
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then observability, then listener
//! - Bootstrap flags live for the process, never reset by shutdown or reload

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
pub use signals::{spawn_signal_listener, wait_for_signal};
