//! Built-in component trees rendered by the page path.
//!
//! # Data Flow
//! ```text
//! ConvergenceEngine
//!     → StorefrontApp::render
//!         → context not loaded → queue session_context
//!         → page not loaded    → queue page_by_url
//!         → page loaded        → redirect / status / metadata / markup
//!         → page failed        → unhandled-error presentation
//! ```

pub mod storefront;

pub use storefront::{set_initial_page, StorefrontApp, CONTEXT_KEY, PAGE_KEY};
