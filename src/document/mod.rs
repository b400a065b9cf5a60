//! Document assembly subsystem.
//!
//! # Data Flow
//! ```text
//! RenderedPage (fragment, final-pass styles, metadata)
//!     + store snapshot (hydration), dictionaries (localization.rs)
//!     + theme.rs (default merged with backend theme)
//!     + tracking.rs (tag manager snippets from settings)
//!     → assembler.rs (storefront or shell document)
//!     → complete HTML string
//! ```
//!
//! # Design Decisions
//! - Assembly is a pure function of the fragment and the model
//! - Every JSON payload in an inline script has `</` escaped

pub mod assembler;
pub mod localization;
pub mod theme;
pub mod tracking;

pub use assembler::{assemble, escape_script_json, DocumentMode, DocumentModel, SHELL_TITLE};
pub use localization::{process_site_messages, process_translations};
pub use theme::{default_theme, font_import_url, merge_theme, resolve_theme};
pub use tracking::{head_tracking_script, noscript_tracking_script};
