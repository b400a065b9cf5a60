//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (path)
//!     → router.rs (ordered scan over route entries)
//!     → matcher.rs (exact or pattern, case-insensitive)
//!     → Return: matched handler or NoMatch (page render)
//!
//! Route Table Construction (at startup / config reload):
//!     fixed endpoints, sitemap, relay prefixes, legacy redirects
//!     → registration order = precedence
//!     → Freeze as immutable RouteTable
//! ```
//!
//! # Design Decisions
//! - Deterministic: same input always matches same route
//! - First match wins (registration order)
//! - The table is pure dispatch; handlers own all side effects

pub mod matcher;
pub mod router;

pub use matcher::RouteMatcher;
pub use router::{RouteEntry, RouteTable};
