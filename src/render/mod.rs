//! Render convergence subsystem.
//!
//! # Data Flow
//! ```text
//! page path
//!     → engine.rs (ConvergenceEngine::converge)
//!         → scope.rs (RenderScope handed to the tree for one pass)
//!             → queue.rs (components queue async work)
//!             → store.rs (work writes results into the request store)
//!             → styles.rs (rules collected per pass)
//!         → await queued batch, render again
//!     → RenderOutcome (Redirect | Rendered)
//! ```
//!
//! # Design Decisions
//! - Rendering is synchronous; only the batch await yields
//! - All work queued in one pass is awaited together, so the next pass sees
//!   every result of the previous one
//! - The cycle cap is the only hard stop; diagnostics never abort the loop
//! - Per-request state only: nothing here is shared across requests

pub mod engine;
pub mod queue;
pub mod scope;
pub mod store;
pub mod styles;

pub use engine::{ConvergenceEngine, RenderOutcome, RenderedPage};
pub use queue::{PendingOperation, PendingQueue};
pub use scope::{
    Dictionary, PageMetadata, RenderContext, RenderCycleState, RenderScope, Renderable,
    ShellContext,
};
pub use store::Store;
pub use styles::StyleSheet;
