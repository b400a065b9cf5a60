//! Render convergence loop.
//!
//! ```text
//! render ──▶ redirect set? ──yes──▶ Redirect
//!   ▲            │ no
//!   │            ▼
//!   │      queue empty? ──yes──▶ Rendered (converged)
//!   │            │ no
//!   │            ▼
//!   │      cycle cap hit? ──yes──▶ Rendered (best effort)
//!   │            │ no
//!   └── await whole batch
//! ```
//!
//! The cap bounds the number of await cycles, not wall-clock time: a pending
//! operation that never completes stalls the request.

use std::sync::Arc;

use futures_util::future::join_all;

use crate::config::RenderConfig;
use crate::observability::metrics;
use crate::render::scope::{PageMetadata, RenderContext, RenderCycleState, RenderScope, Renderable};
use crate::render::styles::StyleSheet;

/// Result of converging a component tree.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderOutcome {
    /// The tree asked for a redirect; no document should be assembled.
    Redirect {
        location: String,
        status: Option<u16>,
    },
    /// Final HTML of the last pass.
    Rendered(RenderedPage),
}

/// Output of the last render pass.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedPage {
    pub html: String,
    /// `<style>` markup extracted from the final pass only.
    pub style_markup: String,
    pub status: Option<u16>,
    pub metadata: Option<PageMetadata>,
    /// Await cycles performed (renders = cycles + 1).
    pub cycles: usize,
    /// `false` when the cycle cap was hit with work still queued.
    pub converged: bool,
    /// How many times the state-management warning fired (0 or 1).
    pub defect_warnings: usize,
}

/// Renders a tree repeatedly until its asynchronous data dependencies settle.
#[derive(Debug, Clone)]
pub struct ConvergenceEngine {
    max_passes: usize,
    suspicious_after: usize,
}

impl Default for ConvergenceEngine {
    fn default() -> Self {
        Self::from_config(&RenderConfig::default())
    }
}

impl ConvergenceEngine {
    pub fn from_config(config: &RenderConfig) -> Self {
        Self {
            max_passes: config.max_passes,
            suspicious_after: config.suspicious_after,
        }
    }

    pub async fn converge(
        &self,
        tree: &dyn Renderable,
        context: &Arc<RenderContext>,
    ) -> RenderOutcome {
        let url = context.location.as_str();
        let state = RenderCycleState::new(url);

        let (mut html, mut sheet) = render_pass(tree, context, &state);
        let mut redirect = state.redirect_to();
        let mut batch = state.queue.drain();
        let mut cycles = 0;
        let mut defect_warnings = 0;

        while !batch.is_empty() && cycles < self.max_passes && redirect.is_none() {
            cycles += 1;
            state.queue.set_cycle(cycles);

            if cycles > self.suspicious_after {
                if cycles == self.suspicious_after + 1 {
                    tracing::warn!(
                        url = %url,
                        cycles = self.suspicious_after,
                        "New pending operations are still being created after {} cycles, possible state management issue",
                        self.suspicious_after
                    );
                    state.queue.trace_origins();
                    defect_warnings += 1;
                }
                tracing::warn!(url = %url, pending = batch.len(), cycle = cycles, "Pending operations outstanding");
            }

            tracing::debug!(url = %url, pending = batch.len(), cycle = cycles, "Awaiting pending operations");
            join_all(batch.into_iter().map(|op| op.future)).await;

            (html, sheet) = render_pass(tree, context, &state);
            redirect = state.redirect_to();
            batch = state.queue.drain();
        }

        let status = state.status_code();

        if let Some(location) = redirect {
            tracing::debug!(url = %url, location = %location, cycle = cycles, "Render requested redirect");
            metrics::record_render(cycles, true);
            return RenderOutcome::Redirect { location, status };
        }

        let converged = batch.is_empty();
        if !converged {
            tracing::warn!(
                url = %url,
                cycles,
                abandoned = batch.len(),
                "Render did not converge, using output of the last pass"
            );
        }
        metrics::record_render(cycles, converged);

        RenderOutcome::Rendered(RenderedPage {
            html,
            style_markup: sheet.into_style_markup(),
            status,
            metadata: state.metadata(),
            cycles,
            converged,
            defect_warnings,
        })
    }
}

fn render_pass(
    tree: &dyn Renderable,
    context: &Arc<RenderContext>,
    state: &RenderCycleState,
) -> (String, StyleSheet) {
    let sheet = StyleSheet::new();
    let html = tree.render(&RenderScope::new(context, state, &sheet));
    (html, sheet)
}
