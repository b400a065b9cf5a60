//! Pending operation queue.
//!
//! Rendering is synchronous; any asynchronous work a component starts is
//! pushed into this request-scoped queue and drained in batches by the
//! convergence engine. Single consumer, unbounded, no backpressure.

use std::future::Future;
use std::panic::Location;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use tokio::sync::mpsc;

/// A queued asynchronous operation and where it was queued from.
pub struct PendingOperation {
    pub future: BoxFuture<'static, ()>,
    pub origin: &'static Location<'static>,
}

impl std::fmt::Debug for PendingOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingOperation")
            .field("origin", &self.origin)
            .finish_non_exhaustive()
    }
}

/// Producer side handed to components, consumer side owned by the engine.
#[derive(Debug)]
pub struct PendingQueue {
    tx: mpsc::UnboundedSender<PendingOperation>,
    rx: Mutex<mpsc::UnboundedReceiver<PendingOperation>>,
    trace_origins: AtomicBool,
    cycle: AtomicUsize,
    url: String,
}

impl PendingQueue {
    /// Create a queue for the request at `url` (used in diagnostics only).
    pub fn new(url: impl Into<String>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            tx,
            rx: Mutex::new(rx),
            trace_origins: AtomicBool::new(false),
            cycle: AtomicUsize::new(0),
            url: url.into(),
        }
    }

    /// Queue an operation. The caller's location is recorded for diagnostics.
    #[track_caller]
    pub fn track<F>(&self, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let origin = Location::caller();
        if self.trace_origins.load(Ordering::Relaxed) {
            tracing::warn!(
                url = %self.url,
                cycle = self.cycle.load(Ordering::Relaxed),
                origin = %origin,
                "New pending operation added"
            );
        }
        // The receiver lives as long as the queue, so send cannot fail here.
        let _ = self.tx.send(PendingOperation {
            future: future.boxed(),
            origin,
        });
    }

    /// Take every operation queued so far as one batch.
    pub fn drain(&self) -> Vec<PendingOperation> {
        let mut rx = self
            .rx
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let mut batch = Vec::new();
        while let Ok(op) = rx.try_recv() {
            batch.push(op);
        }
        batch
    }

    /// Record the current await cycle for origin logging.
    pub(crate) fn set_cycle(&self, cycle: usize) {
        self.cycle.store(cycle, Ordering::Relaxed);
    }

    /// Log the origin of every operation queued from now on.
    pub(crate) fn trace_origins(&self) {
        self.trace_origins.store(true, Ordering::Relaxed);
    }

    pub fn is_tracing_origins(&self) -> bool {
        self.trace_origins.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn drain_takes_everything_queued_so_far() {
        let queue = PendingQueue::new("/");
        queue.track(async {});
        queue.track(async {});
        let batch = queue.drain();
        assert_eq!(batch.len(), 2);
        assert!(queue.drain().is_empty());

        for op in batch {
            assert!(op.origin.file().ends_with("queue.rs"));
            op.future.await;
        }
    }
}
