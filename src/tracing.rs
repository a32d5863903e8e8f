//! Tracing integration for observability.
//!
//! This module provides structured events and span propagation when the
//! `tracing` feature is enabled.
//!
//! # Example
//!
//! ```rust,ignore
//! use work_pool::prelude::*;
//! use work_pool::tracing::TracedWorkItem;
//! use tracing_subscriber::{fmt, prelude::*, EnvFilter};
//!
//! tracing_subscriber::registry()
//!     .with(fmt::layer())
//!     .with(EnvFilter::from_default_env()
//!         .add_directive("work_pool=debug".parse().unwrap()))
//!     .init();
//!
//! let pool = WorkPool::with_threads(4)?;
//! pool.submit(TracedWorkItem::new(MyItem::new()))?;
//! ```

use crate::core::WorkItem;
#[cfg(feature = "tracing")]
use std::time::Duration;

/// A work item wrapper that carries the submitter's tracing span to the worker.
///
/// The span current at construction is entered around both `execute` and
/// `on_complete`. Without the `tracing` feature this is a plain pass-through.
pub struct TracedWorkItem<W: WorkItem> {
    inner: W,
    #[cfg(feature = "tracing")]
    span: tracing::Span,
}

impl<W: WorkItem> TracedWorkItem<W> {
    /// Wrap `item`, capturing the current span.
    pub fn new(item: W) -> Self {
        Self {
            inner: item,
            #[cfg(feature = "tracing")]
            span: tracing::Span::current(),
        }
    }

    /// Wrap `item` with a specific span.
    #[cfg(feature = "tracing")]
    pub fn with_span(item: W, span: tracing::Span) -> Self {
        Self { inner: item, span }
    }

    /// Unwrap the inner item
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: WorkItem> WorkItem for TracedWorkItem<W> {
    fn execute(&mut self) {
        #[cfg(feature = "tracing")]
        let _guard = self.span.enter();
        self.inner.execute();
    }

    fn on_complete(&mut self) {
        #[cfg(feature = "tracing")]
        let _guard = self.span.enter();
        self.inner.on_complete();
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

/// Metrics recording functions for observability.
///
/// These emit tracing events that metrics layers can aggregate.
#[cfg(feature = "tracing")]
pub mod metrics {
    use super::*;

    /// Records a submission and the queue depth after it.
    #[inline]
    pub fn record_submission(queue_depth: usize) {
        tracing::trace!(
            counter.items_submitted = 1,
            gauge.queue_depth = queue_depth as i64,
            "work item submitted"
        );
    }

    /// Records a completed item with timing.
    #[inline]
    pub fn record_completion(duration: Duration) {
        tracing::trace!(
            counter.items_completed = 1,
            histogram.item_duration_ms = duration.as_millis() as u64,
            "work item completed"
        );
    }

    /// Records a panicking item.
    #[inline]
    pub fn record_panic(duration: Duration) {
        tracing::trace!(
            counter.items_panicked = 1,
            histogram.item_duration_ms = duration.as_millis() as u64,
            "work item panicked"
        );
    }

    /// Records worker becoming busy.
    #[inline]
    pub fn record_worker_busy(worker_id: usize) {
        tracing::trace!(gauge.workers_busy = 1, worker_id = worker_id, "worker busy");
    }

    /// Records worker becoming idle.
    #[inline]
    pub fn record_worker_idle(worker_id: usize) {
        tracing::trace!(
            gauge.workers_busy = -1i64,
            worker_id = worker_id,
            "worker idle"
        );
    }

    /// Records pool startup.
    #[inline]
    pub fn record_pool_start(num_workers: usize, pool_name: &str) {
        tracing::info!(workers = num_workers, pool = pool_name, "work pool started");
    }

    /// Records pool shutdown.
    #[inline]
    pub fn record_pool_shutdown(items_completed: u64, items_panicked: u64) {
        tracing::info!(
            items_completed = items_completed,
            items_panicked = items_panicked,
            "work pool shutdown complete"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::FnWorkItem;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_traced_item_delegates_both_calls() {
        let calls = Arc::new(AtomicUsize::new(0));
        let c1 = Arc::clone(&calls);
        let c2 = Arc::clone(&calls);

        let item = FnWorkItem::new(move || {
            c1.fetch_add(1, Ordering::SeqCst);
        })
        .with_completion(move || {
            c2.fetch_add(1, Ordering::SeqCst);
        });

        let mut traced = TracedWorkItem::new(item);
        traced.execute();
        traced.on_complete();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_traced_item_preserves_name() {
        let traced = TracedWorkItem::new(FnWorkItem::with_name(|| {}, "Traced"));
        assert_eq!(traced.name(), "Traced");
        assert_eq!(traced.into_inner().name(), "Traced");
    }
}
