//! Unbounded FIFO queue guarded by a mutex and condition variable.

use super::WakePolicy;
use crate::core::{BoxedWorkItem, Result, ThreadError, WorkItem};
use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

struct QueueState {
    items: VecDeque<BoxedWorkItem>,
    running: bool,
    /// Items dropped by `close`, reported back to late submitters
    discarded_at_close: usize,
}

/// An unbounded FIFO of pending work items plus the pool's running flag.
///
/// Once [`close`](JobQueue::close) has run the queue stays closed: there is
/// no way back to the running state.
pub struct JobQueue {
    name: String,
    state: Mutex<QueueState>,
    available: Condvar,
    wake_policy: WakePolicy,
    active: AtomicUsize,
    submitted: AtomicU64,
    dequeued: AtomicU64,
    cleared: AtomicU64,
}

impl std::fmt::Debug for JobQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("JobQueue")
            .field("name", &self.name)
            .field("len", &state.items.len())
            .field("running", &state.running)
            .field("wake_policy", &self.wake_policy)
            .field("active", &self.active.load(Ordering::Relaxed))
            .finish()
    }
}

impl JobQueue {
    /// Creates an empty, running queue.
    pub fn new(name: impl Into<String>, wake_policy: WakePolicy) -> Self {
        Self {
            name: name.into(),
            state: Mutex::new(QueueState {
                items: VecDeque::new(),
                running: true,
                discarded_at_close: 0,
            }),
            available: Condvar::new(),
            wake_policy,
            active: AtomicUsize::new(0),
            submitted: AtomicU64::new(0),
            dequeued: AtomicU64::new(0),
            cleared: AtomicU64::new(0),
        }
    }

    /// Appends an item to the tail and wakes idle workers.
    ///
    /// # Errors
    ///
    /// `ThreadError::PoolClosed` once the queue has been closed. The item is
    /// dropped without running either of its operations.
    pub fn push(&self, item: BoxedWorkItem) -> Result<()> {
        let depth = {
            let mut state = self.state.lock();
            if !state.running {
                let discarded = state.discarded_at_close;
                drop(state);
                log::warn!(
                    "rejected work item '{}': pool '{}' is closed",
                    item.name(),
                    self.name
                );
                return Err(ThreadError::pool_closed(&self.name, discarded));
            }
            state.items.push_back(item);
            state.items.len()
        };
        self.submitted.fetch_add(1, Ordering::Relaxed);

        #[cfg(feature = "tracing")]
        crate::tracing::metrics::record_submission(depth);
        #[cfg(not(feature = "tracing"))]
        log::trace!("pool '{}': queued work item (depth {})", self.name, depth);

        match self.wake_policy {
            WakePolicy::All => {
                self.available.notify_all();
            }
            WakePolicy::One => {
                self.available.notify_one();
            }
        }
        Ok(())
    }

    /// Blocks until an item is available or the queue is closed.
    ///
    /// Returns the head item, or `None` when the queue has been closed and
    /// the caller should exit.
    pub fn pop_blocking(&self) -> Option<BoxedWorkItem> {
        let mut state = self.state.lock();
        self.available
            .wait_while(&mut state, |s| s.running && s.items.is_empty());
        let item = state.items.pop_front();
        if item.is_some() {
            self.dequeued.fetch_add(1, Ordering::Relaxed);
        }
        item
    }

    /// Removes every queued item without running it.
    ///
    /// Items already handed to a worker are unaffected. Returns the number of
    /// items removed.
    pub fn clear(&self) -> usize {
        let drained = std::mem::take(&mut self.state.lock().items);
        let count = drained.len();
        // Dropped outside the lock: an item's Drop may submit more work.
        drop(drained);

        if count > 0 {
            self.cleared.fetch_add(count as u64, Ordering::Relaxed);
            log::debug!("pool '{}': cleared {} queued work items", self.name, count);
        }
        count
    }

    /// Clears the queue, flips the running flag to false and wakes every
    /// waiting worker.
    ///
    /// Clearing and stopping happen in one critical section, so no submission
    /// can land between them. Returns the number of discarded items; a second
    /// call returns 0.
    pub fn close(&self) -> usize {
        let drained = {
            let mut state = self.state.lock();
            if !state.running {
                return 0;
            }
            let drained = std::mem::take(&mut state.items);
            state.running = false;
            state.discarded_at_close = drained.len();
            drained
        };
        self.available.notify_all();

        let count = drained.len();
        drop(drained);
        if count > 0 {
            self.cleared.fetch_add(count as u64, Ordering::Relaxed);
        }
        log::debug!(
            "pool '{}': closed, {} queued work items discarded",
            self.name,
            count
        );
        count
    }

    /// Number of queued items (approximate under concurrent use)
    pub fn len(&self) -> usize {
        self.state.lock().items.len()
    }

    /// Whether no items are queued
    pub fn is_empty(&self) -> bool {
        self.state.lock().items.is_empty()
    }

    /// Whether the queue still accepts work
    pub fn is_running(&self) -> bool {
        self.state.lock().running
    }

    /// Name used in logs and errors
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Wake policy applied on submission
    pub fn wake_policy(&self) -> WakePolicy {
        self.wake_policy
    }

    /// Number of items currently being executed by workers
    pub fn active(&self) -> usize {
        self.active.load(Ordering::Acquire)
    }

    /// Total items accepted by `push`
    pub fn total_submitted(&self) -> u64 {
        self.submitted.load(Ordering::Relaxed)
    }

    /// Total items handed to a worker
    pub fn total_dequeued(&self) -> u64 {
        self.dequeued.load(Ordering::Relaxed)
    }

    /// Total items discarded by `clear` and `close`
    pub fn total_cleared(&self) -> u64 {
        self.cleared.load(Ordering::Relaxed)
    }

    /// Marks one worker busy until the returned guard is dropped.
    pub(crate) fn busy(&self) -> BusyGuard<'_> {
        self.active.fetch_add(1, Ordering::AcqRel);
        BusyGuard {
            active: &self.active,
        }
    }
}

/// Decrements the active counter on drop, including during unwinding.
pub(crate) struct BusyGuard<'a> {
    active: &'a AtomicUsize,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.active.fetch_sub(1, Ordering::AcqRel);
    }
}
