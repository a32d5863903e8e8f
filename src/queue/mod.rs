//! The synchronized job queue shared by a pool, its submitters and its workers.
//!
//! [`JobQueue`] keeps pending work items and the pool's running flag behind a
//! single [`parking_lot::Mutex`]. Idle workers park on a paired
//! [`parking_lot::Condvar`] with the predicate "queue non-empty OR stopped",
//! which is evaluated under the lock so no wakeup is lost between the check
//! and the wait.
//!
//! # Example
//!
//! ```rust
//! use work_pool::queue::{JobQueue, WakePolicy};
//! use work_pool::core::{FnWorkItem, WorkItem};
//!
//! let queue = JobQueue::new("demo", WakePolicy::All);
//! queue.push(Box::new(FnWorkItem::new(|| {}))).unwrap();
//! assert_eq!(queue.len(), 1);
//!
//! let mut item = queue.pop_blocking().unwrap();
//! item.execute();
//!
//! assert_eq!(queue.close(), 0);
//! assert!(queue.pop_blocking().is_none());
//! ```

mod fifo;

pub use fifo::JobQueue;

/// How many idle workers a submission wakes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WakePolicy {
    /// Wake every idle worker; they race for the item under the queue lock
    /// and the losers go back to waiting.
    #[default]
    All,
    /// Wake a single idle worker.
    One,
}
