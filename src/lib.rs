//! # Work Pool
//!
//! A fixed-size worker pool that runs user-supplied work items and reports
//! completion through a callback.
//!
//! ## Features
//!
//! - **Fixed Workers**: One thread per hardware thread by default, spawned once
//! - **FIFO Queue**: Unbounded queue guarded by a mutex and condition variable;
//!   idle workers sleep instead of polling
//! - **Completion Callbacks**: `on_complete` runs on the worker right after `execute`
//! - **Race-free Shutdown**: Clearing and stopping happen atomically; every worker
//!   is joined and `shutdown` consumes the pool
//! - **Panic Policy**: Propagate worker panics (default) or isolate them per item
//! - **Global Holder**: Optional explicitly initialized process-wide pool
//!
//! ## Quick Start
//!
//! ```rust
//! use work_pool::prelude::*;
//!
//! # fn main() -> Result<()> {
//! let pool = WorkPool::with_threads(4)?;
//!
//! for i in 0..10 {
//!     pool.execute(move || {
//!         println!("Item {} executing", i);
//!     })?;
//! }
//!
//! // Queued items that have not started are discarded
//! pool.shutdown()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Custom Work Items
//!
//! ```rust
//! use work_pool::prelude::*;
//! use parking_lot::Mutex;
//! use std::sync::Arc;
//!
//! struct SumTo {
//!     limit: u64,
//!     total: u64,
//!     done: bool,
//! }
//!
//! impl WorkItem for SumTo {
//!     fn execute(&mut self) {
//!         self.total = (1..=self.limit).sum();
//!     }
//!
//!     fn on_complete(&mut self) {
//!         self.done = true;
//!     }
//! }
//!
//! # fn main() -> Result<()> {
//! let pool = WorkPool::with_threads(2)?;
//! let item = Arc::new(Mutex::new(SumTo { limit: 100, total: 0, done: false }));
//! pool.submit(Arc::clone(&item))?;
//!
//! while !item.lock().done {
//!     std::thread::yield_now();
//! }
//! assert_eq!(item.lock().total, 5050);
//! pool.shutdown()?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod core;
pub mod global;
pub mod pool;
pub mod prelude;
pub mod queue;
pub mod tracing;

pub use core::{BoxedWorkItem, FnWorkItem, Result, ThreadError, WorkItem};
pub use pool::{
    PanicPolicy, Submitter, WorkPool, WorkPoolBuilder, WorkPoolConfig, WorkerStatSnapshot,
    WorkerStats,
};
pub use queue::{JobQueue, WakePolicy};
