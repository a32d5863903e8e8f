//! Process-wide pool holder.
//!
//! Some programs want one pool reachable from anywhere. This module keeps at
//! most one [`WorkPool`] in a static slot that must be filled with [`init`]
//! (or [`init_with`]) and emptied with [`shutdown`]; nothing is created
//! implicitly. After a shutdown a fresh pool can be installed.
//!
//! ```rust
//! use work_pool::global;
//! use work_pool::prelude::*;
//!
//! # fn main() -> Result<()> {
//! global::init_with(WorkPoolConfig::new(2))?;
//! global::submit(FnWorkItem::new(|| println!("hello from the global pool")))?;
//! global::shutdown()?;
//! # Ok(())
//! # }
//! ```

use crate::core::{Result, ThreadError, WorkItem};
use crate::pool::{Submitter, WorkPool, WorkPoolConfig};
use parking_lot::Mutex;

static GLOBAL: Mutex<Option<WorkPool>> = Mutex::new(None);

/// Install a pool with the default configuration.
pub fn init() -> Result<()> {
    init_with(WorkPoolConfig::default())
}

/// Install a pool built from `config`.
///
/// # Errors
///
/// `AlreadyInitialized` if a pool is installed; construction errors from
/// [`WorkPool::with_config`].
pub fn init_with(config: WorkPoolConfig) -> Result<()> {
    let mut slot = GLOBAL.lock();
    if let Some(pool) = slot.as_ref() {
        return Err(ThreadError::already_initialized(pool.num_threads()));
    }
    *slot = Some(WorkPool::with_config(config)?);
    Ok(())
}

/// Whether a pool is installed
pub fn is_initialized() -> bool {
    GLOBAL.lock().is_some()
}

/// Producer handle for the installed pool.
///
/// The handle outlives the slot lock, so callers may submit from work items
/// or from `Drop` impls without deadlocking on the holder.
pub fn submitter() -> Result<Submitter> {
    GLOBAL
        .lock()
        .as_ref()
        .map(WorkPool::submitter)
        .ok_or(ThreadError::NotInitialized)
}

/// Submit a work item to the installed pool
pub fn submit<W: WorkItem + 'static>(item: W) -> Result<()> {
    submitter()?.submit(item)
}

/// Discard the installed pool's queued items; returns how many were removed
pub fn clear_queue() -> Result<usize> {
    Ok(submitter()?.clear_queue())
}

/// Remove the installed pool and shut it down.
///
/// The slot is emptied before the workers are joined, so items still
/// running that call back into this module see `NotInitialized` instead of
/// blocking.
pub fn shutdown() -> Result<()> {
    let pool = GLOBAL.lock().take().ok_or(ThreadError::NotInitialized)?;
    pool.shutdown()
}
