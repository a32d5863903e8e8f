//! Convenient re-exports for common types and traits

pub use crate::core::{BoxedWorkItem, FnWorkItem, Result, ThreadError, WorkItem};
pub use crate::pool::{
    PanicPolicy, Submitter, WorkPool, WorkPoolBuilder, WorkPoolConfig, WorkerStatSnapshot,
};
pub use crate::queue::WakePolicy;
