//! Work pool, its configuration and worker implementations

pub mod config;
pub mod work_pool;
pub mod worker;

pub use config::{hardware_concurrency, PanicPolicy, WorkPoolConfig};
pub use work_pool::{Submitter, WorkPool, WorkPoolBuilder};
pub use worker::{Worker, WorkerStatSnapshot, WorkerStats};
