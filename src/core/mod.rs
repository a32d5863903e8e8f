//! Core types and traits for the work pool

pub mod error;
pub mod work_item;

pub use error::{Result, ThreadError};
pub use work_item::{BoxedWorkItem, FnWorkItem, WorkItem};
