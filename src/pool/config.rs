//! Configuration for the work pool.

use crate::core::{Result, ThreadError};
use crate::queue::WakePolicy;
use std::str::FromStr;

/// Environment variable overriding the worker count
pub const ENV_THREADS: &str = "WORK_POOL_THREADS";
/// Environment variable overriding the worker thread name prefix
pub const ENV_THREAD_PREFIX: &str = "WORK_POOL_THREAD_PREFIX";
/// Environment variable enabling per-item panic isolation
pub const ENV_ISOLATE_PANICS: &str = "WORK_POOL_ISOLATE_PANICS";

/// What a worker does when a work item panics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PanicPolicy {
    /// Let the panic unwind out of the worker loop. The worker thread dies,
    /// the remaining workers keep serving the queue, and
    /// [`WorkPool::shutdown`](crate::pool::WorkPool::shutdown) reports the
    /// failure as [`ThreadError::WorkerPanic`].
    #[default]
    Propagate,
    /// Catch the panic, log it and keep the worker alive. `on_complete` is
    /// skipped for an item whose `execute` panicked.
    Isolate,
}

/// Configuration for a work pool
///
/// # Example
///
/// ```rust
/// use work_pool::prelude::*;
///
/// let config = WorkPoolConfig::new(4)
///     .with_thread_name_prefix("primes")
///     .with_panic_policy(PanicPolicy::Isolate)
///     .with_wake_policy(WakePolicy::One);
///
/// assert!(config.validate().is_ok());
/// assert_eq!(config.num_threads, 4);
/// ```
#[derive(Debug, Clone)]
pub struct WorkPoolConfig {
    /// Number of worker threads (0 = hardware concurrency)
    pub num_threads: usize,
    /// Thread name prefix; workers are named `{prefix}-{id}`
    pub thread_name_prefix: String,
    /// Handling of panics raised by work items
    pub panic_policy: PanicPolicy,
    /// How many idle workers a submission wakes
    pub wake_policy: WakePolicy,
}

impl Default for WorkPoolConfig {
    fn default() -> Self {
        Self {
            num_threads: hardware_concurrency(),
            thread_name_prefix: "worker".to_string(),
            panic_policy: PanicPolicy::default(),
            wake_policy: WakePolicy::default(),
        }
    }
}

impl WorkPoolConfig {
    /// Create a new configuration with specified number of threads
    #[must_use]
    pub fn new(num_threads: usize) -> Self {
        Self::default().with_num_threads(num_threads)
    }

    /// Build a configuration from `WORK_POOL_*` environment variables.
    ///
    /// Unset or unparsable variables fall back to the defaults.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let isolate = env_get_bool(
            ENV_ISOLATE_PANICS,
            defaults.panic_policy == PanicPolicy::Isolate,
        );

        Self {
            thread_name_prefix: env_get(ENV_THREAD_PREFIX, defaults.thread_name_prefix.clone()),
            panic_policy: if isolate {
                PanicPolicy::Isolate
            } else {
                PanicPolicy::Propagate
            },
            ..defaults
        }
        .with_num_threads(env_get(ENV_THREADS, 0))
    }

    /// Set the number of worker threads (0 = hardware concurrency)
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_num_threads(mut self, num_threads: usize) -> Self {
        self.num_threads = if num_threads == 0 {
            hardware_concurrency()
        } else {
            num_threads
        };
        self
    }

    /// Set thread name prefix
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_thread_name_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.thread_name_prefix = prefix.into();
        self
    }

    /// Set the panic policy
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_panic_policy(mut self, policy: PanicPolicy) -> Self {
        self.panic_policy = policy;
        self
    }

    /// Set the wake policy
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_wake_policy(mut self, policy: WakePolicy) -> Self {
        self.wake_policy = policy;
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.num_threads == 0 {
            return Err(ThreadError::invalid_config(
                "num_threads",
                "Number of threads must be greater than 0",
            ));
        }
        if self.thread_name_prefix.is_empty() {
            return Err(ThreadError::invalid_config(
                "thread_name_prefix",
                "Thread name prefix must not be empty",
            ));
        }
        if self.thread_name_prefix.contains('\0') {
            return Err(ThreadError::invalid_config(
                "thread_name_prefix",
                "Thread name prefix must not contain NUL bytes",
            ));
        }
        Ok(())
    }
}

/// Number of hardware threads, never less than 1
pub fn hardware_concurrency() -> usize {
    num_cpus::get().max(1)
}

fn env_get<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn env_get_bool(key: &str, default: bool) -> bool {
    match std::env::var(key) {
        Ok(val) => matches!(
            val.trim().to_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        ),
        Err(_) => default,
    }
}
