//! Error types for the work pool

/// Result type for work pool operations
pub type Result<T> = std::result::Result<T, ThreadError>;

/// Errors that can occur in the work pool
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ThreadError {
    /// Invalid configuration with parameter
    #[error("Invalid configuration for '{parameter}': {message}")]
    InvalidConfig {
        /// Configuration parameter name
        parameter: String,
        /// Error message
        message: String,
    },

    /// Failed to spawn a worker thread with details
    #[error("Failed to spawn worker thread #{thread_id}: {message}")]
    SpawnError {
        /// ID of the thread that failed to spawn
        thread_id: usize,
        /// Error message
        message: String,
        /// Source IO error
        #[source]
        source: Option<std::io::Error>,
    },

    /// A worker thread terminated because a work item panicked
    #[error("Worker thread #{thread_id} panicked: {message}")]
    WorkerPanic {
        /// ID of the panicked thread
        thread_id: usize,
        /// Panic message
        message: String,
    },

    /// The pool has been shut down and accepts no more work
    #[error("Work pool '{pool_name}' is closed ({discarded} queued items discarded at shutdown)")]
    PoolClosed {
        /// Thread name prefix of the pool
        pool_name: String,
        /// Number of items discarded when the pool closed
        discarded: usize,
    },

    /// A global pool is already installed
    #[error("Global work pool is already initialized with {worker_count} workers")]
    AlreadyInitialized {
        /// Number of workers in the installed pool
        worker_count: usize,
    },

    /// No global pool is installed
    #[error("Global work pool is not initialized")]
    NotInitialized,

    /// General error
    #[error("{0}")]
    Other(String),
}

impl ThreadError {
    /// Create an invalid config error
    pub fn invalid_config(parameter: impl Into<String>, message: impl Into<String>) -> Self {
        ThreadError::InvalidConfig {
            parameter: parameter.into(),
            message: message.into(),
        }
    }

    /// Create a spawn error with source
    pub fn spawn_with_source(
        thread_id: usize,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        ThreadError::SpawnError {
            thread_id,
            message: message.into(),
            source: Some(source),
        }
    }

    /// Create a worker panic error
    pub fn worker_panic(thread_id: usize, message: impl Into<String>) -> Self {
        ThreadError::WorkerPanic {
            thread_id,
            message: message.into(),
        }
    }

    /// Create a pool closed error
    pub fn pool_closed(pool_name: impl Into<String>, discarded: usize) -> Self {
        ThreadError::PoolClosed {
            pool_name: pool_name.into(),
            discarded,
        }
    }

    /// Create an already initialized error
    pub fn already_initialized(worker_count: usize) -> Self {
        ThreadError::AlreadyInitialized { worker_count }
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        ThreadError::Other(msg.into())
    }

    /// Whether this error reports work that can no longer be accepted
    pub fn is_closed(&self) -> bool {
        matches!(self, ThreadError::PoolClosed { .. })
    }
}

/// Extract a readable message from a panic payload.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}
