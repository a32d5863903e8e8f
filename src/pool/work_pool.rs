//! Work pool implementation

use crate::core::{BoxedWorkItem, FnWorkItem, Result, ThreadError, WorkItem};
use crate::pool::config::{PanicPolicy, WorkPoolConfig};
use crate::pool::worker::{Worker, WorkerStatSnapshot, WorkerStats};
use crate::queue::{JobQueue, WakePolicy};
use std::sync::Arc;

/// A fixed-size pool of worker threads serving one FIFO queue.
///
/// Workers are spawned on construction and live until
/// [`shutdown`](WorkPool::shutdown), which consumes the pool. Dropping a pool
/// that was never shut down performs the same teardown.
///
/// # Shutdown Mechanism
///
/// Shutdown discards everything still queued, stops the pool, wakes every
/// idle worker and joins all of them. Items already running are allowed to
/// finish; items still queued never run.
///
/// # Example
///
/// ```rust
/// use work_pool::prelude::*;
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
///
/// # fn main() -> Result<()> {
/// let pool = WorkPool::with_threads(2)?;
/// let done = Arc::new(AtomicUsize::new(0));
///
/// for _ in 0..4 {
///     let done = Arc::clone(&done);
///     pool.submit(FnWorkItem::new(|| {}).with_completion(move || {
///         done.fetch_add(1, Ordering::SeqCst);
///     }))?;
/// }
///
/// while done.load(Ordering::SeqCst) < 4 {
///     std::thread::yield_now();
/// }
/// pool.shutdown()?;
/// # Ok(())
/// # }
/// ```
pub struct WorkPool {
    config: WorkPoolConfig,
    queue: Arc<JobQueue>,
    workers: Vec<Worker>,
    stats: Vec<Arc<WorkerStats>>,
}

impl std::fmt::Debug for WorkPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkPool")
            .field("config", &self.config)
            .field("queue", &self.queue)
            .field("workers", &self.workers.len())
            .finish()
    }
}

impl WorkPool {
    /// Create a pool with one worker per hardware thread
    pub fn new() -> Result<Self> {
        Self::with_config(WorkPoolConfig::default())
    }

    /// Create a pool with specified number of threads (0 = hardware concurrency)
    pub fn with_threads(num_threads: usize) -> Result<Self> {
        Self::with_config(WorkPoolConfig::new(num_threads))
    }

    /// Create a pool with custom configuration
    ///
    /// # Errors
    ///
    /// `InvalidConfig` if the configuration does not validate, `SpawnError`
    /// if a worker thread cannot be created. On spawn failure the workers
    /// already started are stopped and joined before returning.
    pub fn with_config(config: WorkPoolConfig) -> Result<Self> {
        config.validate()?;

        let queue = Arc::new(JobQueue::new(
            config.thread_name_prefix.clone(),
            config.wake_policy,
        ));

        let mut workers = Vec::with_capacity(config.num_threads);
        for id in 0..config.num_threads {
            match Worker::new(
                id,
                &config.thread_name_prefix,
                Arc::clone(&queue),
                config.panic_policy,
            ) {
                Ok(worker) => workers.push(worker),
                Err(e) => {
                    log::error!(
                        "pool '{}': failed to spawn worker {}: {}",
                        config.thread_name_prefix,
                        id,
                        e
                    );
                    queue.close();
                    join_workers(&config.thread_name_prefix, workers);
                    return Err(e);
                }
            }
        }

        let stats = workers.iter().map(Worker::stats).collect();

        #[cfg(feature = "tracing")]
        crate::tracing::metrics::record_pool_start(config.num_threads, &config.thread_name_prefix);
        log::info!(
            "pool '{}' started with {} workers",
            config.thread_name_prefix,
            config.num_threads
        );

        Ok(Self {
            config,
            queue,
            workers,
            stats,
        })
    }

    /// Start configuring a pool
    pub fn builder() -> WorkPoolBuilder {
        WorkPoolBuilder::new()
    }

    /// Submit a work item to the tail of the queue
    ///
    /// Never blocks beyond the queue lock.
    pub fn submit<W: WorkItem + 'static>(&self, item: W) -> Result<()> {
        self.queue.push(Box::new(item))
    }

    /// Submit an already boxed work item
    pub fn submit_boxed(&self, item: BoxedWorkItem) -> Result<()> {
        self.queue.push(item)
    }

    /// Submit a closure as a work item with no completion callback
    pub fn execute<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        self.submit(FnWorkItem::new(f))
    }

    /// Get a cloneable handle for submitting from other threads
    pub fn submitter(&self) -> Submitter {
        Submitter {
            queue: Arc::clone(&self.queue),
        }
    }

    /// Discard every queued item that no worker has picked up yet
    ///
    /// Neither operation of a discarded item runs. Returns the number removed.
    pub fn clear_queue(&self) -> usize {
        self.queue.clear()
    }

    /// Shutdown the pool and wait for all workers to finish
    ///
    /// # Graceful Shutdown
    ///
    /// 1. Clears the queue and stops accepting work, in one step
    /// 2. Wakes every idle worker
    /// 3. Joins every worker once its current item (if any) is done
    ///
    /// Consuming `self` makes a second shutdown impossible.
    ///
    /// # Errors
    ///
    /// `WorkerPanic` if a worker died from a propagated panic. All workers
    /// are joined regardless; the first failure is returned.
    pub fn shutdown(mut self) -> Result<()> {
        self.shutdown_workers()
    }

    fn shutdown_workers(&mut self) -> Result<()> {
        let discarded = self.queue.close();

        let first_error = join_workers(
            &self.config.thread_name_prefix,
            std::mem::take(&mut self.workers),
        );

        #[cfg(feature = "tracing")]
        crate::tracing::metrics::record_pool_shutdown(
            self.total_completed(),
            self.total_panicked(),
        );
        log::info!(
            "pool '{}' shut down: {} completed, {} panicked, {} discarded",
            self.config.thread_name_prefix,
            self.total_completed(),
            self.total_panicked(),
            discarded
        );

        first_error.map_or(Ok(()), Err)
    }

    /// Get the number of worker threads
    pub fn num_threads(&self) -> usize {
        self.config.num_threads
    }

    /// Get the configuration the pool was built with
    pub fn config(&self) -> &WorkPoolConfig {
        &self.config
    }

    /// Check if the pool is accepting work
    pub fn is_running(&self) -> bool {
        self.queue.is_running()
    }

    /// Get current queue length (approximate)
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// Number of workers currently executing an item
    pub fn active_workers(&self) -> usize {
        self.queue.active()
    }

    /// Get total number of items accepted
    pub fn total_submitted(&self) -> u64 {
        self.queue.total_submitted()
    }

    /// Get total number of items picked up by a worker
    pub fn total_dequeued(&self) -> u64 {
        self.queue.total_dequeued()
    }

    /// Get total number of items discarded before they ran
    pub fn total_cleared(&self) -> u64 {
        self.queue.total_cleared()
    }

    /// Get total items completed across all workers
    pub fn total_completed(&self) -> u64 {
        self.stats.iter().map(|s| s.get_items_completed()).sum()
    }

    /// Get total items panicked across all workers
    pub fn total_panicked(&self) -> u64 {
        self.stats.iter().map(|s| s.get_items_panicked()).sum()
    }

    /// Get statistics for all workers
    pub fn worker_stats(&self) -> Vec<WorkerStatSnapshot> {
        self.stats
            .iter()
            .enumerate()
            .map(|(id, s)| s.snapshot(id))
            .collect()
    }
}

/// Join every worker, logging each failure; returns the first one.
fn join_workers(pool_name: &str, workers: Vec<Worker>) -> Option<ThreadError> {
    let mut first_error = None;
    for worker in workers {
        let id = worker.id();
        if let Err(e) = worker.join() {
            log::error!("pool '{}': worker {} failed: {}", pool_name, id, e);
            first_error.get_or_insert(e);
        }
    }
    first_error
}

impl Drop for WorkPool {
    fn drop(&mut self) {
        if !self.workers.is_empty() {
            if let Err(e) = self.shutdown_workers() {
                log::error!(
                    "failed to shut down pool '{}' during drop: {}",
                    self.config.thread_name_prefix,
                    e
                );
            }
        }
    }
}

/// Cloneable producer handle sharing a pool's queue.
///
/// A submitter does not keep the workers alive; once the pool is shut down
/// every submission fails with [`ThreadError::PoolClosed`](crate::core::ThreadError::PoolClosed).
#[derive(Clone, Debug)]
pub struct Submitter {
    queue: Arc<JobQueue>,
}

impl Submitter {
    /// Submit a work item
    pub fn submit<W: WorkItem + 'static>(&self, item: W) -> Result<()> {
        self.queue.push(Box::new(item))
    }

    /// Submit an already boxed work item
    pub fn submit_boxed(&self, item: BoxedWorkItem) -> Result<()> {
        self.queue.push(item)
    }

    /// Submit a closure
    pub fn execute<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        self.submit(FnWorkItem::new(f))
    }

    /// Discard queued items
    pub fn clear_queue(&self) -> usize {
        self.queue.clear()
    }

    /// Whether the pool still accepts work
    pub fn is_running(&self) -> bool {
        self.queue.is_running()
    }

    /// Current queue length
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// Items accepted so far
    pub fn total_submitted(&self) -> u64 {
        self.queue.total_submitted()
    }

    /// Items picked up by a worker so far
    pub fn total_dequeued(&self) -> u64 {
        self.queue.total_dequeued()
    }

    /// Items discarded by clearing or shutdown so far
    pub fn total_cleared(&self) -> u64 {
        self.queue.total_cleared()
    }
}

/// Fluent builder for [`WorkPool`]
#[derive(Debug, Clone, Default)]
pub struct WorkPoolBuilder {
    config: WorkPoolConfig,
}

impl WorkPoolBuilder {
    /// Builder starting from the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of worker threads (0 = hardware concurrency)
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn num_threads(mut self, num_threads: usize) -> Self {
        self.config = self.config.with_num_threads(num_threads);
        self
    }

    /// Worker thread name prefix
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn thread_name_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.config = self.config.with_thread_name_prefix(prefix);
        self
    }

    /// Panic handling policy
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn panic_policy(mut self, policy: PanicPolicy) -> Self {
        self.config = self.config.with_panic_policy(policy);
        self
    }

    /// Wake policy on submission
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn wake_policy(mut self, policy: WakePolicy) -> Self {
        self.config = self.config.with_wake_policy(policy);
        self
    }

    /// Spawn the workers
    pub fn build(self) -> Result<WorkPool> {
        WorkPool::with_config(self.config)
    }
}
