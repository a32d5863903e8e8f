//! Worker thread implementation

use crate::core::error::panic_message;
use crate::core::{BoxedWorkItem, Result, ThreadError, WorkItem};
use crate::pool::PanicPolicy;
use crate::queue::JobQueue;
use std::panic::{catch_unwind, resume_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

#[cfg(feature = "tracing")]
use tracing::{debug, span, Level};

/// Statistics for a worker thread
#[derive(Debug, Default)]
pub struct WorkerStats {
    /// Total number of items whose `execute` and `on_complete` both returned
    pub items_completed: AtomicU64,
    /// Total number of items that panicked
    pub items_panicked: AtomicU64,
    /// Total time spent processing items (microseconds)
    pub total_processing_time_us: AtomicU64,
}

impl WorkerStats {
    /// Create new worker statistics
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment items completed counter
    pub fn increment_completed(&self) {
        self.items_completed.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment items panicked counter
    pub fn increment_panicked(&self) {
        self.items_panicked.fetch_add(1, Ordering::Relaxed);
    }

    /// Add processing time
    pub fn add_processing_time(&self, microseconds: u64) {
        self.total_processing_time_us
            .fetch_add(microseconds, Ordering::Relaxed);
    }

    /// Get total items completed
    pub fn get_items_completed(&self) -> u64 {
        self.items_completed.load(Ordering::Relaxed)
    }

    /// Get total items panicked
    pub fn get_items_panicked(&self) -> u64 {
        self.items_panicked.load(Ordering::Relaxed)
    }

    /// Get average processing time per completed item in microseconds
    pub fn get_average_processing_time_us(&self) -> f64 {
        let total = self.total_processing_time_us.load(Ordering::Relaxed);
        let count = self.items_completed.load(Ordering::Relaxed);
        if count > 0 {
            total as f64 / count as f64
        } else {
            0.0
        }
    }

    /// Point-in-time copy of the counters
    pub fn snapshot(&self, worker_id: usize) -> WorkerStatSnapshot {
        WorkerStatSnapshot {
            worker_id,
            items_completed: self.get_items_completed(),
            items_panicked: self.get_items_panicked(),
            total_processing_time_us: self.total_processing_time_us.load(Ordering::Relaxed),
        }
    }
}

/// Plain copy of a worker's statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WorkerStatSnapshot {
    /// Worker the counters belong to
    pub worker_id: usize,
    /// Items completed
    pub items_completed: u64,
    /// Items panicked
    pub items_panicked: u64,
    /// Processing time in microseconds
    pub total_processing_time_us: u64,
}

/// A worker thread that runs the dequeue-execute-callback loop
#[derive(Debug)]
pub struct Worker {
    id: usize,
    thread: Option<thread::JoinHandle<()>>,
    stats: Arc<WorkerStats>,
}

impl Worker {
    /// Spawn a worker serving `queue`.
    ///
    /// The worker waits on the queue's condition variable and exits once the
    /// queue has been closed.
    pub fn new(
        id: usize,
        name_prefix: &str,
        queue: Arc<JobQueue>,
        panic_policy: PanicPolicy,
    ) -> Result<Self> {
        let stats = Arc::new(WorkerStats::new());
        let stats_clone = Arc::clone(&stats);

        let thread = thread::Builder::new()
            .name(format!("{}-{}", name_prefix, id))
            .spawn(move || {
                Self::run(id, &queue, &stats_clone, panic_policy);
            })
            .map_err(|e| ThreadError::spawn_with_source(id, "thread spawn failed", e))?;

        Ok(Self {
            id,
            thread: Some(thread),
            stats,
        })
    }

    /// Get worker ID
    pub fn id(&self) -> usize {
        self.id
    }

    /// Get worker statistics
    pub fn stats(&self) -> Arc<WorkerStats> {
        Arc::clone(&self.stats)
    }

    /// Whether the worker thread has exited
    pub fn is_finished(&self) -> bool {
        self.thread.as_ref().map_or(true, |t| t.is_finished())
    }

    /// Join the worker thread
    ///
    /// A worker that died from a propagated panic reports
    /// [`ThreadError::WorkerPanic`].
    pub fn join(mut self) -> Result<()> {
        if let Some(thread) = self.thread.take() {
            thread
                .join()
                .map_err(|payload| ThreadError::worker_panic(self.id, panic_message(&*payload)))?;
        }
        Ok(())
    }

    /// Main worker loop: waiting -> executing -> waiting, until the queue
    /// reports it is closed.
    fn run(id: usize, queue: &JobQueue, stats: &WorkerStats, panic_policy: PanicPolicy) {
        #[cfg(feature = "tracing")]
        let worker_span = span!(Level::DEBUG, "worker", id = id);
        #[cfg(feature = "tracing")]
        let _guard = worker_span.enter();

        #[cfg(feature = "tracing")]
        debug!("worker started");
        log::debug!("worker {} of pool '{}' started", id, queue.name());

        while let Some(mut item) = queue.pop_blocking() {
            let _busy = queue.busy();

            #[cfg(feature = "tracing")]
            crate::tracing::metrics::record_worker_busy(id);

            Self::process(id, &mut item, stats, panic_policy);

            #[cfg(feature = "tracing")]
            crate::tracing::metrics::record_worker_idle(id);
        }

        #[cfg(feature = "tracing")]
        debug!(
            items_completed = stats.get_items_completed(),
            items_panicked = stats.get_items_panicked(),
            "worker shutting down"
        );
        log::debug!(
            "worker {} of pool '{}' stopped after {} items",
            id,
            queue.name(),
            stats.get_items_completed()
        );
    }

    /// Run one item: `execute`, then `on_complete`.
    fn process(id: usize, item: &mut BoxedWorkItem, stats: &WorkerStats, policy: PanicPolicy) {
        #[cfg(feature = "tracing")]
        let item_span = span!(Level::DEBUG, "work_item", name = item.name());
        #[cfg(feature = "tracing")]
        let _item_guard = item_span.enter();

        let start = Instant::now();

        let outcome = catch_unwind(AssertUnwindSafe(|| {
            item.execute();
            item.on_complete();
        }));

        let elapsed = start.elapsed();
        stats.add_processing_time(elapsed.as_micros() as u64);

        match outcome {
            Ok(()) => {
                stats.increment_completed();
                #[cfg(feature = "tracing")]
                {
                    debug!(duration_ms = elapsed.as_millis() as u64, "work item completed");
                    crate::tracing::metrics::record_completion(elapsed);
                }
            }
            Err(payload) => {
                stats.increment_panicked();
                let message = panic_message(&*payload);
                #[cfg(feature = "tracing")]
                {
                    tracing::error!(
                        panic_message = %message,
                        duration_ms = elapsed.as_millis() as u64,
                        "work item panicked"
                    );
                    crate::tracing::metrics::record_panic(elapsed);
                }

                match policy {
                    PanicPolicy::Isolate => {
                        log::error!(
                            "worker {}: work item '{}' panicked: {}",
                            id,
                            item.name(),
                            message
                        );
                    }
                    PanicPolicy::Propagate => {
                        log::error!(
                            "worker {}: work item '{}' panicked, terminating worker: {}",
                            id,
                            item.name(),
                            message
                        );
                        resume_unwind(payload);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::FnWorkItem;
    use crate::queue::WakePolicy;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    fn new_queue() -> Arc<JobQueue> {
        Arc::new(JobQueue::new("worker-test", WakePolicy::All))
    }

    #[test]
    fn test_worker_creation() {
        let queue = new_queue();

        let worker = Worker::new(0, "test", Arc::clone(&queue), PanicPolicy::Propagate)
            .expect("Failed to create worker");
        assert_eq!(worker.id(), 0);

        // Close queue to trigger worker shutdown
        queue.close();
        worker.join().expect("Failed to join worker");
    }

    #[test]
    fn test_worker_runs_execute_then_on_complete() {
        let queue = new_queue();
        let worker = Worker::new(0, "test", Arc::clone(&queue), PanicPolicy::Propagate)
            .expect("Failed to create worker");
        let stats = worker.stats();

        let (tx, rx) = crossbeam_channel::unbounded();
        let tx_done = tx.clone();
        queue
            .push(Box::new(
                FnWorkItem::new(move || tx.send("execute").unwrap())
                    .with_completion(move || tx_done.send("complete").unwrap()),
            ))
            .expect("Failed to push item");

        assert_eq!(rx.recv_timeout(Duration::from_secs(5)), Ok("execute"));
        assert_eq!(rx.recv_timeout(Duration::from_secs(5)), Ok("complete"));

        queue.close();
        worker.join().expect("Failed to join worker");

        assert_eq!(stats.get_items_completed(), 1);
        assert_eq!(stats.get_items_panicked(), 0);
    }

    #[test]
    fn test_worker_panic_isolated() {
        let queue = new_queue();
        let worker = Worker::new(0, "test", Arc::clone(&queue), PanicPolicy::Isolate)
            .expect("Failed to create worker");
        let stats = worker.stats();

        let completions = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&completions);
        queue
            .push(Box::new(
                FnWorkItem::new(|| panic!("Intentional panic for testing"))
                    .with_completion(move || {
                        c.fetch_add(1, Ordering::SeqCst);
                    }),
            ))
            .expect("Failed to push panicking item");

        // Verify the worker survives and serves the next item
        let (tx, rx) = crossbeam_channel::bounded(1);
        queue
            .push(Box::new(FnWorkItem::new(move || tx.send(()).unwrap())))
            .expect("Failed to push normal item");
        rx.recv_timeout(Duration::from_secs(5))
            .expect("worker did not survive the panic");

        queue.close();
        worker.join().expect("isolated panic must not fail the join");

        assert_eq!(completions.load(Ordering::SeqCst), 0);
        assert_eq!(stats.get_items_panicked(), 1);
        assert_eq!(stats.get_items_completed(), 1);
    }

    #[test]
    fn test_worker_panic_propagates() {
        let queue = new_queue();
        let worker = Worker::new(7, "test", Arc::clone(&queue), PanicPolicy::Propagate)
            .expect("Failed to create worker");

        queue
            .push(Box::new(FnWorkItem::new(|| panic!("fatal item"))))
            .expect("Failed to push item");

        let deadline = Instant::now() + Duration::from_secs(5);
        while !worker.is_finished() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        assert!(worker.is_finished());
        assert_eq!(queue.active(), 0);

        queue.close();
        match worker.join() {
            Err(ThreadError::WorkerPanic { thread_id, message }) => {
                assert_eq!(thread_id, 7);
                assert_eq!(message, "fatal item");
            }
            other => panic!("expected WorkerPanic, got {:?}", other),
        }
    }

    #[test]
    fn test_stats_snapshot() {
        let stats = WorkerStats::new();
        stats.increment_completed();
        stats.increment_completed();
        stats.add_processing_time(300);

        let snapshot = stats.snapshot(3);
        assert_eq!(snapshot.worker_id, 3);
        assert_eq!(snapshot.items_completed, 2);
        assert_eq!(snapshot.total_processing_time_us, 300);
        assert!((stats.get_average_processing_time_us() - 150.0).abs() < f64::EPSILON);
    }
}
