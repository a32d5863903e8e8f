//! Property-based tests for work_pool using proptest

use crossbeam_channel::{bounded, unbounded};
use parking_lot::Mutex;
use proptest::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use work_pool::prelude::*;

const TIMEOUT: Duration = Duration::from_secs(10);

// ============================================================================
// WorkPoolConfig Tests
// ============================================================================

proptest! {
    /// Any positive thread count is kept as given
    #[test]
    fn test_config_thread_count(threads in 1usize..64) {
        let config = WorkPoolConfig::new(threads);
        prop_assert_eq!(config.num_threads, threads);
        prop_assert!(config.validate().is_ok());
    }

    /// Printable prefixes validate and are kept verbatim
    #[test]
    fn test_config_thread_name_prefix(prefix in "[a-z][a-z0-9-]{0,15}") {
        let config = WorkPoolConfig::new(2).with_thread_name_prefix(prefix.clone());
        prop_assert!(config.validate().is_ok());
        prop_assert_eq!(config.thread_name_prefix, prefix);
    }
}

// ============================================================================
// Execution Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    /// Every submitted item completes exactly once for any worker count
    #[test]
    fn test_all_items_complete(workers in 1usize..6, item_count in 1usize..60) {
        let pool = WorkPool::with_threads(workers).unwrap();
        let runs = Arc::new(AtomicUsize::new(0));
        let (done_tx, done_rx) = unbounded();

        for _ in 0..item_count {
            let runs = Arc::clone(&runs);
            let done_tx = done_tx.clone();
            pool.submit(
                FnWorkItem::new(move || {
                    runs.fetch_add(1, Ordering::SeqCst);
                })
                .with_completion(move || done_tx.send(()).unwrap()),
            )
            .unwrap();
        }

        for _ in 0..item_count {
            done_rx.recv_timeout(TIMEOUT).unwrap();
        }
        pool.shutdown().unwrap();

        prop_assert_eq!(runs.load(Ordering::SeqCst), item_count);
    }

    /// A single worker processes items in submission order
    #[test]
    fn test_fifo_single_worker(values in prop::collection::vec(any::<u32>(), 1..40)) {
        let pool = WorkPool::with_threads(1).unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let (done_tx, done_rx) = unbounded();

        for &value in &values {
            let seen = Arc::clone(&seen);
            let done_tx = done_tx.clone();
            pool.submit(
                FnWorkItem::new(move || seen.lock().push(value))
                    .with_completion(move || done_tx.send(()).unwrap()),
            )
            .unwrap();
        }

        for _ in 0..values.len() {
            done_rx.recv_timeout(TIMEOUT).unwrap();
        }
        pool.shutdown().unwrap();

        prop_assert_eq!(&*seen.lock(), &values);
    }

    /// Clearing behind a busy worker removes exactly the queued items
    #[test]
    fn test_clear_removes_exactly_queued(queued in 0usize..30) {
        let pool = WorkPool::with_threads(1).unwrap();
        let (started_tx, started_rx) = bounded(1);
        let (gate_tx, gate_rx) = bounded::<()>(1);

        pool.execute(move || {
            started_tx.send(()).unwrap();
            let _ = gate_rx.recv();
        })
        .unwrap();
        started_rx.recv_timeout(TIMEOUT).unwrap();

        let runs = Arc::new(AtomicUsize::new(0));
        for _ in 0..queued {
            let runs = Arc::clone(&runs);
            pool.execute(move || {
                runs.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();
        }

        prop_assert_eq!(pool.clear_queue(), queued);
        gate_tx.send(()).unwrap();
        pool.shutdown().unwrap();

        prop_assert_eq!(runs.load(Ordering::SeqCst), 0);
    }
}
