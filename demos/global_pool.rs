//! Process-wide pool usage
//!
//! Installs a global pool, submits from several producer threads through
//! submitter handles, then tears the pool down explicitly.
//!
//! Run with: cargo run --example global_pool

use std::thread;
use std::time::Duration;
use work_pool::global;
use work_pool::prelude::*;

fn main() -> Result<()> {
    env_logger::init();

    global::init_with(WorkPoolConfig::from_env().with_thread_name_prefix("global"))?;

    let (done_tx, done_rx) = crossbeam_channel::unbounded();
    let producers: Vec<_> = (0..3)
        .map(|producer| -> Result<thread::JoinHandle<Result<()>>> {
            let submitter = global::submitter()?;
            let done_tx = done_tx.clone();
            Ok(thread::spawn(move || -> Result<()> {
                for i in 0..5 {
                    let done_tx = done_tx.clone();
                    submitter.submit(
                        FnWorkItem::with_name(
                            move || thread::sleep(Duration::from_millis(10)),
                            format!("producer-{}-item-{}", producer, i),
                        )
                        .with_completion(move || {
                            let _ = done_tx.send((producer, i));
                        }),
                    )?;
                }
                Ok(())
            }))
        })
        .collect::<Result<_>>()?;
    drop(done_tx);

    for producer in producers {
        producer
            .join()
            .map_err(|_| ThreadError::other("producer thread panicked"))??;
    }

    for _ in 0..15 {
        let (producer, i) = done_rx
            .recv()
            .map_err(|_| ThreadError::other("completion channel closed early"))?;
        println!("completed item {} from producer {}", i, producer);
    }

    global::shutdown()?;
    println!("global pool shut down");
    Ok(())
}
