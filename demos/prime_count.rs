//! Prime counting on the work pool
//!
//! Counts the primes below four bounds, first on the pool and then on the
//! calling thread, and prints how long each run took. Completion lines from
//! the pool may appear in any order.
//!
//! Run with: cargo run --example prime_count

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Instant;
use work_pool::prelude::*;

const BOUNDS: [u32; 4] = [13455, 13999, 13872, 13717];

struct PrimeCount {
    bound: u32,
    primes_found: u32,
    completed: bool,
}

impl PrimeCount {
    fn new(bound: u32) -> Self {
        Self {
            bound,
            primes_found: 0,
            completed: false,
        }
    }
}

fn is_prime(n: u32) -> bool {
    n >= 2 && (2..).take_while(|d| d * d <= n).all(|d| n % d != 0)
}

impl WorkItem for PrimeCount {
    fn execute(&mut self) {
        self.primes_found = (2..self.bound).filter(|&n| is_prime(n)).count() as u32;
    }

    fn on_complete(&mut self) {
        self.completed = true;
        println!(
            "The work pool found {} primes between 1 and {}",
            self.primes_found, self.bound
        );
    }

    fn name(&self) -> &str {
        "PrimeCount"
    }
}

fn main() -> Result<()> {
    env_logger::init();

    println!("Running the tasks on the work pool:\n");
    let pool_start = Instant::now();

    let pool = WorkPool::new()?;
    let items: Vec<_> = BOUNDS
        .iter()
        .map(|&bound| Arc::new(Mutex::new(PrimeCount::new(bound))))
        .collect();
    for item in &items {
        pool.submit(Arc::clone(item))?;
    }

    // Shutdown discards anything still queued, so wait for every item first
    while items.iter().any(|item| !item.lock().completed) {
        std::thread::yield_now();
    }
    pool.shutdown()?;
    let pool_elapsed = pool_start.elapsed();

    println!("\nNow the same bounds without the pool:\n");
    let serial_start = Instant::now();
    for &bound in &BOUNDS {
        let mut item = PrimeCount::new(bound);
        item.execute();
        item.on_complete();
    }
    let serial_elapsed = serial_start.elapsed();

    println!(
        "\nExecution time using the work pool: {:.3} ms",
        pool_elapsed.as_secs_f64() * 1000.0
    );
    println!(
        "Execution time on one thread: {:.3} ms",
        serial_elapsed.as_secs_f64() * 1000.0
    );

    Ok(())
}
