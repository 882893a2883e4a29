#![allow(dead_code)]
use std::time::Duration;

use halo_heat::prelude::*;

/// Connected in-process ranks `0..size`.
pub fn world(size: usize) -> Vec<ThreadComm> {
    ThreadComm::world(size)
}

/// Same as [`world`], but receives give up after `ms` milliseconds.
pub fn world_with_timeout(size: usize, ms: u64) -> Vec<ThreadComm> {
    ThreadComm::world(size)
        .into_iter()
        .map(|c| c.with_timeout(Duration::from_millis(ms)))
        .collect()
}

/// Run `f` once per rank, each on its own scoped thread; results in rank order.
pub fn on_ranks<T, F>(comms: Vec<ThreadComm>, f: F) -> Vec<T>
where
    T: Send,
    F: Fn(&ThreadComm) -> T + Sync,
{
    std::thread::scope(|s| {
        let handles: Vec<_> = comms
            .iter()
            .map(|comm| {
                let f = &f;
                s.spawn(move || f(comm))
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().expect("rank thread panicked"))
            .collect()
    })
}

/// Small configuration used across tests.
pub fn cfg(n: usize, iters: usize, workers: usize) -> SimulationConfig {
    SimulationConfig::new(n, iters, 0.1).with_workers(workers)
}
