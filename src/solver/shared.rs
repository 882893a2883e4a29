//! Shared-memory variant: interior rows of each timestep run on rayon.
//!
//! The write target is split into disjoint rows, so no locking is needed:
//! every `next` cell is written by exactly one task and only `current` is
//! read.

use std::time::Instant;

use rayon::prelude::*;

use super::serial::initial_field;
use super::{RunOutcome, RunTiming};
use crate::algs::stencil::update_row;
use crate::config::SimulationConfig;
use crate::data::global_field::GlobalField;
use crate::heat_error::HeatError;

pub fn step_par(current: &GlobalField, next: &mut GlobalField, alpha: f64) {
    let n = current.n();
    if n < 3 {
        return;
    }
    next.rows_mut(1, n - 2)
        .par_chunks_mut(n)
        .enumerate()
        .for_each(|(r, out)| {
            let i = r + 1;
            update_row(current.row(i - 1), current.row(i), current.row(i + 1), out, alpha);
        });
}

pub fn run_shared(cfg: &SimulationConfig) -> Result<RunOutcome, HeatError> {
    cfg.validate()?;
    let mut u = initial_field(cfg);
    let mut u_next = u.clone();

    log::info!(
        "shared-memory run: {0}x{0} grid, {1} iterations, {2} threads",
        cfg.n,
        cfg.max_iter,
        rayon::current_num_threads()
    );
    let started = Instant::now();
    for _ in 0..cfg.max_iter {
        step_par(&u, &mut u_next, cfg.alpha);
        std::mem::swap(&mut u, &mut u_next);
    }
    let finished = Instant::now();
    log::info!("shared-memory run finished in {:?}", finished - started);

    Ok(RunOutcome {
        field: u,
        timing: RunTiming { started, finished },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::serial::run_serial;

    #[test]
    fn matches_serial_bit_for_bit() {
        let cfg = SimulationConfig::new(24, 40, 0.2);
        let serial = run_serial(&cfg).unwrap();
        let shared = run_shared(&cfg).unwrap();
        assert_eq!(serial.field, shared.field);
    }
}
