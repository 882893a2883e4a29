//! Single-threaded baseline.

use std::time::Instant;

use super::{RunOutcome, RunTiming};
use crate::algs::stencil::update_row;
use crate::config::SimulationConfig;
use crate::data::bc::DirichletBoundary;
use crate::data::global_field::GlobalField;
use crate::heat_error::HeatError;

/// Zero field with column 0 of every row at the boundary value.
pub fn initial_field(cfg: &SimulationConfig) -> GlobalField {
    let mut field = GlobalField::zeros(cfg.n);
    DirichletBoundary::new(cfg.boundary_value).apply_field(&mut field);
    field
}

/// One timestep: interior rows `1..n-1`, interior columns `1..n-1`.
pub fn step(current: &GlobalField, next: &mut GlobalField, alpha: f64) {
    let n = current.n();
    if n < 3 {
        return;
    }
    for i in 1..n - 1 {
        update_row(
            current.row(i - 1),
            current.row(i),
            current.row(i + 1),
            next.rows_mut(i, 1),
            alpha,
        );
    }
}

pub fn run_serial(cfg: &SimulationConfig) -> Result<RunOutcome, HeatError> {
    cfg.validate()?;
    let mut u = initial_field(cfg);
    let mut u_next = u.clone();

    log::info!("serial run: {0}x{0} grid, {1} iterations", cfg.n, cfg.max_iter);
    let started = Instant::now();
    for _ in 0..cfg.max_iter {
        step(&u, &mut u_next, cfg.alpha);
        std::mem::swap(&mut u, &mut u_next);
    }
    let finished = Instant::now();
    log::info!("serial run finished in {:?}", finished - started);

    Ok(RunOutcome {
        field: u,
        timing: RunTiming { started, finished },
    })
}
