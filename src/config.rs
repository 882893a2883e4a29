//! Immutable simulation parameters.
//!
//! A [`SimulationConfig`] is built once at process start and handed by
//! reference to every component; nothing in the crate keeps its own copy of
//! grid size, iteration count or coefficient.

use serde::{Deserialize, Serialize};

use crate::heat_error::HeatError;
use crate::partitioning::{GridPartitioner, RemainderPolicy};

/// Largest `alpha` for which the explicit 2D scheme is stable.
pub const STABLE_ALPHA_LIMIT: f64 = 0.25;

/// How the root assembles the per-worker slabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CollectMode {
    /// Each worker reports its own `(offset, rows)`; works for any split.
    #[default]
    Variable,
    /// Fixed-size collective; only valid when `n % workers == 0`.
    Uniform,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Grid side length (the grid is `n × n`).
    pub n: usize,
    /// Number of timesteps.
    pub max_iter: usize,
    /// Stencil coefficient.
    pub alpha: f64,
    /// Dirichlet value held on column 0.
    pub boundary_value: f64,
    /// Number of distributed workers.
    pub workers: usize,
    pub remainder_policy: RemainderPolicy,
    pub collect_mode: CollectMode,
    /// Rank that receives the assembled field.
    pub root: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            n: 2000,
            max_iter: 4000,
            alpha: 0.1,
            boundary_value: 100.0,
            workers: 1,
            remainder_policy: RemainderPolicy::LastAbsorbs,
            collect_mode: CollectMode::Variable,
            root: 0,
        }
    }
}

impl SimulationConfig {
    pub fn new(n: usize, max_iter: usize, alpha: f64) -> Self {
        Self {
            n,
            max_iter,
            alpha,
            ..Default::default()
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_boundary_value(mut self, value: f64) -> Self {
        self.boundary_value = value;
        self
    }

    pub fn with_remainder_policy(mut self, policy: RemainderPolicy) -> Self {
        self.remainder_policy = policy;
        self
    }

    pub fn with_collect_mode(mut self, mode: CollectMode) -> Self {
        self.collect_mode = mode;
        self
    }

    pub fn with_root(mut self, root: usize) -> Self {
        self.root = root;
        self
    }

    /// Check everything that can be checked without a communicator.
    ///
    /// An unstable `alpha` is only warned about: the scheme will diverge, but
    /// that is the caller's choice to make.
    pub fn validate(&self) -> Result<(), HeatError> {
        if self.n == 0 {
            return Err(HeatError::InvalidConfig("grid size must be positive".into()));
        }
        if !self.alpha.is_finite() || !self.boundary_value.is_finite() {
            return Err(HeatError::InvalidConfig(
                "alpha and boundary value must be finite".into(),
            ));
        }
        if self.root >= self.workers.max(1) {
            return Err(HeatError::InvalidConfig(format!(
                "root rank {} out of range for {} workers",
                self.root, self.workers
            )));
        }
        if self.alpha > STABLE_ALPHA_LIMIT {
            log::warn!(
                "alpha = {} exceeds the explicit stability limit {STABLE_ALPHA_LIMIT}",
                self.alpha
            );
        }
        Ok(())
    }

    /// Partitioner for this run's grid and worker count.
    pub fn partitioner(&self) -> Result<GridPartitioner, HeatError> {
        Ok(GridPartitioner::new(
            self.n,
            self.workers,
            self.remainder_policy,
        )?)
    }
}
