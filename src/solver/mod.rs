//! The three execution models.
//!
//! - [`serial`]: single-threaded nested loops over one N×N double buffer.
//! - [`shared`]: the same loops with interior rows spread over rayon.
//! - [`distributed`]: row-band decomposition, halo exchange and collection
//!   over any [`Communicator`](crate::algs::communicator::Communicator).
//!
//! All three return the same field bit for bit.

pub mod distributed;
pub mod serial;
#[cfg(feature = "rayon")]
pub mod shared;

use std::time::{Duration, Instant};

use crate::data::global_field::GlobalField;
use crate::partitioning::Partition;

/// Start and end of the iteration loop, for an external reporter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunTiming {
    pub started: Instant,
    pub finished: Instant,
}

impl RunTiming {
    pub fn elapsed(&self) -> Duration {
        self.finished.saturating_duration_since(self.started)
    }
}

/// Result of a complete run.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub field: GlobalField,
    pub timing: RunTiming,
}

/// Result of one distributed worker. Only the root carries the field.
#[derive(Debug, Clone)]
pub struct WorkerOutcome {
    pub partition: Partition,
    pub timing: RunTiming,
    pub field: Option<GlobalField>,
}
