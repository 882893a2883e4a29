//! Row-band decomposition of the global grid.
//!
//! The N×N grid is split into contiguous bands of whole rows, one per rank.
//! Bands are computed once at start-up and never change; they size every
//! local buffer and tell the stencil which local rows sit on the global
//! top/bottom edge.
//!
//! Two remainder policies are available when `n % workers != 0`:
//! - [`RemainderPolicy::LastAbsorbs`] (default): the highest rank takes every
//!   leftover row. Known load imbalance, logged but not corrected.
//! - [`RemainderPolicy::Spread`]: the first `n % workers` ranks take one extra
//!   row each.

pub mod error;
#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};

use crate::debug_invariants::DebugInvariants;
use crate::heat_error::HeatError;
pub use error::PartitionError;

/// Where the rows left over by `n / workers` end up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RemainderPolicy {
    /// Highest rank owns `n - rank * (n / workers)` rows.
    #[default]
    LastAbsorbs,
    /// Ranks `0..n % workers` own one extra row each.
    Spread,
}

/// One rank's band of the global grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Partition {
    pub rank: usize,
    pub workers: usize,
    pub row_count: usize,
    pub global_row_offset: usize,
}

impl Partition {
    /// Global row index of local real row `local_row`.
    ///
    /// Only real rows (`1..=row_count`) have a global index; ghost rows
    /// belong to the neighbours. Debug builds panic on a ghost index.
    #[inline]
    pub fn global_row(&self, local_row: usize) -> usize {
        debug_assert!(
            (1..=self.row_count).contains(&local_row),
            "local row {local_row} is not a real row of rank {} (1..={})",
            self.rank,
            self.row_count
        );
        self.global_row_offset + local_row - 1
    }

    /// One past the last global row of this band.
    #[inline]
    pub fn end(&self) -> usize {
        self.global_row_offset + self.row_count
    }

    pub fn contains(&self, global_row: usize) -> bool {
        (self.global_row_offset..self.end()).contains(&global_row)
    }

    /// Rank owning the band directly above, if any.
    pub fn upper(&self) -> Option<usize> {
        self.rank.checked_sub(1)
    }

    /// Rank owning the band directly below, if any.
    pub fn lower(&self) -> Option<usize> {
        (self.rank + 1 < self.workers).then_some(self.rank + 1)
    }
}

/// Maps `(n, workers, rank)` to a [`Partition`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridPartitioner {
    n: usize,
    workers: usize,
    policy: RemainderPolicy,
}

impl GridPartitioner {
    /// Validate the topology. Fails before anything is allocated.
    pub fn new(n: usize, workers: usize, policy: RemainderPolicy) -> Result<Self, PartitionError> {
        if workers == 0 {
            return Err(PartitionError::ZeroWorkers);
        }
        if n < workers {
            return Err(PartitionError::TooFewRows { n, workers });
        }
        let remainder = n % workers;
        if remainder != 0 && policy == RemainderPolicy::LastAbsorbs {
            log::warn!(
                "{n} rows over {workers} workers: rank {} carries {remainder} extra rows",
                workers - 1
            );
        }
        let partitioner = Self { n, workers, policy };
        partitioner.debug_assert_invariants();
        Ok(partitioner)
    }

    pub fn n(&self) -> usize {
        self.n
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn policy(&self) -> RemainderPolicy {
        self.policy
    }

    /// True when every band has `n / workers` rows.
    pub fn is_uniform(&self) -> bool {
        self.n % self.workers == 0
    }

    /// Band owned by `rank`.
    pub fn partition(&self, rank: usize) -> Result<Partition, PartitionError> {
        if rank >= self.workers {
            return Err(PartitionError::RankOutOfRange {
                rank,
                workers: self.workers,
            });
        }
        let base = self.n / self.workers;
        let (row_count, global_row_offset) = match self.policy {
            RemainderPolicy::LastAbsorbs => {
                let rows = if rank == self.workers - 1 {
                    self.n - rank * base
                } else {
                    base
                };
                (rows, rank * base)
            }
            RemainderPolicy::Spread => {
                let rem = self.n % self.workers;
                let rows = base + usize::from(rank < rem);
                (rows, rank * base + rank.min(rem))
            }
        };
        Ok(Partition {
            rank,
            workers: self.workers,
            row_count,
            global_row_offset,
        })
    }

    /// All bands in rank order.
    pub fn partitions(&self) -> Vec<Partition> {
        (0..self.workers)
            .filter_map(|rank| self.partition(rank).ok())
            .collect()
    }
}

impl DebugInvariants for GridPartitioner {
    fn validate_invariants(&self) -> Result<(), HeatError> {
        let mut next_row = 0;
        for band in self.partitions() {
            if band.global_row_offset != next_row {
                return Err(PartitionError::Coverage(format!(
                    "rank {} starts at row {}, expected {next_row}",
                    band.rank, band.global_row_offset
                ))
                .into());
            }
            if band.row_count == 0 {
                return Err(
                    PartitionError::Coverage(format!("rank {} owns no rows", band.rank)).into(),
                );
            }
            next_row = band.end();
        }
        if next_row != self.n {
            return Err(PartitionError::Coverage(format!(
                "bands end at row {next_row}, grid has {}",
                self.n
            ))
            .into());
        }
        Ok(())
    }
}
