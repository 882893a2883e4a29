//! Partitioning errors for halo-heat

use thiserror::Error;

/// Errors from row-band decomposition of the global grid.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PartitionError {
    /// A run needs at least one worker.
    #[error("worker count must be at least 1")]
    ZeroWorkers,
    /// Every worker must own at least one row.
    #[error("grid of {n} rows cannot be split over {workers} workers")]
    TooFewRows { n: usize, workers: usize },
    /// Rank does not exist in a world of `workers`.
    #[error("rank {rank} out of range for {workers} workers")]
    RankOutOfRange { rank: usize, workers: usize },
    /// Bands leave a gap or overlap (invariant violation).
    #[error("row bands do not cover the grid: {0}")]
    Coverage(String),
}
