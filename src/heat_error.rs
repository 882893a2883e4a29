//! HeatError: Unified error type for halo-heat public APIs
//!
//! Every fallible operation of the crate returns this type. Nothing here is
//! recoverable by retrying: a run either completes on every worker or is
//! aborted, and the error says which worker and which phase gave up.

use std::fmt;
use thiserror::Error;

use crate::partitioning::error::PartitionError;

/// Stage of a worker's pipeline in which a fatal error surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Partition,
    Exchange,
    Update,
    Collection,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Partition => "partition",
            Phase::Exchange => "exchange",
            Phase::Update => "update",
            Phase::Collection => "collection",
        };
        f.write_str(name)
    }
}

/// Unified error type for halo-heat operations.
#[derive(Debug, Error)]
pub enum HeatError {
    /// Invalid rank / worker-count topology.
    #[error("Topology error: {0}")]
    Partition(#[from] PartitionError),
    /// A simulation parameter is unusable.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    /// Fixed-size collection requested for a grid the workers cannot split evenly.
    #[error("Uniform collection needs n divisible by worker count (n = {n}, workers = {workers})")]
    PartitionMismatch { n: usize, workers: usize },
    /// A message from `neighbor` never arrived or arrived malformed.
    #[error("Communication with rank {neighbor} failed: {source}")]
    CommError {
        neighbor: usize,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// Slab headers received by the root do not tile the global grid.
    #[error("Collection mismatch from rank {rank}: {reason}")]
    CollectionMismatch { rank: usize, reason: String },
    /// Local buffer access outside `rows × cols`.
    #[error("Cell ({row}, {col}) out of range for a {rows}x{cols} buffer")]
    CellOutOfRange {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },
    /// Any of the above, tagged with the worker and phase it came from.
    #[error("Worker {rank} failed during {phase}: {source}")]
    Worker {
        rank: usize,
        phase: Phase,
        #[source]
        source: Box<HeatError>,
    },
    /// An in-process worker thread panicked.
    #[error("Worker thread for rank {rank} panicked")]
    WorkerPanicked { rank: usize },
    /// The MPI runtime could not be brought up.
    #[error("MPI initialization failed")]
    MpiInit,
    /// Output collaborator failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl HeatError {
    /// Wrap `self` with the failing worker and phase. Already-tagged errors
    /// are returned unchanged so the innermost phase wins.
    pub fn in_phase(self, rank: usize, phase: Phase) -> Self {
        match self {
            err @ HeatError::Worker { .. } => err,
            other => HeatError::Worker {
                rank,
                phase,
                source: Box::new(other),
            },
        }
    }

    /// Build a [`HeatError::CommError`] from a plain message.
    pub fn comm(neighbor: usize, msg: impl Into<String>) -> Self {
        HeatError::CommError {
            neighbor,
            source: msg.into().into(),
        }
    }

    /// The phase this error was tagged with, if any.
    pub fn phase(&self) -> Option<Phase> {
        match self {
            HeatError::Worker { phase, .. } => Some(*phase),
            _ => None,
        }
    }

    /// Innermost error, with any worker/phase tag stripped.
    pub fn root_cause(&self) -> &HeatError {
        match self {
            HeatError::Worker { source, .. } => source.root_cause(),
            other => other,
        }
    }
}
