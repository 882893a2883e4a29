#![cfg_attr(docsrs, feature(doc_cfg))]
//! # halo-heat
//!
//! halo-heat evolves a 2D heat field on an N×N grid with an explicit 5-point
//! finite-difference scheme. The same simulation runs in three execution
//! models that agree bit for bit:
//!
//! - a single-threaded serial baseline ([`solver::serial`]),
//! - a shared-memory variant on rayon ([`solver::shared`], feature `rayon`),
//! - a distributed variant using row-band domain decomposition, per-timestep
//!   ghost-row exchange and a final gather on a root worker
//!   ([`solver::distributed`]).
//!
//! ## Features
//! - Pluggable communication backends (serial no-op, in-process threads, MPI)
//!   behind one non-blocking [`Communicator`](algs::communicator::Communicator) trait
//! - Last-rank-absorbs or spread remainder policies for uneven splits
//! - Variable-size collection, with the fixed-size form as a checked special case
//! - Every fatal error names the worker and phase that failed
//!
//! ## Usage
//!
//! ```toml
//! [dependencies]
//! halo-heat = "0.1"
//! # Optional features:
//! # features = ["mpi-support"]
//! ```
//!
//! ```no_run
//! use halo_heat::prelude::*;
//!
//! let cfg = SimulationConfig::new(256, 500, 0.1).with_workers(4);
//! let out = run_threaded(&cfg)?;
//! println!("centre = {}", out.field.get(128, 128));
//! # Ok::<(), HeatError>(())
//! ```
//!
//! ## Determinism
//!
//! All execution models share one update kernel and visit cells in the same
//! order, so results do not depend on worker or thread count.

pub mod algs;
pub mod config;
pub mod data;
pub mod debug_invariants;
pub mod heat_error;
pub mod io;
pub mod partitioning;
pub mod solver;

pub use debug_invariants::DebugInvariants;

/// A convenient prelude to import the most-used traits & types:
pub mod prelude {
    pub use crate::algs::collect::ResultCollector;
    #[cfg(feature = "mpi-support")]
    pub use crate::algs::communicator::MpiComm;
    pub use crate::algs::communicator::{Communicator, NoComm, ThreadComm, Wait};
    pub use crate::algs::halo_exchange::HaloExchanger;
    pub use crate::algs::stencil::StencilUpdater;
    pub use crate::config::{CollectMode, SimulationConfig};
    pub use crate::data::bc::DirichletBoundary;
    pub use crate::data::global_field::GlobalField;
    pub use crate::data::local_grid::LocalGridBuffer;
    pub use crate::debug_invariants::DebugInvariants;
    pub use crate::heat_error::{HeatError, Phase};
    pub use crate::partitioning::{GridPartitioner, Partition, RemainderPolicy};
    pub use crate::solver::distributed::{run_threaded, run_worker, run_world};
    pub use crate::solver::serial::run_serial;
    #[cfg(feature = "rayon")]
    pub use crate::solver::shared::run_shared;
    pub use crate::solver::{RunOutcome, RunTiming, WorkerOutcome};
}
