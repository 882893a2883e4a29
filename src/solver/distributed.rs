//! Distributed-memory variant: row-band domain decomposition.
//!
//! Per worker: partition once, then for every timestep
//! exchange halos → stencil → swap → re-impose the boundary, and finally
//! gather the slabs on the root. Any failure is tagged with the worker's
//! rank and the phase it happened in; there are no retries.

use std::time::Instant;

use super::{RunOutcome, RunTiming, WorkerOutcome};
use crate::algs::collect::ResultCollector;
use crate::algs::communicator::{Communicator, ThreadComm};
use crate::algs::halo_exchange::HaloExchanger;
use crate::algs::stencil::StencilUpdater;
use crate::config::SimulationConfig;
use crate::data::bc::DirichletBoundary;
use crate::data::local_grid::LocalGridBuffer;
use crate::heat_error::{HeatError, Phase};
use crate::partitioning::Partition;

/// Validate the topology and compute this rank's band. Nothing is allocated
/// before this succeeds.
fn setup<C: Communicator>(
    cfg: &SimulationConfig,
    comm: &C,
) -> Result<(Partition, ResultCollector), HeatError> {
    cfg.validate()?;
    if comm.size() != cfg.workers {
        return Err(HeatError::InvalidConfig(format!(
            "communicator has {} ranks, configuration expects {} workers",
            comm.size(),
            cfg.workers
        )));
    }
    let partition = cfg.partitioner()?.partition(comm.rank())?;
    let collector = ResultCollector::new(cfg);
    collector.check(comm.size())?;
    Ok((partition, collector))
}

/// Run the whole pipeline for the calling rank.
pub fn run_worker<C: Communicator>(
    cfg: &SimulationConfig,
    comm: &C,
) -> Result<WorkerOutcome, HeatError> {
    let rank = comm.rank();
    let fail = |phase: Phase| {
        move |err: HeatError| {
            let err = err.in_phase(rank, phase);
            log::error!("{err}");
            err
        }
    };

    let (partition, collector) = setup(cfg, comm).map_err(fail(Phase::Partition))?;
    log::debug!(
        "rank {rank}: rows {}..{} of {}",
        partition.global_row_offset,
        partition.end(),
        cfg.n
    );

    let mut grid = LocalGridBuffer::new(&partition, cfg.n, cfg.boundary_value);
    let halo = HaloExchanger::new(&partition);
    let stencil = StencilUpdater::new(cfg);
    let boundary = DirichletBoundary::new(cfg.boundary_value);

    if rank == collector.root() {
        log::info!(
            "distributed run: {0}x{0} grid, {1} iterations, {2} workers",
            cfg.n,
            cfg.max_iter,
            comm.size()
        );
    }
    let started = Instant::now();
    for t in 0..cfg.max_iter {
        halo.exchange(comm, &mut grid)
            .map_err(fail(Phase::Exchange))?;
        stencil
            .update(&partition, &mut grid)
            .map_err(fail(Phase::Update))?;
        grid.swap();
        boundary.apply(&mut grid);
        log::trace!("rank {rank}: timestep {t} done");
    }
    let finished = Instant::now();

    let field = collector
        .collect(comm, &partition, &grid)
        .map_err(fail(Phase::Collection))?;
    if field.is_some() {
        log::info!("distributed run finished in {:?}", finished - started);
    }

    Ok(WorkerOutcome {
        partition,
        timing: RunTiming { started, finished },
        field,
    })
}

/// Aborts the worker's world if the worker unwinds.
struct AbortOnPanic<'a, C: Communicator>(&'a C);

impl<C: Communicator> Drop for AbortOnPanic<'_, C> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            self.0.abort();
        }
    }
}

/// Run one worker per communicator, each on its own scoped thread, and
/// return the root's field. `comms[i]` must be rank `i`.
///
/// A worker that fails or panics aborts the world, so its peers stop
/// waiting on it instead of blocking forever. A panic is reported ahead of
/// the communication errors it causes on other ranks; otherwise the lowest
/// failing rank's error is returned.
pub fn run_world<C>(cfg: &SimulationConfig, comms: Vec<C>) -> Result<RunOutcome, HeatError>
where
    C: Communicator + Send,
{
    let results: Vec<Result<WorkerOutcome, HeatError>> = std::thread::scope(|s| {
        let handles: Vec<_> = comms
            .into_iter()
            .map(|comm| {
                s.spawn(move || {
                    let _guard = AbortOnPanic(&comm);
                    let result = run_worker(cfg, &comm);
                    if result.is_err() {
                        comm.abort();
                    }
                    result
                })
            })
            .collect();
        handles
            .into_iter()
            .enumerate()
            .map(|(rank, h)| {
                h.join()
                    .unwrap_or(Err(HeatError::WorkerPanicked { rank }))
            })
            .collect()
    });

    if let Some(rank) = results
        .iter()
        .position(|r| matches!(r, Err(HeatError::WorkerPanicked { .. })))
    {
        return Err(HeatError::WorkerPanicked { rank });
    }
    let mut outcomes = Vec::with_capacity(results.len());
    for result in results {
        outcomes.push(result?);
    }
    let started = outcomes.iter().map(|o| o.timing.started).min();
    let finished = outcomes.iter().map(|o| o.timing.finished).max();
    let field = outcomes.into_iter().find_map(|o| o.field);
    match (field, started, finished) {
        (Some(field), Some(started), Some(finished)) => Ok(RunOutcome {
            field,
            timing: RunTiming { started, finished },
        }),
        _ => Err(HeatError::InvalidConfig("no worker acted as root".into())),
    }
}

/// Distributed run with `cfg.workers` in-process workers.
///
/// Configuration and topology errors found before any worker starts are
/// tagged like worker errors: with the root rank and [`Phase::Partition`].
pub fn run_threaded(cfg: &SimulationConfig) -> Result<RunOutcome, HeatError> {
    cfg.validate()
        .and_then(|()| cfg.partitioner().map(drop))
        .map_err(|err| {
            let err = err.in_phase(cfg.root, Phase::Partition);
            log::error!("{err}");
            err
        })?;
    run_world(cfg, ThreadComm::world(cfg.workers))
}
