//! Ghost-row (halo) exchange between rank-adjacent workers.
//!
//! Protocol, once per timestep and per worker:
//! 1. with an upper neighbour: receive its bottom row into ghost row 0
//!    (tag [`HALO_DOWN`]) and send real row 1 up (tag [`HALO_UP`]);
//! 2. with a lower neighbour: receive its top row into ghost row `rows + 1`
//!    (tag [`HALO_UP`]) and send real row `rows` down (tag [`HALO_DOWN`]);
//! 3. [`PendingExchange::join`] waits for every receive and drains every send
//!    before the stencil may run.
//!
//! Receives are posted before sends. The two tags are reused every timestep:
//! the transport is FIFO per `(src, dst, tag)` and a worker never has more
//! than one exchange in flight, so rounds cannot be confused.

use crate::algs::communicator::{CommTag, Communicator, Wait};
use crate::algs::wire::{cast_slice, cast_slice_mut, decode_row};
use crate::data::local_grid::LocalGridBuffer;
use crate::heat_error::HeatError;
use crate::partitioning::Partition;

/// Row travelling towards rank - 1 (the sender's top real row).
pub const HALO_UP: CommTag = CommTag(0x4801);
/// Row travelling towards rank + 1 (the sender's bottom real row).
pub const HALO_DOWN: CommTag = CommTag(0x4802);

/// Message operations issued by one exchange.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExchangeStats {
    pub sends: usize,
    pub recvs: usize,
}

impl ExchangeStats {
    pub fn total(&self) -> usize {
        self.sends + self.recvs
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HaloExchanger {
    rank: usize,
    upper: Option<usize>,
    lower: Option<usize>,
}

impl HaloExchanger {
    pub fn new(partition: &Partition) -> Self {
        Self {
            rank: partition.rank,
            upper: partition.upper(),
            lower: partition.lower(),
        }
    }

    /// Neighbour ranks, upper first.
    pub fn neighbours(&self) -> impl Iterator<Item = usize> {
        self.upper.into_iter().chain(self.lower)
    }

    /// Post all receives, then all sends, for this timestep.
    pub fn post<C: Communicator>(&self, comm: &C, grid: &mut LocalGridBuffer) -> PendingExchange<C> {
        debug_assert_eq!(comm.rank(), self.rank, "communicator rank differs from partition");
        let rows = grid.rows();
        let mut recvs = Vec::with_capacity(2);
        let mut sends = Vec::with_capacity(2);

        // 1) post receives into the ghost rows
        if let Some(up) = self.upper {
            let h = comm.irecv(up, HALO_DOWN.as_u16(), cast_slice_mut(grid.row_mut(0)));
            recvs.push((up, 0, h));
        }
        if let Some(down) = self.lower {
            let ghost = grid.bottom_ghost();
            let h = comm.irecv(down, HALO_UP.as_u16(), cast_slice_mut(grid.row_mut(ghost)));
            recvs.push((down, ghost, h));
        }

        // 2) post sends of the boundary real rows
        if let Some(up) = self.upper {
            sends.push(comm.isend(up, HALO_UP.as_u16(), cast_slice(grid.row(1))));
        }
        if let Some(down) = self.lower {
            sends.push(comm.isend(down, HALO_DOWN.as_u16(), cast_slice(grid.row(rows))));
        }

        log::trace!(
            "rank {}: halo posted ({} recvs, {} sends)",
            self.rank,
            recvs.len(),
            sends.len()
        );
        PendingExchange { recvs, sends }
    }

    /// Post and join in one go.
    pub fn exchange<C: Communicator>(
        &self,
        comm: &C,
        grid: &mut LocalGridBuffer,
    ) -> Result<ExchangeStats, HeatError> {
        self.post(comm, grid).join(grid)
    }
}

/// Outstanding halo messages of one timestep.
#[must_use = "a posted exchange must be joined before the stencil runs"]
pub struct PendingExchange<C: Communicator> {
    recvs: Vec<(usize, usize, C::RecvHandle)>,
    sends: Vec<C::SendHandle>,
}

impl<C: Communicator> PendingExchange<C> {
    /// Per-timestep synchronization point: wait for every receive, copy it
    /// into its ghost row, and drain every send, even after a failure.
    pub fn join(self, grid: &mut LocalGridBuffer) -> Result<ExchangeStats, HeatError> {
        let stats = ExchangeStats {
            sends: self.sends.len(),
            recvs: self.recvs.len(),
        };

        // 3) wait for all recvs (but do not early-return)
        let mut maybe_err = None;
        for (peer, ghost, h) in self.recvs {
            match h.wait() {
                Some(data) if maybe_err.is_none() => {
                    if let Err(reason) = decode_row(&data, grid.row_mut(ghost)) {
                        maybe_err = Some(HeatError::comm(peer, format!("halo row: {reason}")));
                    }
                }
                None if maybe_err.is_none() => {
                    maybe_err = Some(HeatError::comm(
                        peer,
                        format!("no halo row received from rank {peer}"),
                    ));
                }
                _ => {} // already have an error; just drain
            }
        }

        // 4) always drain all send handles before returning
        for send in self.sends {
            let _ = send.wait();
        }

        match maybe_err {
            Some(err) => Err(err),
            None => Ok(stats),
        }
    }
}
