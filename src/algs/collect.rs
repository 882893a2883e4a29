//! Gather every worker's ghost-free slab into one global field on the root.
//!
//! Two stages, mirroring a size exchange followed by a data exchange:
//! 1. every non-root worker sends a [`WireSlabHeader`] `{offset, rows}`;
//!    the root validates that the announced bands tile the grid;
//! 2. every non-root worker sends its `rows × n` values; the root posts
//!    receives sized from the headers and copies each slab into place.
//!
//! [`CollectMode::Uniform`] is the fixed-size special case: it refuses to run
//! (on every rank, before any message) unless `n % workers == 0`.

use crate::algs::communicator::{CommTag, Communicator, Wait};
use crate::algs::wire::{WireSlabHeader, cast_slice, decode_row};
use crate::config::{CollectMode, SimulationConfig};
use crate::data::global_field::GlobalField;
use crate::data::local_grid::LocalGridBuffer;
use crate::heat_error::HeatError;
use crate::partitioning::Partition;

pub const GATHER_HEADER: CommTag = CommTag(0x4810);
pub const GATHER_DATA: CommTag = CommTag(0x4811);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResultCollector {
    n: usize,
    root: usize,
    mode: CollectMode,
}

/// A band announced to the root.
#[derive(Debug, Clone, Copy)]
struct Band {
    rank: usize,
    offset: usize,
    rows: usize,
}

impl ResultCollector {
    pub fn new(cfg: &SimulationConfig) -> Self {
        Self {
            n: cfg.n,
            root: cfg.root,
            mode: cfg.collect_mode,
        }
    }

    pub fn root(&self) -> usize {
        self.root
    }

    /// Preconditions every rank can check locally.
    pub fn check(&self, workers: usize) -> Result<(), HeatError> {
        if self.root >= workers {
            return Err(HeatError::InvalidConfig(format!(
                "root rank {} out of range for {workers} workers",
                self.root
            )));
        }
        if self.mode == CollectMode::Uniform && self.n % workers != 0 {
            return Err(HeatError::PartitionMismatch {
                n: self.n,
                workers,
            });
        }
        Ok(())
    }

    /// Collect the current real rows of every worker. Returns the assembled
    /// field on the root and `None` everywhere else.
    pub fn collect<C: Communicator>(
        &self,
        comm: &C,
        partition: &Partition,
        grid: &LocalGridBuffer,
    ) -> Result<Option<GlobalField>, HeatError> {
        let workers = comm.size();
        self.check(workers)?;
        let slab = grid.real_rows();

        if comm.rank() != self.root {
            let header = WireSlabHeader::new(partition.global_row_offset, partition.row_count);
            let sends = [
                comm.isend(
                    self.root,
                    GATHER_HEADER.as_u16(),
                    cast_slice(std::slice::from_ref(&header)),
                ),
                comm.isend(self.root, GATHER_DATA.as_u16(), cast_slice(slab)),
            ];
            for send in sends {
                let _ = send.wait();
            }
            return Ok(None);
        }

        let own = Band {
            rank: comm.rank(),
            offset: partition.global_row_offset,
            rows: partition.row_count,
        };
        let bands = self.gather_headers(comm, own)?;
        log::debug!("root {}: {} slab headers validated", self.root, bands.len());

        let mut field = GlobalField::zeros(self.n);
        field
            .rows_mut(own.offset, own.rows)
            .copy_from_slice(slab);

        // Stage 2: post every payload receive, then wait in rank order.
        let mut pending = Vec::with_capacity(bands.len());
        for band in bands.iter().filter(|b| b.rank != self.root) {
            let mut sizing = vec![0u8; band.rows * self.n * std::mem::size_of::<f64>()];
            let h = comm.irecv(band.rank, GATHER_DATA.as_u16(), &mut sizing);
            pending.push((*band, h));
        }
        let mut maybe_err = None;
        for (band, h) in pending {
            match h.wait() {
                Some(data) if maybe_err.is_none() => {
                    let dst = field.rows_mut(band.offset, band.rows);
                    if let Err(reason) = decode_row(&data, dst) {
                        maybe_err = Some(HeatError::comm(band.rank, format!("slab: {reason}")));
                    }
                }
                None if maybe_err.is_none() => {
                    maybe_err = Some(HeatError::comm(
                        band.rank,
                        format!("no slab received from rank {}", band.rank),
                    ));
                }
                _ => {}
            }
        }
        if let Some(err) = maybe_err {
            return Err(err);
        }
        log::debug!("root {}: assembled {}x{} field", self.root, self.n, self.n);
        Ok(Some(field))
    }

    /// Stage 1 on the root: receive and validate every worker's header.
    /// Returns all bands (own included) sorted by rank.
    fn gather_headers<C: Communicator>(&self, comm: &C, own: Band) -> Result<Vec<Band>, HeatError> {
        let workers = comm.size();
        let mut pending = Vec::with_capacity(workers.saturating_sub(1));
        for peer in (0..workers).filter(|&r| r != self.root) {
            let mut sizing = [0u8; WireSlabHeader::SIZE];
            pending.push((peer, comm.irecv(peer, GATHER_HEADER.as_u16(), &mut sizing)));
        }

        let mut bands = vec![own];
        let mut maybe_err = None;
        for (peer, h) in pending {
            let received = h.wait();
            if maybe_err.is_some() {
                continue; // just drain
            }
            match received.map(|data| WireSlabHeader::decode(&data)) {
                Some(Ok(hdr)) => bands.push(Band {
                    rank: peer,
                    offset: hdr.offset(),
                    rows: hdr.rows(),
                }),
                Some(Err(reason)) => {
                    maybe_err = Some(HeatError::comm(peer, format!("slab header: {reason}")));
                }
                None => {
                    maybe_err = Some(HeatError::comm(
                        peer,
                        format!("no slab header received from rank {peer}"),
                    ));
                }
            }
        }
        if let Some(err) = maybe_err {
            return Err(err);
        }

        self.validate_bands(&mut bands, workers)?;
        bands.sort_by_key(|b| b.rank);
        Ok(bands)
    }

    /// Bands must be in bounds, non-overlapping and cover every row.
    fn validate_bands(&self, bands: &mut [Band], workers: usize) -> Result<(), HeatError> {
        let mismatch = |rank: usize, reason: String| HeatError::CollectionMismatch { rank, reason };
        if self.mode == CollectMode::Uniform {
            let expected = self.n / workers;
            if let Some(b) = bands.iter().find(|b| b.rows != expected) {
                return Err(mismatch(
                    b.rank,
                    format!("{} rows announced, uniform collection expects {expected}", b.rows),
                ));
            }
        }
        bands.sort_by_key(|b| b.offset);
        let mut next_row = 0;
        for b in bands.iter() {
            if b.offset != next_row {
                return Err(mismatch(
                    b.rank,
                    format!("band starts at row {}, expected {next_row}", b.offset),
                ));
            }
            next_row = b
                .offset
                .checked_add(b.rows)
                .filter(|&end| end <= self.n)
                .ok_or_else(|| {
                    mismatch(
                        b.rank,
                        format!("band {}+{} exceeds {} rows", b.offset, b.rows, self.n),
                    )
                })?;
        }
        if next_row != self.n {
            let last = bands.last().map_or(self.root, |b| b.rank);
            return Err(mismatch(
                last,
                format!("bands end at row {next_row}, grid has {}", self.n),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algs::communicator::NoComm;

    #[test]
    fn single_worker_collects_its_own_slab() {
        let cfg = SimulationConfig::new(3, 0, 0.1);
        let band = Partition {
            rank: 0,
            workers: 1,
            row_count: 3,
            global_row_offset: 0,
        };
        let mut grid = LocalGridBuffer::new(&band, 3, 100.0);
        grid.set(2, 1, 7.0).unwrap();
        let field = ResultCollector::new(&cfg)
            .collect(&NoComm, &band, &grid)
            .unwrap()
            .expect("root gets the field");
        assert_eq!(field.row(0), &[100.0, 0.0, 0.0]);
        assert_eq!(field.row(1), &[100.0, 7.0, 0.0]);
    }

    #[test]
    fn uniform_mode_rejects_uneven_split() {
        let cfg = SimulationConfig::new(10, 0, 0.1).with_collect_mode(CollectMode::Uniform);
        let collector = ResultCollector::new(&cfg);
        assert!(matches!(
            collector.check(3),
            Err(HeatError::PartitionMismatch { n: 10, workers: 3 })
        ));
        assert!(collector.check(5).is_ok());
        assert!(ResultCollector::new(&SimulationConfig::new(10, 0, 0.1)).check(3).is_ok());
    }

    #[test]
    fn overlapping_bands_are_rejected() {
        let cfg = SimulationConfig::new(6, 0, 0.1);
        let collector = ResultCollector::new(&cfg);
        let mut bands = [
            Band { rank: 0, offset: 0, rows: 3 },
            Band { rank: 1, offset: 2, rows: 4 },
        ];
        assert!(matches!(
            collector.validate_bands(&mut bands, 2),
            Err(HeatError::CollectionMismatch { rank: 1, .. })
        ));
        let mut short = [Band { rank: 0, offset: 0, rows: 3 }, Band { rank: 1, offset: 3, rows: 2 }];
        assert!(collector.validate_bands(&mut short, 2).is_err());
    }
}
