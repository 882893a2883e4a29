//! Explicit 5-point diffusion update.
//!
//! Every execution model (serial, shared-memory, distributed) funnels its
//! arithmetic through [`diffuse`] and [`update_row`], so the three produce
//! bit-for-bit identical fields for the same inputs.

#[cfg(feature = "rayon")]
use rayon::prelude::*;

use crate::config::SimulationConfig;
use crate::data::local_grid::LocalGridBuffer;
use crate::heat_error::HeatError;
use crate::partitioning::Partition;

/// `center + alpha * (up + down + left + right - 4 * center)`.
#[inline(always)]
pub fn diffuse(center: f64, up: f64, down: f64, left: f64, right: f64, alpha: f64) -> f64 {
    center + alpha * (up + down + left + right - 4.0 * center)
}

/// Update interior columns `1..n-1` of one row into `out`.
///
/// Columns 0 and `n-1` of `out` are not written.
#[inline]
pub fn update_row(above: &[f64], row: &[f64], below: &[f64], out: &mut [f64], alpha: f64) {
    let n = row.len();
    if n < 3 {
        return;
    }
    for j in 1..n - 1 {
        out[j] = diffuse(row[j], above[j], below[j], row[j - 1], row[j + 1], alpha);
    }
}

/// Applies the stencil to the real rows of a worker's slab.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StencilUpdater {
    n: usize,
    alpha: f64,
}

impl StencilUpdater {
    pub fn new(cfg: &SimulationConfig) -> Self {
        Self {
            n: cfg.n,
            alpha: cfg.alpha,
        }
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Global rows 0 and N-1 are pinned and never updated.
    #[inline]
    pub fn is_pinned(&self, global_row: usize) -> bool {
        global_row == 0 || global_row + 1 == self.n
    }

    fn check_shape(&self, partition: &Partition, grid: &LocalGridBuffer) -> Result<(), HeatError> {
        if grid.width() != self.n || grid.rows() != partition.row_count {
            return Err(HeatError::InvalidConfig(format!(
                "slab is {}x{}, partition of rank {} expects {}x{}",
                grid.rows(),
                grid.width(),
                partition.rank,
                partition.row_count,
                self.n
            )));
        }
        Ok(())
    }

    /// Write `next` for every non-pinned real row from `current`.
    ///
    /// Rows 1 and `rows` read the ghost rows, so the halo exchange for this
    /// timestep must have completed. Returns the number of rows updated.
    pub fn update(&self, partition: &Partition, grid: &mut LocalGridBuffer) -> Result<usize, HeatError> {
        self.check_shape(partition, grid)?;
        let w = self.n;
        let rows = grid.rows();
        let (cur, next) = grid.split_mut();
        let mut updated = 0;
        for i in 1..=rows {
            if self.is_pinned(partition.global_row(i)) {
                continue;
            }
            update_row(
                &cur[(i - 1) * w..i * w],
                &cur[i * w..(i + 1) * w],
                &cur[(i + 1) * w..(i + 2) * w],
                &mut next[i * w..(i + 1) * w],
                self.alpha,
            );
            updated += 1;
        }
        Ok(updated)
    }

    /// Same as [`update`](Self::update) with real rows fanned out over the
    /// rayon pool. Each `next` row is owned by exactly one task.
    #[cfg(feature = "rayon")]
    pub fn update_par(
        &self,
        partition: &Partition,
        grid: &mut LocalGridBuffer,
    ) -> Result<usize, HeatError> {
        self.check_shape(partition, grid)?;
        let w = self.n;
        let rows = grid.rows();
        if w == 0 {
            return Ok(0);
        }
        let (cur, next) = grid.split_mut();
        let updated = next[w..(rows + 1) * w]
            .par_chunks_mut(w)
            .enumerate()
            .filter_map(|(k, out)| {
                let i = k + 1;
                if self.is_pinned(partition.global_row(i)) {
                    return None;
                }
                update_row(
                    &cur[(i - 1) * w..i * w],
                    &cur[i * w..(i + 1) * w],
                    &cur[(i + 1) * w..(i + 2) * w],
                    out,
                    self.alpha,
                );
                Some(())
            })
            .count();
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single_band(n: usize) -> Partition {
        Partition {
            rank: 0,
            workers: 1,
            row_count: n,
            global_row_offset: 0,
        }
    }

    #[test]
    fn kernel_matches_formula() {
        let v = diffuse(1.0, 2.0, 3.0, 4.0, 5.0, 0.1);
        assert_eq!(v, 1.0 + 0.1 * (2.0 + 3.0 + 4.0 + 5.0 - 4.0 * 1.0));
    }

    #[test]
    fn edges_are_never_written() {
        let above = [1.0; 4];
        let row = [1.0; 4];
        let below = [1.0; 4];
        let mut out = [-1.0; 4];
        update_row(&above, &row, &below, &mut out, 0.2);
        assert_eq!(out, [-1.0, 1.0, 1.0, -1.0]);
    }

    #[test]
    fn pinned_rows_are_skipped() {
        let cfg = SimulationConfig::new(4, 1, 0.1);
        let band = single_band(4);
        let mut grid = LocalGridBuffer::new(&band, 4, 100.0);
        let updater = StencilUpdater::new(&cfg);
        assert_eq!(updater.update(&band, &mut grid).unwrap(), 2);
        grid.swap();
        // Global row 1 next to the hot wall heats up, row 0 stays pinned.
        assert_eq!(grid.get(2, 1).unwrap(), 0.0 + 0.1 * (0.0 + 0.0 + 100.0 + 0.0 - 4.0 * 0.0));
        assert_eq!(grid.get(1, 1).unwrap(), 0.0);
        assert_eq!(grid.get(2, 3).unwrap(), 0.0);
    }

    #[test]
    fn shape_mismatch_is_rejected() {
        let cfg = SimulationConfig::new(5, 1, 0.1);
        let band = single_band(4);
        let mut grid = LocalGridBuffer::new(&band, 4, 100.0);
        assert!(StencilUpdater::new(&cfg).update(&band, &mut grid).is_err());
    }

    #[cfg(feature = "rayon")]
    #[test]
    fn parallel_update_matches_sequential() {
        let cfg = SimulationConfig::new(16, 1, 0.2);
        let band = single_band(16);
        let mut seq = LocalGridBuffer::new(&band, 16, 100.0);
        for i in 1..=16 {
            for j in 1..15 {
                seq.set(i, j, ((i * 31 + j * 7) % 13) as f64).unwrap();
            }
        }
        let mut par = seq.clone();
        let updater = StencilUpdater::new(&cfg);
        assert_eq!(updater.update(&band, &mut seq).unwrap(), 14);
        assert_eq!(updater.update_par(&band, &mut par).unwrap(), 14);
        seq.swap();
        par.swap();
        assert_eq!(seq, par);
    }
}
