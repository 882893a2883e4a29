//! Double-buffered local slab of one worker.
//!
//! Layout: `(rows + 2) × width` row-major `f64`s. Row `0` is the top ghost
//! row, rows `1..=rows` are the worker's real rows, row `rows + 1` is the
//! bottom ghost row. Two such buffers exist; `current` is read by the
//! stencil, `next` is written, and [`LocalGridBuffer::swap`] exchanges their
//! roles without touching any element.

use crate::debug_invariants::DebugInvariants;
use crate::heat_error::HeatError;
use crate::partitioning::Partition;

#[derive(Debug, Clone, PartialEq)]
pub struct LocalGridBuffer {
    width: usize,
    rows: usize,
    current: Vec<f64>,
    next: Vec<f64>,
}

impl LocalGridBuffer {
    /// Zeroed slab for `partition`, with column 0 of every real row set to
    /// `boundary_value` in both buffers.
    pub fn new(partition: &Partition, width: usize, boundary_value: f64) -> Self {
        let rows = partition.row_count;
        let len = (rows + 2) * width;
        let mut grid = Self {
            width,
            rows,
            current: vec![0.0; len],
            next: vec![0.0; len],
        };
        if width > 0 {
            for i in 1..=rows {
                grid.current[i * width] = boundary_value;
                grid.next[i * width] = boundary_value;
            }
        }
        grid.debug_assert_invariants();
        grid
    }

    /// Number of real (owned) rows.
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Row length (`N`).
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Local index of the bottom ghost row.
    #[inline]
    pub fn bottom_ghost(&self) -> usize {
        self.rows + 1
    }

    fn index(&self, row: usize, col: usize) -> Result<usize, HeatError> {
        if row > self.rows + 1 || col >= self.width {
            return Err(HeatError::CellOutOfRange {
                row,
                col,
                rows: self.rows + 2,
                cols: self.width,
            });
        }
        Ok(row * self.width + col)
    }

    /// Current value at local `(row, col)`.
    pub fn get(&self, row: usize, col: usize) -> Result<f64, HeatError> {
        let idx = self.index(row, col)?;
        Ok(self.current[idx])
    }

    /// Overwrite the current value at local `(row, col)`.
    pub fn set(&mut self, row: usize, col: usize, value: f64) -> Result<(), HeatError> {
        let idx = self.index(row, col)?;
        self.current[idx] = value;
        Ok(())
    }

    /// Row `row` of the current buffer. Panics if `row > rows + 1`.
    pub fn row(&self, row: usize) -> &[f64] {
        &self.current[row * self.width..(row + 1) * self.width]
    }

    /// Mutable row `row` of the current buffer. Panics if `row > rows + 1`.
    pub fn row_mut(&mut self, row: usize) -> &mut [f64] {
        &mut self.current[row * self.width..(row + 1) * self.width]
    }

    /// Real rows of the current buffer as one contiguous ghost-free slice.
    pub fn real_rows(&self) -> &[f64] {
        &self.current[self.width..(self.rows + 1) * self.width]
    }

    /// Whole current buffer, ghosts included.
    pub fn current(&self) -> &[f64] {
        &self.current
    }

    /// Read `current`, write `next`. The two borrows never alias.
    pub fn split_mut(&mut self) -> (&[f64], &mut [f64]) {
        (&self.current, &mut self.next)
    }

    /// Exchange the roles of current and next in O(1).
    pub fn swap(&mut self) {
        std::mem::swap(&mut self.current, &mut self.next);
    }
}

impl DebugInvariants for LocalGridBuffer {
    fn validate_invariants(&self) -> Result<(), HeatError> {
        let expected = (self.rows + 2) * self.width;
        if self.current.len() != expected || self.next.len() != expected {
            return Err(HeatError::InvalidConfig(format!(
                "slab buffers hold {} and {} cells, expected {expected}",
                self.current.len(),
                self.next.len()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn band(rows: usize) -> Partition {
        Partition {
            rank: 0,
            workers: 1,
            row_count: rows,
            global_row_offset: 0,
        }
    }

    #[test]
    fn new_sets_boundary_on_real_rows_only() {
        let g = LocalGridBuffer::new(&band(3), 4, 100.0);
        assert_eq!(g.get(0, 0).unwrap(), 0.0);
        for i in 1..=3 {
            assert_eq!(g.get(i, 0).unwrap(), 100.0);
            assert_eq!(g.get(i, 1).unwrap(), 0.0);
        }
        assert_eq!(g.get(4, 0).unwrap(), 0.0);
        assert_eq!(g.real_rows().len(), 12);
    }

    #[test]
    fn swap_exchanges_roles_without_copy() {
        let mut g = LocalGridBuffer::new(&band(2), 3, 1.0);
        let before = g.current().as_ptr();
        {
            let (_, next) = g.split_mut();
            next[4] = 7.0;
        }
        assert_eq!(g.get(1, 1).unwrap(), 0.0);
        g.swap();
        assert_eq!(g.get(1, 1).unwrap(), 7.0);
        assert_ne!(g.current().as_ptr(), before);
        g.swap();
        assert_eq!(g.current().as_ptr(), before);
    }

    #[test]
    fn out_of_range_access_is_an_error() {
        let mut g = LocalGridBuffer::new(&band(2), 3, 1.0);
        assert!(matches!(
            g.get(4, 0),
            Err(HeatError::CellOutOfRange { row: 4, rows: 4, .. })
        ));
        assert!(g.set(1, 3, 0.0).is_err());
        assert!(g.set(3, 2, 5.0).is_ok());
        assert_eq!(g.row(3), &[0.0, 0.0, 5.0]);
    }
}
