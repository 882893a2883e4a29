//! Dirichlet boundary re-imposition.
//!
//! Column 0 of every row is held at a fixed temperature. The stencil never
//! writes that column; [`DirichletBoundary::apply`] still runs after every
//! swap.

use crate::data::global_field::GlobalField;
use crate::data::local_grid::LocalGridBuffer;

/// Fixed value on the left edge (column 0).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DirichletBoundary {
    value: f64,
}

impl DirichletBoundary {
    pub fn new(value: f64) -> Self {
        Self { value }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    /// Reset column 0 of every real row of the current buffer. Idempotent.
    pub fn apply(&self, grid: &mut LocalGridBuffer) {
        if grid.width() == 0 {
            return;
        }
        for i in 1..=grid.rows() {
            grid.row_mut(i)[0] = self.value;
        }
    }

    /// Same condition on an assembled field (every row).
    pub fn apply_field(&self, field: &mut GlobalField) {
        for i in 0..field.n() {
            field.set(i, 0, self.value);
        }
    }

    /// True if every real row already carries the boundary value.
    pub fn is_satisfied(&self, grid: &LocalGridBuffer) -> bool {
        grid.width() == 0 || (1..=grid.rows()).all(|i| grid.row(i)[0] == self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::partitioning::Partition;

    fn grid() -> LocalGridBuffer {
        let band = Partition {
            rank: 1,
            workers: 3,
            row_count: 3,
            global_row_offset: 3,
        };
        LocalGridBuffer::new(&band, 4, 100.0)
    }

    #[test]
    fn restores_eroded_column() {
        let mut g = grid();
        g.set(2, 0, 42.0).unwrap();
        let bc = DirichletBoundary::new(100.0);
        assert!(!bc.is_satisfied(&g));
        bc.apply(&mut g);
        assert!(bc.is_satisfied(&g));
        assert_eq!(g.get(2, 0).unwrap(), 100.0);
    }

    #[test]
    fn applying_twice_equals_applying_once() {
        let mut g = grid();
        g.set(1, 0, -1.0).unwrap();
        g.set(3, 2, 5.0).unwrap();
        let bc = DirichletBoundary::new(100.0);
        bc.apply(&mut g);
        let once = g.clone();
        bc.apply(&mut g);
        assert_eq!(g, once);
    }

    #[test]
    fn ghost_rows_are_left_alone() {
        let mut g = grid();
        let bc = DirichletBoundary::new(100.0);
        bc.apply(&mut g);
        assert_eq!(g.get(0, 0).unwrap(), 0.0);
        assert_eq!(g.get(g.bottom_ghost(), 0).unwrap(), 0.0);
    }
}
