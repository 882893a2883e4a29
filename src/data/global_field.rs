//! Assembled N×N temperature field.

use crate::heat_error::HeatError;

/// Row-major `n × n` field of temperatures.
#[derive(Debug, Clone, PartialEq)]
pub struct GlobalField {
    n: usize,
    data: Vec<f64>,
}

impl GlobalField {
    pub fn zeros(n: usize) -> Self {
        Self {
            n,
            data: vec![0.0; n * n],
        }
    }

    /// Wrap an existing row-major buffer of exactly `n * n` values.
    pub fn from_vec(n: usize, data: Vec<f64>) -> Result<Self, HeatError> {
        if data.len() != n * n {
            return Err(HeatError::InvalidConfig(format!(
                "field of side {n} needs {} values, got {}",
                n * n,
                data.len()
            )));
        }
        Ok(Self { n, data })
    }

    #[inline]
    pub fn n(&self) -> usize {
        self.n
    }

    /// Value at `(row, col)`. Panics out of range.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.n + col]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.data[row * self.n + col] = value;
    }

    pub fn row(&self, row: usize) -> &[f64] {
        &self.data[row * self.n..(row + 1) * self.n]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> + '_ {
        self.data.chunks(self.n.max(1))
    }

    /// Rows `[first, first + count)` as one mutable slice.
    pub fn rows_mut(&mut self, first: usize, count: usize) -> &mut [f64] {
        &mut self.data[first * self.n..(first + count) * self.n]
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<f64> {
        self.data
    }

    /// Largest absolute pointwise difference; `None` if the sides differ.
    pub fn max_abs_diff(&self, other: &GlobalField) -> Option<f64> {
        (self.n == other.n).then(|| {
            self.data
                .iter()
                .zip(&other.data)
                .map(|(a, b)| (a - b).abs())
                .fold(0.0, f64::max)
        })
    }
}
