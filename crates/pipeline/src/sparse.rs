//! Row-compressed sparse matrix produced by the vectorizer.

use ndarray::{Array1, Array2};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// One sparse row: column indices in ascending order with their values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SparseVector {
    pub indices: Vec<usize>,
    pub values: Vec<f64>,
}

impl SparseVector {
    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.indices.iter().copied().zip(self.values.iter().copied())
    }

    pub fn norm(&self) -> f64 {
        self.values.iter().map(|v| v * v).sum::<f64>().sqrt()
    }

    /// Scale to unit L2 norm; an all-zero row stays zero.
    pub fn normalize(&mut self) {
        let norm = self.norm();
        if norm > 0.0 {
            self.values.iter_mut().for_each(|v| *v /= norm);
        }
    }

    pub fn to_dense(&self, n_cols: usize) -> Array1<f64> {
        let mut dense = Array1::zeros(n_cols);
        for (j, v) in self.iter() {
            dense[j] = v;
        }
        dense
    }
}

/// An `n_rows × n_cols` matrix stored as a list of sparse rows.
#[derive(Debug, Clone, PartialEq)]
pub struct SparseMatrix {
    n_cols: usize,
    rows: Vec<SparseVector>,
}

impl SparseMatrix {
    pub fn new(n_cols: usize, rows: Vec<SparseVector>) -> Self {
        Self { n_cols, rows }
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    pub fn row(&self, i: usize) -> &SparseVector {
        &self.rows[i]
    }

    pub fn rows(&self) -> &[SparseVector] {
        &self.rows
    }

    pub fn nnz(&self) -> usize {
        self.rows.iter().map(SparseVector::nnz).sum()
    }

    /// `self · rhs`, where `rhs` is `n_cols × l`. Rows are computed in parallel.
    pub fn mul_dense(&self, rhs: &Array2<f64>) -> Array2<f64> {
        debug_assert_eq!(rhs.nrows(), self.n_cols);
        let width = rhs.ncols();

        let products: Vec<Array1<f64>> = self
            .rows
            .par_iter()
            .map(|row| {
                let mut acc = Array1::<f64>::zeros(width);
                for (j, v) in row.iter() {
                    acc.scaled_add(v, &rhs.row(j));
                }
                acc
            })
            .collect();

        let mut out = Array2::<f64>::zeros((self.rows.len(), width));
        for (mut dst, src) in out.rows_mut().into_iter().zip(products) {
            dst.assign(&src);
        }
        out
    }

    /// `selfᵀ · rhs`, where `rhs` is `n_rows × l`.
    pub fn transpose_mul_dense(&self, rhs: &Array2<f64>) -> Array2<f64> {
        debug_assert_eq!(rhs.nrows(), self.rows.len());
        let mut out = Array2::<f64>::zeros((self.n_cols, rhs.ncols()));
        for (i, row) in self.rows.iter().enumerate() {
            let rhs_row = rhs.row(i);
            for (j, v) in row.iter() {
                out.row_mut(j).scaled_add(v, &rhs_row);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn sample() -> SparseMatrix {
        // [[1, 0, 2],
        //  [0, 3, 0]]
        SparseMatrix::new(
            3,
            vec![
                SparseVector {
                    indices: vec![0, 2],
                    values: vec![1.0, 2.0],
                },
                SparseVector {
                    indices: vec![1],
                    values: vec![3.0],
                },
            ],
        )
    }

    #[test]
    fn test_mul_dense() {
        let rhs = array![[1.0, 0.0], [0.0, 1.0], [1.0, 1.0]];
        let product = sample().mul_dense(&rhs);
        assert_eq!(product, array![[3.0, 2.0], [0.0, 3.0]]);
    }

    #[test]
    fn test_transpose_mul_dense() {
        let rhs = array![[1.0], [2.0]];
        let product = sample().transpose_mul_dense(&rhs);
        assert_eq!(product, array![[1.0], [6.0], [2.0]]);
    }

    #[test]
    fn test_normalize_keeps_zero_rows() {
        let mut zero = SparseVector::default();
        zero.normalize();
        assert_eq!(zero.nnz(), 0);

        let mut row = SparseVector {
            indices: vec![0, 1],
            values: vec![3.0, 4.0],
        };
        row.normalize();
        assert!((row.values[0] - 0.6).abs() < 1e-12);
        assert!((row.values[1] - 0.8).abs() < 1e-12);
    }
}
