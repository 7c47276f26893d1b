//! Truncated SVD by randomized range finding.
//!
//! ## Algorithm
//! 1. Draw a Gaussian test matrix Ω (`n_terms × l`, `l = k + oversamples`)
//!    from a ChaCha RNG seeded with `seed`
//! 2. Q = orth(A·Ω), then `n_iter` power iterations Q = orth(A·orth(Aᵀ·Q))
//! 3. B = Qᵀ·A is small (`l × n_terms`); its SVD comes from the symmetric
//!    eigendecomposition of B·Bᵀ (cyclic Jacobi)
//! 4. U = Q·U_B; output rows are U·Σ, components are Vᵀ = Σ⁻¹·U_Bᵀ·B
//!
//! Signs are fixed so the largest-magnitude entry of each U column is
//! positive. With a fixed seed the output is reproducible run to run.

use crate::error::ConfigError;
use crate::sparse::{SparseMatrix, SparseVector};
use ndarray::{Array1, Array2, Axis};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::{debug, info};

/// Columns with a smaller norm than this are treated as linearly dependent
const DEPENDENT_COLUMN_NORM: f64 = 1e-12;
const MAX_JACOBI_SWEEPS: usize = 64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SvdConfig {
    /// Target dimensionality `d`
    pub n_components: usize,
    pub n_oversamples: usize,
    /// Power iterations
    pub n_iter: usize,
    pub seed: u64,
}

impl Default for SvdConfig {
    fn default() -> Self {
        Self {
            n_components: 200,
            n_oversamples: 10,
            n_iter: 5,
            seed: 42,
        }
    }
}

impl SvdConfig {
    /// Check the target dimensionality against a `documents × terms` matrix.
    pub fn validate(&self, documents: usize, terms: usize) -> Result<(), ConfigError> {
        if self.n_components == 0 {
            return Err(ConfigError::ZeroComponents);
        }
        if self.n_components > documents.min(terms) {
            return Err(ConfigError::Dimensionality {
                requested: self.n_components,
                documents,
                terms,
            });
        }
        Ok(())
    }
}

/// A fitted truncated SVD.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TruncatedSvd {
    config: SvdConfig,
    /// Vᵀ, `n_components × n_terms`
    components: Array2<f64>,
    singular_values: Array1<f64>,
}

impl TruncatedSvd {
    /// Fit on `x` and return the model with the reduced rows (`n_docs × k`).
    pub fn fit_transform(
        config: SvdConfig,
        x: &SparseMatrix,
    ) -> Result<(Self, Array2<f64>), ConfigError> {
        let (n_docs, n_terms) = (x.n_rows(), x.n_cols());
        config.validate(n_docs, n_terms)?;

        let k = config.n_components;
        let width = (k + config.n_oversamples).min(n_docs.min(n_terms));

        let omega = gaussian_matrix(n_terms, width, config.seed);
        let mut q = orthonormalize(x.mul_dense(&omega));
        for i in 0..config.n_iter {
            let z = orthonormalize(x.transpose_mul_dense(&q));
            q = orthonormalize(x.mul_dense(&z));
            debug!("Power iteration {} of {}", i + 1, config.n_iter);
        }

        // Bᵀ = Aᵀ·Q, so B·Bᵀ = (Bᵀ)ᵀ·Bᵀ
        let b_t = x.transpose_mul_dense(&q);
        let gram = b_t.t().dot(&b_t);
        let (eigenvalues, eigenvectors) = symmetric_eigen(gram);

        let mut order: Vec<usize> = (0..eigenvalues.len()).collect();
        order.sort_by(|&a, &b| {
            eigenvalues[b]
                .total_cmp(&eigenvalues[a])
                .then(a.cmp(&b))
        });
        order.truncate(k);

        let singular_values: Array1<f64> = order
            .iter()
            .map(|&i| eigenvalues[i].max(0.0).sqrt())
            .collect();
        let u_b = eigenvectors.select(Axis(1), &order);

        let mut u = q.dot(&u_b);
        let mut components = b_t.dot(&u_b).reversed_axes();
        for (c, &s) in singular_values.iter().enumerate() {
            let mut row = components.row_mut(c);
            if s > DEPENDENT_COLUMN_NORM {
                row.mapv_inplace(|v| v / s);
            } else {
                row.fill(0.0);
            }
        }
        flip_signs(&mut u, &mut components);

        let reduced = &u * &singular_values;
        info!(
            "Fitted truncated SVD: {} x {} -> {} components (top singular value {:.4})",
            n_docs,
            n_terms,
            k,
            singular_values.first().copied().unwrap_or(0.0)
        );

        Ok((
            Self {
                config,
                components,
                singular_values,
            },
            reduced,
        ))
    }

    /// Project sparse rows into the reduced space.
    pub fn transform(&self, x: &SparseMatrix) -> Array2<f64> {
        x.mul_dense(&self.components.t().to_owned())
    }

    /// Project a single sparse row.
    pub fn transform_one(&self, row: &SparseVector) -> Array1<f64> {
        let mut out = Array1::zeros(self.n_components());
        for (j, v) in row.iter() {
            out.scaled_add(v, &self.components.column(j));
        }
        out
    }

    pub fn n_components(&self) -> usize {
        self.components.nrows()
    }

    pub fn singular_values(&self) -> &Array1<f64> {
        &self.singular_values
    }

    pub fn components(&self) -> &Array2<f64> {
        &self.components
    }

    pub fn config(&self) -> &SvdConfig {
        &self.config
    }
}

fn gaussian_matrix(rows: usize, cols: usize, seed: u64) -> Array2<f64> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut omega = Array2::zeros((rows, cols));
    for value in omega.iter_mut() {
        *value = rng.sample(StandardNormal);
    }
    omega
}

/// Orthonormalize the columns in place order (modified Gram-Schmidt, two
/// passes). Dependent columns become zero columns.
fn orthonormalize(mut m: Array2<f64>) -> Array2<f64> {
    for j in 0..m.ncols() {
        for _ in 0..2 {
            for i in 0..j {
                let basis = m.column(i).to_owned();
                let projection = basis.dot(&m.column(j));
                m.column_mut(j).scaled_add(-projection, &basis);
            }
        }
        let norm = m.column(j).dot(&m.column(j)).sqrt();
        if norm > DEPENDENT_COLUMN_NORM {
            m.column_mut(j).mapv_inplace(|v| v / norm);
        } else {
            m.column_mut(j).fill(0.0);
        }
    }
    m
}

/// Eigendecomposition of a symmetric matrix by cyclic Jacobi rotations.
///
/// Returns the eigenvalues (unordered) and the eigenvectors as columns.
fn symmetric_eigen(mut a: Array2<f64>) -> (Vec<f64>, Array2<f64>) {
    let n = a.nrows();
    let mut v = Array2::<f64>::eye(n);
    let scale = a.iter().map(|x| x * x).sum::<f64>();

    for _ in 0..MAX_JACOBI_SWEEPS {
        let mut off = 0.0;
        for p in 0..n {
            for q in (p + 1)..n {
                off += a[[p, q]] * a[[p, q]];
            }
        }
        if off <= f64::EPSILON * f64::EPSILON * scale {
            break;
        }

        for p in 0..n {
            for q in (p + 1)..n {
                let apq = a[[p, q]];
                if apq == 0.0 {
                    continue;
                }
                let theta = (a[[q, q]] - a[[p, p]]) / (2.0 * apq);
                let t = theta.signum() / (theta.abs() + (theta * theta + 1.0).sqrt());
                let c = 1.0 / (t * t + 1.0).sqrt();
                let s = t * c;

                for k in 0..n {
                    let akp = a[[k, p]];
                    let akq = a[[k, q]];
                    a[[k, p]] = c * akp - s * akq;
                    a[[k, q]] = s * akp + c * akq;
                }
                for k in 0..n {
                    let apk = a[[p, k]];
                    let aqk = a[[q, k]];
                    a[[p, k]] = c * apk - s * aqk;
                    a[[q, k]] = s * apk + c * aqk;
                }
                for k in 0..n {
                    let vkp = v[[k, p]];
                    let vkq = v[[k, q]];
                    v[[k, p]] = c * vkp - s * vkq;
                    v[[k, q]] = s * vkp + c * vkq;
                }
            }
        }
    }

    ((0..n).map(|i| a[[i, i]]).collect(), v)
}

/// Make the largest-magnitude entry of every U column positive, flipping
/// the matching component row with it.
fn flip_signs(u: &mut Array2<f64>, components: &mut Array2<f64>) {
    for c in 0..u.ncols() {
        let column = u.column(c);
        let pivot = column
            .iter()
            .enumerate()
            .fold((0usize, 0.0f64), |best, (i, &x)| {
                match x.abs().partial_cmp(&best.1.abs()) {
                    Some(Ordering::Greater) => (i, x),
                    _ => best,
                }
            });
        if pivot.1 < 0.0 {
            u.column_mut(c).mapv_inplace(|x| -x);
            components.row_mut(c).mapv_inplace(|x| -x);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn corpus() -> SparseMatrix {
        // Three documents over four terms: two near-duplicates and an outlier
        let rows = [
            vec![(0, 1.0), (1, 1.0)],
            vec![(0, 1.0), (1, 0.9), (2, 0.1)],
            vec![(3, 1.0)],
        ];
        SparseMatrix::new(
            4,
            rows.iter()
                .map(|entries| {
                    let mut row = SparseVector {
                        indices: entries.iter().map(|e| e.0).collect(),
                        values: entries.iter().map(|e| e.1).collect(),
                    };
                    row.normalize();
                    row
                })
                .collect(),
        )
    }

    fn config(k: usize) -> SvdConfig {
        SvdConfig {
            n_components: k,
            ..SvdConfig::default()
        }
    }

    #[test]
    fn test_symmetric_eigen_diagonalizes() {
        let a = array![[4.0, 1.0, 0.0], [1.0, 3.0, 0.5], [0.0, 0.5, 1.0]];
        let (values, vectors) = symmetric_eigen(a.clone());

        for (i, &lambda) in values.iter().enumerate() {
            let v = vectors.column(i);
            let av = a.dot(&v);
            for r in 0..3 {
                assert!((av[r] - lambda * v[r]).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_orthonormalize_zeroes_dependent_columns() {
        let m = array![[1.0, 2.0], [1.0, 2.0]];
        let q = orthonormalize(m);
        assert!((q.column(0).dot(&q.column(0)) - 1.0).abs() < 1e-12);
        assert!(q.column(1).iter().all(|&x| x.abs() < 1e-9));
    }

    #[test]
    fn test_rejects_too_many_components() {
        let err = TruncatedSvd::fit_transform(config(4), &corpus()).unwrap_err();
        assert_eq!(
            err,
            ConfigError::Dimensionality {
                requested: 4,
                documents: 3,
                terms: 4
            }
        );
        assert_eq!(
            TruncatedSvd::fit_transform(config(0), &corpus()).unwrap_err(),
            ConfigError::ZeroComponents
        );
    }

    #[test]
    fn test_full_rank_reconstructs_gram_matrix() {
        let x = corpus();
        let (_, reduced) = TruncatedSvd::fit_transform(config(3), &x).unwrap();
        assert_eq!(reduced.dim(), (3, 3));

        // With k = rank, U·Σ preserves inner products between documents
        for i in 0..3 {
            for j in 0..3 {
                let original: f64 = x.row(i).to_dense(4).dot(&x.row(j).to_dense(4));
                let projected = reduced.row(i).dot(&reduced.row(j));
                assert!((original - projected).abs() < 1e-8);
            }
        }
    }

    #[test]
    fn test_fit_is_reproducible() {
        let x = corpus();
        let (model_a, reduced_a) = TruncatedSvd::fit_transform(config(2), &x).unwrap();
        let (model_b, reduced_b) = TruncatedSvd::fit_transform(config(2), &x).unwrap();
        assert_eq!(reduced_a, reduced_b);
        assert_eq!(model_a, model_b);
    }

    #[test]
    fn test_transform_matches_fit_output() {
        let x = corpus();
        let (model, reduced) = TruncatedSvd::fit_transform(config(2), &x).unwrap();
        let projected = model.transform(&x);
        for (a, b) in projected.iter().zip(reduced.iter()) {
            assert!((a - b).abs() < 1e-8);
        }
        let single = model.transform_one(x.row(2));
        for (a, b) in single.iter().zip(reduced.row(2).iter()) {
            assert!((a - b).abs() < 1e-8);
        }
    }

    #[test]
    fn test_singular_values_are_descending() {
        let (model, _) = TruncatedSvd::fit_transform(config(3), &corpus()).unwrap();
        let s = model.singular_values();
        assert!(s[0] >= s[1] && s[1] >= s[2]);
    }
}
