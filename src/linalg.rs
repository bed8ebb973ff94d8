//! Dense helpers for covariance adaptation: sample statistics and the eigensystem of a
//! covariance matrix, over nalgebra's dynamically sized matrices.

use crate::error::{RacingError, Result};
use nalgebra::{DMatrix, DVector};

/// Empirical mean and unbiased covariance of a set of equally sized samples
#[derive(Debug, Clone)]
pub struct SampleStatistics {
    pub mean: DVector<f64>,
    pub covariance: DMatrix<f64>,
}

impl SampleStatistics {
    /// `None` when there are no samples. A single sample has zero covariance.
    pub fn estimate<S: AsRef<[f64]>>(samples: &[S]) -> Option<Self> {
        let n = samples.first()?.as_ref().len();
        let count = samples.len();

        // one sample per row
        let data = DMatrix::from_fn(count, n, |row, col| samples[row].as_ref()[col]);
        let mean = DVector::from_fn(n, |col, _| data.column(col).mean());
        let centred = DMatrix::from_fn(count, n, |row, col| data[(row, col)] - mean[col]);

        let covariance = if count > 1 {
            centred.transpose() * &centred / (count - 1) as f64
        } else {
            DMatrix::zeros(n, n)
        };

        Some(Self { mean, covariance })
    }
}

/// Eigensystem `C = B diag(λ) Bᵀ` of a symmetric covariance matrix, kept as the two products
/// sampling and step size control need. Eigenvalues below `floor` are raised to it first.
#[derive(Debug, Clone)]
pub struct Eigensystem {
    pub eigenvalues: DVector<f64>,
    /// `B D`, with `D = diag(√λ)`
    scale: DMatrix<f64>,
    /// `B D⁻¹ Bᵀ = C^-1/2`
    inverse_root: DMatrix<f64>,
}

impl Eigensystem {
    pub fn new(covariance: &DMatrix<f64>, floor: f64) -> Result<Self> {
        if !covariance.is_square() {
            return Err(RacingError::GeometricMismatch {
                context: "eigendecomposition of a non square matrix",
                expected: covariance.nrows(),
                found: covariance.ncols(),
            });
        }
        if covariance.iter().any(|v| !v.is_finite()) {
            return Err(RacingError::Numerical(
                "non-finite entry in covariance matrix".into(),
            ));
        }

        let eigen = nalgebra::SymmetricEigen::new(covariance.clone());
        let eigenvalues = eigen.eigenvalues.map(|v| v.max(floor));
        let roots = eigenvalues.map(f64::sqrt);
        let scale = &eigen.eigenvectors * DMatrix::from_diagonal(&roots);
        let inverse_root = &eigen.eigenvectors
            * DMatrix::from_diagonal(&roots.map(|r| 1. / r))
            * eigen.eigenvectors.transpose();

        Ok(Self {
            eigenvalues,
            scale,
            inverse_root,
        })
    }

    /// Maps a standard normal draw `z` to one distributed with this covariance, `B D z`
    #[inline]
    pub fn transform(&self, z: &DVector<f64>) -> DVector<f64> {
        &self.scale * z
    }

    /// `C^-1/2 y`
    #[inline]
    pub fn whiten(&self, y: &DVector<f64>) -> DVector<f64> {
        &self.inverse_root * y
    }

    /// Ratio of the largest to smallest floored eigenvalue
    pub fn condition(&self) -> f64 {
        self.eigenvalues.max() / self.eigenvalues.min()
    }
}
