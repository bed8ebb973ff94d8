//! Savitzky-Golay smoothing of closed weight vectors. Fits a polynomial of `order` to every
//! `window` of neighbouring weights by least squares and keeps its value at the window center,
//! reading around the end of the vector as the path is a loop.

use crate::{
    constants::{RACELINE_SMOOTHING_ORDER, RACELINE_SMOOTHING_WINDOW},
    error::{RacingError, Result},
};
use rulinalg::matrix::{BaseMatrix, Matrix};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Smoothing {
    /// Number of weights in each fit, must be odd
    pub window: usize,
    /// Degree of the fitted polynomial, must be below `window`
    pub order: usize,
}

impl Default for Smoothing {
    fn default() -> Self {
        Self {
            window: RACELINE_SMOOTHING_WINDOW,
            order: RACELINE_SMOOTHING_ORDER,
        }
    }
}

impl Smoothing {
    pub fn validate(&self) -> Result<()> {
        if self.window % 2 == 0 {
            return Err(RacingError::InvalidConfig(format!(
                "smoothing window must be odd, got {}",
                self.window
            )));
        }
        if self.order >= self.window {
            return Err(RacingError::InvalidConfig(format!(
                "smoothing order {} must be below window {}",
                self.order, self.window
            )));
        }

        Ok(())
    }

    /// Convolution coefficients for a window of `window` points, centered
    pub fn coefficients(window: usize, order: usize) -> Result<Vec<f64>> {
        let half = (window / 2) as f64;
        let cols = order + 1;
        let a = Matrix::new(
            window,
            cols,
            (0..window)
                .flat_map(|row| {
                    let x = row as f64 - half;
                    (0..cols).map(move |p| x.powi(p as i32))
                })
                .collect::<Vec<_>>(),
        );

        let at = a.transpose();
        let projection = (&at * &a).inverse()? * at;
        Ok((0..window).map(|col| projection[[0, col]]).collect())
    }

    /// Smooth `weights` as a closed loop and clamp the result back into [0, 1]. The window
    /// shrinks to fit short vectors; when it can no longer hold a fit of this order the weights
    /// are returned untouched.
    pub fn apply(&self, weights: &[f64]) -> Result<Vec<f64>> {
        let n = weights.len();
        let window = match self.window.min(n) {
            w if w % 2 == 0 => w.saturating_sub(1),
            w => w,
        };
        if window <= self.order || window < 3 {
            return Ok(weights.to_vec());
        }

        let coefficients = Self::coefficients(window, self.order)?;
        let half = window / 2;
        Ok((0..n)
            .map(|idx| {
                coefficients
                    .iter()
                    .enumerate()
                    .map(|(k, c)| c * weights[(idx + n + k - half) % n])
                    .sum::<f64>()
                    .clamp(0., 1.)
            })
            .collect())
    }
}
