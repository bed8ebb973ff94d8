//! Geometry of the track: points, the three point sectors physics is evaluated over, closed
//! racing lines, and the pair of boundary curves a racing line is interpolated between.

pub mod line;
pub mod point;
pub mod sector;

pub use line::RacingLine;
pub use point::Point;
pub use sector::Sector;

use crate::error::{RacingError, Result};
use serde::{Deserialize, Serialize};

/// The left and right limits of a track, sampled at corresponding indices: `left[i]` and
/// `right[i]` sit at the same longitudinal position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TrackLimits")]
pub struct Track {
    left: Vec<Point>,
    right: Vec<Point>,
}

#[derive(Deserialize)]
struct TrackLimits {
    left: Vec<Point>,
    right: Vec<Point>,
}

impl TryFrom<TrackLimits> for Track {
    type Error = RacingError;

    fn try_from(TrackLimits { left, right }: TrackLimits) -> Result<Self> {
        Self::new(left, right)
    }
}

impl Track {
    pub fn new(left: Vec<Point>, right: Vec<Point>) -> Result<Self> {
        if left.len() != right.len() {
            return Err(RacingError::GeometricMismatch {
                context: "right boundary",
                expected: left.len(),
                found: right.len(),
            });
        }

        Ok(Self { left, right })
    }

    #[inline]
    pub fn left(&self) -> &[Point] {
        &self.left
    }

    #[inline]
    pub fn right(&self) -> &[Point] {
        &self.right
    }

    /// Number of vertices in each boundary, and so in every racing line on this track
    #[inline]
    pub fn len(&self) -> usize {
        self.left.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.left.is_empty()
    }

    pub fn line(&self, weights: &[f64]) -> Result<RacingLine> {
        RacingLine::from_weights(weights, &self.left, &self.right)
    }

    /// The line running exactly halfway between both limits
    pub fn centre_line(&self) -> RacingLine {
        RacingLine::new(
            self.left
                .iter()
                .zip(&self.right)
                .map(|(l, r)| l.midpoint(r))
                .collect(),
        )
    }
}
