use super::{Point, Sector};
use crate::error::{RacingError, Result};
use serde::{Deserialize, Serialize};

/// A closed path through an ordered sequence of points. Indexing wraps, so the point after the
/// last one is the first.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RacingLine {
    vertices: Vec<Point>,
}

impl RacingLine {
    pub fn new(vertices: Vec<Point>) -> Self {
        Self { vertices }
    }

    /// Interpolate each vertex between its left and right boundary point, using the matching
    /// weight clamped to [0, 1]. A weight of 0 sits on the left boundary, 1 on the right.
    pub fn from_weights(weights: &[f64], left: &[Point], right: &[Point]) -> Result<Self> {
        if left.len() != right.len() {
            return Err(RacingError::GeometricMismatch {
                context: "right boundary",
                expected: left.len(),
                found: right.len(),
            });
        }
        if weights.len() != left.len() {
            return Err(RacingError::GeometricMismatch {
                context: "weight vector",
                expected: left.len(),
                found: weights.len(),
            });
        }

        Ok(Self::new(
            weights
                .iter()
                .zip(left.iter().zip(right))
                .map(|(w, (l, r))| l.lerp(r, w.clamp(0., 1.)))
                .collect(),
        ))
    }

    #[inline]
    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Sectors covering the closed loop, advancing two points at a time so that each sector
    /// starts where the last ended: `(p[2k], p[2k + 1], p[2k + 2])`, wrapping at the end.
    /// An odd point count leaves the last point to a straight closing sector back to `p[0]`.
    /// Fewer than three points describe no sectors.
    pub fn sectors(&self) -> Vec<Sector> {
        let n = self.vertices.len();
        if n < 3 {
            return vec![];
        }

        let v = &self.vertices;
        let mut sectors = (0..n / 2)
            .map(|k| Sector::new(v[2 * k], v[2 * k + 1], v[(2 * k + 2) % n]))
            .collect::<Vec<_>>();

        if n % 2 == 1 {
            let last = v[n - 1];
            sectors.push(Sector::new(last, last.midpoint(&v[0]), v[0]));
        }

        sectors
    }

    /// The sector centered on vertex `idx`, made of its predecessor, itself, and its successor
    pub fn sector(&self, idx: usize) -> Option<Sector> {
        let n = self.vertices.len();
        if idx >= n {
            return None;
        }

        let v = &self.vertices;
        Some(Sector::new(v[(idx + n - 1) % n], v[idx], v[(idx + 1) % n]))
    }

    /// Length of the closed loop, including the segment from the last point back to the first
    pub fn length(&self) -> f64 {
        match self.vertices.first() {
            Some(first) => self.open_length() + self.vertices[self.len() - 1].distance(first),
            None => 0.,
        }
    }

    /// Length walking the points in order, without returning to the start
    pub fn open_length(&self) -> f64 {
        self.vertices
            .windows(2)
            .map(|pair| pair[0].distance(&pair[1]))
            .sum()
    }

    /// Index pairs joining consecutive points, closing the loop. This is the edge list a mesh
    /// consumer needs to draw the line as a polyline.
    pub fn edges(&self) -> Vec<(usize, usize)> {
        let n = self.vertices.len();
        (0..n).map(|idx| (idx, (idx + 1) % n)).collect()
    }
}

impl From<Vec<Point>> for RacingLine {
    fn from(vertices: Vec<Point>) -> Self {
        Self::new(vertices)
    }
}

impl AsRef<[Point]> for RacingLine {
    fn as_ref(&self) -> &[Point] {
        &self.vertices
    }
}
