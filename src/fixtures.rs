//! Tracks shared by tests across modules

use crate::track::{Point, Track};
use core::f64::consts::PI;

pub fn ring(r: f64, n: usize) -> Vec<Point> {
    (0..n)
        .map(|i| {
            let θ = 2. * PI * i as f64 / n as f64;
            Point::new(r * θ.cos(), r * θ.sin(), 0.)
        })
        .collect()
}

/// A ring shaped track between radii `inner` (left) and `outer` (right)
pub fn annulus(inner: f64, outer: f64, n: usize) -> Track {
    Track::new(ring(inner, n), ring(outer, n)).expect("rings share a length")
}

/// Two boundary points per side, far too short to hold a sector
pub fn sliver() -> Track {
    Track::new(
        vec![Point::new(0., 0., 0.), Point::new(10., 0., 0.)],
        vec![Point::new(0., 8., 0.), Point::new(10., 8., 0.)],
    )
    .expect("two points a side")
}
