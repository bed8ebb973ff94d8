use super::Point;
use core::f64::consts::PI;

/// Three consecutive points of a path, the unit the lap time simulator works on
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sector {
    pub start: Point,
    pub mid: Point,
    pub end: Point,
}

impl Sector {
    #[inline]
    pub const fn new(start: Point, mid: Point, end: Point) -> Self {
        Self { start, mid, end }
    }

    /// Radius of the arc through all three points, from the angle they form at `mid`.
    /// Colinear or coincident points describe a straight, whose radius is infinite.
    pub fn radius(&self) -> f64 {
        let a = self.start.distance(&self.end);
        let b = self.mid.distance(&self.end);
        let c = self.start.distance(&self.mid);
        if b == 0. || c == 0. {
            return f64::INFINITY;
        }

        let cos_angle = ((c * c + b * b - a * a) / (2. * b * c)).clamp(-1., 1.);
        let angle = cos_angle.acos();
        if angle == 0. || angle == PI {
            return f64::INFINITY;
        }

        let sin = (PI - angle).sin();
        if sin <= f64::EPSILON {
            f64::INFINITY
        } else {
            a / (2. * sin)
        }
    }

    /// Distance travelled walking start -> mid -> end
    #[inline]
    pub fn length(&self) -> f64 {
        self.start.distance(&self.mid) + self.mid.distance(&self.end)
    }

    #[inline]
    pub fn is_straight(&self) -> bool {
        self.radius().is_infinite()
    }
}
