//! Straight line segment

use super::Curve;
use crate::common::types::Point2D;

/// A straight segment parameterized by distance from `start`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSegment {
    start: Point2D,
    end: Point2D,
}

impl LineSegment {
    /// Create a new line segment
    pub fn new(start: Point2D, end: Point2D) -> Self {
        LineSegment { start, end }
    }

    pub fn length(&self) -> f64 {
        (self.end - self.start).norm()
    }

    fn direction(&self) -> Point2D {
        let length = self.length();
        if length > 0.0 {
            (self.end - self.start) / length
        } else {
            Point2D::zeros()
        }
    }
}

impl Curve for LineSegment {
    fn domain(&self) -> (f64, f64) {
        (0.0, self.length())
    }

    fn position(&self, t: f64) -> Point2D {
        self.start + self.direction() * t
    }

    fn derivative(&self, _t: f64) -> Point2D {
        self.direction()
    }

    fn second_derivative(&self, _t: f64) -> Point2D {
        Point2D::zeros()
    }
}
