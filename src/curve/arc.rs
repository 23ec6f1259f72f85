//! Circular arc with constant curvature

use super::Curve;
use crate::common::types::Point2D;
use crate::error::{PathError, Result};

/// Circular arc parameterized by distance traveled along it
///
/// A positive `sweep` turns left (counter-clockwise), a negative one right.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircularArc {
    center: Point2D,
    radius: f64,
    start_angle: f64,
    sweep: f64,
}

impl CircularArc {
    /// Create an arc around `center`, starting at polar angle `start_angle`
    pub fn new(center: Point2D, radius: f64, start_angle: f64, sweep: f64) -> Result<Self> {
        if !(radius.is_finite() && radius > 0.0) {
            return Err(PathError::InvalidCurve(format!(
                "arc radius must be positive, got {}",
                radius
            )));
        }
        if !start_angle.is_finite() || !sweep.is_finite() {
            return Err(PathError::InvalidCurve("arc angles must be finite".to_string()));
        }
        Ok(CircularArc {
            center,
            radius,
            start_angle,
            sweep,
        })
    }

    /// Arc of signed curvature `curvature` and length `length` starting at the
    /// origin heading along +x
    pub fn from_curvature(curvature: f64, length: f64) -> Result<Self> {
        if curvature == 0.0 || !curvature.is_finite() {
            return Err(PathError::InvalidCurve(format!(
                "arc curvature must be finite and non-zero, got {}",
                curvature
            )));
        }
        let radius = 1.0 / curvature.abs();
        let turn = curvature.signum();
        let center = Point2D::new(0.0, turn * radius);
        let start_angle = -turn * std::f64::consts::FRAC_PI_2;
        Self::new(center, radius, start_angle, turn * length / radius)
    }

    /// Signed curvature, positive for a left turn
    pub fn curvature_value(&self) -> f64 {
        self.turn() / self.radius
    }

    pub fn length(&self) -> f64 {
        self.radius * self.sweep.abs()
    }

    fn turn(&self) -> f64 {
        if self.sweep < 0.0 {
            -1.0
        } else {
            1.0
        }
    }

    fn angle(&self, t: f64) -> f64 {
        self.start_angle + self.turn() * t / self.radius
    }
}

impl Curve for CircularArc {
    fn domain(&self) -> (f64, f64) {
        (0.0, self.length())
    }

    fn position(&self, t: f64) -> Point2D {
        let theta = self.angle(t);
        self.center + Point2D::new(theta.cos(), theta.sin()) * self.radius
    }

    fn derivative(&self, t: f64) -> Point2D {
        let theta = self.angle(t);
        Point2D::new(-theta.sin(), theta.cos()) * self.turn()
    }

    fn second_derivative(&self, t: f64) -> Point2D {
        let theta = self.angle(t);
        -Point2D::new(theta.cos(), theta.sin()) / self.radius
    }
}
