//! Curve sources consumed by the sampler
//!
//! The generator only needs to evaluate a position and a derivative at a
//! parameter inside the curve's domain. Anything implementing [`Curve`] can be
//! turned into a tank drive path; the concrete curves in this module are
//! reference sources used by the binaries and the tests.

pub mod arc;
pub mod cubic_spline;
pub mod line;

pub use arc::CircularArc;
pub use cubic_spline::CubicSpline2D;
pub use line::LineSegment;

use crate::common::types::Point2D;

/// Relative parameter step for first derivative finite differences
const FIRST_DIFFERENCE_STEP: f64 = 1e-5;
/// Relative parameter step for second derivative finite differences
const SECOND_DIFFERENCE_STEP: f64 = 1e-4;

/// A parametric planar curve
pub trait Curve {
    /// Parameter range `(t0, t1)` the curve is defined on
    fn domain(&self) -> (f64, f64);

    /// Position at parameter `t`
    fn position(&self, t: f64) -> Point2D;

    /// First derivative at parameter `t`
    ///
    /// Defaults to a central difference of [`Curve::position`], one-sided at
    /// the domain ends.
    fn derivative(&self, t: f64) -> Point2D {
        let (t0, t1) = self.domain();
        central_difference(|u| self.position(u), t, t0, t1, FIRST_DIFFERENCE_STEP)
    }

    /// Second derivative at parameter `t`
    fn second_derivative(&self, t: f64) -> Point2D {
        let (t0, t1) = self.domain();
        central_difference(|u| self.derivative(u), t, t0, t1, SECOND_DIFFERENCE_STEP)
    }

    /// Signed curvature at `t`, positive for left turns
    ///
    /// Returns `None` where the curve has (numerically) zero speed.
    fn curvature(&self, t: f64, min_speed: f64) -> Option<f64> {
        signed_curvature(&self.derivative(t), &self.second_derivative(t), min_speed)
    }
}

impl<C: Curve + ?Sized> Curve for &C {
    fn domain(&self) -> (f64, f64) {
        (**self).domain()
    }

    fn position(&self, t: f64) -> Point2D {
        (**self).position(t)
    }

    fn derivative(&self, t: f64) -> Point2D {
        (**self).derivative(t)
    }

    fn second_derivative(&self, t: f64) -> Point2D {
        (**self).second_derivative(t)
    }

    fn curvature(&self, t: f64, min_speed: f64) -> Option<f64> {
        (**self).curvature(t, min_speed)
    }
}

impl<C: Curve + ?Sized> Curve for Box<C> {
    fn domain(&self) -> (f64, f64) {
        (**self).domain()
    }

    fn position(&self, t: f64) -> Point2D {
        (**self).position(t)
    }

    fn derivative(&self, t: f64) -> Point2D {
        (**self).derivative(t)
    }

    fn second_derivative(&self, t: f64) -> Point2D {
        (**self).second_derivative(t)
    }

    fn curvature(&self, t: f64, min_speed: f64) -> Option<f64> {
        (**self).curvature(t, min_speed)
    }
}

/// Signed curvature `(x'y'' - y'x'') / |r'|^3`
pub fn signed_curvature(d: &Point2D, dd: &Point2D, min_speed: f64) -> Option<f64> {
    let speed = d.norm();
    if !speed.is_finite() || speed < min_speed {
        return None;
    }
    Some((d.x * dd.y - d.y * dd.x) / speed.powi(3))
}

fn central_difference<F>(f: F, t: f64, t0: f64, t1: f64, relative_step: f64) -> Point2D
where
    F: Fn(f64) -> Point2D,
{
    let h = (t1 - t0) * relative_step;
    if !(h > 0.0) {
        return Point2D::zeros();
    }
    let a = (t - h).max(t0);
    let b = (t + h).min(t1);
    (f(b) - f(a)) / (b - a)
}
