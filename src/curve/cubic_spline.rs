//! Natural cubic spline through 2D waypoints
//!
//! Each coordinate is interpolated by a natural cubic spline over the
//! cumulative chord length between waypoints, so the parameter is roughly the
//! distance traveled. Consecutive duplicate waypoints are dropped; a spline
//! built from a single distinct waypoint has the zero-length domain `[0, 0]`.

use nalgebra::{DMatrix, DVector};

use super::Curve;
use crate::common::{is_finite_point, types::Point2D};
use crate::error::{PathError, Result};

/// One-dimensional natural cubic spline
#[derive(Debug, Clone, PartialEq)]
struct CubicSpline1D {
    knots: Vec<f64>,
    a: Vec<f64>,
    b: Vec<f64>,
    c: Vec<f64>,
    d: Vec<f64>,
}

impl CubicSpline1D {
    fn new(knots: &[f64], values: &[f64]) -> Result<Self> {
        let n = knots.len();
        if n == 0 || n != values.len() {
            return Err(PathError::InvalidCurve(
                "spline needs matching, non-empty knots and values".to_string(),
            ));
        }

        let a = values.to_vec();
        if n == 1 {
            return Ok(CubicSpline1D {
                knots: knots.to_vec(),
                a,
                b: Vec::new(),
                c: Vec::new(),
                d: Vec::new(),
            });
        }

        let h: Vec<f64> = knots.windows(2).map(|w| w[1] - w[0]).collect();

        // Tridiagonal system for the quadratic coefficients, natural end conditions
        let mut lhs = DMatrix::<f64>::zeros(n, n);
        let mut rhs = DVector::<f64>::zeros(n);
        lhs[(0, 0)] = 1.0;
        lhs[(n - 1, n - 1)] = 1.0;
        for i in 1..n - 1 {
            lhs[(i, i - 1)] = h[i - 1];
            lhs[(i, i)] = 2.0 * (h[i - 1] + h[i]);
            lhs[(i, i + 1)] = h[i];
            rhs[i] = 3.0 * (a[i + 1] - a[i]) / h[i] - 3.0 * (a[i] - a[i - 1]) / h[i - 1];
        }

        let c = lhs.lu().solve(&rhs).ok_or_else(|| {
            PathError::InvalidCurve("spline coefficient system is singular".to_string())
        })?;
        let c: Vec<f64> = c.iter().copied().collect();

        let mut b = Vec::with_capacity(n - 1);
        let mut d = Vec::with_capacity(n - 1);
        for i in 0..n - 1 {
            b.push((a[i + 1] - a[i]) / h[i] - h[i] * (c[i + 1] + 2.0 * c[i]) / 3.0);
            d.push((c[i + 1] - c[i]) / (3.0 * h[i]));
        }

        Ok(CubicSpline1D {
            knots: knots.to_vec(),
            a,
            b,
            c,
            d,
        })
    }

    /// Segment index and local offset for parameter `s`
    fn locate(&self, s: f64) -> (usize, f64) {
        let segments = self.b.len();
        let i = self.knots[1..]
            .partition_point(|&knot| knot <= s)
            .min(segments - 1);
        (i, s - self.knots[i])
    }

    fn value(&self, s: f64) -> f64 {
        if self.b.is_empty() {
            return self.a[0];
        }
        let (i, dx) = self.locate(s);
        self.a[i] + self.b[i] * dx + self.c[i] * dx.powi(2) + self.d[i] * dx.powi(3)
    }

    fn first_derivative(&self, s: f64) -> f64 {
        if self.b.is_empty() {
            return 0.0;
        }
        let (i, dx) = self.locate(s);
        self.b[i] + 2.0 * self.c[i] * dx + 3.0 * self.d[i] * dx.powi(2)
    }

    fn second_derivative(&self, s: f64) -> f64 {
        if self.b.is_empty() {
            return 0.0;
        }
        let (i, dx) = self.locate(s);
        2.0 * self.c[i] + 6.0 * self.d[i] * dx
    }
}

/// Planar spline through a list of waypoints
#[derive(Debug, Clone, PartialEq)]
pub struct CubicSpline2D {
    sx: CubicSpline1D,
    sy: CubicSpline1D,
    length: f64,
}

impl CubicSpline2D {
    /// Fit a spline through `waypoints`
    pub fn new(waypoints: &[Point2D]) -> Result<Self> {
        if waypoints.is_empty() {
            return Err(PathError::InvalidCurve(
                "spline needs at least one waypoint".to_string(),
            ));
        }
        if let Some(bad) = waypoints.iter().position(|p| !is_finite_point(p)) {
            return Err(PathError::InvalidCurve(format!(
                "waypoint {} is not finite",
                bad
            )));
        }

        let mut knots = vec![0.0];
        let mut xs = vec![waypoints[0].x];
        let mut ys = vec![waypoints[0].y];
        let mut last = waypoints[0];
        for point in &waypoints[1..] {
            let ds = (point - last).norm();
            if ds > 0.0 {
                let s = knots[knots.len() - 1] + ds;
                knots.push(s);
                xs.push(point.x);
                ys.push(point.y);
                last = *point;
            }
        }

        log::debug!(
            "fitting spline through {} of {} waypoints",
            knots.len(),
            waypoints.len()
        );

        Ok(CubicSpline2D {
            sx: CubicSpline1D::new(&knots, &xs)?,
            sy: CubicSpline1D::new(&knots, &ys)?,
            length: knots[knots.len() - 1],
        })
    }

    /// Sum of chord lengths between the distinct waypoints
    pub fn chord_length(&self) -> f64 {
        self.length
    }
}

impl Curve for CubicSpline2D {
    fn domain(&self) -> (f64, f64) {
        (0.0, self.length)
    }

    fn position(&self, t: f64) -> Point2D {
        Point2D::new(self.sx.value(t), self.sy.value(t))
    }

    fn derivative(&self, t: f64) -> Point2D {
        Point2D::new(self.sx.first_derivative(t), self.sy.first_derivative(t))
    }

    fn second_derivative(&self, t: f64) -> Point2D {
        Point2D::new(self.sx.second_derivative(t), self.sy.second_derivative(t))
    }
}
