//! Centerline sampling
//!
//! Walks a curve's domain at a fixed step and produces the ordered centerline
//! samples the differential-drive offsetter works on. The step is either a
//! parameter increment or a centerline arc-length increment, see [`StepMode`].
//!
//! Sample count is always `ceil(extent / step) + 1`, where the extent is the
//! parameter range or the total centerline length. The first and last samples
//! sit exactly on the curve endpoints. A curve whose extent is zero yields a
//! single sample.
//!
//! Where the curve has numerically zero speed the heading is undefined. Such
//! samples borrow the tangent of the previous well-defined sample (or the
//! next one, for a leading run) and get zero curvature. If no sample has a
//! defined heading, the chord from the first to the last sample is used, and
//! failing that the +x axis.

use nalgebra::Unit;

use crate::common::{
    is_finite_point,
    types::{Direction2D, Point2D},
};
use crate::curve::Curve;
use crate::error::{PathError, Result};

/// Speeds below this are treated as a stationary point of the curve
pub const DEGENERATE_SPEED_EPSILON: f64 = 1e-9;

/// Upper bound on the number of samples a single generation may produce
pub const MAX_SAMPLES: usize = 10_000_000;

/// Sub-intervals used to integrate the arc length table (Simpson, per interval)
const ARC_LENGTH_INTERVALS: usize = 1024;

/// Relative tolerance when deciding whether the extent is a whole number of steps
const STEP_COUNT_TOLERANCE: f64 = 1e-9;

/// Meaning of the sampling step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StepMode {
    /// `step` is a distance along the centerline
    #[default]
    ArcLength,
    /// `step` is an increment of the curve parameter
    Parametric,
}

/// One sample of the curve the vehicle center follows
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CenterlineSample {
    /// Curve parameter of the sample
    pub t: f64,
    /// Centerline distance traveled from the first sample
    pub distance: f64,
    pub position: Point2D,
    /// Heading of the centerline
    pub tangent: Direction2D,
    /// Signed curvature, positive when turning left
    pub curvature: f64,
}

/// Sample `curve` at a fixed `step`
pub fn sample_curve<C>(curve: &C, step: f64, mode: StepMode) -> Result<Vec<CenterlineSample>>
where
    C: Curve + ?Sized,
{
    let (t0, t1) = curve.domain();
    if !t0.is_finite() || !t1.is_finite() {
        return Err(PathError::InvalidCurve(format!(
            "curve domain [{}, {}] is not finite",
            t0, t1
        )));
    }
    if t1 < t0 {
        return Err(PathError::InvalidCurve(format!(
            "curve domain [{}, {}] is empty",
            t0, t1
        )));
    }
    if !(step.is_finite() && step > 0.0) {
        return Err(PathError::InvalidCurve(format!(
            "step must be positive, got {}",
            step
        )));
    }

    let stations = match mode {
        StepMode::Parametric => parametric_stations(t0, t1, step)?,
        StepMode::ArcLength => arc_length_stations(curve, t0, t1, step)?,
    };

    log::debug!(
        "sampling {:?} step {} over [{}, {}]: {} samples",
        mode,
        step,
        t0,
        t1,
        stations.len()
    );

    build_samples(curve, &stations)
}

/// Parameter and centerline distance of a sample before evaluation
#[derive(Debug, Clone, Copy)]
struct Station {
    t: f64,
    distance: Option<f64>,
}

/// Number of whole steps needed to cover `extent`
fn step_count(extent: f64, step: f64) -> Result<usize> {
    let ratio = extent / step;
    let rounded = ratio.round();
    let intervals = if (ratio - rounded).abs() <= STEP_COUNT_TOLERANCE * ratio.max(1.0) {
        rounded
    } else {
        ratio.ceil()
    };
    if !intervals.is_finite() || intervals >= MAX_SAMPLES as f64 {
        return Err(PathError::InvalidCurve(format!(
            "step {} is too small for extent {}",
            step, extent
        )));
    }
    Ok(intervals as usize)
}

fn parametric_stations(t0: f64, t1: f64, step: f64) -> Result<Vec<Station>> {
    let intervals = step_count(t1 - t0, step)?;
    Ok((0..=intervals)
        .map(|i| {
            let t = if i == intervals {
                t1
            } else {
                (t0 + i as f64 * step).min(t1)
            };
            Station { t, distance: None }
        })
        .collect())
}

fn arc_length_stations<C>(curve: &C, t0: f64, t1: f64, step: f64) -> Result<Vec<Station>>
where
    C: Curve + ?Sized,
{
    let table = ArcLengthTable::build(curve, t0, t1)?;
    let total = table.total();
    let intervals = step_count(total, step)?;
    Ok((0..=intervals)
        .map(|i| {
            if i == intervals {
                Station {
                    t: t1,
                    distance: Some(total),
                }
            } else {
                let s = (i as f64 * step).min(total);
                Station {
                    t: table.parameter_at(s),
                    distance: Some(s),
                }
            }
        })
        .collect())
}

/// Cumulative centerline length at evenly spaced parameters
#[derive(Debug, Clone)]
struct ArcLengthTable {
    params: Vec<f64>,
    lengths: Vec<f64>,
}

impl ArcLengthTable {
    fn build<C>(curve: &C, t0: f64, t1: f64) -> Result<Self>
    where
        C: Curve + ?Sized,
    {
        if t1 == t0 {
            return Ok(ArcLengthTable {
                params: vec![t0],
                lengths: vec![0.0],
            });
        }

        let speed = |t: f64| curve.derivative(t).norm();
        let dt = (t1 - t0) / ARC_LENGTH_INTERVALS as f64;
        let mut params = Vec::with_capacity(ARC_LENGTH_INTERVALS + 1);
        let mut lengths = Vec::with_capacity(ARC_LENGTH_INTERVALS + 1);
        params.push(t0);
        lengths.push(0.0);

        let mut total = 0.0;
        let mut a = t0;
        let mut speed_a = speed(a);
        for i in 1..=ARC_LENGTH_INTERVALS {
            let b = if i == ARC_LENGTH_INTERVALS {
                t1
            } else {
                t0 + i as f64 * dt
            };
            let speed_b = speed(b);
            let mid = speed(0.5 * (a + b));
            total += (b - a) / 6.0 * (speed_a + 4.0 * mid + speed_b);
            params.push(b);
            lengths.push(total);
            a = b;
            speed_a = speed_b;
        }

        if !total.is_finite() {
            return Err(PathError::DegenerateGeometry(
                "curve length is not finite".to_string(),
            ));
        }

        Ok(ArcLengthTable { params, lengths })
    }

    fn total(&self) -> f64 {
        self.lengths[self.lengths.len() - 1]
    }

    /// Parameter at which the centerline distance reaches `s`
    fn parameter_at(&self, s: f64) -> f64 {
        let upper = self.lengths.partition_point(|&length| length < s);
        if upper == 0 {
            return self.params[0];
        }
        if upper >= self.lengths.len() {
            return self.params[self.params.len() - 1];
        }
        let (s0, s1) = (self.lengths[upper - 1], self.lengths[upper]);
        let (p0, p1) = (self.params[upper - 1], self.params[upper]);
        if s1 - s0 <= 0.0 {
            return p0;
        }
        p0 + (p1 - p0) * (s - s0) / (s1 - s0)
    }
}

fn build_samples<C>(curve: &C, stations: &[Station]) -> Result<Vec<CenterlineSample>>
where
    C: Curve + ?Sized,
{
    let mut positions = Vec::with_capacity(stations.len());
    let mut headings: Vec<Option<(Direction2D, f64)>> = Vec::with_capacity(stations.len());

    for (i, station) in stations.iter().enumerate() {
        let position = curve.position(station.t);
        if !is_finite_point(&position) {
            return Err(PathError::DegenerateGeometry(format!(
                "curve position at t = {} (sample {}) is not finite",
                station.t, i
            )));
        }
        positions.push(position);

        let derivative = curve.derivative(station.t);
        if !is_finite_point(&derivative) {
            return Err(PathError::DegenerateGeometry(format!(
                "curve derivative at t = {} (sample {}) is not finite",
                station.t, i
            )));
        }
        // Only a finite speed below the epsilon counts as a stationary point
        let heading = match curve.curvature(station.t, DEGENERATE_SPEED_EPSILON) {
            Some(curvature) => {
                if !curvature.is_finite() {
                    return Err(PathError::DegenerateGeometry(format!(
                        "curvature at t = {} (sample {}) is not finite",
                        station.t, i
                    )));
                }
                Some((Unit::new_normalize(derivative), curvature))
            }
            _ => None,
        };
        headings.push(heading);
    }

    let tangents = resolve_tangents(&positions, &headings);

    let mut samples = Vec::with_capacity(stations.len());
    let mut chord_distance = 0.0;
    for (i, station) in stations.iter().enumerate() {
        if i > 0 {
            chord_distance += (positions[i] - positions[i - 1]).norm();
        }
        samples.push(CenterlineSample {
            t: station.t,
            distance: station.distance.unwrap_or(chord_distance),
            position: positions[i],
            tangent: tangents[i],
            curvature: headings[i].map_or(0.0, |(_, curvature)| curvature),
        });
    }
    Ok(samples)
}

fn resolve_tangents(
    positions: &[Point2D],
    headings: &[Option<(Direction2D, f64)>],
) -> Vec<Direction2D> {
    let degenerate = headings.iter().filter(|h| h.is_none()).count();
    if degenerate > 0 {
        log::warn!(
            "{} of {} samples have no defined heading, borrowing neighbour tangents",
            degenerate,
            headings.len()
        );
    }

    let first_defined = headings.iter().flatten().next().map(|(tangent, _)| *tangent);
    let fallback = first_defined.unwrap_or_else(|| chord_direction(positions));

    let mut previous: Option<Direction2D> = None;
    headings
        .iter()
        .map(|heading| {
            let tangent = match heading {
                Some((tangent, _)) => *tangent,
                None => previous.unwrap_or(fallback),
            };
            previous = Some(tangent);
            tangent
        })
        .collect()
}

fn chord_direction(positions: &[Point2D]) -> Direction2D {
    match (positions.first(), positions.last()) {
        (Some(first), Some(last)) => Unit::try_new(last - first, DEGENERATE_SPEED_EPSILON)
            .unwrap_or_else(Point2D::x_axis),
        _ => Point2D::x_axis(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::{CircularArc, CubicSpline2D, LineSegment};
    use approx::assert_relative_eq;

    /// Straight line traversed with non-uniform speed, stopping at t = 0
    struct Cubic;

    impl Curve for Cubic {
        fn domain(&self) -> (f64, f64) {
            (-1.0, 1.0)
        }

        fn position(&self, t: f64) -> Point2D {
            Point2D::new(t.powi(3), 0.0)
        }

        fn derivative(&self, t: f64) -> Point2D {
            Point2D::new(3.0 * t * t, 0.0)
        }

        fn second_derivative(&self, t: f64) -> Point2D {
            Point2D::new(6.0 * t, 0.0)
        }
    }

    #[test]
    fn parametric_count_and_endpoints() {
        let line = LineSegment::new(Point2D::new(0.0, 0.0), Point2D::new(10.0, 0.0));
        let samples = sample_curve(&line, 3.0, StepMode::Parametric).unwrap();
        // ceil(10 / 3) + 1
        assert_eq!(samples.len(), 5);
        assert_eq!(samples[0].position, Point2D::new(0.0, 0.0));
        assert_eq!(samples[4].position, Point2D::new(10.0, 0.0));
        assert_relative_eq!(samples[3].t, 9.0);
    }

    #[test]
    fn whole_number_of_steps_does_not_duplicate_the_endpoint() {
        let line = LineSegment::new(Point2D::new(0.0, 0.0), Point2D::new(1.0, 0.0));
        let samples = sample_curve(&line, 0.1, StepMode::Parametric).unwrap();
        assert_eq!(samples.len(), 11);
    }

    #[test]
    fn arc_length_mode_spaces_samples_evenly() {
        let arc = CircularArc::from_curvature(0.5, 4.0).unwrap();
        let samples = sample_curve(&arc, 0.5, StepMode::ArcLength).unwrap();
        assert_eq!(samples.len(), 9);
        for pair in samples.windows(2) {
            assert_relative_eq!(pair[1].distance - pair[0].distance, 0.5, epsilon = 1e-6);
            assert_relative_eq!(pair[0].curvature, 0.5, epsilon = 1e-9);
        }
    }

    #[test]
    fn arc_length_mode_resamples_non_uniform_parameterization() {
        let spline = CubicSpline2D::new(&[
            Point2D::new(0.0, 0.0),
            Point2D::new(1.0, 0.0),
            Point2D::new(5.0, 0.0),
        ])
        .unwrap();
        let samples = sample_curve(&spline, 1.0, StepMode::ArcLength).unwrap();
        assert_eq!(samples.len(), 6);
        for (i, sample) in samples.iter().enumerate() {
            assert_relative_eq!(sample.position.x, i as f64, epsilon = 1e-6);
        }
    }

    #[test]
    fn zero_length_curve_yields_single_sample() {
        let p = Point2D::new(3.0, 4.0);
        let samples = sample_curve(&LineSegment::new(p, p), 1.0, StepMode::ArcLength).unwrap();
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].position, p);
        assert_eq!(samples[0].curvature, 0.0);
        assert_eq!(samples[0].tangent, Point2D::x_axis());
    }

    #[test]
    fn stationary_point_borrows_previous_tangent() {
        let samples = sample_curve(&Cubic, 0.5, StepMode::Parametric).unwrap();
        let stationary = samples.iter().position(|s| s.t == 0.0).unwrap();
        assert_eq!(samples[stationary].tangent, samples[stationary - 1].tangent);
        assert_eq!(samples[stationary].curvature, 0.0);
    }

    #[test]
    fn rejects_bad_domain_and_step() {
        let line = LineSegment::new(Point2D::new(0.0, 0.0), Point2D::new(1.0, 0.0));
        for step in [0.0, -1.0, f64::NAN] {
            assert!(matches!(
                sample_curve(&line, step, StepMode::Parametric),
                Err(PathError::InvalidCurve(_))
            ));
        }

        struct Backwards;
        impl Curve for Backwards {
            fn domain(&self) -> (f64, f64) {
                (1.0, 0.0)
            }
            fn position(&self, t: f64) -> Point2D {
                Point2D::new(t, 0.0)
            }
        }
        assert!(matches!(
            sample_curve(&Backwards, 0.1, StepMode::Parametric),
            Err(PathError::InvalidCurve(_))
        ));
    }

    #[test]
    fn non_finite_position_is_degenerate() {
        struct Exploding;
        impl Curve for Exploding {
            fn domain(&self) -> (f64, f64) {
                (0.0, 1.0)
            }
            fn position(&self, t: f64) -> Point2D {
                Point2D::new(f64::NAN, t)
            }
        }
        assert!(matches!(
            sample_curve(&Exploding, 0.5, StepMode::Parametric),
            Err(PathError::DegenerateGeometry(_))
        ));
    }

    #[test]
    fn non_finite_derivative_is_degenerate_in_both_modes() {
        /// Finite positions but an undefined derivative everywhere
        struct Undifferentiable;
        impl Curve for Undifferentiable {
            fn domain(&self) -> (f64, f64) {
                (0.0, 1.0)
            }
            fn position(&self, t: f64) -> Point2D {
                Point2D::new(t, 0.0)
            }
            fn derivative(&self, _t: f64) -> Point2D {
                Point2D::new(f64::NAN, f64::NAN)
            }
        }

        for mode in [StepMode::Parametric, StepMode::ArcLength] {
            assert!(
                matches!(
                    sample_curve(&Undifferentiable, 0.25, mode),
                    Err(PathError::DegenerateGeometry(_))
                ),
                "{:?} accepted a NaN derivative",
                mode
            );
        }

        struct Infinite;
        impl Curve for Infinite {
            fn domain(&self) -> (f64, f64) {
                (0.0, 1.0)
            }
            fn position(&self, t: f64) -> Point2D {
                Point2D::new(t, 0.0)
            }
            fn derivative(&self, _t: f64) -> Point2D {
                Point2D::new(f64::INFINITY, 0.0)
            }
        }
        assert!(matches!(
            sample_curve(&Infinite, 0.25, StepMode::Parametric),
            Err(PathError::DegenerateGeometry(_))
        ));
    }
}
