//! Differential-drive path generation
//!
//! Every centerline sample is offset sideways by half the track width to get
//! the two wheel contact points. The wheel on the outside of a turn covers
//! more ground than the inside one, so its speed is scaled by
//! `1 + |kappa| * w / 2` and the inner wheel by `1 - |kappa| * w / 2`. Each
//! wheel's position is the running sum of its own chord lengths, which makes
//! the two wheels diverge in total distance on curved sections.

use std::collections::HashMap;

use crate::common::{is_finite_point, rotate90, types::Point2D, Side};
use crate::curve::Curve;
use crate::error::{PathError, Result};
use crate::path::{Path, WheelPathPoint};
use crate::sampling::{sample_curve, CenterlineSample, StepMode};

/// Maps world coordinates to display coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayTransform {
    pub scale: f64,
    pub offset: Point2D,
    /// Mirror the y axis, for screens whose y grows downwards
    pub flip_y: bool,
}

impl Default for DisplayTransform {
    fn default() -> Self {
        DisplayTransform::identity()
    }
}

impl DisplayTransform {
    pub fn identity() -> Self {
        DisplayTransform {
            scale: 1.0,
            offset: Point2D::zeros(),
            flip_y: false,
        }
    }

    /// Project a world point into display space
    pub fn apply(&self, point: &Point2D) -> Point2D {
        let y = if self.flip_y { -point.y } else { point.y };
        Point2D::new(point.x, y) * self.scale + self.offset
    }
}

/// Parameters of a path generation run
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorConfig {
    /// Lateral distance between the left and right wheel contact lines
    pub wheel_distance: f64,
    pub step: f64,
    pub step_mode: StepMode,
    /// Centerline speed the wheel velocity scales are multiplied with
    pub nominal_speed: f64,
    pub display: DisplayTransform,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            wheel_distance: 0.5,
            step: 0.1,
            step_mode: StepMode::ArcLength,
            nominal_speed: 1.0,
            display: DisplayTransform::identity(),
        }
    }
}

impl GeneratorConfig {
    /// Create a configuration with the given track width and step
    pub fn new(wheel_distance: f64, step: f64) -> Self {
        GeneratorConfig {
            wheel_distance,
            step,
            ..Default::default()
        }
    }

    /// Update the configuration from named parameters
    ///
    /// Recognized keys: `wheel_distance`, `step`, `arc_length_step` (non-zero
    /// for arc length stepping), `nominal_speed`, `display_scale`,
    /// `display_offset_x`, `display_offset_y`, `display_flip_y`. Nothing is
    /// changed if any value is rejected.
    pub fn configure(&mut self, params: &HashMap<String, f64>) -> Result<()> {
        let mut updated = self.clone();

        if let Some(&wheel_distance) = params.get("wheel_distance") {
            if !(wheel_distance.is_finite() && wheel_distance > 0.0) {
                return Err(PathError::InvalidParameter(
                    "Wheel distance must be positive".to_string(),
                ));
            }
            updated.wheel_distance = wheel_distance;
        }

        if let Some(&step) = params.get("step") {
            if !(step.is_finite() && step > 0.0) {
                return Err(PathError::InvalidParameter("Step must be positive".to_string()));
            }
            updated.step = step;
        }

        if let Some(&arc_length) = params.get("arc_length_step") {
            updated.step_mode = if arc_length != 0.0 {
                StepMode::ArcLength
            } else {
                StepMode::Parametric
            };
        }

        if let Some(&nominal_speed) = params.get("nominal_speed") {
            if !nominal_speed.is_finite() {
                return Err(PathError::InvalidParameter("Nominal speed must be finite".to_string()));
            }
            updated.nominal_speed = nominal_speed;
        }

        if let Some(&scale) = params.get("display_scale") {
            if !(scale.is_finite() && scale > 0.0) {
                return Err(PathError::InvalidParameter(
                    "Display scale must be positive".to_string(),
                ));
            }
            updated.display.scale = scale;
        }

        if let Some(&offset_x) = params.get("display_offset_x") {
            if !offset_x.is_finite() {
                return Err(PathError::InvalidParameter(
                    "Display offset x must be finite".to_string(),
                ));
            }
            updated.display.offset.x = offset_x;
        }

        if let Some(&offset_y) = params.get("display_offset_y") {
            if !offset_y.is_finite() {
                return Err(PathError::InvalidParameter(
                    "Display offset y must be finite".to_string(),
                ));
            }
            updated.display.offset.y = offset_y;
        }

        if let Some(&flip_y) = params.get("display_flip_y") {
            updated.display.flip_y = flip_y != 0.0;
        }

        for key in params.keys() {
            if !KNOWN_PARAMETERS.contains(&key.as_str()) {
                log::warn!("ignoring unknown generator parameter {:?}", key);
            }
        }

        *self = updated;
        Ok(())
    }

    /// Check the values a generation run depends on
    pub fn validate(&self) -> Result<()> {
        if !(self.step.is_finite() && self.step > 0.0) {
            return Err(PathError::InvalidCurve(format!(
                "step must be positive, got {}",
                self.step
            )));
        }
        if !(self.wheel_distance.is_finite() && self.wheel_distance > 0.0) {
            return Err(PathError::InvalidParameter(format!(
                "wheel distance must be positive, got {}",
                self.wheel_distance
            )));
        }
        if !self.nominal_speed.is_finite() {
            return Err(PathError::InvalidParameter(format!(
                "nominal speed must be finite, got {}",
                self.nominal_speed
            )));
        }
        let display = &self.display;
        let scale_ok = display.scale.is_finite() && display.scale > 0.0;
        if !scale_ok || !is_finite_point(&display.offset) {
            return Err(PathError::InvalidParameter(format!(
                "display transform must have a positive scale and a finite offset, got {:?}",
                display
            )));
        }
        Ok(())
    }
}

const KNOWN_PARAMETERS: [&str; 8] = [
    "wheel_distance",
    "step",
    "arc_length_step",
    "nominal_speed",
    "display_scale",
    "display_offset_x",
    "display_offset_y",
    "display_flip_y",
];

/// Turns curves into tank drive paths
#[derive(Debug, Clone, Default)]
pub struct PathGenerator {
    config: GeneratorConfig,
}

impl PathGenerator {
    /// Create a new path generator
    pub fn new(config: GeneratorConfig) -> Self {
        PathGenerator { config }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Configure the generator with parameters
    pub fn configure(&mut self, params: &HashMap<String, f64>) -> Result<()> {
        self.config.configure(params)
    }

    /// Generate a path at constant nominal speed
    pub fn generate<C>(&self, curve: &C) -> Result<Path>
    where
        C: Curve + ?Sized,
    {
        let nominal_speed = self.config.nominal_speed;
        self.generate_with_profile(curve, |_| nominal_speed)
    }

    /// Generate a path whose centerline speed is given per sample by `profile`
    pub fn generate_with_profile<C, F>(&self, curve: &C, profile: F) -> Result<Path>
    where
        C: Curve + ?Sized,
        F: Fn(&CenterlineSample) -> f64,
    {
        self.config.validate()?;
        let samples = sample_curve(curve, self.config.step, self.config.step_mode)?;
        let path = offset_samples(&samples, &self.config, profile)?;

        if let Some((left, right)) = path.final_positions() {
            log::info!(
                "generated tank path: {} samples, left {:.3}, right {:.3}",
                path.len(),
                left,
                right
            );
        }
        Ok(path)
    }
}

/// Generate a path with the default configuration and the given geometry
pub fn generate_from_curve<C>(curve: &C, wheel_distance: f64, step: f64) -> Result<Path>
where
    C: Curve + ?Sized,
{
    PathGenerator::new(GeneratorConfig::new(wheel_distance, step)).generate(curve)
}

/// Offset centerline samples into left and right wheel sequences
pub fn offset_samples<F>(
    samples: &[CenterlineSample],
    config: &GeneratorConfig,
    profile: F,
) -> Result<Path>
where
    F: Fn(&CenterlineSample) -> f64,
{
    let half_width = config.wheel_distance / 2.0;
    let mut left = WheelTrack::new(Side::Left, samples.len());
    let mut right = WheelTrack::new(Side::Right, samples.len());

    for (index, sample) in samples.iter().enumerate() {
        let speed = profile(sample);
        if !speed.is_finite() {
            return Err(PathError::DegenerateGeometry(format!(
                "speed profile returned {} at sample {}",
                speed, index
            )));
        }
        left.push(index, sample, half_width, speed, &config.display)?;
        right.push(index, sample, half_width, speed, &config.display)?;
    }

    Ok(Path::from_wheels(left.points, right.points))
}

/// Accumulates one wheel's points while walking the centerline
struct WheelTrack {
    side: Side,
    previous: Option<Point2D>,
    distance: f64,
    points: Vec<WheelPathPoint>,
}

impl WheelTrack {
    fn new(side: Side, capacity: usize) -> Self {
        WheelTrack {
            side,
            previous: None,
            distance: 0.0,
            points: Vec::with_capacity(capacity),
        }
    }

    fn push(
        &mut self,
        index: usize,
        sample: &CenterlineSample,
        half_width: f64,
        speed: f64,
        display: &DisplayTransform,
    ) -> Result<()> {
        let sign = self.side.sign();
        let normal = rotate90(sample.tangent.into_inner());
        let contact = sample.position + normal * (sign * half_width);

        // Left turns (positive curvature) put the left wheel on the inside
        let velocity = speed * (1.0 - sign * sample.curvature * half_width);

        if let Some(previous) = self.previous {
            self.distance += (contact - previous).norm();
        }
        self.previous = Some(contact);

        let display_coordinate = display.apply(&contact);
        if !is_finite_point(&contact)
            || !velocity.is_finite()
            || !self.distance.is_finite()
            || !is_finite_point(&display_coordinate)
        {
            return Err(PathError::DegenerateGeometry(format!(
                "{:?} wheel offset is not finite at sample {} (t = {})",
                self.side, index, sample.t
            )));
        }

        self.points
            .push(WheelPathPoint::new(self.distance, velocity, display_coordinate));
        Ok(())
    }
}
