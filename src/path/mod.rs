//! Per-wheel path store
//!
//! A [`Path`] holds two index-aligned sequences of wheel points, one per side
//! of a tank drive vehicle. Entry `i` of both sequences belongs to the same
//! centerline sample, and the order is the order the vehicle drives them in.
//! Paths are built by [`generator::generate_from_curve`] or
//! [`codec::decode_from_stream`] and are never mutated afterwards.

pub mod codec;
pub mod generator;

use crate::common::{types::Point2D, Side};

/// Position and velocity target for one wheel at one sample
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PrimitivePoint {
    /// Distance the wheel has traveled along its own track
    pub position: f64,
    /// Signed wheel speed, relative to the nominal centerline speed
    pub velocity: f64,
}

/// A wheel target together with where to draw it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelPathPoint {
    pub primitive: PrimitivePoint,
    /// Display-space location, never used for control
    pub display_coordinate: Point2D,
}

impl WheelPathPoint {
    /// Create a new wheel point
    pub fn new(position: f64, velocity: f64, display_coordinate: Point2D) -> Self {
        WheelPathPoint {
            primitive: PrimitivePoint { position, velocity },
            display_coordinate,
        }
    }

    pub fn position(&self) -> f64 {
        self.primitive.position
    }

    pub fn velocity(&self) -> f64 {
        self.primitive.velocity
    }
}

/// Left and right wheel trajectories of equal length
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Path {
    left: Vec<WheelPathPoint>,
    right: Vec<WheelPathPoint>,
}

impl Path {
    /// Assemble a path from two wheel sequences built in lock step
    pub(crate) fn from_wheels(left: Vec<WheelPathPoint>, right: Vec<WheelPathPoint>) -> Self {
        debug_assert_eq!(left.len(), right.len(), "wheel sequences must be aligned");
        Path { left, right }
    }

    /// A path without any samples
    pub fn empty() -> Self {
        Path::default()
    }

    pub fn left(&self) -> &[WheelPathPoint] {
        &self.left
    }

    pub fn right(&self) -> &[WheelPathPoint] {
        &self.right
    }

    /// Points of the wheel on `side`
    pub fn wheel(&self, side: Side) -> &[WheelPathPoint] {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    /// Number of samples per wheel
    pub fn len(&self) -> usize {
        self.left.len()
    }

    pub fn is_empty(&self) -> bool {
        self.left.is_empty()
    }

    /// Index-aligned `(left, right)` pairs in driving order
    pub fn iter(&self) -> impl Iterator<Item = (&WheelPathPoint, &WheelPathPoint)> + '_ {
        self.left.iter().zip(self.right.iter())
    }

    /// Total distance traveled by the left and right wheel
    pub fn final_positions(&self) -> Option<(f64, f64)> {
        match (self.left.last(), self.right.last()) {
            (Some(left), Some(right)) => Some((left.position(), right.position())),
            _ => None,
        }
    }
}
