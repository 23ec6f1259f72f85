//! Common utilities and types shared across the crate

/// Common types used across the codebase
pub mod types {
    use nalgebra::{Unit, Vector2};

    /// A 2D point or displacement
    pub type Point2D = Vector2<f64>;

    /// A unit-length 2D direction
    pub type Direction2D = Unit<Vector2<f64>>;
}

/// Which side of the vehicle a wheel is on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// Both sides in wire/storage order
    pub const BOTH: [Side; 2] = [Side::Left, Side::Right];

    /// Lateral sign of the wheel relative to the left normal
    pub fn sign(self) -> f64 {
        match self {
            Side::Left => 1.0,
            Side::Right => -1.0,
        }
    }
}

/// Rotate a vector by +90 degrees (counter-clockwise)
pub fn rotate90(v: types::Point2D) -> types::Point2D {
    types::Point2D::new(-v.y, v.x)
}

/// Check that every component of a point is finite
pub fn is_finite_point(p: &types::Point2D) -> bool {
    p.x.is_finite() && p.y.is_finite()
}
