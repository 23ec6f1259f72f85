//! Color-by-value annotation
//!
//! Coloring never touches the path itself. [`color_by`] builds a separate
//! [`ColoredPath`] that carries the display coordinates together with a color
//! per point, so several differently colored views of one path can coexist.

use super::{bounding_rectangle_of, DisplayPrimitive, DisplayPrimitives, Rect, Renderable};
use crate::path::{Path, WheelPathPoint};

/// 8-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Color { r, g, b }
    }

    /// CSS hex notation, e.g. `#ff7f0e`
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Blue at 0, green at 0.5, red at 1; `fraction` is clamped to [0, 1]
    pub fn ramp(fraction: f64) -> Self {
        let f = if fraction.is_finite() {
            fraction.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let channel = |v: f64| (v * 255.0).round() as u8;
        if f < 0.5 {
            let u = f * 2.0;
            Color::new(0, channel(u), channel(1.0 - u))
        } else {
            let u = (f - 0.5) * 2.0;
            Color::new(channel(u), channel(1.0 - u), 0)
        }
    }
}

/// Display-only view of a path with a color attached to every point
#[derive(Debug, Clone, PartialEq)]
pub struct ColoredPath {
    primitives: DisplayPrimitives,
}

impl ColoredPath {
    pub fn left(&self) -> &[DisplayPrimitive] {
        &self.primitives.left
    }

    pub fn right(&self) -> &[DisplayPrimitive] {
        &self.primitives.right
    }
}

impl Renderable for ColoredPath {
    fn to_display_primitives(&self) -> DisplayPrimitives {
        self.primitives.clone()
    }

    fn bounding_rectangle(&self) -> Option<Rect> {
        bounding_rectangle_of(
            self.primitives
                .left
                .iter()
                .chain(&self.primitives.right)
                .map(|primitive| &primitive.coordinate),
        )
    }
}

/// Color every point by its speed relative to `full_scale`
///
/// A point whose `|velocity|` reaches `full_scale` is drawn red, a stopped
/// wheel blue. A non-positive or non-finite `full_scale` puts every point at
/// the blue end.
pub fn color_by(path: &Path, full_scale: f64) -> ColoredPath {
    let fraction = |point: &WheelPathPoint| {
        if full_scale.is_finite() && full_scale > 0.0 {
            point.velocity().abs() / full_scale
        } else {
            0.0
        }
    };
    let track = |points: &[WheelPathPoint]| {
        points
            .iter()
            .map(|point| DisplayPrimitive {
                coordinate: point.display_coordinate,
                color: Color::ramp(fraction(point)),
            })
            .collect::<Vec<_>>()
    };
    ColoredPath {
        primitives: DisplayPrimitives {
            left: track(path.left()),
            right: track(path.right()),
        },
    }
}
