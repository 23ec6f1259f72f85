//! Display view of paths
//!
//! Rendering is kept apart from the kinematics: anything implementing
//! [`Renderable`] hands out per-wheel `(coordinate, color)` lists and a
//! bounding rectangle, and a [`Renderer`] draws them without knowing what a
//! wheel or a curvature is.

pub mod color;
pub mod svg;

pub use color::{color_by, Color, ColoredPath};
pub use svg::SvgRenderer;

use crate::common::types::Point2D;
use crate::path::Path;

/// Default stroke color of the left wheel track
pub const LEFT_COLOR: Color = Color::new(0x1f, 0x77, 0xb4);
/// Default stroke color of the right wheel track
pub const RIGHT_COLOR: Color = Color::new(0xff, 0x7f, 0x0e);

/// Axis-aligned rectangle in display coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Create a rectangle spanning two corners
    pub fn from_corners(min: Point2D, max: Point2D) -> Self {
        Rect {
            x: min.x,
            y: min.y,
            width: max.x - min.x,
            height: max.y - min.y,
        }
    }

    pub fn min(&self) -> Point2D {
        Point2D::new(self.x, self.y)
    }

    pub fn max(&self) -> Point2D {
        Point2D::new(self.x + self.width, self.y + self.height)
    }

    /// Whether `point` lies inside or on the border
    pub fn contains(&self, point: &Point2D) -> bool {
        let (min, max) = (self.min(), self.max());
        point.x >= min.x && point.x <= max.x && point.y >= min.y && point.y <= max.y
    }
}

/// One drawable point of a wheel track
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayPrimitive {
    pub coordinate: Point2D,
    pub color: Color,
}

/// Drawable points of both wheel tracks, in driving order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DisplayPrimitives {
    pub left: Vec<DisplayPrimitive>,
    pub right: Vec<DisplayPrimitive>,
}

impl DisplayPrimitives {
    /// Both tracks, left first
    pub fn tracks(&self) -> [&[DisplayPrimitive]; 2] {
        [&self.left, &self.right]
    }
}

/// Something that can be handed to a [`Renderer`]
pub trait Renderable {
    /// Per-wheel `(coordinate, color)` lists
    fn to_display_primitives(&self) -> DisplayPrimitives;

    /// Smallest rectangle enclosing every display coordinate, `None` when
    /// there is nothing to draw
    fn bounding_rectangle(&self) -> Option<Rect>;
}

impl Renderable for Path {
    fn to_display_primitives(&self) -> DisplayPrimitives {
        let track = |points: &[crate::path::WheelPathPoint], color: Color| {
            points
                .iter()
                .map(|point| DisplayPrimitive {
                    coordinate: point.display_coordinate,
                    color,
                })
                .collect::<Vec<_>>()
        };
        DisplayPrimitives {
            left: track(self.left(), LEFT_COLOR),
            right: track(self.right(), RIGHT_COLOR),
        }
    }

    fn bounding_rectangle(&self) -> Option<Rect> {
        bounding_rectangle_of(
            self.left()
                .iter()
                .chain(self.right())
                .map(|point| &point.display_coordinate),
        )
    }
}

/// Smallest rectangle enclosing `points`
pub fn bounding_rectangle_of<'a, I>(points: I) -> Option<Rect>
where
    I: IntoIterator<Item = &'a Point2D>,
{
    let mut points = points.into_iter();
    let first = points.next()?;
    let (min, max) = points.fold((*first, *first), |(min, max), p| {
        (min.inf(p), max.sup(p))
    });
    Some(Rect::from_corners(min, max))
}

/// Drawing backend
pub trait Renderer {
    /// Called once before anything is drawn
    fn begin(&mut self, _bounds: Option<Rect>) {}

    /// Draw a straight piece of track from `from` to `to`
    fn draw_segment(&mut self, from: &DisplayPrimitive, to: &DisplayPrimitive);

    /// Draw a track consisting of a single point
    fn draw_point(&mut self, _point: &DisplayPrimitive) {}

    /// Called once after everything is drawn
    fn finish(&mut self) {}
}

/// Draw `item` with `renderer`
pub fn render(item: &dyn Renderable, renderer: &mut dyn Renderer) {
    let primitives = item.to_display_primitives();
    renderer.begin(item.bounding_rectangle());
    for track in primitives.tracks() {
        if let [single] = track {
            renderer.draw_point(single);
        }
        for pair in track.windows(2) {
            renderer.draw_segment(&pair[0], &pair[1]);
        }
    }
    renderer.finish();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::WheelPathPoint;

    #[derive(Default)]
    struct Recorder {
        bounds: Option<Option<Rect>>,
        segments: usize,
        points: usize,
        finished: bool,
    }

    impl Renderer for Recorder {
        fn begin(&mut self, bounds: Option<Rect>) {
            self.bounds = Some(bounds);
        }

        fn draw_segment(&mut self, _from: &DisplayPrimitive, _to: &DisplayPrimitive) {
            self.segments += 1;
        }

        fn draw_point(&mut self, _point: &DisplayPrimitive) {
            self.points += 1;
        }

        fn finish(&mut self) {
            self.finished = true;
        }
    }

    fn path(left: &[(f64, f64)], right: &[(f64, f64)]) -> Path {
        let wheel = |coords: &[(f64, f64)]| {
            coords
                .iter()
                .enumerate()
                .map(|(i, &(x, y))| WheelPathPoint::new(i as f64, 1.0, Point2D::new(x, y)))
                .collect::<Vec<_>>()
        };
        Path::from_wheels(wheel(left), wheel(right))
    }

    #[test]
    fn empty_path_has_no_bounding_rectangle() {
        assert_eq!(Path::empty().bounding_rectangle(), None);
    }

    #[test]
    fn bounding_rectangle_covers_both_wheels() {
        let path = path(&[(0.0, 1.0), (4.0, 3.0)], &[(-1.0, -1.0), (2.0, 0.5)]);
        let rect = path.bounding_rectangle().unwrap();
        assert_eq!(
            rect,
            Rect::from_corners(Point2D::new(-1.0, -1.0), Point2D::new(4.0, 3.0))
        );
        for (left, right) in path.iter() {
            assert!(rect.contains(&left.display_coordinate));
            assert!(rect.contains(&right.display_coordinate));
        }
    }

    #[test]
    fn render_draws_segments_per_track() {
        let path = path(
            &[(0.0, 1.0), (1.0, 1.0), (2.0, 1.0)],
            &[(0.0, -1.0), (1.0, -1.0), (2.0, -1.0)],
        );
        let mut recorder = Recorder::default();
        render(&path, &mut recorder);
        assert_eq!(recorder.segments, 4);
        assert_eq!(recorder.points, 0);
        assert!(recorder.finished);
        assert_eq!(recorder.bounds, Some(path.bounding_rectangle()));
    }

    #[test]
    fn single_sample_tracks_are_drawn_as_points() {
        let path = path(&[(0.0, 1.0)], &[(0.0, -1.0)]);
        let mut recorder = Recorder::default();
        render(&path, &mut recorder);
        assert_eq!(recorder.segments, 0);
        assert_eq!(recorder.points, 2);
    }

    #[test]
    fn path_primitives_use_wheel_colors() {
        let path = path(&[(0.0, 1.0)], &[(0.0, -1.0)]);
        let primitives = path.to_display_primitives();
        assert_eq!(primitives.left[0].color, LEFT_COLOR);
        assert_eq!(primitives.right[0].color, RIGHT_COLOR);
        assert_eq!(primitives.right[0].coordinate, Point2D::new(0.0, -1.0));
    }
}
