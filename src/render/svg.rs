//! Minimal SVG output

use std::fmt::Write;

use super::{DisplayPrimitive, Rect, Renderer};

/// Renders wheel tracks into a standalone SVG document
#[derive(Debug, Clone)]
pub struct SvgRenderer {
    stroke_width: f64,
    margin: f64,
    view_box: Rect,
    body: String,
}

impl Default for SvgRenderer {
    fn default() -> Self {
        SvgRenderer::new(0.02, 0.1)
    }
}

impl SvgRenderer {
    /// Create a new renderer; `stroke_width` and `margin` are in display units
    pub fn new(stroke_width: f64, margin: f64) -> Self {
        SvgRenderer {
            stroke_width,
            margin,
            view_box: Rect {
                x: 0.0,
                y: 0.0,
                width: 1.0,
                height: 1.0,
            },
            body: String::new(),
        }
    }

    /// The finished document
    pub fn into_document(self) -> String {
        format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"{} {} {} {}\">\n{}</svg>\n",
            self.view_box.x, self.view_box.y, self.view_box.width, self.view_box.height, self.body
        )
    }
}

impl Renderer for SvgRenderer {
    fn begin(&mut self, bounds: Option<Rect>) {
        self.body.clear();
        if let Some(bounds) = bounds {
            self.view_box = Rect {
                x: bounds.x - self.margin,
                y: bounds.y - self.margin,
                width: bounds.width + 2.0 * self.margin,
                height: bounds.height + 2.0 * self.margin,
            };
        }
    }

    fn draw_segment(&mut self, from: &DisplayPrimitive, to: &DisplayPrimitive) {
        // Writing into a String cannot fail
        let _ = writeln!(
            self.body,
            "  <line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" stroke=\"{}\" stroke-width=\"{}\" />",
            from.coordinate.x,
            from.coordinate.y,
            to.coordinate.x,
            to.coordinate.y,
            to.color.to_hex(),
            self.stroke_width
        );
    }

    fn draw_point(&mut self, point: &DisplayPrimitive) {
        let _ = writeln!(
            self.body,
            "  <circle cx=\"{}\" cy=\"{}\" r=\"{}\" fill=\"{}\" />",
            point.coordinate.x,
            point.coordinate.y,
            self.stroke_width,
            point.color.to_hex()
        );
    }
}
