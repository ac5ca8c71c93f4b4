//! Rendering: draws stroke segments onto a surface.
//!
//! [`Surface`] is the only seam that touches pixels. The browser build draws
//! through [`web_sys::CanvasRenderingContext2d`]; tests and the native
//! participant use [`RecordingSurface`], which keeps a display list.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use web_sys::CanvasRenderingContext2d;

use crate::normalize::{PixelSegment, Point};

/// Something straight lines can be drawn on.
pub trait Surface {
    /// Stroke one straight line.
    fn stroke_line(&mut self, from: Point, to: Point, color: &str, line_width: f64);

    /// Wipe the whole surface.
    fn clear(&mut self);
}

/// Draw `segment` in `color` at `line_width`. Always draws, even if the same
/// segment was drawn before.
pub fn render<S: Surface + ?Sized>(surface: &mut S, segment: &PixelSegment, color: &str, line_width: f64) {
    surface.stroke_line(segment.from, segment.to, color, line_width);
}

/// Wipe the surface. Only called on explicit user request.
pub fn clear<S: Surface + ?Sized>(surface: &mut S) {
    surface.clear();
}

// =============================================================
// Recording surface
// =============================================================

/// One line as drawn on a [`RecordingSurface`].
#[derive(Debug, Clone, PartialEq)]
pub struct DrawnLine {
    pub from: Point,
    pub to: Point,
    pub color: String,
    pub line_width: f64,
}

/// In-memory surface that records every line drawn since the last clear.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    lines: Vec<DrawnLine>,
    clears: usize,
}

impl RecordingSurface {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn lines(&self) -> &[DrawnLine] {
        &self.lines
    }

    /// How many times the surface was cleared.
    #[must_use]
    pub fn clears(&self) -> usize {
        self.clears
    }
}

impl Surface for RecordingSurface {
    fn stroke_line(&mut self, from: Point, to: Point, color: &str, line_width: f64) {
        self.lines.push(DrawnLine { from, to, color: color.to_owned(), line_width });
    }

    fn clear(&mut self) {
        self.lines.clear();
        self.clears += 1;
    }
}

// =============================================================
// Browser surface
// =============================================================

impl Surface for CanvasRenderingContext2d {
    fn stroke_line(&mut self, from: Point, to: Point, color: &str, line_width: f64) {
        self.begin_path();
        self.move_to(from.x, from.y);
        self.line_to(to.x, to.y);
        self.set_stroke_style_str(color);
        self.set_line_width(line_width);
        self.stroke();
        self.close_path();
    }

    fn clear(&mut self) {
        let Some(canvas) = self.canvas() else {
            return;
        };
        self.clear_rect(0.0, 0.0, f64::from(canvas.width()), f64::from(canvas.height()));
    }
}
