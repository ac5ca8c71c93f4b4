//! Conversion between device pixels and unit coordinates.
//!
//! A sender divides by its own canvas size and a receiver multiplies by its
//! own, so a stroke lands at the same relative position on every screen.
//! Zero-sized canvases never get a [`CanvasSize`]; callers skip the emit or
//! render instead of dividing by zero.

#[cfg(test)]
#[path = "normalize_test.rs"]
mod normalize_test;

use frames::StrokeSegment;

/// A point in either pixel or unit space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Clamp both axes into `[0, 1]`.
    #[must_use]
    pub fn clamp_unit(self) -> Self {
        Self { x: self.x.clamp(0.0, 1.0), y: self.y.clamp(0.0, 1.0) }
    }
}

/// A straight line between two pixel-space points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelSegment {
    pub from: Point,
    pub to: Point,
}

impl PixelSegment {
    #[must_use]
    pub fn new(from: Point, to: Point) -> Self {
        Self { from, to }
    }
}

/// `(px / width, py / height)`.
#[must_use]
pub fn normalize(px: f64, py: f64, canvas_width: f64, canvas_height: f64) -> (f64, f64) {
    (px / canvas_width, py / canvas_height)
}

/// `(ux * width, uy * height)`.
#[must_use]
pub fn denormalize(ux: f64, uy: f64, canvas_width: f64, canvas_height: f64) -> (f64, f64) {
    (ux * canvas_width, uy * canvas_height)
}

/// Current dimensions of a drawing surface. Both sides are finite and positive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasSize {
    width: f64,
    height: f64,
}

impl CanvasSize {
    /// Returns `None` for a zero, negative, or non-finite dimension.
    #[must_use]
    pub fn new(width: f64, height: f64) -> Option<Self> {
        let valid = |v: f64| v.is_finite() && v > 0.0;
        if valid(width) && valid(height) { Some(Self { width, height }) } else { None }
    }

    #[must_use]
    pub fn width(self) -> f64 {
        self.width
    }

    #[must_use]
    pub fn height(self) -> f64 {
        self.height
    }

    /// Pixel point to unit point. Points outside the canvas are clamped to
    /// its edge so peers never see an out-of-range coordinate.
    #[must_use]
    pub fn to_unit(self, pixel: Point) -> Point {
        let (x, y) = normalize(pixel.x, pixel.y, self.width, self.height);
        Point::new(x, y).clamp_unit()
    }

    /// Unit point to pixel point on this canvas.
    #[must_use]
    pub fn to_pixel(self, unit: Point) -> Point {
        let (x, y) = denormalize(unit.x, unit.y, self.width, self.height);
        Point::new(x, y)
    }

    /// Build the wire segment for a locally drawn line.
    #[must_use]
    pub fn normalize_segment(self, segment: &PixelSegment, color: &str, author: &str) -> StrokeSegment {
        let from = self.to_unit(segment.from);
        let to = self.to_unit(segment.to);
        StrokeSegment {
            x0: from.x,
            y0: from.y,
            x1: to.x,
            y1: to.y,
            color: color.to_owned(),
            name: author.to_owned(),
        }
    }

    /// Place a received wire segment on this canvas.
    #[must_use]
    pub fn denormalize_segment(self, segment: &StrokeSegment) -> PixelSegment {
        PixelSegment::new(
            self.to_pixel(Point::new(segment.x0, segment.y0)),
            self.to_pixel(Point::new(segment.x1, segment.y1)),
        )
    }
}

/// On-screen placement of the canvas element, as reported by
/// `getBoundingClientRect`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementBox {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl ElementBox {
    /// Map a client-space position (`MouseEvent.clientX`, `Touch.clientX`)
    /// onto the backing store. CSS scaling is undone when both the box and
    /// `size` are known; otherwise only the offset is removed.
    #[must_use]
    pub fn to_canvas(self, client: Point, size: Option<CanvasSize>) -> Point {
        let local = Point::new(client.x - self.left, client.y - self.top);
        match size {
            Some(size) if self.width > 0.0 && self.height > 0.0 => {
                Point::new(local.x * size.width() / self.width, local.y * size.height() / self.height)
            }
            _ => local,
        }
    }
}
