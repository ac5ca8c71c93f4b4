//! Input model: the draw gesture state machine and the active color.
//!
//! `GestureState` is the pencil gesture tracked between pointer-down and
//! pointer-up. `InputCapture` feeds it raw pointer positions (in pixels) and
//! hands back one [`CapturedSegment`] per accepted move plus a final segment
//! on release. Every segment starts where the previous one ended.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use std::sync::{Arc, PoisonError, RwLock};

use crate::consts::{DEFAULT_COLOR, PALETTE};
use crate::normalize::{PixelSegment, Point};
use crate::throttle::Throttle;

/// The color the palette has currently selected.
///
/// Cloning shares the same slot, so the palette keeps one handle and the
/// capture reads the latest value each time it builds a segment.
#[derive(Debug, Clone)]
pub struct ActiveColor(Arc<RwLock<String>>);

impl ActiveColor {
    #[must_use]
    pub fn new(color: impl Into<String>) -> Self {
        Self(Arc::new(RwLock::new(color.into())))
    }

    /// Select a palette color. Returns whether it was accepted; anything
    /// outside [`PALETTE`] leaves the selection unchanged.
    pub fn set(&self, color: &str) -> bool {
        let Some(color) = palette_color(color) else {
            return false;
        };
        *self.0.write().unwrap_or_else(PoisonError::into_inner) = color.to_owned();
        true
    }

    #[must_use]
    pub fn get(&self) -> String {
        self.0.read().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

/// The palette entry matching `color`, ignoring surrounding whitespace and
/// ASCII case.
#[must_use]
pub fn palette_color(color: &str) -> Option<&'static str> {
    let color = color.trim();
    PALETTE.iter().copied().find(|entry| entry.eq_ignore_ascii_case(color))
}

impl Default for ActiveColor {
    fn default() -> Self {
        Self::new(DEFAULT_COLOR)
    }
}

/// Pencil gesture state.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum GestureState {
    /// No gesture in progress; waiting for the next pointer-down.
    #[default]
    Idle,
    /// The pointer is down.
    Drawing {
        /// End point of the last emitted segment, or the press point.
        last: Point,
    },
}

/// A locally drawn segment in pixels, with the color read at capture time.
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedSegment {
    pub segment: PixelSegment,
    pub color: String,
}

/// Turns pointer events into a throttled, continuous run of segments.
#[derive(Debug, Clone, Default)]
pub struct InputCapture {
    state: GestureState,
    throttle: Throttle,
    color: ActiveColor,
}

impl InputCapture {
    #[must_use]
    pub fn new(color: ActiveColor, throttle: Throttle) -> Self {
        Self { state: GestureState::Idle, throttle, color }
    }

    #[must_use]
    pub fn state(&self) -> GestureState {
        self.state
    }

    #[must_use]
    pub fn is_drawing(&self) -> bool {
        matches!(self.state, GestureState::Drawing { .. })
    }

    /// Handle shared with the palette.
    #[must_use]
    pub fn active_color(&self) -> &ActiveColor {
        &self.color
    }

    /// Pointer pressed: remember the start point. No segment yet.
    pub fn pointer_down(&mut self, at: Point) {
        self.state = GestureState::Drawing { last: at };
    }

    /// Pointer moved. Emits a segment only while drawing and only when the
    /// throttle accepts `now_ms`; a dropped move leaves `last` untouched.
    pub fn pointer_move(&mut self, at: Point, now_ms: f64) -> Option<CapturedSegment> {
        let GestureState::Drawing { last } = self.state else {
            return None;
        };
        if !self.throttle.accept_at(now_ms) {
            return None;
        }
        self.state = GestureState::Drawing { last: at };
        Some(self.capture(last, at))
    }

    /// Pointer released. Emits the closing segment to the release point.
    /// Never throttled.
    pub fn pointer_up(&mut self, at: Point) -> Option<CapturedSegment> {
        let GestureState::Drawing { last } = self.state else {
            return None;
        };
        self.state = GestureState::Idle;
        Some(self.capture(last, at))
    }

    /// Pointer left the drawing surface. Ends the gesture like a release.
    pub fn pointer_leave(&mut self, at: Point) -> Option<CapturedSegment> {
        self.pointer_up(at)
    }

    fn capture(&self, from: Point, to: Point) -> CapturedSegment {
        CapturedSegment { segment: PixelSegment::new(from, to), color: self.color.get() }
    }
}
