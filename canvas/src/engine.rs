use serde_json::Value;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use frames::StrokeSegment;

use crate::consts::LINE_WIDTH;
use crate::input::{ActiveColor, CapturedSegment, InputCapture};
use crate::normalize::{CanvasSize, ElementBox, Point};
use crate::render::{self, Surface};
use crate::throttle::Throttle;

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

/// Engine state that never touches the canvas element.
///
/// Outbound: pointer events become locally rendered segments and the
/// normalized [`StrokeSegment`] the host sends to the relay. Inbound: relayed
/// segments are validated, denormalized against this canvas, and rendered.
pub struct EngineCore<S: Surface> {
    surface: S,
    input: InputCapture,
    size: Option<CanvasSize>,
    author: String,
}

impl<S: Surface> EngineCore<S> {
    /// `author` is the display name stamped on outgoing segments.
    #[must_use]
    pub fn new(surface: S, author: impl Into<String>, color: ActiveColor) -> Self {
        Self {
            surface,
            input: InputCapture::new(color, Throttle::default()),
            size: None,
            author: author.into(),
        }
    }

    #[must_use]
    pub fn surface(&self) -> &S {
        &self.surface
    }

    #[must_use]
    pub fn input(&self) -> &InputCapture {
        &self.input
    }

    #[must_use]
    pub fn canvas_size(&self) -> Option<CanvasSize> {
        self.size
    }

    /// Handle shared with the palette.
    #[must_use]
    pub fn active_color(&self) -> &ActiveColor {
        self.input.active_color()
    }

    /// Record the current canvas dimensions. Zero-sized canvases disable both
    /// emission and replay until the next resize.
    pub fn set_viewport(&mut self, width: f64, height: f64) {
        self.size = CanvasSize::new(width, height);
    }

    // --- Local input ---

    pub fn on_pointer_down(&mut self, at: Point) {
        self.input.pointer_down(at);
    }

    /// Throttled move. Returns the segment to send, if one was drawn.
    pub fn on_pointer_move(&mut self, at: Point, now_ms: f64) -> Option<StrokeSegment> {
        let captured = self.input.pointer_move(at, now_ms)?;
        self.draw_local(&captured)
    }

    /// Release. Returns the closing segment to send.
    pub fn on_pointer_up(&mut self, at: Point) -> Option<StrokeSegment> {
        let captured = self.input.pointer_up(at)?;
        self.draw_local(&captured)
    }

    pub fn on_pointer_leave(&mut self, at: Point) -> Option<StrokeSegment> {
        let captured = self.input.pointer_leave(at)?;
        self.draw_local(&captured)
    }

    fn draw_local(&mut self, captured: &CapturedSegment) -> Option<StrokeSegment> {
        let size = self.size?;
        render::render(&mut self.surface, &captured.segment, &captured.color, LINE_WIDTH);
        Some(size.normalize_segment(&captured.segment, &captured.color, &self.author))
    }

    // --- Remote input ---

    /// Replay a peer's segment. Returns whether anything was drawn; invalid
    /// segments and a zero-sized canvas draw nothing.
    pub fn apply_remote(&mut self, segment: &StrokeSegment) -> bool {
        if segment.validate().is_err() {
            return false;
        }
        let Some(size) = self.size else {
            return false;
        };
        let pixels = size.denormalize_segment(segment);
        render::render(&mut self.surface, &pixels, &segment.color, LINE_WIDTH);
        true
    }

    /// Replay a raw `drawing` payload; malformed payloads are discarded.
    pub fn apply_remote_data(&mut self, data: &Value) -> bool {
        match StrokeSegment::from_data(data) {
            Ok(segment) => self.apply_remote(&segment),
            Err(_) => false,
        }
    }

    /// Replay a `drawing` payload given as JSON text; unparsable text is
    /// discarded.
    pub fn apply_remote_json(&mut self, raw: &str) -> bool {
        match serde_json::from_str::<Value>(raw) {
            Ok(data) => self.apply_remote_data(&data),
            Err(_) => false,
        }
    }

    /// Wipe the local canvas. Peers are unaffected.
    pub fn clear(&mut self) {
        render::clear(&mut self.surface);
    }
}

/// The browser engine. Wraps `EngineCore` and owns the canvas element.
///
/// The page wires DOM events straight through: `mousedown`/`touchstart` to
/// [`Engine::pointer_down`], `mousemove`/`touchmove` to
/// [`Engine::pointer_move`] with `event.timeStamp`, `mouseup`/`touchend` to
/// [`Engine::pointer_up`], and `mouseout`/`touchcancel` to
/// [`Engine::pointer_leave`]. Positions are client coordinates; touch events
/// pass the first changed touch. Every non-`undefined` return value is the
/// JSON `data` of a `drawing` frame to send. Palette clicks go to
/// [`Engine::set_color`], the clear button to [`Engine::clear`], window
/// `resize` to [`Engine::set_size`], and relayed `drawing` data to
/// [`Engine::apply_remote`].
#[wasm_bindgen]
pub struct Engine {
    canvas: HtmlCanvasElement,
    core: EngineCore<CanvasRenderingContext2d>,
}

#[wasm_bindgen]
impl Engine {
    /// Bind to a canvas element and size the engine to it.
    ///
    /// # Errors
    ///
    /// Returns `Err` when the element has no 2D context.
    #[wasm_bindgen(constructor)]
    pub fn new(canvas: HtmlCanvasElement, author: &str) -> Result<Engine, JsValue> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(JsValue::from)?;
        let mut engine = Self { canvas, core: EngineCore::new(ctx, author, ActiveColor::default()) };
        engine.resize();
        Ok(engine)
    }

    /// Re-read the element's pixel dimensions.
    pub fn resize(&mut self) {
        let width = f64::from(self.canvas.width());
        let height = f64::from(self.canvas.height());
        self.core.set_viewport(width, height);
    }

    /// Resize the backing store to `width` × `height` and refresh the engine.
    /// Resizing wipes the element, as the browser does.
    pub fn set_size(&mut self, width: u32, height: u32) {
        self.canvas.set_width(width);
        self.canvas.set_height(height);
        self.resize();
    }

    /// Palette click. Returns `false` for colors outside the palette.
    pub fn set_color(&self, color: &str) -> bool {
        self.core.active_color().set(color)
    }

    #[must_use]
    pub fn color(&self) -> String {
        self.core.active_color().get()
    }

    pub fn clear(&mut self) {
        self.core.clear();
    }

    pub fn pointer_down(&mut self, client_x: f64, client_y: f64) {
        let at = self.canvas_point(client_x, client_y);
        self.core.on_pointer_down(at);
    }

    pub fn pointer_move(&mut self, client_x: f64, client_y: f64, time_stamp: f64) -> Option<String> {
        let at = self.canvas_point(client_x, client_y);
        self.core.on_pointer_move(at, time_stamp).map(|segment| segment.to_data().to_string())
    }

    pub fn pointer_up(&mut self, client_x: f64, client_y: f64) -> Option<String> {
        let at = self.canvas_point(client_x, client_y);
        self.core.on_pointer_up(at).map(|segment| segment.to_data().to_string())
    }

    pub fn pointer_leave(&mut self, client_x: f64, client_y: f64) -> Option<String> {
        let at = self.canvas_point(client_x, client_y);
        self.core.on_pointer_leave(at).map(|segment| segment.to_data().to_string())
    }

    /// Replay a relayed `drawing` payload given as JSON text.
    pub fn apply_remote(&mut self, data: &str) -> bool {
        self.core.apply_remote_json(data)
    }

    fn canvas_point(&self, client_x: f64, client_y: f64) -> Point {
        let rect = self.canvas.get_bounding_client_rect();
        let bounds = ElementBox { left: rect.left(), top: rect.top(), width: rect.width(), height: rect.height() };
        bounds.to_canvas(Point::new(client_x, client_y), self.core.canvas_size())
    }
}
