//! Browser tests — the 2D context surface and the exported `Engine`.
//!
//! Run with `wasm-pack test --headless --chrome canvas`.

#![cfg(target_arch = "wasm32")]

use canvas::engine::Engine;
use canvas::normalize::{PixelSegment, Point};
use canvas::render;
use serde_json::Value;
use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

wasm_bindgen_test_configure!(run_in_browser);

// =============================================================
// Helpers
// =============================================================

fn mounted_canvas(width: u32, height: u32) -> HtmlCanvasElement {
    let document = web_sys::window().unwrap().document().unwrap();
    let canvas = document
        .create_element("canvas")
        .unwrap()
        .dyn_into::<HtmlCanvasElement>()
        .unwrap();
    canvas.set_width(width);
    canvas.set_height(height);
    document.body().unwrap().append_child(&canvas).unwrap();
    canvas
}

fn context(canvas: &HtmlCanvasElement) -> CanvasRenderingContext2d {
    canvas.get_context("2d").unwrap().unwrap().dyn_into().unwrap()
}

fn alpha_at(canvas: &HtmlCanvasElement, x: f64, y: f64) -> u8 {
    context(canvas).get_image_data(x, y, 1.0, 1.0).unwrap().data().0[3]
}

/// Client coordinates of a backing-store pixel.
fn client(canvas: &HtmlCanvasElement, x: f64, y: f64) -> (f64, f64) {
    let rect = canvas.get_bounding_client_rect();
    (rect.left() + x, rect.top() + y)
}

// =============================================================
// Context surface
// =============================================================

#[wasm_bindgen_test]
fn context_surface_strokes_and_clears() {
    let canvas = mounted_canvas(100, 100);
    let mut ctx = context(&canvas);

    let segment = PixelSegment::new(Point::new(10.0, 50.0), Point::new(90.0, 50.0));
    render::render(&mut ctx, &segment, "red", 3.0);
    assert!(alpha_at(&canvas, 50.0, 50.0) > 0);
    assert_eq!(alpha_at(&canvas, 50.0, 10.0), 0);

    render::clear(&mut ctx);
    assert_eq!(alpha_at(&canvas, 50.0, 50.0), 0);
}

// =============================================================
// Engine
// =============================================================

#[wasm_bindgen_test]
fn drag_draws_locally_and_returns_normalized_data() {
    let canvas = mounted_canvas(200, 100);
    let mut engine = Engine::new(canvas.clone(), "Alice").unwrap();

    let (x, y) = client(&canvas, 20.0, 50.0);
    engine.pointer_down(x, y);
    let (x, y) = client(&canvas, 180.0, 50.0);
    let raw = engine.pointer_up(x, y).expect("closing segment");

    let data: Value = serde_json::from_str(&raw).unwrap();
    assert!((data["x0"].as_f64().unwrap() - 0.1).abs() < 1e-6);
    assert!((data["x1"].as_f64().unwrap() - 0.9).abs() < 1e-6);
    assert!((data["y0"].as_f64().unwrap() - 0.5).abs() < 1e-6);
    assert_eq!(data["name"], "Alice");
    assert_eq!(data["color"], "black");
    assert!(alpha_at(&canvas, 100.0, 50.0) > 0);
}

#[wasm_bindgen_test]
fn moves_are_throttled_by_event_time() {
    let canvas = mounted_canvas(200, 100);
    let mut engine = Engine::new(canvas.clone(), "Alice").unwrap();

    let (x, y) = client(&canvas, 10.0, 10.0);
    engine.pointer_down(x, y);
    let (x, y) = client(&canvas, 20.0, 20.0);
    assert!(engine.pointer_move(x, y, 1000.0).is_some());
    let (x, y) = client(&canvas, 30.0, 30.0);
    assert!(engine.pointer_move(x, y, 1005.0).is_none());
    let (x, y) = client(&canvas, 40.0, 40.0);
    assert!(engine.pointer_leave(x, y).is_some());
    assert!(engine.pointer_move(x, y, 2000.0).is_none());
}

#[wasm_bindgen_test]
fn palette_accepts_only_known_colors() {
    let canvas = mounted_canvas(50, 50);
    let engine = Engine::new(canvas, "Alice").unwrap();

    assert!(!engine.set_color("purple"));
    assert_eq!(engine.color(), "black");
    assert!(engine.set_color("red"));
    assert_eq!(engine.color(), "red");
}

#[wasm_bindgen_test]
fn remote_data_lands_relative_to_own_size_and_clear_wipes_it() {
    let canvas = mounted_canvas(10, 10);
    let mut engine = Engine::new(canvas.clone(), "Bob").unwrap();
    engine.set_size(400, 200);

    let raw = r#"{"x0":0.25,"y0":0.5,"x1":0.75,"y1":0.5,"color":"blue","name":"Alice"}"#;
    assert!(engine.apply_remote(raw));
    assert!(!engine.apply_remote("garbage"));
    assert!(alpha_at(&canvas, 200.0, 100.0) > 0);

    engine.clear();
    assert_eq!(alpha_at(&canvas, 200.0, 100.0), 0);
}

#[wasm_bindgen_test]
fn zero_sized_canvas_skips_replay() {
    let canvas = mounted_canvas(100, 100);
    let mut engine = Engine::new(canvas, "Bob").unwrap();
    engine.set_size(0, 0);

    let raw = r#"{"x0":0.1,"y0":0.1,"x1":0.2,"y1":0.2,"color":"red","name":"Alice"}"#;
    assert!(!engine.apply_remote(raw));
}
