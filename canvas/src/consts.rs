//! Shared constants for the canvas crate.

// ── Input ───────────────────────────────────────────────────────

/// Minimum spacing between two accepted pointer-move events, in milliseconds.
pub const THROTTLE_INTERVAL_MS: f64 = 10.0;

// ── Rendering ───────────────────────────────────────────────────

/// Stroke width for every segment, in device pixels.
pub const LINE_WIDTH: f64 = 3.0;

/// Color in effect before the palette is touched.
pub const DEFAULT_COLOR: &str = "black";

/// Colors offered by the palette.
pub const PALETTE: [&str; 5] = ["black", "red", "green", "blue", "yellow"];
