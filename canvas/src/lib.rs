//! Drawing engine for a shared, room-scoped sketch canvas.
//!
//! This crate owns everything a participant does locally: turning raw pointer
//! events into throttled line segments, converting between device pixels and
//! resolution-independent unit coordinates, drawing segments onto a surface,
//! and tracking the room session lifecycle. It performs no I/O; the host (the
//! browser shell or the `cli` participant) moves [`frames::StrokeSegment`]s
//! between the engine and the relay.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Testable [`engine::EngineCore`] plus the browser [`engine::Engine`] |
//! | [`normalize`] | Pixel ⇄ unit coordinate conversion |
//! | [`throttle`] | Drop-based rate limiter for pointer moves |
//! | [`input`] | Draw gesture state machine and active color |
//! | [`render`] | Surfaces and the stroke renderer |
//! | [`session`] | Participant gating and the room session state machine |
//! | [`consts`] | Shared constants (throttle interval, line width, palette) |

pub mod consts;
pub mod engine;
pub mod input;
pub mod normalize;
pub mod render;
pub mod session;
pub mod throttle;
