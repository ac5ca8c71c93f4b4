//! Domain services used by the websocket route.
//!
//! ARCHITECTURE
//! ============
//! Service modules own room membership and fan-out so the route handler can
//! stay focused on protocol translation.

pub mod room;
