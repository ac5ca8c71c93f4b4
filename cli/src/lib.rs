//! Command-line participant for the sketch relay.
//!
//! [`session`] drives a room session over a websocket; the `sketch` binary
//! builds its subcommands on top of it.

pub mod session;
