//! Realtime stroke relay.
//!
//! Participants join a room over a websocket and every stroke segment one
//! member draws is forwarded to the other members of that room. The relay
//! keeps no history; late joiners start from a blank canvas.

pub mod config;
pub mod routes;
pub mod services;
pub mod state;

use tokio::net::TcpListener;

use crate::state::AppState;

/// Serve the relay on an already bound listener until the future is dropped.
///
/// # Errors
///
/// Returns the underlying I/O error if the accept loop fails.
pub async fn serve(listener: TcpListener, state: AppState) -> std::io::Result<()> {
    axum::serve(listener, routes::app(state)).await
}
