//! WebSocket handler — stroke relay.
//!
//! DESIGN
//! ======
//! On upgrade, generates a client ID and enters a `select!` loop:
//! - Incoming client frames → decode + dispatch by syscall
//! - Relayed frames from room peers → forward to client
//!
//! Handler functions validate, mutate membership, and return an `Outcome`.
//! The dispatch layer owns all outbound concerns: reply to sender and
//! fan-out to peers.
//!
//! LIFECYCLE
//! =========
//! 1. Upgrade → send `session:connected` with `client_id`
//! 2. `join` → register in the room → `done` (or `error` with a code)
//! 3. `drawing` → relayed verbatim to every other member of the room
//! 4. Close → leave the room (no notification to peers)
//!
//! A `connect_error` is a connection-level failure: the relay sends it, closes
//! the socket, and drops the membership. Request-level failures (a rejected
//! join) stay on the connection as `error` replies.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::Response;
use frames::{
    CodecError, ConnectError, ErrorCode, Frame, SYSCALL_CONNECT_ERROR, SYSCALL_CONNECTED, SYSCALL_DRAWING, SYSCALL_JOIN,
    StrokeSegment,
};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::mpsc;
use tracing::{debug, info, trace, warn};
use uuid::Uuid;

use crate::services::room::{self, RoomError};
use crate::state::AppState;

// =============================================================================
// OUTCOME
// =============================================================================

/// Result returned by handler functions. The dispatch layer uses this to
/// decide who receives what; handlers never send frames directly.
enum Outcome {
    /// Send empty done to sender only.
    Done,
    /// Forward to all room peers EXCLUDING sender. No reply to sender.
    RelayExcludeSender { room: String, frame: Frame },
}

// =============================================================================
// CONNECTION
// =============================================================================

/// Encoding used for frames sent to a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireFormat {
    /// Protobuf binary messages.
    #[default]
    Binary,
    /// JSON text messages, for browser clients without a protobuf codec.
    Json,
}

#[derive(Debug, Default, Deserialize)]
pub struct WsParams {
    #[serde(default)]
    format: WireFormat,
}

/// Room membership of one connection.
struct Membership {
    room: String,
    name: String,
}

/// Per-connection state owned by the socket task.
struct Connection {
    client_id: Uuid,
    /// Sender half of this connection's own outbound queue, handed to the
    /// room on join.
    tx: mpsc::Sender<Frame>,
    joined: Option<Membership>,
}

impl Connection {
    fn new(client_id: Uuid, tx: mpsc::Sender<Frame>) -> Self {
        Self { client_id, tx, joined: None }
    }
}

// =============================================================================
// UPGRADE
// =============================================================================

pub async fn handle_ws(State(state): State<AppState>, Query(params): Query<WsParams>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| run_ws(socket, state, params.format))
}

async fn run_ws(mut socket: WebSocket, state: AppState, format: WireFormat) {
    let client_id = Uuid::new_v4();

    // Per-connection queue for frames relayed from room peers.
    let (client_tx, mut client_rx) = mpsc::channel::<Frame>(state.config.client_queue);

    let welcome = Frame::request(SYSCALL_CONNECTED, json!({ "client_id": client_id.to_string() }));
    if send_frame(&mut socket, &welcome, format).await.is_err() {
        return;
    }

    info!(%client_id, ?format, "ws: client connected");

    let mut conn = Connection::new(client_id, client_tx);

    loop {
        tokio::select! {
            msg = socket.recv() => {
                let Some(Ok(msg)) = msg else { break };
                let decoded = match msg {
                    Message::Binary(bytes) => frames::decode_frame(&bytes),
                    Message::Text(text) => frames::decode_json(text.as_str()),
                    Message::Close(_) => break,
                    _ => continue,
                };
                let replies = process_inbound(&state, &mut conn, decoded).await;
                if send_all(&mut socket, &replies, format).await.is_err() {
                    break;
                }
                if replies.iter().any(is_connect_error) {
                    if let Err(e) = socket.send(Message::Close(None)).await {
                        debug!(%client_id, error = %e, "ws: close after connect_error failed");
                    }
                    break;
                }
            }
            Some(frame) = client_rx.recv() => {
                if send_frame(&mut socket, &frame, format).await.is_err() {
                    break;
                }
            }
        }
    }

    if let Some(membership) = conn.joined.take() {
        room::part_room(&state, &membership.room, client_id).await;
    }
    info!(%client_id, "ws: client disconnected");
}

// =============================================================================
// FRAME DISPATCH
// =============================================================================

/// Process one decoded inbound message and return frames for the sender.
///
/// Kept apart from the socket so tests can drive dispatch with plain
/// channels.
async fn process_inbound(state: &AppState, conn: &mut Connection, decoded: Result<Frame, CodecError>) -> Vec<Frame> {
    let req = match decoded {
        Ok(frame) => frame,
        Err(e) => {
            warn!(client_id = %conn.client_id, error = %e, "ws: invalid inbound frame");
            return vec![connect_error(format!("invalid frame: {e}"))];
        }
    };

    let result = match req.syscall.as_str() {
        SYSCALL_JOIN => {
            info!(client_id = %conn.client_id, id = %req.id, "ws: recv join");
            handle_join(state, conn, &req).await
        }
        SYSCALL_DRAWING => {
            trace!(client_id = %conn.client_id, id = %req.id, "ws: recv drawing");
            // Strokes never get a reply; failures are only logged.
            match handle_drawing(conn, &req) {
                Ok(outcome) => Ok(outcome),
                Err(RoomError::NotJoined) => {
                    warn!(client_id = %conn.client_id, "ws: drawing before join dropped");
                    return vec![];
                }
                Err(e) => {
                    debug!(client_id = %conn.client_id, error = %e, "ws: malformed drawing dropped");
                    return vec![];
                }
            }
        }
        other => {
            warn!(client_id = %conn.client_id, syscall = other, "ws: unknown syscall");
            return vec![connect_error(format!("unknown syscall: {other}"))];
        }
    };

    match result {
        Ok(Outcome::Done) => vec![req.done()],
        Ok(Outcome::RelayExcludeSender { room, frame }) => {
            let delivered = room::broadcast(state, &room, &frame, Some(conn.client_id)).await;
            trace!(client_id = %conn.client_id, %room, delivered, "ws: relayed drawing");
            vec![]
        }
        Err(e) => {
            warn!(client_id = %conn.client_id, code = e.error_code(), error = %e, "ws: request failed");
            vec![req.error_from(&e)]
        }
    }
}

// =============================================================================
// HANDLERS
// =============================================================================

async fn handle_join(state: &AppState, conn: &mut Connection, req: &Frame) -> Result<Outcome, RoomError> {
    let join = room::validate_join(&state.config, &req.data)?;

    // Leave the current room first; a connection is in at most one room.
    if let Some(previous) = conn.joined.take() {
        room::part_room(state, &previous.room, conn.client_id).await;
    }

    let members = room::join_room(state, &join.room, conn.client_id, &join.name, conn.tx.clone()).await;
    info!(client_id = %conn.client_id, room = %join.room, name = %join.name, members, "ws: client joined");
    conn.joined = Some(Membership { room: join.room, name: join.name });
    Ok(Outcome::Done)
}

fn handle_drawing(conn: &Connection, req: &Frame) -> Result<Outcome, RoomError> {
    let Some(membership) = &conn.joined else {
        return Err(RoomError::NotJoined);
    };
    StrokeSegment::from_data(&req.data)?;

    let frame = Frame::request(SYSCALL_DRAWING, req.data.clone())
        .with_room(membership.room.as_str())
        .with_from(membership.name.as_str());
    Ok(Outcome::RelayExcludeSender { room: membership.room.clone(), frame })
}

// =============================================================================
// HELPERS
// =============================================================================

fn connect_error(reason: impl Into<String>) -> Frame {
    Frame::request(SYSCALL_CONNECT_ERROR, ConnectError::new(reason).to_data())
}

/// Frames after which the relay hangs up.
fn is_connect_error(frame: &Frame) -> bool {
    frame.syscall == SYSCALL_CONNECT_ERROR
}

async fn send_all(socket: &mut WebSocket, frames: &[Frame], format: WireFormat) -> Result<(), ()> {
    for frame in frames {
        send_frame(socket, frame, format).await?;
    }
    Ok(())
}

async fn send_frame(socket: &mut WebSocket, frame: &Frame, format: WireFormat) -> Result<(), ()> {
    let msg = match format {
        WireFormat::Binary => Message::Binary(frames::encode_frame(frame).into()),
        WireFormat::Json => match serde_json::to_string(frame) {
            Ok(json) => Message::Text(json.into()),
            Err(e) => {
                warn!(error = %e, "ws: failed to serialize frame");
                return Err(());
            }
        },
    };

    if frame.syscall == SYSCALL_DRAWING {
        trace!(id = %frame.id, "ws: send drawing");
    } else if frame.status == frames::Status::Error {
        let code = frame.code().unwrap_or("-");
        let message = frame.message().unwrap_or("-");
        warn!(id = %frame.id, syscall = %frame.syscall, code, message, "ws: send frame status=Error");
    } else {
        info!(id = %frame.id, syscall = %frame.syscall, status = ?frame.status, "ws: send frame");
    }

    socket.send(msg).await.map_err(|_| ())
}

#[cfg(test)]
#[path = "ws_test.rs"]
mod tests;
