//! Room service — join validation, membership, and fan-out.
//!
//! DESIGN
//! ======
//! Rooms are created on first join and evicted when their last member
//! leaves. Membership changes take the write lock; fan-out takes the read
//! lock and pushes into each member's bounded queue with `try_send`, so a
//! slow peer drops frames instead of stalling the sender. Frames from one
//! sender reach each peer in the order they were broadcast.

use frames::{ErrorCode, Frame, JoinRequest, PayloadError};
use serde_json::Value;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::RelayConfig;
use crate::state::{AppState, Member, RoomState};

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    #[error("display name must be 1 to {max} characters")]
    InvalidName { max: usize },
    #[error("room must be 1 to {max} characters")]
    InvalidRoom { max: usize },
    #[error("must join a room first")]
    NotJoined,
    #[error("malformed payload: {0}")]
    Malformed(#[from] PayloadError),
}

impl ErrorCode for RoomError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidName { .. } => "E_INVALID_NAME",
            Self::InvalidRoom { .. } => "E_INVALID_ROOM",
            Self::NotJoined => "E_NOT_JOINED",
            Self::Malformed(_) => "E_MALFORMED",
        }
    }
}

// =============================================================================
// VALIDATION
// =============================================================================

/// Parse and normalize a join payload. Name and room are trimmed and must be
/// non-empty and within the configured limits.
///
/// # Errors
///
/// Returns [`RoomError::InvalidName`] or [`RoomError::InvalidRoom`] for blank
/// or oversized values and [`RoomError::Malformed`] for missing fields.
pub fn validate_join(config: &RelayConfig, data: &Value) -> Result<JoinRequest, RoomError> {
    let req = JoinRequest::from_data(data).map_err(|e| match e {
        PayloadError::Empty("name") => RoomError::InvalidName { max: config.max_name_len },
        PayloadError::Empty(_) => RoomError::InvalidRoom { max: config.max_room_len },
        other => RoomError::Malformed(other),
    })?;

    let name = req.name.trim();
    let room = req.room.trim();
    if name.chars().count() > config.max_name_len {
        return Err(RoomError::InvalidName { max: config.max_name_len });
    }
    if room.chars().count() > config.max_room_len {
        return Err(RoomError::InvalidRoom { max: config.max_room_len });
    }
    Ok(JoinRequest::new(name, room))
}

// =============================================================================
// MEMBERSHIP
// =============================================================================

/// Register a connection in a room, creating the room if needed. Returns the
/// member count after the join.
pub async fn join_room(state: &AppState, room: &str, client_id: Uuid, name: &str, tx: mpsc::Sender<Frame>) -> usize {
    let mut rooms = state.rooms.write().await;
    let room_state = rooms.entry(room.to_owned()).or_insert_with(RoomState::new);
    room_state
        .members
        .insert(client_id, Member { name: name.to_owned(), tx });
    let members = room_state.members.len();
    info!(%room, %client_id, %name, members, "client joined room");
    members
}

/// Remove a connection from a room. The room is evicted once empty. Returns
/// the departed member's display name, `None` if it was not a member.
pub async fn part_room(state: &AppState, room: &str, client_id: Uuid) -> Option<String> {
    let mut rooms = state.rooms.write().await;
    let room_state = rooms.get_mut(room)?;

    let member = room_state.members.remove(&client_id)?;
    info!(%room, %client_id, name = %member.name, remaining = room_state.members.len(), "client left room");

    if room_state.members.is_empty() {
        rooms.remove(room);
        info!(%room, "evicted empty room");
    }
    Some(member.name)
}

/// Current member count, zero for unknown rooms.
pub async fn member_count(state: &AppState, room: &str) -> usize {
    let rooms = state.rooms.read().await;
    rooms.get(room).map_or(0, |r| r.members.len())
}

// =============================================================================
// BROADCAST
// =============================================================================

/// Queue `frame` for every member of `room` except `exclude`. Returns how
/// many members accepted it.
pub async fn broadcast(state: &AppState, room: &str, frame: &Frame, exclude: Option<Uuid>) -> usize {
    let rooms = state.rooms.read().await;
    let Some(room_state) = rooms.get(room) else {
        return 0;
    };

    let mut delivered = 0;
    for (client_id, member) in &room_state.members {
        if exclude == Some(*client_id) {
            continue;
        }
        match member.tx.try_send(frame.clone()) {
            Ok(()) => delivered += 1,
            Err(TrySendError::Full(_)) => {
                warn!(
                    %room, %client_id, name = %member.name, syscall = %frame.syscall,
                    "client queue full, frame dropped"
                );
            }
            Err(TrySendError::Closed(_)) => {
                debug!(%room, %client_id, name = %member.name, "client queue closed");
            }
        }
    }
    delivered
}

#[cfg(test)]
#[path = "room_test.rs"]
mod tests;
