//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor.
//! It holds the relay configuration and the live room map. Rooms exist only
//! while they have members; nothing is persisted and no stroke history is
//! kept.

use std::collections::HashMap;
use std::sync::Arc;

use frames::Frame;
use tokio::sync::{RwLock, mpsc};
use uuid::Uuid;

use crate::config::RelayConfig;

// =============================================================================
// ROOM STATE
// =============================================================================

/// One connection registered in a room.
pub struct Member {
    /// Display name from the join request.
    pub name: String,
    /// Sender for the connection's outbound frame queue.
    pub tx: mpsc::Sender<Frame>,
}

/// Per-room live state.
pub struct RoomState {
    /// Connected members keyed by `client_id`.
    pub members: HashMap<Uuid, Member>,
}

impl RoomState {
    #[must_use]
    pub fn new() -> Self {
        Self { members: HashMap::new() }
    }
}

impl Default for RoomState {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// APP STATE
// =============================================================================

/// Clone is required by Axum; all inner fields are Arc-wrapped.
#[derive(Clone)]
pub struct AppState {
    pub rooms: Arc<RwLock<HashMap<String, RoomState>>>,
    pub config: Arc<RelayConfig>,
}

impl AppState {
    #[must_use]
    pub fn new(config: RelayConfig) -> Self {
        Self { rooms: Arc::new(RwLock::new(HashMap::new())), config: Arc::new(config) }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================
