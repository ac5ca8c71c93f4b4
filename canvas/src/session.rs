//! Participant gating and the room session state machine.
//!
//! LIFECYCLE
//! =========
//! `Disconnected → Connecting → Joined`, with `Failed` reachable from
//! `Connecting` and `Joined`. The machine performs no I/O; the host opens the
//! transport when [`RoomSession::begin`] succeeds, sends the join request
//! returned by [`RoomSession::transport_open`], and reports the outcome back.
//! A failed session stays failed until it is closed; there is no retry.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use frames::JoinRequest;

/// Why the join form refused to activate a session.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum JoinFormError {
    #[error("display name is required")]
    EmptyName,
    #[error("room is required")]
    EmptyRoom,
}

/// Who is drawing, and where. Both fields are non-blank and trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    display_name: String,
    room_id: String,
}

impl Participant {
    /// Validate join form input.
    ///
    /// # Errors
    ///
    /// Returns [`JoinFormError`] when either value is blank after trimming.
    pub fn new(display_name: &str, room_id: &str) -> Result<Self, JoinFormError> {
        let display_name = display_name.trim();
        let room_id = room_id.trim();
        if display_name.is_empty() {
            return Err(JoinFormError::EmptyName);
        }
        if room_id.is_empty() {
            return Err(JoinFormError::EmptyRoom);
        }
        Ok(Self { display_name: display_name.to_owned(), room_id: room_id.to_owned() })
    }

    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    #[must_use]
    pub fn room_id(&self) -> &str {
        &self.room_id
    }

    #[must_use]
    pub fn join_request(&self) -> JoinRequest {
        JoinRequest::new(&self.display_name, &self.room_id)
    }
}

/// Why a session ended up in [`SessionState::Failed`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    /// The connection could not be established or dropped.
    Transport(String),
    /// The relay declined the join.
    JoinRejected(String),
}

impl Failure {
    /// Message shown to the participant.
    #[must_use]
    pub fn notice(&self) -> String {
        match self {
            Self::Transport(reason) => format!("Connection problem: {reason}"),
            Self::JoinRejected(reason) => format!("Could not join the room: {reason}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Disconnected,
    Connecting {
        /// Whether the join request has gone out on this connection.
        join_sent: bool,
    },
    Joined,
    Failed(Failure),
}

impl SessionState {
    fn name(&self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Connecting { .. } => "connecting",
            Self::Joined => "joined",
            Self::Failed(_) => "failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot {event} while {state}")]
pub struct TransitionError {
    pub state: &'static str,
    pub event: &'static str,
}

/// Room session for one participant.
#[derive(Debug, Clone)]
pub struct RoomSession {
    participant: Participant,
    state: SessionState,
}

impl RoomSession {
    #[must_use]
    pub fn new(participant: Participant) -> Self {
        Self { participant, state: SessionState::Disconnected }
    }

    #[must_use]
    pub fn participant(&self) -> &Participant {
        &self.participant
    }

    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    #[must_use]
    pub fn is_joined(&self) -> bool {
        self.state == SessionState::Joined
    }

    /// User-visible notice for a failed session.
    #[must_use]
    pub fn notice(&self) -> Option<String> {
        match &self.state {
            SessionState::Failed(failure) => Some(failure.notice()),
            _ => None,
        }
    }

    /// `Disconnected → Connecting`. The host opens the transport on success.
    ///
    /// # Errors
    ///
    /// Fails unless the session is disconnected.
    pub fn begin(&mut self) -> Result<(), TransitionError> {
        if self.state != SessionState::Disconnected {
            return Err(self.invalid("begin connecting"));
        }
        self.state = SessionState::Connecting { join_sent: false };
        Ok(())
    }

    /// The transport is up. Returns the one join request for this connection.
    ///
    /// # Errors
    ///
    /// Fails unless connecting with no join sent yet.
    pub fn transport_open(&mut self) -> Result<JoinRequest, TransitionError> {
        if self.state != (SessionState::Connecting { join_sent: false }) {
            return Err(self.invalid("send join"));
        }
        self.state = SessionState::Connecting { join_sent: true };
        Ok(self.participant.join_request())
    }

    /// The relay answered the join. `Err` carries the rejection message.
    ///
    /// # Errors
    ///
    /// Fails unless a join request is outstanding.
    pub fn join_acked(&mut self, outcome: Result<(), String>) -> Result<(), TransitionError> {
        if self.state != (SessionState::Connecting { join_sent: true }) {
            return Err(self.invalid("accept join ack"));
        }
        self.state = match outcome {
            Ok(()) => SessionState::Joined,
            Err(reason) => SessionState::Failed(Failure::JoinRejected(reason)),
        };
        Ok(())
    }

    /// Transport-level failure, before or after the join.
    ///
    /// # Errors
    ///
    /// Fails when the session is not connecting or joined.
    pub fn connect_error(&mut self, reason: impl Into<String>) -> Result<(), TransitionError> {
        match self.state {
            SessionState::Connecting { .. } | SessionState::Joined => {
                self.state = SessionState::Failed(Failure::Transport(reason.into()));
                Ok(())
            }
            _ => Err(self.invalid("report connect error")),
        }
    }

    /// Teardown. Always succeeds; no leave acknowledgment is involved.
    pub fn close(&mut self) {
        self.state = SessionState::Disconnected;
    }

    fn invalid(&self, event: &'static str) -> TransitionError {
        TransitionError { state: self.state.name(), event }
    }
}
