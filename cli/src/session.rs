//! Network driver for a room session.
//!
//! DESIGN
//! ======
//! [`RoomSession`] wraps the pure state machine from `canvas::session` and
//! performs the I/O it asks for: open the websocket, send the one join
//! request, wait for the acknowledgment, then split the socket into a writer
//! task (fed by an unbounded channel, so sends never block the caller) and a
//! reader task that turns relayed frames into [`SessionEvent`]s.
//!
//! [`SessionHost`] gives mount semantics on top: mounting the same
//! participant again reuses the live connection, mounting a different one
//! closes the old connection first. Blank names or rooms never reach the
//! network.

use std::time::Duration;

use canvas::session::{JoinFormError, Participant, RoomSession as SessionMachine, SessionState, TransitionError};
use frames::{
    ConnectError, Frame, SYSCALL_CONNECT_ERROR, SYSCALL_CONNECTED, SYSCALL_DRAWING, SYSCALL_JOIN, Status,
    StrokeSegment,
};
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, info, warn};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

pub const DEFAULT_JOIN_TIMEOUT: Duration = Duration::from_secs(5);

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Form(#[from] JoinFormError),
    #[error("invalid server URL: {0}")]
    InvalidUrl(String),
    #[error("connection problem: {0}")]
    Transport(String),
    #[error("could not join the room: {0}")]
    JoinRejected(String),
    #[error("timed out waiting for join acknowledgment")]
    JoinTimeout,
    #[error(transparent)]
    Transition(#[from] TransitionError),
}

/// Something that happened on a joined session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// A peer's segment, relayed by the server.
    Drawing { from: Option<String>, segment: StrokeSegment },
    /// The server reported a transport-level failure.
    ConnectError(String),
    /// The connection closed.
    Closed,
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Websocket endpoint, e.g. `ws://127.0.0.1:3000/api/ws`.
    pub url: String,
    pub join_timeout: Duration,
}

impl SessionConfig {
    /// Derive the websocket endpoint from an `http(s)://` base URL.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidUrl`] for any other scheme.
    pub fn from_base_url(base_url: &str) -> Result<Self, SessionError> {
        Ok(Self { url: ws_url(base_url)?, join_timeout: DEFAULT_JOIN_TIMEOUT })
    }

    #[must_use]
    pub fn with_join_timeout(mut self, join_timeout: Duration) -> Self {
        self.join_timeout = join_timeout;
        self
    }
}

fn ws_url(base_url: &str) -> Result<String, SessionError> {
    let base_url = base_url.trim_end_matches('/');
    if let Some(rest) = base_url.strip_prefix("http://") {
        return Ok(format!("ws://{rest}/api/ws"));
    }
    if let Some(rest) = base_url.strip_prefix("https://") {
        return Ok(format!("wss://{rest}/api/ws"));
    }
    Err(SessionError::InvalidUrl(base_url.to_owned()))
}

// =============================================================================
// ROOM SESSION
// =============================================================================

/// One participant's live connection to a room.
pub struct RoomSession {
    machine: SessionMachine,
    client_id: Option<String>,
    outbound: Option<mpsc::UnboundedSender<Frame>>,
    events: mpsc::UnboundedReceiver<SessionEvent>,
    reader: JoinHandle<()>,
    writer: Option<JoinHandle<()>>,
}

impl RoomSession {
    /// Connect, join, and wait for the acknowledgment.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Transport`] when the connection fails,
    /// [`SessionError::JoinRejected`] when the relay declines the join, and
    /// [`SessionError::JoinTimeout`] when no answer arrives in time.
    pub async fn connect(config: &SessionConfig, participant: Participant) -> Result<Self, SessionError> {
        let mut machine = SessionMachine::new(participant);
        machine.begin()?;

        let mut stream = match connect_async(config.url.as_str()).await {
            Ok((stream, _)) => stream,
            Err(e) => {
                machine.connect_error(e.to_string())?;
                return Err(SessionError::Transport(e.to_string()));
            }
        };

        let handshake = tokio::time::timeout(config.join_timeout, handshake(&mut stream, &mut machine)).await;
        let client_id = match handshake {
            Ok(Ok(client_id)) => client_id,
            Ok(Err(e)) => return Err(e),
            Err(_) => {
                machine.connect_error("join timed out")?;
                return Err(SessionError::JoinTimeout);
            }
        };

        info!(
            name = machine.participant().display_name(),
            room = machine.participant().room_id(),
            client_id = client_id.as_deref().unwrap_or("-"),
            "session: joined"
        );

        let (sink, source) = stream.split();
        let (out_tx, out_rx) = mpsc::unbounded_channel();
        let (event_tx, events) = mpsc::unbounded_channel();
        let writer = tokio::spawn(write_loop(sink, out_rx));
        let reader = tokio::spawn(read_loop(source, event_tx));

        Ok(Self { machine, client_id, outbound: Some(out_tx), events, reader, writer: Some(writer) })
    }

    #[must_use]
    pub fn participant(&self) -> &Participant {
        self.machine.participant()
    }

    #[must_use]
    pub fn state(&self) -> &SessionState {
        self.machine.state()
    }

    #[must_use]
    pub fn is_joined(&self) -> bool {
        self.machine.is_joined()
    }

    /// Id the relay assigned in its welcome frame.
    #[must_use]
    pub fn client_id(&self) -> Option<&str> {
        self.client_id.as_deref()
    }

    /// User-visible notice once the session has failed.
    #[must_use]
    pub fn notice(&self) -> Option<String> {
        self.machine.notice()
    }

    /// Queue a segment for the relay. Fire-and-forget: returns whether it was
    /// queued, which only requires the session to be joined.
    pub fn send_segment(&self, segment: &StrokeSegment) -> bool {
        if !self.machine.is_joined() {
            return false;
        }
        let Some(outbound) = &self.outbound else {
            return false;
        };
        outbound
            .send(Frame::request(SYSCALL_DRAWING, segment.to_data()))
            .is_ok()
    }

    /// Wait for the next event. Transport failures move the session to
    /// `Failed`, after which no further drawings are delivered; `None` once
    /// the reader has stopped.
    pub async fn next_event(&mut self) -> Option<SessionEvent> {
        loop {
            let event = self.events.recv().await?;
            let failure = match &event {
                SessionEvent::ConnectError(reason) => Some(reason.clone()),
                SessionEvent::Closed => Some("connection closed".to_owned()),
                SessionEvent::Drawing { .. } => None,
            };
            match failure {
                Some(reason) => {
                    if let Err(e) = self.machine.connect_error(reason) {
                        debug!(error = %e, "session: failure after teardown ignored");
                    }
                }
                None if !self.machine.is_joined() => {
                    debug!("session: drawing after failure discarded");
                    continue;
                }
                None => {}
            }
            return Some(event);
        }
    }

    /// Close the connection. No leave acknowledgment is awaited.
    pub async fn close(&mut self) {
        self.machine.close();
        // Dropping the sender ends the writer, which closes the socket.
        self.outbound = None;
        if let Some(writer) = self.writer.take() {
            if let Err(e) = writer.await {
                debug!(error = %e, "session: writer task ended abnormally");
            }
        }
        self.reader.abort();
        info!(name = self.participant().display_name(), "session: closed");
    }
}

impl Drop for RoomSession {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

/// Wait for the welcome, send the join, and wait for its answer. Returns the
/// client id from the welcome, if one arrived first.
async fn handshake(stream: &mut WsStream, machine: &mut SessionMachine) -> Result<Option<String>, SessionError> {
    let mut client_id = None;
    let join = machine.transport_open()?;
    let req = Frame::request(SYSCALL_JOIN, join.to_data());

    if let Err(e) = stream.send(Message::Binary(frames::encode_frame(&req).into())).await {
        machine.connect_error(e.to_string())?;
        return Err(SessionError::Transport(e.to_string()));
    }

    loop {
        let frame = match recv_frame(stream).await {
            Ok(frame) => frame,
            Err(reason) => {
                machine.connect_error(reason.clone())?;
                return Err(SessionError::Transport(reason));
            }
        };

        if frame.syscall == SYSCALL_CONNECTED {
            client_id = frame.data.get("client_id").and_then(Value::as_str).map(ToOwned::to_owned);
            continue;
        }
        if frame.syscall == SYSCALL_CONNECT_ERROR {
            let reason = ConnectError::from_data(&frame.data).reason;
            machine.connect_error(reason.clone())?;
            return Err(SessionError::Transport(reason));
        }
        if frame.parent_id.as_deref() != Some(req.id.as_str()) || !frame.status.is_terminal() {
            continue;
        }

        if frame.status == Status::Error {
            let message = frame.message().unwrap_or("join rejected").to_owned();
            machine.join_acked(Err(message.clone()))?;
            return Err(SessionError::JoinRejected(message));
        }
        machine.join_acked(Ok(()))?;
        return Ok(client_id);
    }
}

/// Next decodable frame. `Err` carries a transport failure reason.
async fn recv_frame(stream: &mut WsStream) -> Result<Frame, String> {
    loop {
        let Some(message) = stream.next().await else {
            return Err("connection closed".to_owned());
        };
        match message.map_err(|e| e.to_string())? {
            Message::Binary(bytes) => match frames::decode_frame(&bytes) {
                Ok(frame) => return Ok(frame),
                Err(e) => warn!(error = %e, "session: undecodable frame skipped"),
            },
            Message::Close(_) => return Err("connection closed".to_owned()),
            _ => {}
        }
    }
}

async fn write_loop(
    mut sink: futures_util::stream::SplitSink<WsStream, Message>,
    mut outbound: mpsc::UnboundedReceiver<Frame>,
) {
    while let Some(frame) = outbound.recv().await {
        if let Err(e) = sink.send(Message::Binary(frames::encode_frame(&frame).into())).await {
            warn!(error = %e, "session: send failed");
            return;
        }
    }
    if let Err(e) = sink.close().await {
        debug!(error = %e, "session: close failed");
    }
}

async fn read_loop(
    mut source: futures_util::stream::SplitStream<WsStream>,
    events: mpsc::UnboundedSender<SessionEvent>,
) {
    while let Some(message) = source.next().await {
        let bytes = match message {
            Ok(Message::Binary(bytes)) => bytes,
            Ok(Message::Close(_)) => break,
            Ok(_) => continue,
            Err(e) => {
                debug!(error = %e, "session: read failed");
                break;
            }
        };
        let frame = match frames::decode_frame(&bytes) {
            Ok(frame) => frame,
            Err(e) => {
                warn!(error = %e, "session: undecodable frame skipped");
                continue;
            }
        };

        let event = match frame.syscall.as_str() {
            SYSCALL_DRAWING => match StrokeSegment::from_data(&frame.data) {
                Ok(segment) => SessionEvent::Drawing { from: frame.from, segment },
                Err(e) => {
                    debug!(error = %e, "session: malformed segment discarded");
                    continue;
                }
            },
            SYSCALL_CONNECT_ERROR => {
                let reason = ConnectError::from_data(&frame.data).reason;
                warn!(%reason, "session: relay reported connect_error");
                // The relay hangs up after a connect_error; stop reading.
                if events.send(SessionEvent::ConnectError(reason)).is_err() {
                    return;
                }
                break;
            }
            _ => continue,
        };
        if events.send(event).is_err() {
            return;
        }
    }
    if events.send(SessionEvent::Closed).is_err() {
        debug!("session: closed after receiver dropped");
    }
}

// =============================================================================
// MOUNT
// =============================================================================

/// Owns at most one live session and applies mount semantics.
pub struct SessionHost {
    config: SessionConfig,
    current: Option<RoomSession>,
}

impl SessionHost {
    #[must_use]
    pub fn new(config: SessionConfig) -> Self {
        Self { config, current: None }
    }

    /// Mount the join form values. Blank values fail before any connection
    /// is attempted; a joined session for the same participant is reused.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Form`] for blank input, or any error from
    /// [`RoomSession::connect`].
    pub async fn mount(&mut self, display_name: &str, room_id: &str) -> Result<&mut RoomSession, SessionError> {
        let participant = Participant::new(display_name, room_id)?;

        let session = match self.current.take() {
            Some(live) if live.is_joined() && live.participant() == &participant => live,
            previous => {
                if let Some(mut previous) = previous {
                    previous.close().await;
                }
                RoomSession::connect(&self.config, participant).await?
            }
        };
        Ok(self.current.insert(session))
    }

    /// Close the current session, if any.
    pub async fn unmount(&mut self) {
        if let Some(mut session) = self.current.take() {
            session.close().await;
        }
    }

    #[must_use]
    pub fn current(&self) -> Option<&RoomSession> {
        self.current.as_ref()
    }

    pub fn current_mut(&mut self) -> Option<&mut RoomSession> {
        self.current.as_mut()
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
