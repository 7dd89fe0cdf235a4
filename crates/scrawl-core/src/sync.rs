//! WebSocket sync channel.
//!
//! Connects to the relay server and shuttles protocol messages from/to the
//! single-threaded client engine. The socket runs on a background thread;
//! the engine drains inbound events with `poll_events()` so nothing on the
//! caller's side ever blocks.

use crate::protocol::{ClientMessage, ServerMessage};
use crate::segment::Segment;
use std::sync::mpsc::{Receiver, Sender, TryRecvError, channel};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tungstenite::{Message, connect};
use url::Url;

/// Connection lifecycle, surfaced as a status indicator only. There is no
/// reconnect or backoff; a dropped connection stays dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Error,
}

/// Events delivered to the engine by `poll_events()`.
#[derive(Debug, Clone)]
pub enum SyncEvent {
    /// Connected to the server.
    Connected,
    /// Disconnected from the server.
    Disconnected,
    /// Full board history (sent on join and after a clear).
    BoardState(Vec<Segment>),
    /// A segment drawn by another client.
    Draw(Segment),
    /// Blank the board.
    Clear,
    /// Connected client count changed.
    CurrentUsers(usize),
    /// Transport error.
    Error(String),
}

/// Errors from channel operations.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("already connected")]
    AlreadyConnected,
    #[error("not connected")]
    NotConnected,
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("invalid WebSocket URL scheme: {0}")]
    InvalidScheme(String),
    #[error("send failed: {0}")]
    SendFailed(String),
    #[error("serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Commands sent to the WebSocket thread.
enum WsCommand {
    Send(String),
    Close,
}

/// WebSocket client backed by a background I/O thread.
pub struct SyncClient {
    state: ConnectionState,
    events: Vec<SyncEvent>,
    /// Channel to send commands to the WebSocket thread.
    cmd_tx: Option<Sender<WsCommand>>,
    /// Channel to receive events from the WebSocket thread.
    event_rx: Option<Receiver<SyncEvent>>,
    /// Handle to the WebSocket thread.
    _thread: Option<JoinHandle<()>>,
}

impl SyncClient {
    /// Create a new disconnected client.
    pub fn new() -> Self {
        Self {
            state: ConnectionState::Disconnected,
            events: Vec::new(),
            cmd_tx: None,
            event_rx: None,
            _thread: None,
        }
    }

    /// Connect to a `ws://` or `wss://` server.
    pub fn connect(&mut self, url: &str) -> Result<(), SyncError> {
        if self.cmd_tx.is_some() {
            return Err(SyncError::AlreadyConnected);
        }

        let parsed = Url::parse(url)?;
        if parsed.scheme() != "ws" && parsed.scheme() != "wss" {
            return Err(SyncError::InvalidScheme(parsed.scheme().to_string()));
        }

        self.state = ConnectionState::Connecting;

        let (cmd_tx, cmd_rx) = channel::<WsCommand>();
        let (event_tx, event_rx) = channel::<SyncEvent>();
        let url = url.to_string();

        let handle = thread::spawn(move || run_socket(&url, &cmd_rx, &event_tx));

        self.cmd_tx = Some(cmd_tx);
        self.event_rx = Some(event_rx);
        self._thread = Some(handle);

        Ok(())
    }

    /// Disconnect from the server.
    pub fn disconnect(&mut self) {
        if let Some(tx) = self.cmd_tx.take() {
            let _ = tx.send(WsCommand::Close);
        }
        self.event_rx = None;
        self._thread = None;
        self.state = ConnectionState::Disconnected;
    }

    /// Serialize and send a protocol message. Fire-and-forget: delivery is
    /// not acknowledged.
    pub fn send(&self, msg: &ClientMessage) -> Result<(), SyncError> {
        let json = serde_json::to_string(msg)?;
        let tx = self.cmd_tx.as_ref().ok_or(SyncError::NotConnected)?;
        tx.send(WsCommand::Send(json))
            .map_err(|e| SyncError::SendFailed(e.to_string()))
    }

    /// Poll for pending events (non-blocking) and update the status
    /// indicator from lifecycle events seen on the way through.
    pub fn poll_events(&mut self) -> Vec<SyncEvent> {
        if let Some(ref rx) = self.event_rx {
            while let Ok(event) = rx.try_recv() {
                match &event {
                    SyncEvent::Connected => self.state = ConnectionState::Connected,
                    SyncEvent::Disconnected => self.state = ConnectionState::Disconnected,
                    SyncEvent::Error(_) => self.state = ConnectionState::Error,
                    _ => {}
                }
                self.events.push(event);
            }
        }

        std::mem::take(&mut self.events)
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }
}

impl Default for SyncClient {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for SyncClient {
    fn drop(&mut self) {
        self.disconnect();
    }
}

/// Body of the WebSocket I/O thread: blocking tungstenite with a short read
/// timeout so outbound commands are picked up between reads.
fn run_socket(url: &str, cmd_rx: &Receiver<WsCommand>, event_tx: &Sender<SyncEvent>) {
    log::info!("WebSocket thread: connecting to {}", url);

    let (mut socket, response) = match connect(url) {
        Ok(ok) => ok,
        Err(e) => {
            log::error!("WebSocket connection failed: {}", e);
            let _ = event_tx.send(SyncEvent::Error(format!("Connection failed: {}", e)));
            return;
        }
    };

    log::info!("WebSocket connected, status: {}", response.status());
    let _ = event_tx.send(SyncEvent::Connected);

    if let tungstenite::stream::MaybeTlsStream::Plain(tcp) = socket.get_mut() {
        let _ = tcp.set_read_timeout(Some(Duration::from_millis(50)));
        let _ = tcp.set_write_timeout(Some(Duration::from_secs(5)));
    }

    loop {
        // Outbound commands first (non-blocking).
        match cmd_rx.try_recv() {
            Ok(WsCommand::Send(msg)) => {
                if let Err(e) = socket.send(Message::Text(msg)) {
                    log::error!("WebSocket send error: {}", e);
                    break;
                }
            }
            Ok(WsCommand::Close) => {
                let _ = socket.close(None);
                break;
            }
            Err(TryRecvError::Disconnected) => break,
            Err(TryRecvError::Empty) => {}
        }

        // Inbound frames (bounded by the read timeout).
        match socket.read() {
            Ok(Message::Text(txt)) => match serde_json::from_str::<ServerMessage>(&txt) {
                Ok(msg) => {
                    let _ = event_tx.send(server_message_event(msg));
                }
                Err(e) => {
                    // Malformed payloads are dropped, never fatal.
                    log::warn!("Ignoring unparseable server message ({}): {}", e, txt);
                }
            },
            Ok(Message::Ping(data)) => {
                let _ = socket.send(Message::Pong(data));
            }
            Ok(Message::Close(_)) => break,
            Ok(_) => {} // Ignore binary, pong.
            Err(tungstenite::Error::Io(ref e))
                if e.kind() == std::io::ErrorKind::WouldBlock
                    || e.kind() == std::io::ErrorKind::TimedOut =>
            {
                continue;
            }
            Err(e) => {
                log::error!("WebSocket read error: {}", e);
                break;
            }
        }
    }

    log::info!("WebSocket thread exiting");
    let _ = event_tx.send(SyncEvent::Disconnected);
}

fn server_message_event(msg: ServerMessage) -> SyncEvent {
    match msg {
        ServerMessage::BoardState { segments } => SyncEvent::BoardState(segments),
        ServerMessage::Draw { segment } => SyncEvent::Draw(segment),
        ServerMessage::Clear => SyncEvent::Clear,
        ServerMessage::CurrentUsers { count } => SyncEvent::CurrentUsers(count),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Point;

    #[test]
    fn test_send_while_disconnected() {
        let client = SyncClient::new();
        assert!(matches!(
            client.send(&ClientMessage::Clear),
            Err(SyncError::NotConnected)
        ));
    }

    #[test]
    fn test_rejects_non_ws_scheme() {
        let mut client = SyncClient::new();
        assert!(matches!(
            client.connect("http://localhost:3030"),
            Err(SyncError::InvalidScheme(_))
        ));
        assert_eq!(client.state(), ConnectionState::Disconnected);
    }

    #[test]
    fn test_rejects_garbage_url() {
        let mut client = SyncClient::new();
        assert!(matches!(
            client.connect("not a url"),
            Err(SyncError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_server_message_mapping() {
        let seg = Segment::new(Point::new(0.0, 0.0), Point::new(1.0, 1.0), "#000", 2.0);
        assert!(matches!(
            server_message_event(ServerMessage::Draw { segment: seg.clone() }),
            SyncEvent::Draw(s) if s == seg
        ));
        assert!(matches!(
            server_message_event(ServerMessage::Clear),
            SyncEvent::Clear
        ));
        assert!(matches!(
            server_message_event(ServerMessage::CurrentUsers { count: 4 }),
            SyncEvent::CurrentUsers(4)
        ));
        assert!(matches!(
            server_message_event(ServerMessage::BoardState { segments: vec![seg] }),
            SyncEvent::BoardState(v) if v.len() == 1
        ));
    }
}
