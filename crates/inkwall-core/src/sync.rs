//! WebSocket client for wall synchronization.
//!
//! A background thread owns the socket; the host polls events each frame.
//! Events are delivered in arrival order, which is the only ordering
//! guarantee the protocol needs on the client side.

use std::sync::mpsc::{Receiver, Sender, TryRecvError, channel};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use thiserror::Error;
use tungstenite::{Message, connect};
use url::Url;

use crate::protocol::{ClientMessage, ServerMessage, StrokeSegment};

/// Connection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Error,
}

/// Events surfaced to the host application.
#[derive(Debug, Clone)]
pub enum WallEvent {
    /// Connected to the server.
    Connected,
    /// Disconnected from the server. A reconnecting client becomes a brand
    /// new session and receives a fresh history.
    Disconnected,
    /// Catch-up snapshot, first event after connecting.
    History(Vec<StrokeSegment>),
    /// Another participant drew a segment.
    Draw(StrokeSegment),
    /// The wall was wiped.
    Clear,
    /// Transport-level error.
    Error(String),
}

/// Errors from the sync client itself. Protocol-level garbage from the
/// server is logged and skipped, never surfaced as an error.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("already connected")]
    AlreadyConnected,
    #[error("not connected")]
    NotConnected,
    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("invalid websocket scheme: {0}")]
    InvalidScheme(String),
    #[error("send failed: {0}")]
    SendFailed(String),
}

/// Commands sent to the WebSocket thread.
enum WsCommand {
    Send(String),
    Close,
}

/// WebSocket client for native platforms.
///
/// Uses a background thread for non-blocking operation.
pub struct WallSocket {
    state: ConnectionState,
    events: Vec<WallEvent>,
    /// Channel to send commands to the WebSocket thread.
    cmd_tx: Option<Sender<WsCommand>>,
    /// Channel to receive events from the WebSocket thread.
    event_rx: Option<Receiver<WallEvent>>,
    /// Handle to the WebSocket thread.
    _thread: Option<JoinHandle<()>>,
}

impl WallSocket {
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

    /// Connect to a wall server.
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
        let (event_tx, event_rx) = channel::<WallEvent>();
        let url = url.to_string();

        let handle = thread::spawn(move || run_socket_thread(&url, &cmd_rx, &event_tx));

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

    /// Send one client message.
    pub fn send(&self, message: &ClientMessage) -> Result<(), SyncError> {
        let Some(ref tx) = self.cmd_tx else {
            return Err(SyncError::NotConnected);
        };
        let json = serde_json::to_string(message).map_err(|e| SyncError::SendFailed(e.to_string()))?;
        tx.send(WsCommand::Send(json))
            .map_err(|e| SyncError::SendFailed(e.to_string()))
    }

    /// Poll for pending events in arrival order (non-blocking).
    pub fn poll_events(&mut self) -> Vec<WallEvent> {
        if let Some(ref rx) = self.event_rx {
            while let Ok(event) = rx.try_recv() {
                match &event {
                    WallEvent::Connected => self.state = ConnectionState::Connected,
                    WallEvent::Disconnected => self.state = ConnectionState::Disconnected,
                    WallEvent::Error { .. } => self.state = ConnectionState::Error,
                    _ => {}
                }
                self.events.push(event);
            }
        }

        std::mem::take(&mut self.events)
    }

    /// Get current connection state.
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Check if connected.
    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }
}

impl Default for WallSocket {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for WallSocket {
    fn drop(&mut self) {
        self.disconnect();
    }
}

/// Body of the socket thread: pump commands out and server events in.
fn run_socket_thread(url: &str, cmd_rx: &Receiver<WsCommand>, event_tx: &Sender<WallEvent>) {
    log::info!("wall socket: connecting to {url}");

    let (mut socket, response) = match connect(url) {
        Ok(ok) => ok,
        Err(e) => {
            log::error!("wall socket: connection failed: {e}");
            let _ = event_tx.send(WallEvent::Error(format!("connection failed: {e}")));
            return;
        }
    };

    log::info!("wall socket: connected, status {}", response.status());
    let _ = event_tx.send(WallEvent::Connected);

    // Short read timeout so the loop can interleave outgoing commands.
    if let tungstenite::stream::MaybeTlsStream::Plain(tcp) = socket.get_mut() {
        let _ = tcp.set_read_timeout(Some(Duration::from_millis(50)));
        let _ = tcp.set_write_timeout(Some(Duration::from_secs(5)));
    }

    loop {
        match cmd_rx.try_recv() {
            Ok(WsCommand::Send(json)) => {
                if let Err(e) = socket.send(Message::Text(json)) {
                    log::error!("wall socket: send error: {e}");
                    break;
                }
            }
            Ok(WsCommand::Close) | Err(TryRecvError::Disconnected) => {
                let _ = socket.close(None);
                break;
            }
            Err(TryRecvError::Empty) => {}
        }

        match socket.read() {
            Ok(Message::Text(text)) => match serde_json::from_str::<ServerMessage>(&text) {
                Ok(ServerMessage::History { segments }) => {
                    let _ = event_tx.send(WallEvent::History(segments));
                }
                Ok(ServerMessage::Draw { segment }) => {
                    let _ = event_tx.send(WallEvent::Draw(segment));
                }
                Ok(ServerMessage::Clear) => {
                    let _ = event_tx.send(WallEvent::Clear);
                }
                Err(e) => {
                    log::warn!("wall socket: unparseable server message: {e}");
                }
            },
            Ok(Message::Ping(data)) => {
                let _ = socket.send(Message::Pong(data));
            }
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(tungstenite::Error::Io(ref e))
                if e.kind() == std::io::ErrorKind::WouldBlock
                    || e.kind() == std::io::ErrorKind::TimedOut =>
            {
                continue;
            }
            Err(e) => {
                log::error!("wall socket: read error: {e}");
                break;
            }
        }
    }

    log::info!("wall socket: thread exiting");
    let _ = event_tx.send(WallEvent::Disconnected);
}
