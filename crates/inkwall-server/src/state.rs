//! Shared wall state: stroke log, session registry, broadcast coordinator.
//!
//! One `tokio::sync::Mutex` guards the log and the registry together, so the
//! two compound operations the protocol depends on are atomic:
//!
//! - "append, then fan out" — no session observes the log and the broadcast
//!   stream disagreeing;
//! - "snapshot, then register" — a joining session can neither miss a
//!   segment appended during its join nor receive one twice (once inside
//!   `history`, once as `draw`).
//!
//! Fan-out is fire-and-forget over bounded per-session queues: a slow or
//! mid-disconnect recipient loses events instead of blocking everyone else.

use std::collections::HashMap;

use tokio::sync::{Mutex, mpsc};
use tracing::{debug, warn};
use uuid::Uuid;

use inkwall_core::protocol::{ServerMessage, StrokeSegment};

/// Capacity of each session's outbound queue.
pub const OUTBOUND_QUEUE: usize = 256;

// =============================================================================
// STROKE LOG
// =============================================================================

/// Append-only ordered log of stroke segments. The single source of truth
/// for wall content; lives only as long as the process.
#[derive(Debug, Default)]
pub struct StrokeLog {
    segments: Vec<StrokeSegment>,
}

impl StrokeLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a segment. Malformed input is dropped, not an error: a hostile
    /// client must not be able to corrupt or crash the shared log.
    /// Returns whether the segment was accepted.
    pub fn append(&mut self, segment: StrokeSegment) -> bool {
        if !segment.is_well_formed() {
            warn!("dropping malformed segment");
            return false;
        }
        self.segments.push(segment);
        true
    }

    /// Empty the log.
    pub fn clear(&mut self) {
        self.segments.clear();
    }

    /// Ordered copy of every segment, for a newly connecting session.
    pub fn snapshot(&self) -> Vec<StrokeSegment> {
        self.segments.clone()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }
}

// =============================================================================
// SESSION REGISTRY
// =============================================================================

/// Live sessions and their outbound queues. Used only for fan-out addressing;
/// sessions hold no drawing state.
#[derive(Debug, Default)]
struct SessionRegistry {
    sessions: HashMap<Uuid, mpsc::Sender<ServerMessage>>,
}

impl SessionRegistry {
    fn register(&mut self, id: Uuid, tx: mpsc::Sender<ServerMessage>) {
        self.sessions.insert(id, tx);
    }

    fn unregister(&mut self, id: Uuid) {
        self.sessions.remove(&id);
    }

    fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Queue a message for every session except `exclude`, best effort.
    fn send_except(&self, exclude: Uuid, message: &ServerMessage) {
        for (id, tx) in &self.sessions {
            if *id != exclude {
                Self::offer(*id, tx, message.clone());
            }
        }
    }

    /// Queue a message for every session, best effort.
    fn send_all(&self, message: &ServerMessage) {
        for (id, tx) in &self.sessions {
            Self::offer(*id, tx, message.clone());
        }
    }

    /// At-most-once delivery: a full queue or a closed receiver drops the
    /// message for that session only, never stalls the broadcast.
    fn offer(id: Uuid, tx: &mpsc::Sender<ServerMessage>, message: ServerMessage) {
        match tx.try_send(message) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!(session = %id, "outbound queue full, dropping event");
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                // Session is mid-disconnect; cleanup happens in its own task.
                debug!(session = %id, "outbound queue closed");
            }
        }
    }
}

// =============================================================================
// WALL COORDINATOR
// =============================================================================

/// Handle for one connected session: identity plus the receiving end of its
/// outbound queue. Dropping the receiver is what ends delivery.
pub struct SessionHandle {
    pub id: Uuid,
    pub rx: mpsc::Receiver<ServerMessage>,
}

struct WallInner {
    log: StrokeLog,
    registry: SessionRegistry,
}

/// The broadcast coordinator: sole writer to the stroke log and to every
/// session's outbound queue. Explicitly owned, handed to connection tasks
/// by `Arc` — no ambient global.
pub struct Wall {
    inner: Mutex<WallInner>,
}

impl Wall {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(WallInner {
                log: StrokeLog::new(),
                registry: SessionRegistry::default(),
            }),
        }
    }

    /// Admit a new session.
    ///
    /// The catch-up snapshot is queued as the session's first message and
    /// the session is registered for future fan-out in the same critical
    /// section, so no concurrent append can slip between the two.
    pub async fn connect(&self) -> SessionHandle {
        let id = Uuid::new_v4();
        let (tx, rx) = mpsc::channel(OUTBOUND_QUEUE);

        let mut inner = self.inner.lock().await;
        let history = ServerMessage::History {
            segments: inner.log.snapshot(),
        };
        // Fresh queue, cannot be full.
        let _ = tx.try_send(history);
        inner.registry.register(id, tx);
        debug!(
            session = %id,
            peers = inner.registry.len(),
            strokes = inner.log.len(),
            "session connected"
        );

        SessionHandle { id, rx }
    }

    /// Remove a session. Safe to call while a broadcast is in flight; the
    /// session simply stops being addressed.
    pub async fn disconnect(&self, id: Uuid) {
        let mut inner = self.inner.lock().await;
        inner.registry.unregister(id);
        debug!(session = %id, peers = inner.registry.len(), "session disconnected");
    }

    /// Append a segment drawn by `sender` and fan it out to everyone else.
    /// The sender already rendered it locally, so it gets no echo.
    pub async fn draw(&self, sender: Uuid, segment: StrokeSegment) {
        let mut inner = self.inner.lock().await;
        if !inner.log.append(segment.clone()) {
            return;
        }
        inner
            .registry
            .send_except(sender, &ServerMessage::Draw { segment });
    }

    /// Wipe the log and tell every session, the requester included: clearing
    /// is an authoritative reset, not a local echo.
    pub async fn clear(&self, sender: Uuid) {
        let mut inner = self.inner.lock().await;
        inner.log.clear();
        inner.registry.send_all(&ServerMessage::Clear);
        debug!(session = %sender, "wall cleared");
    }
}

impl Default for Wall {
    fn default() -> Self {
        Self::new()
    }
}
