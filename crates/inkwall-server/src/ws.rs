//! WebSocket connection handling.
//!
//! Each connection gets its own task and a `select!` loop:
//! - inbound client messages → dispatch to the wall coordinator;
//! - outbound queue → forward to the socket.
//!
//! The handler never touches the log or other sessions directly; the
//! coordinator is the only writer to outbound queues.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt, stream::SplitSink};
use tracing::{info, warn};

use inkwall_core::protocol::{ClientMessage, ServerMessage};

use crate::state::Wall;

/// WebSocket upgrade handler.
pub async fn ws_handler(ws: WebSocketUpgrade, State(wall): State<Arc<Wall>>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, wall))
}

/// Serve one connection until it closes.
async fn handle_socket(socket: WebSocket, wall: Arc<Wall>) {
    // Snapshot + registration happen atomically inside `connect`; the
    // `history` message is already queued as the session's first event.
    let mut session = wall.connect().await;
    info!(session = %session.id, "client connected");

    let (mut sender, mut receiver) = socket.split();

    loop {
        tokio::select! {
            inbound = receiver.next() => {
                match inbound {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<ClientMessage>(&text) {
                            Ok(ClientMessage::Draw { segment }) => {
                                wall.draw(session.id, segment).await;
                            }
                            Ok(ClientMessage::Clear) => {
                                wall.clear(session.id).await;
                            }
                            Err(e) => {
                                // Malformed input is dropped; the connection
                                // stays open.
                                warn!(session = %session.id, error = %e, "invalid message");
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {} // Ignore binary/ping/pong.
                    Some(Err(e)) => {
                        warn!(session = %session.id, error = %e, "websocket error");
                        break;
                    }
                }
            }

            outbound = session.rx.recv() => {
                // `None` cannot happen while the registry holds the sender,
                // but a race with disconnect ends the loop cleanly.
                let Some(message) = outbound else { break };
                if send_message(&mut sender, &message).await.is_err() {
                    break;
                }
            }
        }
    }

    wall.disconnect(session.id).await;
    info!(session = %session.id, "client disconnected");
}

async fn send_message(
    sender: &mut SplitSink<WebSocket, Message>,
    message: &ServerMessage,
) -> Result<(), ()> {
    let Ok(json) = serde_json::to_string(message) else {
        return Err(());
    };
    sender.send(Message::Text(json.into())).await.map_err(|_| ())
}
