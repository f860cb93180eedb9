//! Inkwall fan-out server.
//!
//! Holds the append-only stroke log in memory and relays drawing events
//! between all connected participants.
//!
//! ## Protocol
//!
//! Messages are JSON with a `type` tag:
//! ```json
//! { "type": "draw", "x0": 0.0, "y0": 0.0, "x1": 10.0, "y1": 10.0, "color": "#ff0000" }
//! { "type": "clear" }
//! { "type": "history", "segments": [ ... ] }
//! ```
//! `history` is sent exactly once per connection, as its first message.

use std::{net::SocketAddr, sync::Arc};

use axum::{Router, routing::get};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

mod state;
mod ws;

use state::Wall;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "inkwall_server=info,tower_http=info".into()),
        )
        .init();

    let wall = Arc::new(Wall::new());

    let app = Router::new()
        .route("/", get(index))
        .route("/ws", get(ws::ws_handler))
        .route("/health", get(health))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(wall);

    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3030);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Inkwall server listening on {}", addr);
    info!("WebSocket endpoint: ws://localhost:{}/ws", port);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind listen address");
    axum::serve(listener, app)
        .await
        .expect("server error");
}

/// Index page.
async fn index() -> &'static str {
    "Inkwall server - connect via WebSocket at /ws"
}

/// Health check.
async fn health() -> &'static str {
    "ok"
}
