//! Narwhal arena server library.
//!
//! Simulation (segments, players, balls, combat, rooms), snapshot encoding and
//! the WebSocket transport, exposed for tests and the binary.

pub mod ball;
pub mod combat;
pub mod config;
pub mod game_loop;
pub mod player;
pub mod protocol;
pub mod room;
pub mod segment;
pub mod state;
pub mod ws;

use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;
use ws::{ws_handler, AppState};

/// Routes served by the game server. The client connects at the root.
pub fn router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(ws_handler))
        .route("/ws", get(ws_handler))
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}
