//! HTTP/WebSocket front for the relay
//!
//! This module exposes the network surface:
//! - GET /ws - WebSocket upgrade into the relay hub
//! - GET /health - Health check
//! - everything else - static viewer assets
//!
//! The display layer itself lives in those static assets; the server only
//! relays frames.

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
