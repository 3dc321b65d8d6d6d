//! Producer/viewer side of the relay
//!
//! `RelayClient` is the transport: a WebSocket connection that retries on
//! a fixed interval after an unexpected close. `ViewerSession` is the
//! glue a headless viewer runs over it: reconciler plus correction cache,
//! turning inbound messages into the correction requests to send back.

mod transport;
mod viewer;

pub use transport::RelayClient;
pub use viewer::ViewerSession;
