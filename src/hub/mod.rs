//! Real-time fan-out relay
//!
//! The hub owns the set of connected peers. Every inbound frame is
//! classified once: correction requests go to the worker side-channel,
//! everything else is re-stamped with the server clock and broadcast to
//! every other ready peer. Broadcast is best-effort; per-sender order is
//! preserved because each peer's frames are handled sequentially.

mod peer;
mod relay;

pub use peer::{PeerHandle, PeerId};
pub use relay::{HubAction, RelayHub};
