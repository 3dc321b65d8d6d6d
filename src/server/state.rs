use crate::hub::RelayHub;
use std::sync::Arc;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// The single broadcast domain all peers join
    pub hub: Arc<RelayHub>,
}

impl AppState {
    pub fn new(hub: Arc<RelayHub>) -> Self {
        Self { hub }
    }
}
