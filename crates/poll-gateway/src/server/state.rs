//! Gateway state
//!
//! Shared dependencies for the push channel handler.

use std::sync::Arc;

use poll_common::HubConfig;

use crate::connection::BroadcastHub;

/// Gateway application state
#[derive(Clone)]
pub struct GatewayState {
    hub: Arc<BroadcastHub>,
}

impl GatewayState {
    /// Create a new gateway state around an existing hub
    pub fn new(hub: Arc<BroadcastHub>) -> Self {
        Self { hub }
    }

    /// Get the broadcast hub
    pub fn hub(&self) -> &BroadcastHub {
        &self.hub
    }

    /// Get a shared handle to the broadcast hub
    pub fn hub_arc(&self) -> Arc<BroadcastHub> {
        Arc::clone(&self.hub)
    }

    /// Get the hub configuration
    pub fn config(&self) -> &HubConfig {
        self.hub.config()
    }
}
