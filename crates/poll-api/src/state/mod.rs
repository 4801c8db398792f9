//! Application state
//!
//! Holds the shared state for the Axum application: the service context
//! for the REST handlers and the gateway state for the push channel.

use std::sync::Arc;

use axum::extract::FromRef;
use poll_common::AppConfig;
use poll_gateway::GatewayState;
use poll_service::ServiceContext;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    service_context: Arc<ServiceContext>,
    gateway: GatewayState,
    config: Arc<AppConfig>,
}

impl AppState {
    /// Create a new AppState
    pub fn new(service_context: ServiceContext, gateway: GatewayState, config: AppConfig) -> Self {
        Self {
            service_context: Arc::new(service_context),
            gateway,
            config: Arc::new(config),
        }
    }

    /// Get the service context
    pub fn service_context(&self) -> &ServiceContext {
        &self.service_context
    }

    /// Get the push channel state
    pub fn gateway(&self) -> &GatewayState {
        &self.gateway
    }

    /// Get the application configuration
    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

impl FromRef<AppState> for GatewayState {
    fn from_ref(state: &AppState) -> Self {
        state.gateway.clone()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("service_context", &"ServiceContext")
            .field("connections", &self.gateway.hub().connection_count())
            .field("config", &self.config)
            .finish()
    }
}
