//! Server setup and initialization
//!
//! Provides the application builder and the server runner. The broadcast
//! hub is created with the server and shut down with it. Polls go to SQLite
//! when a database is configured and stay in memory otherwise.

use std::future::Future;
use std::sync::Arc;

use axum::Router;
use poll_common::{AppConfig, AppError};
use poll_core::{DomainError, PollRepository};
use poll_gateway::{BroadcastHub, GatewayState};
use poll_service::ServiceContextBuilder;
use poll_store::{create_pool, run_migrations, InMemoryPollRepository, SqlitePollRepository};
use tokio::net::TcpListener;
use tracing::info;

use crate::middleware::apply_middleware;
use crate::routes::create_router;
use crate::state::AppState;

/// Build the complete Axum application with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    let config = state.config().clone();
    let router = apply_middleware(create_router(), &config.server, &config.cors);
    router.with_state(state)
}

/// Wire the store, the hub and the services together
pub async fn create_app_state(config: AppConfig) -> Result<AppState, AppError> {
    let poll_repo = create_poll_repo(&config).await?;
    let hub = BroadcastHub::new_shared(Arc::clone(&poll_repo), config.hub.clone());

    let service_context = ServiceContextBuilder::new()
        .poll_repo(poll_repo)
        .publisher(hub.clone())
        .build()
        .map_err(|e| AppError::Config(e.to_string()))?;

    Ok(AppState::new(
        service_context,
        GatewayState::new(hub),
        config,
    ))
}

/// Open the configured store, migrating the database first when there is one
async fn create_poll_repo(config: &AppConfig) -> Result<Arc<dyn PollRepository>, AppError> {
    let Some(database) = &config.database else {
        info!("No DATABASE_URL configured, keeping polls in memory");
        return Ok(Arc::new(InMemoryPollRepository::new()));
    };

    info!("Connecting to SQLite...");
    let db_config = poll_store::DatabaseConfig {
        url: database.url.clone(),
        max_connections: database.max_connections,
        min_connections: database.min_connections,
        ..Default::default()
    };
    let pool = create_pool(&db_config).await.map_err(storage_error)?;
    let applied = run_migrations(&pool).await.map_err(storage_error)?;
    info!(migrations = applied, "SQLite database ready");

    Ok(Arc::new(SqlitePollRepository::new(pool)))
}

fn storage_error(e: impl std::fmt::Display) -> AppError {
    AppError::Domain(DomainError::StorageError(e.to_string()))
}

/// Serve the application on an already bound listener until `shutdown` resolves
///
/// All push connections are closed once shutdown begins.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> Result<(), AppError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let hub = state.gateway().hub_arc();
    let app = create_app(state);

    if let Ok(addr) = listener.local_addr() {
        info!("Server listening on http://{addr} (push channel ws://{addr}/ws)");
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown.await;
            info!("Shutdown signal received");
            hub.shutdown();
        })
        .await
        .map_err(|e| AppError::Config(format!("Server error: {e}")))
}

/// Run the complete server with configuration
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let addr = config.server.address();
    let state = create_app_state(config).await?;

    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind to {addr}: {e}")))?;

    serve(listener, state, shutdown_signal()).await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
