//! Customer server: loads configuration, opens the record store, optionally seeds it, and
//! serves the customer API.
//!
//! Run from repo root: `cargo run -p customer-server`

use customer_service::{app, init_tracing, open_store, populate, AppState, ServiceConfig};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = ServiceConfig::from_env()?;
    init_tracing("customer_service=info,customer_server=info");

    tracing::info!(store = ?config.store, "application startup: creating tables if they don't exist");
    let store = open_store(&config).await?;
    tracing::info!("database tables checked/created");

    if let Some(count) = config.seed_on_startup {
        // Skipped when the table already has rows, so restarts do not grow the table.
        match populate(store.as_ref(), count, false).await {
            Ok(outcome) => tracing::info!(%outcome, "startup seeding"),
            Err(e) => tracing::warn!(error = %e, "startup seeding failed"),
        }
    }

    let router = app(AppState::new(store), config.dev_routes);
    let listener = TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("application shutdown");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for ctrl-c");
    }
}
