// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Trip Planner Server
//!
//! Serves the trip listing and detail pages, Google sign-in, and the JSON
//! API over the same router.

use std::sync::Arc;
use std::time::Duration;
use trip_planner::{
    config::{Config, StoreBackend},
    db::{Collections, DocumentStore, MemoryStore},
    AppState,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// How often expired sessions are purged.
const SESSION_PURGE_INTERVAL: Duration = Duration::from_secs(60 * 60);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(port = config.port, backend = ?config.store_backend, "Starting Trip Planner");

    let db = match config.store_backend {
        StoreBackend::Firestore => {
            let collections = Collections {
                users: config.users_collection.clone(),
                trips: config.trips_collection.clone(),
            };
            DocumentStore::new(&config.gcp_project_id, &config.database_id, collections).await?
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory document store, data is lost on restart");
            DocumentStore::new_in_memory(MemoryStore::new())
        }
    };

    // Build shared state
    let state = Arc::new(AppState::new(config.clone(), db)?);

    let sessions = state.sessions.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SESSION_PURGE_INTERVAL);
        loop {
            interval.tick().await;
            let purged = sessions.purge_expired();
            if purged > 0 {
                tracing::info!(purged, remaining = sessions.len(), "Purged expired sessions");
            }
        }
    });

    // Build router
    let app = trip_planner::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,trip_planner=debug"));

    tracing_subscriber::registry()
        .with(filter)
        .with(format)
        .init();
}
