// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! StraCal API Server
//!
//! Connects a Strava account and serves a scored activity calendar.

use stracal::{config::Config, db::FileCredentialStore, AppState};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging()?;

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(port = config.port, "Starting StraCal API");

    // Durable credential pair
    let store = FileCredentialStore::new(config.token_store_path.clone());
    tracing::info!(
        path = %store.path().display(),
        page_size = config.page_size,
        max_auth_retries = config.max_auth_retries,
        "Credential store ready"
    );

    let port = config.port;
    let state = Arc::new(AppState::new(config, Arc::new(store)));
    match state.tokens.is_authenticated().await {
        Ok(true) => tracing::info!("Stored Strava credentials found"),
        Ok(false) => tracing::info!("No Strava credentials yet, visit /auth/strava"),
        Err(e) => tracing::warn!(error = %e, "Could not read stored credentials"),
    }

    // Build router
    let app = stracal::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("stracal=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .try_init()?;
    Ok(())
}
