//! Task Deck server
//!
//! Keeps a Todoist task snapshot current on a fixed interval and serves it,
//! grouped for a small display, on port 8081.

mod config;
mod routes;
mod state;

use std::sync::Arc;

use anyhow::Context;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use task_sync::TaskSynchronizer;
use taskdeck_core::{Clock, SystemClock, TaskStore};
use todoist_client::{TodoistClient, TodoistConfig};

use crate::config::ServerConfig;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "deck_server=debug,task_sync=debug,todoist_client=info,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env().context("Invalid configuration")?;
    let clock: Arc<dyn Clock> = Arc::new(
        SystemClock::from_name(&config.timezone).context("Invalid TASKDECK_TIMEZONE")?,
    );
    tracing::info!(
        "Polling every {:?} in timezone {}",
        config.sync.poll_interval(),
        config.timezone
    );

    let mut todoist = TodoistConfig::new(config.api_key.clone()).with_timeout(config.sync.request_timeout());
    if let Some(base_url) = &config.api_base_url {
        tracing::info!("Using task API at {}", base_url);
        todoist = todoist.with_base_url(base_url.as_str());
    }
    let client = Arc::new(TodoistClient::with_reqwest(todoist, Arc::clone(&clock)));

    let store = Arc::new(TaskStore::new());
    let synchronizer = TaskSynchronizer::new(client, store, Arc::clone(&clock), config.sync.clone());
    synchronizer.start();

    let app_state = AppState::new(synchronizer.clone(), clock, config.agenda_limit);

    let app = routes::router()
        .with_state(app_state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.listen_addr))?;
    tracing::info!("REST API listening on {}", config.listen_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    synchronizer.stop();
    tracing::info!("Shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
