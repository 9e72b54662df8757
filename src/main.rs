//! Agent Dashboard Server
//!
//! Serves the session core over a REST API. The session snapshot is loaded
//! at startup and written back on graceful shutdown.

use agent_dashboard::{
    api::{self, RouterState},
    config::Config,
    dispatch::{Dispatcher, WebhookClient},
    state::{default_agents, AppState, SnapshotFile},
};
use axum::{extract::Request, middleware::Next, response::Response};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

/// Request ID middleware - adds unique ID to each request for tracing
async fn request_id_middleware(request: Request, next: Next) -> Response {
    let request_id = Uuid::new_v4().to_string();
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let span = info_span!(
        "request",
        request_id = %request_id,
        method = %method,
        uri = %uri,
    );

    let response = next.run(request).instrument(span).await;

    let duration = start.elapsed();
    info!(
        request_id = %request_id,
        method = %method,
        uri = %uri,
        status = %response.status().as_u16(),
        duration_ms = duration.as_millis(),
        "Request completed"
    );

    response
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Load configuration
    let config = Config::from_env();
    info!("Configuration loaded: {:?}", config);

    // Restore the previous session, if any
    let snapshot_path = config.snapshot_path();
    let (mut app_state, save_on_exit) = match SnapshotFile::load_or_set_aside(&snapshot_path) {
        Ok(snapshot) => {
            let state = AppState::from_snapshot(snapshot);
            info!(
                path = %snapshot_path.display(),
                agents = state.agents().len(),
                conversations = state.conversations().len(),
                "Session restored"
            );
            (state, true)
        }
        Err(e) => {
            warn!(
                "Failed to load session from {}, it will not be overwritten: {}",
                snapshot_path.display(),
                e
            );
            (AppState::new(), false)
        }
    };

    if config.agents.seed_defaults && app_state.agents().is_empty() {
        let added = app_state.seed_agents(default_agents(&config.agents.webhook_base_url));
        info!("Seeded {} default agents", added);
    }

    let dispatch_config = config.dispatch_config();
    let endpoint = WebhookClient::new(dispatch_config.timeout)?;
    let dispatcher = Dispatcher::new(app_state.into_shared(), Arc::new(endpoint), dispatch_config);
    let shared = dispatcher.state().clone();

    let app = api::router(RouterState::new(dispatcher, snapshot_path.clone()))
        // Middleware (order matters - request_id should be first)
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }),
        )
        .layer(CorsLayer::permissive()); // Allow CORS for development

    // Bind to address from config
    let addr: SocketAddr = config
        .server_addr()
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid server address: {}", e))?;

    info!("Server running on http://{}", addr);
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Outstanding dispatches are dropped with the runtime; only recorded messages are saved
    if save_on_exit {
        let snapshot = shared.read().await.snapshot();
        match SnapshotFile::save_to_file(&snapshot, &snapshot_path) {
            Ok(()) => info!("Session saved to {}", snapshot_path.display()),
            Err(e) => warn!("Failed to save session to {}: {}", snapshot_path.display(), e),
        }
    }

    info!("Server shutdown complete");
    Ok(())
}

/// Handle graceful shutdown signals (Ctrl+C, SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down gracefully...");
        },
        _ = terminate => {
            info!("Received SIGTERM, shutting down gracefully...");
        },
    }
}
