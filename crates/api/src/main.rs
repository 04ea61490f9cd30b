use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tourforge_api::config::ServerConfig;
use tourforge_api::router::build_app_router;
use tourforge_api::state::AppState;
use tourforge_core::config::VendorConfig;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tourforge_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env().unwrap_or_else(|e| {
        tracing::error!(error = %e, "Invalid server configuration");
        std::process::exit(1);
    });
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    let vendor = VendorConfig::from_env().unwrap_or_else(|e| {
        tracing::error!(error = %e, "Invalid vendor configuration");
        std::process::exit(1);
    });
    tracing::info!(vendor = ?vendor, "Loaded vendor configuration");

    // --- App state ---
    let state = AppState::new(config.clone(), &vendor).unwrap_or_else(|e| {
        tracing::error!(error = %e, "Failed to create vendor client");
        std::process::exit(1);
    });

    // Log workflow events until the bus is dropped.
    let event_log = tokio::spawn(log_workflow_events(state.event_bus.subscribe()));
    let event_bus = Arc::clone(&state.event_bus);

    let app = build_app_router(state);

    // --- Start server ---
    let host: IpAddr = config.host.parse().unwrap_or_else(|e| {
        tracing::error!(host = %config.host, error = %e, "Invalid HOST address");
        std::process::exit(1);
    });
    let addr = SocketAddr::new(host, config.port);
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap_or_else(|e| {
        tracing::error!(%addr, error = %e, "Failed to bind to address");
        std::process::exit(1);
    });

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(error = %e, "Server error");
    }

    tracing::info!("Server stopped accepting connections, cleaning up");
    drop(event_bus);
    let _ = tokio::time::timeout(Duration::from_secs(5), event_log).await;
    tracing::info!("Graceful shutdown complete");
}

async fn log_workflow_events(
    mut rx: tokio::sync::broadcast::Receiver<tourforge_events::WorkflowEvent>,
) {
    loop {
        match rx.recv().await {
            Ok(event) => tracing::debug!(
                display_name = %event.display_name,
                stage = ?event.stage(),
                event = ?event.kind,
                "Workflow event",
            ),
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Workflow event log lagged");
            }
            Err(RecvError::Closed) => break,
        }
    }
}

/// Wait for SIGINT or SIGTERM (Unix) to start a graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
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
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
