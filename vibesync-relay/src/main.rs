//! vibesync-relay - Vibe compatibility relay
//!
//! Receives listening + calendar context from the upstream producer,
//! asks the classifier how well the music fits the next event, and
//! broadcasts the resulting status to dashboards over SSE.

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vibesync_common::config::RelayConfig;
use vibesync_relay::cli::RelayArgs;
use vibesync_relay::{build_router, build_session, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    let args = RelayArgs::parse();

    let config = RelayConfig::resolve(&args.overrides(), args.config.as_deref())
        .context("Failed to load configuration")?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_level.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Log build identification immediately after tracing init
    info!(
        "Starting VibeSync relay (vibesync-relay) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    info!(
        threshold = config.compatibility_threshold,
        model = %config.classifier.model,
        classifier = %config.classifier.base_url,
        "Configuration loaded"
    );
    if config.classifier.api_key.is_none() {
        info!("No classifier credential configured; requests are sent unauthenticated");
    }

    let session = build_session(&config).context("Failed to initialize classifier client")?;
    let app = build_router(AppState::new(session));

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("vibesync-relay listening on http://{}", addr);
    info!("Status stream: http://{}/events", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
