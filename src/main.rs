//! Fraud Predictor - Main Entry Point
//!
//! Loads the anomaly model once and serves the predictor form.
//! Requests are handled one at a time on a single-threaded runtime.

use anyhow::{Context, Result};
use fraud_predictor::{
    config::{AppConfig, LogFormat, LoggingConfig},
    metrics::PredictionMetrics,
    models::ModelLoader,
    server::{app, AppState},
    Scorer,
};
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Load configuration
    let config = AppConfig::load()?;

    // Initialize logging
    init_logging(&config.logging)?;

    info!("Starting Fraud Predictor");
    info!(
        model = %config.model.path,
        address = %config.server.bind_addr(),
        "Configuration loaded successfully"
    );

    let metrics = Arc::new(PredictionMetrics::new());

    // Load the model once; a failure disables predictions but keeps the page up
    let state = match ModelLoader::new(&config.model).load(&config.model.path) {
        Ok(model) => {
            let scorer = Scorer::with_metrics(Arc::new(model), metrics.clone());
            AppState::ready(scorer)?
        }
        Err(e) => {
            error!(error = %e, "Model unavailable, predictions disabled");
            AppState::unavailable(&e)?
        }
    };

    let addr = config.server.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!(address = %addr, "Listening for requests");

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Fraud predictor shutting down...");
    metrics.log_summary();

    Ok(())
}

fn init_logging(logging: &LoggingConfig) -> Result<()> {
    let filter = logging.env_filter()?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match logging.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }

    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, initiating graceful shutdown"),
        _ = terminate => info!("Received SIGTERM, initiating graceful shutdown"),
    }
}
