//! Prediction API server
//!
//! Loads the trained pipeline once at startup and serves `GET /`,
//! `GET /health` and `POST /predict`.

mod api;
mod error;
mod handlers;
mod schema;
mod state;

pub use api::create_router;
pub use error::ServerError;
pub use schema::{predict_survey, PredictionResponse, SurveyInput};
pub use state::AppState;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub model_path: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: std::env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("API_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8000),
            model_path: std::env::var("MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("models/model.bin")),
        }
    }
}

/// Start the server with the given configuration
pub async fn run_server(config: ServerConfig) -> anyhow::Result<()> {
    let start_time = chrono::Utc::now();

    let model_path = config.model_path.clone();
    let state = tokio::task::spawn_blocking(move || AppState::load(&model_path)).await??;
    let app = create_router(Arc::new(state));

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(
        address = %addr,
        model_path = %config.model_path.display(),
        pid = std::process::id(),
        "Prediction API listening"
    );

    // Graceful shutdown on ctrl+c
    let shutdown_signal = async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install CTRL+C signal handler");
            std::future::pending::<()>().await;
        }
        let uptime = chrono::Utc::now().signed_duration_since(start_time);
        info!(
            uptime_secs = uptime.num_seconds(),
            "Shutdown signal received, stopping server gracefully"
        );
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("Server shut down cleanly");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        if std::env::var("API_PORT").is_err() {
            assert_eq!(config.port, 8000);
        }
        if std::env::var("MODEL_PATH").is_err() {
            assert_eq!(config.model_path, PathBuf::from("models/model.bin"));
        }
    }
}
