use anyhow::Result;
use parking_lot::Mutex;
use std::sync::Arc;

mod config;
mod error;
mod logging;
mod models;
mod routes;
mod services;

use crate::error::AppError;
use crate::services::{remote::RemoteAnalysisClient, session::AnalysisSession};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    logging::init_logging()?;

    // Load configuration
    let config = config::Config::new()?;
    let addr = config.bind_addr;

    // Build our application state
    let state = Arc::new(AppState::new(config)?);

    let app = routes::app(state);

    tracing::info!("listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// Application state
pub struct AppState {
    config: config::Config,
    session: Mutex<AnalysisSession>,
    remote: Option<RemoteAnalysisClient>,
}

impl AppState {
    fn new(config: config::Config) -> Result<Self, AppError> {
        let remote = match &config.remote_endpoint {
            Some(endpoint) => {
                let client = RemoteAnalysisClient::new(endpoint.clone(), config.remote_timeout)?;
                tracing::info!("Remote analysis enabled via {}", client.endpoint());
                Some(client)
            }
            None => None,
        };

        tracing::info!(
            "Accepting uploads up to {}KB with extensions: {}",
            config.max_file_size / 1024,
            config.accepted_extensions.join(", ")
        );

        Ok(Self {
            config,
            session: Mutex::new(AnalysisSession::new()),
            remote,
        })
    }
}
