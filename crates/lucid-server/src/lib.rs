//! Lucid Server
//!
//! HTTP surface for the explanation pipeline. Configuration is loaded and
//! checked in full before the listener binds, so a misconfigured process
//! never accepts a request.

#![warn(missing_docs)]

pub mod config;
pub mod handlers;

use config::{ConfigError, ServerConfig};
use handlers::{create_router, AppState};
use lucid_domain::{ClassifiedError, Classify, ErrorCode, ProviderConfig};
use lucid_explainer::Explainer;
use lucid_gatekeeper::Gatekeeper;
use lucid_llm::{build_provider, ProviderAdapter};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::info;

/// Server error
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Pipeline could not be assembled from the configuration
    #[error("Startup failed: {0}")]
    Setup(ClassifiedError),

    /// Server binding error
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        /// Address that could not be bound
        addr: String,
        /// Underlying error
        source: std::io::Error,
    },

    /// Server error
    #[error("Server error: {0}")]
    Server(#[from] std::io::Error),
}

impl Classify for ServerError {
    fn classify(&self) -> ClassifiedError {
        match self {
            ServerError::Config(e) => e.classify(),
            ServerError::Setup(e) => e.clone(),
            _ => ClassifiedError::with_detail(ErrorCode::Internal, self.to_string()),
        }
    }
}

/// Assemble the pipeline from server and provider configuration
///
/// Every setting is validated here; the provider backend is built once and
/// shared by all requests.
pub fn build_explainer(
    config: &ServerConfig,
    provider: ProviderConfig,
) -> Result<Explainer, ServerError> {
    provider.validate().map_err(ServerError::Setup)?;
    let backend = build_provider(&provider).map_err(|e| ServerError::Setup(e.classify()))?;
    let gatekeeper = Gatekeeper::try_new(config.validation.clone())
        .map_err(|e| ServerError::Setup(e.classify()))?;

    Explainer::try_new(
        gatekeeper,
        ProviderAdapter::new(backend),
        Arc::new(provider),
        config.explainer.clone(),
    )
    .map_err(ServerError::Setup)
}

/// Start the Lucid HTTP server
///
/// Serves until Ctrl-C, then finishes in-flight requests before returning.
pub async fn start_server(config: ServerConfig, explainer: Explainer) -> Result<(), ServerError> {
    info!(
        provider = explainer.provider_name(),
        retry_malformed = explainer.config().retry_malformed,
        "Starting Lucid server"
    );

    let app = create_router(AppState::new(explainer));

    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|source| ServerError::Bind {
            addr: addr.clone(),
            source,
        })?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    match signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl+C, shutting down"),
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    }
}
