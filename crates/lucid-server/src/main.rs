//! Lucid server binary
//!
//! Loads configuration, assembles the explanation pipeline and serves it
//! over HTTP.

use anyhow::{Context, Result};
use clap::Parser;
use lucid_domain::Classify;
use lucid_server::config::{provider_config_from_env, ServerConfig};
use lucid_server::{build_explainer, start_server};
use std::path::PathBuf;
use tracing::error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Lucid - AI explanation service
///
/// Provider settings are read from LUCID_PROVIDER, LUCID_API_KEY,
/// LUCID_MODEL, LUCID_BASE_URL, LUCID_TIMEOUT_MS, LUCID_MAX_RETRIES,
/// LUCID_BACKOFF_BASE_MS and LUCID_BACKOFF_MAX_MS.
#[derive(Parser, Debug)]
#[command(name = "lucid", version, about)]
struct Args {
    /// TOML configuration file
    #[arg(short, long, env = "LUCID_CONFIG")]
    config: Option<PathBuf>,

    /// Address to bind, overriding the file
    #[arg(long, env = "LUCID_BIND_ADDRESS")]
    bind_address: Option<String>,

    /// Port to bind, overriding the file
    #[arg(short, long, env = "LUCID_PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => ServerConfig::from_file(path)
            .inspect_err(|e| log_fatal(e))
            .with_context(|| format!("Failed to load {}", path.display()))?,
        None => ServerConfig::default(),
    };
    if let Some(address) = args.bind_address {
        config.bind_address = address;
    }
    if let Some(port) = args.port {
        config.bind_port = port;
    }

    let provider = provider_config_from_env()
        .inspect_err(|e| log_fatal(e))
        .context("Failed to read provider settings")?;

    let explainer = build_explainer(&config, provider)
        .inspect_err(|e| log_fatal(e))
        .context("Failed to assemble pipeline")?;

    start_server(config, explainer)
        .await
        .inspect_err(|e| log_fatal(e))
        .context("Server error")?;

    Ok(())
}

fn log_fatal<E: Classify + std::fmt::Display>(e: &E) {
    let classified = e.classify();
    error!(code = %classified.qualified_code(), error = %e, "Exiting");
}
