//! OAuth Relay - Entry Point

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use oauth_relay::{config::Config, server::RelayServer};

#[derive(Parser, Debug)]
#[command(name = "oauth-relay")]
#[command(about = "OAuth2 authorization-code relay")]
#[command(version)]
struct Cli {
    /// HTTP server port (overrides HTTP_PORT)
    #[arg(long)]
    port: Option<u16>,

    /// Environment file to load before reading configuration
    #[arg(long, default_value = ".env")]
    env_file: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,
}

fn init_tracing(log_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if json {
        subscriber.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        subscriber.with(tracing_subscriber::fmt::layer().compact()).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(&cli.log_level, cli.json_logs);

    match dotenv::from_path(&cli.env_file) {
        Ok(()) => tracing::debug!(path = %cli.env_file.display(), "Loaded environment file"),
        Err(e) if e.not_found() => {
            tracing::debug!(path = %cli.env_file.display(), "No environment file, using process env");
        }
        Err(e) => {
            return Err(e).with_context(|| format!("Error loading {}", cli.env_file.display()));
        }
    }

    let mut config = Config::from_env().context("Invalid configuration")?;
    if let Some(port) = cli.port {
        config.port = port;
    }

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        auth_url = %config.auth_url,
        scopes = ?config.scopes,
        "Starting OAuth relay"
    );

    RelayServer::new(&config)?.run().await
}
