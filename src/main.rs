//! Strictly Rows - game server binary.

#![warn(missing_docs)]

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use std::path::Path;
use strictly_rows::transport::{GameHub, serve};
use strictly_rows::{ServerConfig, SessionRegistry, SessionService};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve { config, host, port } => {
            let mut config = load_config(config.as_deref())?;
            if let Some(host) = host {
                config = config.with_host(host);
            }
            if let Some(port) = port {
                config = config.with_port(port);
            }
            run_server(config).await
        }
        Command::CheckConfig { config } => {
            let config = load_config(config.as_deref())?;
            print!("{}", config.to_toml()?);
            Ok(())
        }
    }
}

/// Defaults, then the optional file, then the environment.
fn load_config(path: Option<&Path>) -> Result<ServerConfig> {
    let config = match path {
        Some(path) => ServerConfig::from_file(path)?,
        None => ServerConfig::default(),
    };
    Ok(config.with_env_overrides()?)
}

/// Run the game server
async fn run_server(config: ServerConfig) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_filter())),
        )
        .init();

    info!(
        host = %config.host(),
        port = config.port(),
        max_board_size = config.max_board_size(),
        "Starting Strictly Rows server"
    );

    let service = SessionService::with_registry(SessionRegistry::new(), *config.max_board_size());
    let hub = GameHub::new(service);
    serve(&config, hub).await
}
