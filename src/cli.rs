//! Command-line interface for strictly_rows.

use clap::{Parser, Subcommand};

/// Strictly Rows - multi-player N-in-a-row game server
#[derive(Parser, Debug)]
#[command(name = "strictly_rows")]
#[command(about = "Concurrent N-in-a-row game server", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the game server
    Serve {
        /// Path to a TOML config file
        #[arg(short, long)]
        config: Option<std::path::PathBuf>,

        /// Host to bind to (overrides config and HOST)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (overrides config and PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Print the effective configuration and exit
    CheckConfig {
        /// Path to a TOML config file
        #[arg(short, long)]
        config: Option<std::path::PathBuf>,
    },
}
