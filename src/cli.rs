//! CLI definitions for homeconsole.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// homeconsole CLI.
#[derive(Parser)]
#[command(name = "homeconsole")]
#[command(about = "Pluggable home-automation console backend")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml", global = true)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Run the console in foreground (default)
    Run {
        /// Gateway host, overrides `server.host`
        #[arg(long)]
        host: Option<String>,

        /// Gateway port, overrides `server.port`
        #[arg(long)]
        port: Option<u16>,
    },

    /// List the built-in modules and whether they are enabled
    Modules,

    /// Validate the configuration file and exit
    Check,
}
