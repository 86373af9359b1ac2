//! homeconsole - pluggable home-automation console backend
//!
//! Main entry point for the homeconsole CLI and server.

mod cli;
mod server;

use clap::Parser;

use console_config::ConfigLoader;

use crate::cli::{Cli, Commands};
use crate::server::{init_tracing, known_modules, run_server, validate};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let mut config = ConfigLoader::load_or_default(&cli.config)?;

    init_tracing(&config.logging)?;

    match cli.command {
        None => run_server(config).await,
        Some(Commands::Run { host, port }) => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            run_server(config).await
        }
        Some(Commands::Modules) => {
            let catalog = console_builtins::builtin_catalog()?;
            for (name, required) in known_modules(&catalog) {
                let status = if config.modules.disabled.iter().any(|d| d == name) {
                    "disabled"
                } else {
                    "enabled"
                };
                let kind = if required { "required" } else { "optional" };
                println!("{:<12} {:<9} {}", name, kind, status);
            }
            Ok(())
        }
        Some(Commands::Check) => {
            validate(&config)?;
            println!("{}: ok", cli.config.display());
            Ok(())
        }
    }
}
