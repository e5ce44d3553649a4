//! Stride CLI - Monthly expense projection
//!
//! Usage:
//!   stride project --file req.json          Summarize savings against the goal
//!   stride export --file req.json --out x   Write an XLSX or CSV report
//!   stride goal                             Show the configured goal
//!   stride serve --port 8001                Start web server

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let config = cli.config.as_deref();

    match cli.command {
        Commands::Project { file, json, check } => {
            commands::cmd_project(config, &file, json, check)
        }
        Commands::Export { file, out, format } => {
            commands::cmd_export(config, &file, &out, &format)
        }
        Commands::Goal => commands::cmd_goal(config),
        Commands::Serve {
            port,
            host,
            static_dir,
            allow_origins,
        } => {
            commands::cmd_serve(config, &host, port, static_dir.as_deref(), allow_origins)
                .await
        }
    }
}
