//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Stride - Project your savings against a long-term goal
#[derive(Parser)]
#[command(name = "stride")]
#[command(about = "Monthly expense projection against a savings goal", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Goal configuration file (TOML)
    ///
    /// Defaults to the data directory override if present, otherwise the
    /// built-in goal. STRIDE_TARGET_AMOUNT and STRIDE_HORIZON_MONTHS
    /// override individual values.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Project monthly savings for an expense request
    Project {
        /// JSON request file ({ monthly_income, expenses: [...] })
        #[arg(short, long)]
        file: PathBuf,

        /// Print the projection as JSON instead of a summary
        #[arg(long)]
        json: bool,

        /// Only validate the request and list any issues
        #[arg(long, conflicts_with = "json")]
        check: bool,
    },

    /// Export the projection as a spreadsheet
    Export {
        /// JSON request file
        #[arg(short, long)]
        file: PathBuf,

        /// Output file
        #[arg(short, long)]
        out: PathBuf,

        /// Output format: xlsx, csv
        #[arg(long, default_value = "xlsx")]
        format: String,
    },

    /// Show the resolved savings goal
    Goal,

    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "8001")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Directory of static UI files to serve
        #[arg(long)]
        static_dir: Option<PathBuf>,

        /// Allowed CORS origin (repeatable)
        #[arg(long = "allow-origin")]
        allow_origins: Vec<String>,
    },
}
