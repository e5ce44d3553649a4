//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Shared utilities (load_engine, read_request)
//! - `project` - Projection summary and goal commands
//! - `export` - Spreadsheet export command
//! - `serve` - Web server command

pub mod core;
pub mod export;
pub mod project;
pub mod serve;

// Re-export command functions for main.rs
pub use core::*;
pub use export::*;
pub use project::*;
pub use serve::*;
