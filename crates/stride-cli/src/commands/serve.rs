//! Server command implementation

use std::path::Path;

use anyhow::{Context, Result};

use super::load_engine;

pub async fn cmd_serve(
    config: Option<&Path>,
    host: &str,
    port: u16,
    static_dir: Option<&Path>,
    allowed_origins: Vec<String>,
) -> Result<()> {
    let engine = load_engine(config)?;
    let goal = engine.goal();

    println!("🚀 Starting Stride web server...");
    println!("   Listening: http://{}:{}", host, port);
    println!(
        "   Goal: {:.2} over {} months",
        goal.target_amount, goal.horizon_months
    );
    if let Some(dir) = static_dir {
        println!("   Static files: {}", dir.display());
    }
    if !allowed_origins.is_empty() {
        println!("   🌐 CORS origins: {}", allowed_origins.join(", "));
    }
    println!();
    println!("   Press Ctrl+C to stop");

    let static_dir_str = static_dir
        .map(|p| {
            p.to_str()
                .with_context(|| format!("Static dir is not valid UTF-8: {}", p.display()))
        })
        .transpose()?;

    let config = stride_server::ServerConfig { allowed_origins };
    stride_server::serve_with_config(engine, host, port, static_dir_str, config).await?;

    Ok(())
}
