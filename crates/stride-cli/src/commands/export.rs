//! Export command implementation

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use stride_core::{export_request, ExportFormat};

use super::{load_engine, read_request};

pub fn cmd_export(config: Option<&Path>, file: &Path, out: &Path, format: &str) -> Result<()> {
    let format: ExportFormat = format.parse().map_err(anyhow::Error::msg)?;
    let engine = load_engine(config)?;
    let request = read_request(file)?;

    println!("📦 Exporting {} expenses as {}...", request.expenses.len(), format);

    let bytes = export_request(&engine, &request, format).context("Export failed")?;
    fs::write(out, &bytes).with_context(|| format!("Failed to write {}", out.display()))?;

    println!("✅ Wrote {} ({} bytes)", out.display(), bytes.len());
    Ok(())
}
