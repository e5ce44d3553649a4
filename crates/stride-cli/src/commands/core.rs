//! Shared command utilities
//!
//! - `load_engine` - Resolve the goal configuration and build the engine
//! - `read_request` - Read a projection request from a JSON file

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use stride_core::{GoalConfig, ProjectionEngine, ProjectionRequest};

/// Resolve the goal (file, data-dir override, env) and build the engine
pub fn load_engine(config: Option<&Path>) -> Result<ProjectionEngine> {
    if let Some(path) = config {
        if !path.exists() {
            anyhow::bail!("Goal config not found: {}", path.display());
        }
    }

    let goal = GoalConfig::from_env(config).context("Failed to load goal configuration")?;
    debug!(
        target_amount = goal.target_amount,
        horizon_months = goal.horizon_months,
        "Loaded goal"
    );
    Ok(ProjectionEngine::new(goal))
}

/// Read a `{ monthly_income, expenses }` request file
pub fn read_request(file: &Path) -> Result<ProjectionRequest> {
    let content = fs::read_to_string(file)
        .with_context(|| format!("Failed to open file: {}", file.display()))?;
    let request = ProjectionRequest::from_json(&content)
        .with_context(|| format!("Invalid request JSON in {}", file.display()))?;
    debug!(entries = request.expenses.len(), "Read projection request");
    Ok(request)
}
