//! Savings goal configuration
//!
//! The goal (target amount and horizon) is bound into the projection engine
//! at construction instead of being hardcoded in the aggregation code.
//!
//! ## Configuration Resolution
//!
//! Config is loaded with a two-layer resolution:
//! 1. Check for override in data dir (~/.local/share/stride/config/goal.toml)
//! 2. Fall back to embedded defaults (compiled into binary)
//!
//! `STRIDE_TARGET_AMOUNT` and `STRIDE_HORIZON_MONTHS` override either layer.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/goal.toml");

/// One crore
pub const DEFAULT_TARGET_AMOUNT: f64 = 10_000_000.0;

/// Five years
pub const DEFAULT_HORIZON_MONTHS: u32 = 60;

/// Long-term savings target
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GoalConfig {
    pub target_amount: f64,
    pub horizon_months: u32,
}

impl Default for GoalConfig {
    fn default() -> Self {
        Self {
            target_amount: DEFAULT_TARGET_AMOUNT,
            horizon_months: DEFAULT_HORIZON_MONTHS,
        }
    }
}

impl GoalConfig {
    /// Build a goal, rejecting non-positive targets and zero-length horizons
    pub fn new(target_amount: f64, horizon_months: u32) -> Result<Self> {
        let config = Self {
            target_amount,
            horizon_months,
        };
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` if it exists, else the data-dir override, else the
    /// embedded defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let content = match path.map(Path::to_path_buf).or_else(default_config_path) {
            Some(p) if p.exists() => fs::read_to_string(&p).map_err(|e| {
                Error::Config(format!("Failed to read {}: {}", p.display(), e))
            })?,
            _ => DEFAULT_CONFIG.to_string(),
        };

        parse_config(&content)
    }

    /// Like [`GoalConfig::load`], then apply environment overrides
    pub fn from_env(path: Option<&Path>) -> Result<Self> {
        let target = std::env::var("STRIDE_TARGET_AMOUNT").ok();
        let months = std::env::var("STRIDE_HORIZON_MONTHS").ok();
        Self::load(path)?.with_overrides(target.as_deref(), months.as_deref())
    }

    /// Apply raw `STRIDE_TARGET_AMOUNT` / `STRIDE_HORIZON_MONTHS` values,
    /// then validate the result
    pub fn with_overrides(mut self, target: Option<&str>, months: Option<&str>) -> Result<Self> {
        if let Some(target) = target {
            self.target_amount = target.trim().parse().map_err(|_| {
                Error::Config(format!("STRIDE_TARGET_AMOUNT is not a number: {}", target))
            })?;
        }
        if let Some(months) = months {
            self.horizon_months = months.trim().parse().map_err(|_| {
                Error::Config(format!(
                    "STRIDE_HORIZON_MONTHS is not a whole number: {}",
                    months
                ))
            })?;
        }

        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.target_amount.is_finite() || self.target_amount <= 0.0 {
            return Err(Error::Config(format!(
                "target_amount must be a positive number, got {}",
                self.target_amount
            )));
        }
        if self.horizon_months == 0 {
            return Err(Error::Config(
                "horizon_months must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Monthly savings needed to reach the target within the horizon
    pub fn required_monthly_savings(&self) -> f64 {
        self.target_amount / f64::from(self.horizon_months)
    }

    pub fn years(&self) -> f64 {
        f64::from(self.horizon_months) / 12.0
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("stride").join("config").join("goal.toml"))
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawConfig {
    goal: Option<RawGoal>,
}

#[derive(Debug, Deserialize)]
struct RawGoal {
    target_amount: Option<f64>,
    horizon_months: Option<u32>,
}

/// Parse config from TOML content
fn parse_config(content: &str) -> Result<GoalConfig> {
    let raw: RawConfig = toml::from_str(content)
        .map_err(|e| Error::Config(format!("Invalid goal TOML: {}", e)))?;

    let mut config = GoalConfig::default();

    if let Some(goal) = raw.goal {
        if let Some(target) = goal.target_amount {
            config.target_amount = target;
        }
        if let Some(months) = goal.horizon_months {
            config.horizon_months = months;
        }
    }

    config.validate()?;
    Ok(config)
}
