use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::ConfigError;

pub const APP_DIR_NAME: &str = "DiskPlanner";
pub const LEDGER_FILE_NAME: &str = "purchases.json";

/// User-tunable planner settings.
///
/// Every field falls back to its default when missing from the file, so
/// older configuration files keep loading as fields are added.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    /// Custom ledger file. Defaults to `<base>/purchases.json`.
    pub ledger_path: Option<PathBuf>,
    pub forecast_horizon: usize,
    pub usage_fraction_min: f64,
    pub usage_fraction_max: f64,
    pub holt_alpha: f64,
    pub holt_beta: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            currency: "USD".into(),
            ledger_path: None,
            forecast_horizon: 6,
            usage_fraction_min: 0.30,
            usage_fraction_max: 0.80,
            holt_alpha: 0.5,
            holt_beta: 0.3,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.currency.trim().is_empty() {
            return Err(ConfigError::Invalid("currency must not be empty".into()));
        }
        if self.forecast_horizon == 0 {
            return Err(ConfigError::Invalid(
                "forecast_horizon must be at least one month".into(),
            ));
        }
        let fraction = |value: f64| (0.0..=1.0).contains(&value);
        if !fraction(self.usage_fraction_min)
            || !fraction(self.usage_fraction_max)
            || self.usage_fraction_min > self.usage_fraction_max
        {
            return Err(ConfigError::Invalid(format!(
                "usage fractions {}..{} must lie within 0..1 with min <= max",
                self.usage_fraction_min, self.usage_fraction_max
            )));
        }
        for (name, value) in [("holt_alpha", self.holt_alpha), ("holt_beta", self.holt_beta)] {
            if !(value > 0.0 && value <= 1.0) {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be in (0, 1], got {value}"
                )));
            }
        }
        Ok(())
    }

    /// Ledger file to use, relative to `base` unless configured explicitly.
    pub fn resolve_ledger_path(&self, base: &Path) -> PathBuf {
        match &self.ledger_path {
            Some(path) => path.clone(),
            None => base.join(LEDGER_FILE_NAME),
        }
    }
}

/// Platform data directory for the planner, e.g. `~/.local/share/DiskPlanner`.
pub fn default_base_dir() -> PathBuf {
    dirs::data_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
}
