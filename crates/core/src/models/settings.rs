use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::errors::CoreError;

/// Runtime configuration. Fields missing from a settings file take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// CSV holding the persisted allocation (`Date,Ticker,Weight`).
    pub portfolio_file: PathBuf,

    /// CSV holding the benchmark registry (`Name,Tickers,Weights`).
    pub benchmark_file: PathBuf,

    /// Optional API keys for providers that require them.
    /// Keys: provider name (e.g., "alphavantage").
    /// Values: the API key string.
    pub api_keys: HashMap<String, String>,

    /// Reuse price histories fetched earlier the same day.
    pub cache_prices: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            portfolio_file: PathBuf::from("data/portfolio.csv"),
            benchmark_file: PathBuf::from("data/benchmarks.csv"),
            api_keys: HashMap::new(),
            cache_prices: true,
        }
    }
}

impl Settings {
    /// Read settings from a JSON file.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, CoreError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize settings: {e}")))
    }

    /// Write settings as pretty JSON, creating parent directories as needed.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), CoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}
