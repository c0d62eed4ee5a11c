//! Pipeline configuration
//!
//! Loaded from a TOML file; every section and field is optional.
//!
//! ```toml
//! workers = 4
//!
//! [forecast]
//! horizon = 6
//! sma_window = 3
//!
//! [calendar]
//! reference_year = 2025
//!
//! [[service_levels]]
//! level = 0.95
//! z = 1.65
//!
//! [output]
//! dir = "output"
//! ```

use crate::data::timeseries::DEFAULT_REFERENCE_YEAR;
use crate::error::{InventoryError, Result};
use crate::forecast::{DEFAULT_HORIZON, DEFAULT_SMA_WINDOW};
use crate::inventory::ZScoreTable;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Longest accepted forecast horizon, in months
pub const MAX_HORIZON: usize = 1200;
/// Accepted range for `calendar.reference_year`
pub const REFERENCE_YEAR_RANGE: std::ops::RangeInclusive<i32> = 1900..=9999;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ForecastConfig {
    pub horizon: usize,
    pub sma_window: usize,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            horizon: DEFAULT_HORIZON,
            sma_window: DEFAULT_SMA_WINDOW,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CalendarConfig {
    /// Year the twelve monthly columns belong to
    pub reference_year: i32,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            reference_year: DEFAULT_REFERENCE_YEAR,
        }
    }
}

/// Output locations, file names relative to `dir`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub dir: PathBuf,
    pub features_file: String,
    pub eoq_file: String,
    pub safety_stock_file: String,
    pub timeseries_file: String,
    pub forecast_file: String,
    pub diagnostics_file: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("output"),
            features_file: "inventory_features.csv".to_string(),
            eoq_file: "inventory_eoq.csv".to_string(),
            safety_stock_file: "safety_stock_and_rop.csv".to_string(),
            timeseries_file: "inventory_timeseries.csv".to_string(),
            forecast_file: "forecasts.csv".to_string(),
            diagnostics_file: "forecast_diagnostics.json".to_string(),
        }
    }
}

impl OutputConfig {
    pub fn path(&self, file: &str) -> PathBuf {
        self.dir.join(file)
    }
}

/// Complete pipeline configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    pub forecast: ForecastConfig,
    pub calendar: CalendarConfig,
    /// Service level -> Z-score table
    pub service_levels: ZScoreTable,
    /// Worker threads for the per-SKU batch; `None` uses the rayon default
    pub workers: Option<usize>,
    pub output: OutputConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            forecast: ForecastConfig::default(),
            calendar: CalendarConfig::default(),
            service_levels: ZScoreTable::default(),
            workers: None,
            output: OutputConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: PipelineConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file; a missing file yields the defaults
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::info!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)?;
        let config = Self::from_toml_str(&contents)?;
        log::info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.forecast.horizon == 0 {
            return Err(InventoryError::ConfigError(
                "forecast.horizon must be at least 1".to_string(),
            ));
        }
        if self.forecast.horizon > MAX_HORIZON {
            return Err(InventoryError::ConfigError(format!(
                "forecast.horizon must be at most {}, got {}",
                MAX_HORIZON, self.forecast.horizon
            )));
        }
        if self.forecast.sma_window == 0 {
            return Err(InventoryError::ConfigError(
                "forecast.sma_window must be at least 1".to_string(),
            ));
        }
        if self.workers == Some(0) {
            return Err(InventoryError::ConfigError(
                "workers must be at least 1".to_string(),
            ));
        }
        if !REFERENCE_YEAR_RANGE.contains(&self.calendar.reference_year) {
            return Err(InventoryError::ConfigError(format!(
                "calendar.reference_year must be between {} and {}, got {}",
                REFERENCE_YEAR_RANGE.start(),
                REFERENCE_YEAR_RANGE.end(),
                self.calendar.reference_year
            )));
        }
        crate::calendar::reference_months(self.calendar.reference_year)?;
        Ok(())
    }
}
