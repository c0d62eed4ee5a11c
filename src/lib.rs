//! # Rusty-Inventory
//!
//! Inventory optimisation and demand forecasting for a catalogue of SKUs.
//!
//! From a cleaned table with one row per SKU (twelve months of sales for a
//! reference year, lead time, costs and a service-level target) the crate
//! derives demand features, the Economic Order Quantity, safety stock and
//! reorder point, reshapes the monthly columns into a long time series and
//! forecasts the next months with the best of four baseline models.
//!
//! ## Example
//!
//! ```rust,no_run
//! use rusty_inventory::prelude::*;
//! use std::path::Path;
//!
//! fn main() -> Result<()> {
//!     let records = SkuTableReader::new().read_path(Path::new("skus.csv"))?;
//!     let config = PipelineConfig::default();
//!     let output = InventoryPipeline::new(config.clone())?.run(&records)?;
//!     write_all(&output, &config.output)?;
//!     Ok(())
//! }
//! ```

pub mod calendar;
pub mod config;
pub mod data;
pub mod error;
pub mod forecast;
pub mod inventory;
pub mod pipeline;
pub mod report;
pub mod types;

pub mod prelude {
    //! Commonly used types and functions
    pub use crate::calendar::Month;
    pub use crate::config::{OutputConfig, PipelineConfig};
    pub use crate::data::{SkuTableReader, TimeSeriesPoint, TimeSeriesReshaper};
    pub use crate::error::{InventoryError, ModelError, Result};
    pub use crate::forecast::{ForecastEngine, ForecastOutcome, ForecastResult, ModelKind};
    pub use crate::inventory::{
        calculate_eoq, calculate_safety_stock, derive_features, EoqOutcome, SafetyStockOutcome,
        ZScoreTable,
    };
    pub use crate::pipeline::{InventoryPipeline, PipelineOutput, PipelineSummary};
    pub use crate::report::write_all;
    pub use crate::types::*;
}
