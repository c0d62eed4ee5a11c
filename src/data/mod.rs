//! Input table reading and time-series reshaping

pub mod reader;
pub mod timeseries;

pub use reader::{required_columns, SkuTableReader};
pub use timeseries::{group_by_sku, observed, TimeSeriesPoint, TimeSeriesReshaper};
