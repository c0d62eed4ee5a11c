//! CSV and JSON export of pipeline results
//!
//! Every table has one row per SKU (the time-series and forecast tables have
//! one row per SKU per month). Values that could not be computed are written
//! as `undefined` or `unavailable`, never left out.

use crate::config::OutputConfig;
use crate::error::Result;
use crate::forecast::{ForecastOutcome, ForecastResult, ModelKind};
use crate::inventory::{EoqOutcome, FeatureStatus, SafetyStockOutcome};
use crate::pipeline::{PipelineOutput, SkuReport};
use serde::{Serialize, Serializer};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Marker for inventory figures that are not defined
pub const UNDEFINED: &str = "undefined";

/// Marker for a forecast that could not be produced
pub const UNAVAILABLE: &str = "unavailable";

/// A numeric cell that may carry a marker instead of a value
#[derive(Debug, Clone, Copy, PartialEq)]
enum Cell {
    Value(f64),
    Marker(&'static str),
}

impl Cell {
    fn or_undefined(value: Option<f64>) -> Self {
        value.map(Cell::Value).unwrap_or(Cell::Marker(UNDEFINED))
    }
}

impl Serialize for Cell {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Cell::Value(v) => serializer.serialize_f64(*v),
            Cell::Marker(m) => serializer.serialize_str(m),
        }
    }
}

#[derive(Debug, Serialize)]
struct FeatureRow<'a> {
    sku_id: &'a str,
    product_name: &'a str,
    category: &'a str,
    sub_category: &'a str,
    observed_months: usize,
    annual_demand: Cell,
    avg_daily_demand: Cell,
    std_dev_monthly_demand: Cell,
    holding_cost_per_unit_year: f64,
}

impl<'a> From<&'a SkuReport> for FeatureRow<'a> {
    fn from(report: &'a SkuReport) -> Self {
        let f = &report.features;
        let defined = |v: f64| match f.status {
            FeatureStatus::Complete => Cell::Value(v),
            FeatureStatus::NoDemandHistory => Cell::Marker(UNDEFINED),
        };
        Self {
            sku_id: &report.identity.sku_id,
            product_name: &report.identity.product_name,
            category: &report.identity.category,
            sub_category: &report.identity.sub_category,
            observed_months: f.observed_months,
            annual_demand: defined(f.annual_demand),
            avg_daily_demand: defined(f.avg_daily_demand),
            std_dev_monthly_demand: defined(f.std_dev_monthly_demand),
            holding_cost_per_unit_year: f.holding_cost_per_unit_year,
        }
    }
}

#[derive(Debug, Serialize)]
struct EoqRow<'a> {
    sku_id: &'a str,
    product_name: &'a str,
    category: &'a str,
    sub_category: &'a str,
    eoq: Cell,
    orders_per_year: Cell,
    annual_total_cost: Cell,
    status: &'static str,
}

impl<'a> From<&'a SkuReport> for EoqRow<'a> {
    fn from(report: &'a SkuReport) -> Self {
        let (eoq, orders, cost, status) = match report.eoq.outcome {
            EoqOutcome::Defined(v) => (
                Cell::Value(v.eoq),
                Cell::Value(v.orders_per_year),
                Cell::Value(v.annual_total_cost),
                "defined",
            ),
            EoqOutcome::Undefined(reason) => (
                Cell::Marker(UNDEFINED),
                Cell::Marker(UNDEFINED),
                Cell::Marker(UNDEFINED),
                reason.as_str(),
            ),
        };
        Self {
            sku_id: &report.identity.sku_id,
            product_name: &report.identity.product_name,
            category: &report.identity.category,
            sub_category: &report.identity.sub_category,
            eoq,
            orders_per_year: orders,
            annual_total_cost: cost,
            status,
        }
    }
}

#[derive(Debug, Serialize)]
struct SafetyStockRow<'a> {
    sku_id: &'a str,
    product_name: &'a str,
    category: &'a str,
    sub_category: &'a str,
    service_level_matched: Cell,
    z_score: Cell,
    safety_stock: Cell,
    reorder_point: Cell,
}

impl<'a> From<&'a SkuReport> for SafetyStockRow<'a> {
    fn from(report: &'a SkuReport) -> Self {
        let value = match report.safety_stock.outcome {
            SafetyStockOutcome::Defined(v) => Some(v),
            SafetyStockOutcome::Undefined => None,
        };
        Self {
            sku_id: &report.identity.sku_id,
            product_name: &report.identity.product_name,
            category: &report.identity.category,
            sub_category: &report.identity.sub_category,
            service_level_matched: Cell::or_undefined(value.map(|v| v.matched_level)),
            z_score: Cell::or_undefined(value.map(|v| v.z_score)),
            safety_stock: Cell::or_undefined(value.map(|v| v.safety_stock)),
            reorder_point: Cell::or_undefined(value.map(|v| v.reorder_point)),
        }
    }
}

#[derive(Debug, Serialize)]
struct ForecastRow<'a> {
    sku_id: &'a str,
    chosen_model: &'static str,
    rmse_naive: f64,
    rmse_sma: f64,
    rmse_ses: f64,
    rmse_holt: f64,
    step: Option<usize>,
    date: Option<String>,
    forecast_value: Option<f64>,
}

fn forecast_rows(result: &ForecastResult) -> Vec<ForecastRow<'_>> {
    let row = |chosen_model, step, date, forecast_value| ForecastRow {
        sku_id: &result.sku_id,
        chosen_model,
        rmse_naive: result.rmse(ModelKind::Naive),
        rmse_sma: result.rmse(ModelKind::Sma),
        rmse_ses: result.rmse(ModelKind::Ses),
        rmse_holt: result.rmse(ModelKind::Holt),
        step,
        date,
        forecast_value,
    };

    match &result.outcome {
        ForecastOutcome::Available(forecast) => forecast
            .points
            .iter()
            .enumerate()
            .map(|(i, p)| {
                row(
                    forecast.chosen_model.as_str(),
                    Some(i + 1),
                    Some(p.date.format("%Y-%m-%d").to_string()),
                    Some(p.value),
                )
            })
            .collect(),
        ForecastOutcome::Unavailable => vec![row(UNAVAILABLE, None, None, None)],
    }
}

fn write_rows<T: Serialize>(path: &Path, rows: impl IntoIterator<Item = T>) -> Result<usize> {
    let mut wtr = csv::Writer::from_path(path)?;
    let mut count = 0;
    for row in rows {
        wtr.serialize(row)?;
        count += 1;
    }
    wtr.flush()?;
    log::info!("Exported {} rows to '{}'", count, path.display());
    Ok(count)
}

/// Paths of every written artefact
#[derive(Debug, Clone, PartialEq)]
pub struct WrittenFiles {
    pub features: PathBuf,
    pub eoq: PathBuf,
    pub safety_stock: PathBuf,
    pub timeseries: PathBuf,
    pub forecasts: PathBuf,
    pub diagnostics: PathBuf,
}

pub fn write_features(path: &Path, output: &PipelineOutput) -> Result<usize> {
    write_rows(path, output.reports.iter().map(FeatureRow::from))
}

pub fn write_eoq(path: &Path, output: &PipelineOutput) -> Result<usize> {
    write_rows(path, output.reports.iter().map(EoqRow::from))
}

pub fn write_safety_stock(path: &Path, output: &PipelineOutput) -> Result<usize> {
    write_rows(path, output.reports.iter().map(SafetyStockRow::from))
}

pub fn write_timeseries(path: &Path, output: &PipelineOutput) -> Result<usize> {
    write_rows(path, output.timeseries())
}

pub fn write_forecasts(path: &Path, output: &PipelineOutput) -> Result<usize> {
    write_rows(path, output.forecasts().flat_map(forecast_rows))
}

/// Full per-SKU forecast diagnostics as pretty JSON
pub fn write_diagnostics(path: &Path, output: &PipelineOutput) -> Result<()> {
    let results: Vec<&ForecastResult> = output.forecasts().collect();
    let mut file = fs::File::create(path)?;
    serde_json::to_writer_pretty(&mut file, &results)?;
    file.write_all(b"\n")?;
    log::info!("Exported diagnostics for {} SKUs to '{}'", results.len(), path.display());
    Ok(())
}

/// Write every output table into the configured directory
pub fn write_all(output: &PipelineOutput, config: &OutputConfig) -> Result<WrittenFiles> {
    fs::create_dir_all(&config.dir)?;
    let files = WrittenFiles {
        features: config.path(&config.features_file),
        eoq: config.path(&config.eoq_file),
        safety_stock: config.path(&config.safety_stock_file),
        timeseries: config.path(&config.timeseries_file),
        forecasts: config.path(&config.forecast_file),
        diagnostics: config.path(&config.diagnostics_file),
    };

    write_features(&files.features, output)?;
    write_eoq(&files.eoq, output)?;
    write_safety_stock(&files.safety_stock, output)?;
    write_timeseries(&files.timeseries, output)?;
    write_forecasts(&files.forecasts, output)?;
    write_diagnostics(&files.diagnostics, output)?;

    Ok(files)
}
