//! Batch pipeline: features, EOQ, safety stock, time series and forecasts
//! for every SKU
//!
//! Each SKU is processed by a pure function of its record and the shared,
//! read-only configuration, so the batch runs on a rayon pool without any
//! synchronisation. Output tables are sorted by `sku_id` afterwards.

use crate::config::PipelineConfig;
use crate::data::timeseries::{TimeSeriesPoint, TimeSeriesReshaper};
use crate::error::{InventoryError, Result};
use crate::forecast::{ForecastEngine, ForecastResult, ModelKind};
use crate::inventory::{
    calculate_eoq, calculate_safety_stock, derive_features, DerivedFeatures, EoqResult,
    SafetyStockResult,
};
use crate::types::SkuRecord;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Identity labels carried into every output table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkuIdentity {
    pub sku_id: String,
    pub product_name: String,
    pub category: String,
    pub sub_category: String,
}

impl From<&SkuRecord> for SkuIdentity {
    fn from(record: &SkuRecord) -> Self {
        Self {
            sku_id: record.sku_id.clone(),
            product_name: record.product_name.clone(),
            category: record.category.clone(),
            sub_category: record.sub_category.clone(),
        }
    }
}

/// Everything computed for one SKU
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkuReport {
    pub identity: SkuIdentity,
    pub features: DerivedFeatures,
    pub eoq: EoqResult,
    pub safety_stock: SafetyStockResult,
    pub timeseries: Vec<TimeSeriesPoint>,
    pub forecast: ForecastResult,
}

/// Run-level counts
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineSummary {
    pub sku_count: usize,
    pub no_history: usize,
    pub undefined_eoq: usize,
    pub undefined_safety_stock: usize,
    pub unavailable_forecasts: usize,
    /// How often each model was selected
    pub model_counts: BTreeMap<ModelKind, usize>,
}

impl PipelineSummary {
    fn from_reports(reports: &[SkuReport]) -> Self {
        let mut summary = PipelineSummary {
            sku_count: reports.len(),
            ..Default::default()
        };
        for report in reports {
            if !report.features.is_complete() {
                summary.no_history += 1;
            }
            if !report.eoq.outcome.is_defined() {
                summary.undefined_eoq += 1;
            }
            if report.safety_stock.outcome.value().is_none() {
                summary.undefined_safety_stock += 1;
            }
            match report.forecast.chosen_model() {
                Some(model) => *summary.model_counts.entry(model).or_insert(0) += 1,
                None => summary.unavailable_forecasts += 1,
            }
        }
        summary
    }
}

/// Per-SKU reports sorted by `sku_id`, plus a summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineOutput {
    pub reports: Vec<SkuReport>,
    pub summary: PipelineSummary,
}

impl PipelineOutput {
    pub fn features(&self) -> impl Iterator<Item = &DerivedFeatures> {
        self.reports.iter().map(|r| &r.features)
    }

    pub fn eoq(&self) -> impl Iterator<Item = &EoqResult> {
        self.reports.iter().map(|r| &r.eoq)
    }

    pub fn safety_stock(&self) -> impl Iterator<Item = &SafetyStockResult> {
        self.reports.iter().map(|r| &r.safety_stock)
    }

    /// Long time-series table ordered by `(sku_id, date)`
    pub fn timeseries(&self) -> impl Iterator<Item = &TimeSeriesPoint> {
        self.reports.iter().flat_map(|r| r.timeseries.iter())
    }

    pub fn forecasts(&self) -> impl Iterator<Item = &ForecastResult> {
        self.reports.iter().map(|r| &r.forecast)
    }

    pub fn report(&self, sku_id: &str) -> Option<&SkuReport> {
        self.reports
            .binary_search_by(|r| r.identity.sku_id.as_str().cmp(sku_id))
            .ok()
            .map(|i| &self.reports[i])
    }
}

/// Inventory optimisation and forecasting pipeline
pub struct InventoryPipeline {
    config: PipelineConfig,
    reshaper: TimeSeriesReshaper,
    engine: ForecastEngine,
}

impl InventoryPipeline {
    /// Build a pipeline, validating the configuration
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        let reshaper = TimeSeriesReshaper::new(config.calendar.reference_year)?;
        let engine = ForecastEngine::new(config.forecast.horizon, config.forecast.sma_window);
        Ok(Self {
            config,
            reshaper,
            engine,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Process one SKU end to end
    pub fn process_sku(&self, record: &SkuRecord) -> SkuReport {
        let features = derive_features(record);
        let eoq = calculate_eoq(&features, record.ordering_cost);
        let safety_stock = calculate_safety_stock(
            &features,
            record.lead_time_days,
            record.service_level_target,
            &self.config.service_levels,
        );
        let timeseries = self.reshaper.reshape_record(record);
        let forecast = self.engine.forecast_sku(&record.sku_id, &timeseries);

        SkuReport {
            identity: SkuIdentity::from(record),
            features,
            eoq,
            safety_stock,
            timeseries,
            forecast,
        }
    }

    /// Run every SKU.
    ///
    /// Invalid records and duplicate ids are fatal and detected before any
    /// SKU is processed. Per-SKU numeric problems never fail the run; they
    /// show up as markers in the reports.
    pub fn run(&self, records: &[SkuRecord]) -> Result<PipelineOutput> {
        log::info!("=== Validation ===");
        let mut seen = HashSet::new();
        for record in records {
            record.validate()?;
            if !seen.insert(record.sku_id.as_str()) {
                return Err(InventoryError::DataError(format!(
                    "duplicate SKU id '{}'",
                    record.sku_id
                )));
            }
        }

        log::info!("=== Processing {} SKUs ===", records.len());
        let mut reports = match self.config.workers {
            Some(threads) => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build()
                    .map_err(|e| InventoryError::ConfigError(format!("worker pool: {}", e)))?;
                pool.install(|| self.process_all(records))
            }
            None => self.process_all(records),
        };
        reports.sort_by(|a, b| a.identity.sku_id.cmp(&b.identity.sku_id));

        let summary = PipelineSummary::from_reports(&reports);
        log::info!("=== Pipeline complete ===");
        log::info!(
            "{} SKUs: {} undefined EOQ, {} unavailable forecasts",
            summary.sku_count,
            summary.undefined_eoq,
            summary.unavailable_forecasts
        );

        Ok(PipelineOutput { reports, summary })
    }

    fn process_all(&self, records: &[SkuRecord]) -> Vec<SkuReport> {
        records.par_iter().map(|r| self.process_sku(r)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forecast::ForecastOutcome;
    use crate::inventory::{EoqOutcome, SafetyStockOutcome, UndefinedEoq};

    fn records() -> Vec<SkuRecord> {
        let mut empty = SkuRecord::new("SKU-C", [0.0; 12])
            .with_costs(50.0, 10.0, 0.25)
            .with_service(5.0, 0.95);
        empty.monthly_qty = [None; 12];

        vec![
            SkuRecord::new("SKU-B", [100.0; 12])
                .with_costs(50.0, 10.0, 0.25)
                .with_service(7.0, 0.95),
            SkuRecord::new(
                "SKU-A",
                [12.0, 15.0, 11.0, 18.0, 20.0, 17.0, 22.0, 25.0, 21.0, 27.0, 30.0, 26.0],
            )
            .with_costs(80.0, 4.0, 0.0)
            .with_service(10.0, 0.965),
            empty,
        ]
    }

    #[test]
    fn test_run_produces_one_row_per_sku_sorted() {
        let pipeline = InventoryPipeline::new(PipelineConfig::default()).unwrap();
        let output = pipeline.run(&records()).unwrap();

        let ids: Vec<&str> = output.reports.iter().map(|r| r.identity.sku_id.as_str()).collect();
        assert_eq!(ids, vec!["SKU-A", "SKU-B", "SKU-C"]);
        assert_eq!(output.timeseries().count(), 36);
        assert_eq!(output.summary.sku_count, 3);
        assert_eq!(pipeline.config().forecast.horizon, 3);
    }

    #[test]
    fn test_markers_instead_of_missing_rows() {
        let pipeline = InventoryPipeline::new(PipelineConfig::default()).unwrap();
        let output = pipeline.run(&records()).unwrap();

        // Zero holding cost fraction
        let a = output.report("SKU-A").unwrap();
        assert_eq!(
            a.eoq.outcome,
            EoqOutcome::Undefined(UndefinedEoq::NonPositiveHoldingCost)
        );
        assert!(a.forecast.forecast().is_some());

        let c = output.report("SKU-C").unwrap();
        assert_eq!(
            c.eoq.outcome,
            EoqOutcome::Undefined(UndefinedEoq::NoDemandHistory)
        );
        assert_eq!(c.safety_stock.outcome, SafetyStockOutcome::Undefined);
        assert_eq!(c.forecast.outcome, ForecastOutcome::Unavailable);
        assert_eq!(c.timeseries.len(), 12);

        assert_eq!(output.summary.undefined_eoq, 2);
        assert_eq!(output.summary.unavailable_forecasts, 1);
        assert_eq!(output.summary.no_history, 1);
    }

    #[test]
    fn test_sequential_and_parallel_agree() {
        let parallel = InventoryPipeline::new(PipelineConfig::default())
            .unwrap()
            .run(&records())
            .unwrap();
        let config = PipelineConfig {
            workers: Some(1),
            ..PipelineConfig::default()
        };
        let sequential = InventoryPipeline::new(config).unwrap().run(&records()).unwrap();
        assert_eq!(parallel, sequential);
    }

    #[test]
    fn test_duplicate_ids_are_fatal() {
        let mut recs = records();
        recs.push(recs[0].clone());
        let pipeline = InventoryPipeline::new(PipelineConfig::default()).unwrap();
        assert!(matches!(pipeline.run(&recs), Err(InventoryError::DataError(_))));
    }

    #[test]
    fn test_invalid_record_is_fatal() {
        let mut recs = records();
        recs[1].lead_time_days = -3.0;
        let pipeline = InventoryPipeline::new(PipelineConfig::default()).unwrap();
        assert!(matches!(
            pipeline.run(&recs),
            Err(InventoryError::InvalidRecord { .. })
        ));
    }

    #[test]
    fn test_constant_sku_forecast() {
        let pipeline = InventoryPipeline::new(PipelineConfig::default()).unwrap();
        let output = pipeline.run(&records()).unwrap();
        let b = output.report("SKU-B").unwrap();
        assert_eq!(b.forecast.chosen_model(), Some(ModelKind::Naive));
        assert_eq!(b.safety_stock.outcome.value().unwrap().safety_stock, 0.0);
    }
}
