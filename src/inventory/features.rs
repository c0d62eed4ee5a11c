//! Demand features derived from the wide monthly sales record

use crate::inventory::constants::DAYS_PER_YEAR;
use crate::types::{Money, Quantity, SkuId, SkuRecord};
use serde::{Deserialize, Serialize};
use statrs::statistics::{Data, Distribution};

/// Whether enough monthly history was present to derive features
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeatureStatus {
    Complete,
    /// Every monthly quantity was absent
    NoDemandHistory,
}

/// Per-SKU demand and holding-cost figures
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedFeatures {
    pub sku_id: SkuId,
    pub status: FeatureStatus,
    /// Number of monthly values that were present
    pub observed_months: usize,
    pub annual_demand: Quantity,
    pub avg_daily_demand: Quantity,
    pub std_dev_monthly_demand: Quantity,
    pub holding_cost_per_unit_year: Money,
}

impl DerivedFeatures {
    pub fn is_complete(&self) -> bool {
        self.status == FeatureStatus::Complete
    }
}

/// Derive demand features for one SKU.
///
/// Absent months are skipped. The standard deviation is the sample (n - 1)
/// deviation of the present values; a constant series yields exactly 0 and
/// a single present value yields 0.
pub fn derive_features(record: &SkuRecord) -> DerivedFeatures {
    let observed = record.observed_quantities();
    let holding_cost_per_unit_year = record.holding_cost_fraction * record.unit_cost;

    if observed.is_empty() {
        log::warn!("SKU {} has no monthly sales history", record.sku_id);
        return DerivedFeatures {
            sku_id: record.sku_id.clone(),
            status: FeatureStatus::NoDemandHistory,
            observed_months: 0,
            annual_demand: 0.0,
            avg_daily_demand: 0.0,
            std_dev_monthly_demand: 0.0,
            holding_cost_per_unit_year,
        };
    }

    let annual_demand: Quantity = observed.iter().sum();

    DerivedFeatures {
        sku_id: record.sku_id.clone(),
        status: FeatureStatus::Complete,
        observed_months: observed.len(),
        annual_demand,
        avg_daily_demand: annual_demand / DAYS_PER_YEAR,
        std_dev_monthly_demand: sample_std_dev(&observed),
        holding_cost_per_unit_year,
    }
}

fn sample_std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let first = values[0];
    if values.iter().all(|&v| v == first) {
        return 0.0;
    }
    let data = Data::new(values.to_vec());
    data.std_dev().filter(|s| s.is_finite()).unwrap_or(0.0)
}
