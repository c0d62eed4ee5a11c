//! Safety stock and reorder point
//!
//! `safety_stock = z * std_dev_monthly_demand * sqrt(lead_time_days)` and
//! `reorder_point = avg_daily_demand * lead_time_days + safety_stock`, where
//! `z` comes from a fixed service-level table.

use crate::error::{InventoryError, Result};
use crate::inventory::constants::{DEFAULT_Z_TABLE, Z_TIE_TOLERANCE};
use crate::inventory::features::{DerivedFeatures, FeatureStatus};
use crate::types::{Percentage, Quantity, SkuId};
use serde::{Deserialize, Serialize};

/// One row of the service-level table
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ServiceLevelZ {
    pub level: Percentage,
    pub z: f64,
}

/// Service level -> Z-score table, kept sorted by service level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<ServiceLevelZ>", into = "Vec<ServiceLevelZ>")]
pub struct ZScoreTable {
    entries: Vec<ServiceLevelZ>,
}

impl ZScoreTable {
    /// Build a table from arbitrary-order entries
    pub fn new(mut entries: Vec<ServiceLevelZ>) -> Result<Self> {
        if entries.is_empty() {
            return Err(InventoryError::ConfigError(
                "service level table must not be empty".to_string(),
            ));
        }
        for entry in &entries {
            if !(entry.level > 0.0 && entry.level < 1.0) {
                return Err(InventoryError::ConfigError(format!(
                    "service level {} must be within (0, 1)",
                    entry.level
                )));
            }
            if !(entry.z > 0.0) || !entry.z.is_finite() {
                return Err(InventoryError::ConfigError(format!(
                    "z-score {} for service level {} must be positive",
                    entry.z, entry.level
                )));
            }
        }
        entries.sort_by(|a, b| a.level.total_cmp(&b.level));
        if let Some(pair) = entries.windows(2).find(|w| w[0].level == w[1].level) {
            return Err(InventoryError::ConfigError(format!(
                "duplicate service level {} in table",
                pair[0].level
            )));
        }
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[ServiceLevelZ] {
        &self.entries
    }

    /// Nearest table entry to `service_level`.
    ///
    /// Entries are scanned in ascending level order and a later entry only
    /// replaces the current best when strictly closer, so equidistant
    /// targets resolve to the lower level.
    pub fn nearest(&self, service_level: Percentage) -> ServiceLevelZ {
        let mut best = self.entries[0];
        let mut best_distance = (best.level - service_level).abs();
        for entry in &self.entries[1..] {
            let distance = (entry.level - service_level).abs();
            if distance < best_distance - Z_TIE_TOLERANCE {
                best = *entry;
                best_distance = distance;
            }
        }
        best
    }

    /// Z-score of the nearest table entry
    pub fn z_score(&self, service_level: Percentage) -> f64 {
        self.nearest(service_level).z
    }
}

impl Default for ZScoreTable {
    fn default() -> Self {
        Self {
            entries: DEFAULT_Z_TABLE
                .iter()
                .map(|&(level, z)| ServiceLevelZ { level, z })
                .collect(),
        }
    }
}

impl TryFrom<Vec<ServiceLevelZ>> for ZScoreTable {
    type Error = InventoryError;

    fn try_from(entries: Vec<ServiceLevelZ>) -> Result<Self> {
        Self::new(entries)
    }
}

impl From<ZScoreTable> for Vec<ServiceLevelZ> {
    fn from(table: ZScoreTable) -> Self {
        table.entries
    }
}

/// Safety stock figures for one SKU
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SafetyStockValue {
    /// Table level that was matched
    pub matched_level: Percentage,
    pub z_score: f64,
    pub safety_stock: Quantity,
    pub reorder_point: Quantity,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SafetyStockOutcome {
    Defined(SafetyStockValue),
    /// Features could not be derived for this SKU
    Undefined,
}

impl SafetyStockOutcome {
    pub fn value(&self) -> Option<&SafetyStockValue> {
        match self {
            SafetyStockOutcome::Defined(v) => Some(v),
            SafetyStockOutcome::Undefined => None,
        }
    }
}

/// Safety stock row for one SKU
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafetyStockResult {
    pub sku_id: SkuId,
    pub outcome: SafetyStockOutcome,
}

/// Compute safety stock and reorder point.
///
/// Inputs are assumed validated: non-negative lead time and a service
/// level within [0, 1].
pub fn calculate_safety_stock(
    features: &DerivedFeatures,
    lead_time_days: f64,
    service_level: Percentage,
    table: &ZScoreTable,
) -> SafetyStockResult {
    let outcome = match features.status {
        FeatureStatus::NoDemandHistory => {
            log::warn!("Safety stock undefined for SKU {}: no demand history", features.sku_id);
            SafetyStockOutcome::Undefined
        }
        FeatureStatus::Complete => {
            let matched = table.nearest(service_level);
            let safety_stock =
                matched.z * features.std_dev_monthly_demand * lead_time_days.sqrt();
            let reorder_point = features.avg_daily_demand * lead_time_days + safety_stock;
            SafetyStockOutcome::Defined(SafetyStockValue {
                matched_level: matched.level,
                z_score: matched.z,
                safety_stock,
                reorder_point,
            })
        }
    };

    SafetyStockResult {
        sku_id: features.sku_id.clone(),
        outcome,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::features::derive_features;
    use crate::types::SkuRecord;
    use approx::assert_relative_eq;

    #[test]
    fn test_exact_keys() {
        let table = ZScoreTable::default();
        assert_eq!(table.z_score(0.90), 1.28);
        assert_eq!(table.z_score(0.92), 1.41);
        assert_eq!(table.z_score(0.95), 1.65);
        assert_eq!(table.z_score(0.98), 2.05);
        assert_eq!(table.z_score(0.99), 2.33);
    }

    #[test]
    fn test_tie_prefers_lower_level() {
        let table = ZScoreTable::default();
        assert_eq!(table.z_score(0.965), 1.65);
        assert_eq!(table.z_score(0.91), 1.28);
        assert_eq!(table.z_score(0.985), 2.05);
    }

    #[test]
    fn test_out_of_table_targets_clamp_to_ends() {
        let table = ZScoreTable::default();
        assert_eq!(table.z_score(0.5), 1.28);
        assert_eq!(table.z_score(1.0), 2.33);
        assert_eq!(table.z_score(0.0), 1.28);
    }

    #[test]
    fn test_custom_table_is_sorted() {
        let table = ZScoreTable::new(vec![
            ServiceLevelZ { level: 0.99, z: 2.33 },
            ServiceLevelZ { level: 0.80, z: 0.84 },
        ])
        .unwrap();
        assert_eq!(table.entries()[0].level, 0.80);
        assert_eq!(table.z_score(0.895), 0.84);
    }

    #[test]
    fn test_invalid_tables_rejected() {
        assert!(ZScoreTable::new(vec![]).is_err());
        assert!(ZScoreTable::new(vec![ServiceLevelZ { level: 1.2, z: 1.0 }]).is_err());
        assert!(ZScoreTable::new(vec![
            ServiceLevelZ { level: 0.9, z: 1.28 },
            ServiceLevelZ { level: 0.9, z: 1.30 },
        ])
        .is_err());
    }

    #[test]
    fn test_safety_stock_and_rop() {
        let record = SkuRecord::new(
            "A",
            [10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0, 80.0, 90.0, 100.0, 110.0, 120.0],
        );
        let features = derive_features(&record);
        let result = calculate_safety_stock(&features, 9.0, 0.95, &ZScoreTable::default());
        let v = result.outcome.value().unwrap();

        assert_eq!(v.z_score, 1.65);
        assert_relative_eq!(v.safety_stock, 1.65 * features.std_dev_monthly_demand * 3.0);
        assert_relative_eq!(
            v.reorder_point,
            features.avg_daily_demand * 9.0 + v.safety_stock
        );
    }

    #[test]
    fn test_stable_demand_has_zero_safety_stock() {
        let features = derive_features(&SkuRecord::new("B", [100.0; 12]));
        let result = calculate_safety_stock(&features, 14.0, 0.99, &ZScoreTable::default());
        let v = result.outcome.value().unwrap();
        assert_eq!(v.safety_stock, 0.0);
        assert_relative_eq!(v.reorder_point, 1200.0 / 365.0 * 14.0);
    }

    #[test]
    fn test_zero_lead_time() {
        let features = derive_features(&SkuRecord::new(
            "C",
            [1.0, 5.0, 1.0, 5.0, 1.0, 5.0, 1.0, 5.0, 1.0, 5.0, 1.0, 5.0],
        ));
        let result = calculate_safety_stock(&features, 0.0, 0.9, &ZScoreTable::default());
        let v = result.outcome.value().unwrap();
        assert_eq!(v.safety_stock, 0.0);
        assert_eq!(v.reorder_point, 0.0);
    }
}
