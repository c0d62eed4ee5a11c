//! Core types and constants

use crate::calendar::Month;
use crate::error::{InventoryError, Result};
use serde::{Deserialize, Serialize};

/// Stock-keeping unit identifier
pub type SkuId = String;

/// Quantity of units (sold, stocked, ordered)
pub type Quantity = f64;

/// Money type
pub type Money = f64;

/// Percentage type (0.0 to 1.0)
pub type Percentage = f64;

/// Twelve monthly quantities, January first. `None` marks an absent month.
pub type MonthlyQuantities = [Option<Quantity>; 12];

/// Cleaned per-SKU input record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkuRecord {
    pub sku_id: SkuId,
    pub product_name: String,
    pub category: String,
    pub sub_category: String,
    pub monthly_qty: MonthlyQuantities,
    pub opening_stock: Option<Quantity>,
    pub lead_time_days: f64,
    pub ordering_cost: Money,
    pub unit_cost: Money,
    pub holding_cost_fraction: Percentage,
    pub service_level_target: Percentage,
}

impl SkuRecord {
    /// Create a record with every month present and empty labels
    pub fn new(sku_id: impl Into<SkuId>, monthly: [Quantity; 12]) -> Self {
        Self {
            sku_id: sku_id.into(),
            product_name: String::new(),
            category: String::new(),
            sub_category: String::new(),
            monthly_qty: monthly.map(Some),
            opening_stock: None,
            lead_time_days: 0.0,
            ordering_cost: 0.0,
            unit_cost: 0.0,
            holding_cost_fraction: 0.0,
            service_level_target: 0.95,
        }
    }

    pub fn with_labels(
        mut self,
        product_name: impl Into<String>,
        category: impl Into<String>,
        sub_category: impl Into<String>,
    ) -> Self {
        self.product_name = product_name.into();
        self.category = category.into();
        self.sub_category = sub_category.into();
        self
    }

    pub fn with_costs(
        mut self,
        ordering_cost: Money,
        unit_cost: Money,
        holding_cost_fraction: Percentage,
    ) -> Self {
        self.ordering_cost = ordering_cost;
        self.unit_cost = unit_cost;
        self.holding_cost_fraction = holding_cost_fraction;
        self
    }

    pub fn with_service(mut self, lead_time_days: f64, service_level_target: Percentage) -> Self {
        self.lead_time_days = lead_time_days;
        self.service_level_target = service_level_target;
        self
    }

    /// Quantity for a given month, if present
    pub fn qty(&self, month: Month) -> Option<Quantity> {
        self.monthly_qty[month.index()]
    }

    /// Present monthly quantities in calendar order
    pub fn observed_quantities(&self) -> Vec<Quantity> {
        self.monthly_qty.iter().flatten().copied().collect()
    }

    /// Check the numeric contract every downstream calculator relies on
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: String| InventoryError::InvalidRecord {
            sku_id: self.sku_id.clone(),
            reason,
        };

        if self.sku_id.trim().is_empty() {
            return Err(invalid("empty sku_id".to_string()));
        }

        let scalars = [
            ("lead_time_days", self.lead_time_days),
            ("ordering_cost", self.ordering_cost),
            ("unit_cost", self.unit_cost),
            ("holding_cost_fraction", self.holding_cost_fraction),
            ("service_level_target", self.service_level_target),
        ];
        for (name, value) in scalars {
            if !value.is_finite() {
                return Err(invalid(format!("{} is not a finite number", name)));
            }
            if value < 0.0 {
                return Err(invalid(format!("{} must be non-negative, got {}", name, value)));
            }
        }

        if self.holding_cost_fraction > 1.0 {
            return Err(invalid(format!(
                "holding_cost_fraction must be within [0, 1], got {}",
                self.holding_cost_fraction
            )));
        }
        if self.service_level_target > 1.0 {
            return Err(invalid(format!(
                "service_level_target must be within [0, 1], got {}",
                self.service_level_target
            )));
        }

        for month in Month::ALL {
            if let Some(qty) = self.qty(month) {
                if !qty.is_finite() || qty < 0.0 {
                    return Err(invalid(format!(
                        "qty_sold_{} must be a non-negative number, got {}",
                        month.suffix(),
                        qty
                    )));
                }
            }
        }

        if let Some(stock) = self.opening_stock {
            if !stock.is_finite() {
                return Err(invalid("opening_stock is not a finite number".to_string()));
            }
        }

        Ok(())
    }
}
