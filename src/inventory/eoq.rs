//! Economic order quantity
//!
//! `EOQ = sqrt(2 * D * S / H)` with `D` annual demand, `S` ordering cost and
//! `H` holding cost per unit per year.

use crate::inventory::features::{DerivedFeatures, FeatureStatus};
use crate::types::{Money, Quantity, SkuId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why an EOQ could not be computed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UndefinedEoq {
    NonPositiveHoldingCost,
    NonPositiveDemand,
    NonPositiveOrderingCost,
    NoDemandHistory,
}

impl UndefinedEoq {
    pub fn as_str(&self) -> &'static str {
        match self {
            UndefinedEoq::NonPositiveHoldingCost => "non_positive_holding_cost",
            UndefinedEoq::NonPositiveDemand => "non_positive_demand",
            UndefinedEoq::NonPositiveOrderingCost => "non_positive_ordering_cost",
            UndefinedEoq::NoDemandHistory => "no_demand_history",
        }
    }
}

impl fmt::Display for UndefinedEoq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A defined EOQ together with the cost figures it implies
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EoqValue {
    pub eoq: Quantity,
    pub orders_per_year: f64,
    /// Ordering plus holding cost per year when ordering `eoq` units
    pub annual_total_cost: Money,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EoqOutcome {
    Defined(EoqValue),
    Undefined(UndefinedEoq),
}

impl EoqOutcome {
    pub fn value(&self) -> Option<Quantity> {
        match self {
            EoqOutcome::Defined(v) => Some(v.eoq),
            EoqOutcome::Undefined(_) => None,
        }
    }

    pub fn is_defined(&self) -> bool {
        matches!(self, EoqOutcome::Defined(_))
    }
}

/// EOQ row for one SKU
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EoqResult {
    pub sku_id: SkuId,
    pub outcome: EoqOutcome,
}

/// Compute the EOQ from raw inputs.
///
/// Guards run before the square root, holding cost first.
pub fn economic_order_quantity(
    annual_demand: Quantity,
    ordering_cost: Money,
    holding_cost_per_unit_year: Money,
) -> EoqOutcome {
    if !(holding_cost_per_unit_year > 0.0) {
        return EoqOutcome::Undefined(UndefinedEoq::NonPositiveHoldingCost);
    }
    if !(annual_demand > 0.0) {
        return EoqOutcome::Undefined(UndefinedEoq::NonPositiveDemand);
    }
    if !(ordering_cost > 0.0) {
        return EoqOutcome::Undefined(UndefinedEoq::NonPositiveOrderingCost);
    }

    let eoq = (2.0 * annual_demand * ordering_cost / holding_cost_per_unit_year).sqrt();
    let orders_per_year = annual_demand / eoq;
    let annual_total_cost = orders_per_year * ordering_cost + eoq / 2.0 * holding_cost_per_unit_year;

    EoqOutcome::Defined(EoqValue {
        eoq,
        orders_per_year,
        annual_total_cost,
    })
}

/// Compute the EOQ row for one SKU from its derived features
pub fn calculate_eoq(features: &DerivedFeatures, ordering_cost: Money) -> EoqResult {
    let outcome = match features.status {
        FeatureStatus::NoDemandHistory => EoqOutcome::Undefined(UndefinedEoq::NoDemandHistory),
        FeatureStatus::Complete => economic_order_quantity(
            features.annual_demand,
            ordering_cost,
            features.holding_cost_per_unit_year,
        ),
    };

    if let EoqOutcome::Undefined(reason) = outcome {
        log::warn!("EOQ undefined for SKU {}: {}", features.sku_id, reason);
    }

    EoqResult {
        sku_id: features.sku_id.clone(),
        outcome,
    }
}
