//! Inventory optimization - demand features, EOQ, safety stock

pub mod constants;
pub mod eoq;
pub mod features;
pub mod safety_stock;

pub use eoq::{calculate_eoq, economic_order_quantity, EoqOutcome, EoqResult, EoqValue, UndefinedEoq};
pub use features::{derive_features, DerivedFeatures, FeatureStatus};
pub use safety_stock::{
    calculate_safety_stock, SafetyStockOutcome, SafetyStockResult, SafetyStockValue,
    ServiceLevelZ, ZScoreTable,
};
