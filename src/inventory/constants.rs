//! Inventory constants and defaults
//!
//! Contains default values shared by the feature, EOQ and safety-stock
//! calculators.

/// Days used to convert annual demand to a daily rate
pub const DAYS_PER_YEAR: f64 = 365.0;

/// Default service level -> Z-score table, sorted by service level
pub const DEFAULT_Z_TABLE: [(f64, f64); 5] = [
    (0.90, 1.28),
    (0.92, 1.41),
    (0.95, 1.65),
    (0.98, 2.05),
    (0.99, 2.33),
];

/// Two table distances closer than this are treated as a tie
pub const Z_TIE_TOLERANCE: f64 = 1e-9;
