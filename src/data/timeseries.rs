//! Wide-to-long reshaping of monthly sales
//!
//! Each SKU's twelve `qty_sold_<month>` columns become twelve rows dated at
//! the month starts of the reference year. Nothing is filtered, aggregated or
//! gap-filled; absent months stay absent.

use crate::calendar::{reference_months, Month};
use crate::error::Result;
use crate::types::{Quantity, SkuId, SkuRecord};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Reference year used when none is configured
pub const DEFAULT_REFERENCE_YEAR: i32 = 2025;

/// One SKU-month observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    pub sku_id: SkuId,
    pub product_name: String,
    pub category: String,
    pub sub_category: String,
    pub date: NaiveDate,
    pub qty_sold: Option<Quantity>,
}

/// Reshapes wide SKU records into an ordered long table
#[derive(Debug, Clone, Copy)]
pub struct TimeSeriesReshaper {
    dates: [NaiveDate; 12],
}

impl TimeSeriesReshaper {
    /// Reshaper for the given calendar year
    pub fn new(reference_year: i32) -> Result<Self> {
        Ok(Self {
            dates: reference_months(reference_year)?,
        })
    }

    /// Month-start dates assigned to Jan..Dec
    pub fn dates(&self) -> &[NaiveDate; 12] {
        &self.dates
    }

    /// Twelve rows for a single SKU, in date order
    pub fn reshape_record(&self, record: &SkuRecord) -> Vec<TimeSeriesPoint> {
        Month::ALL
            .iter()
            .map(|&month| TimeSeriesPoint {
                sku_id: record.sku_id.clone(),
                product_name: record.product_name.clone(),
                category: record.category.clone(),
                sub_category: record.sub_category.clone(),
                date: self.dates[month.index()],
                qty_sold: record.qty(month),
            })
            .collect()
    }

    /// Long table for all SKUs, sorted by `(sku_id, date)`
    pub fn reshape(&self, records: &[SkuRecord]) -> Vec<TimeSeriesPoint> {
        let mut points: Vec<TimeSeriesPoint> = records
            .iter()
            .flat_map(|record| self.reshape_record(record))
            .collect();
        points.sort_by(|a, b| a.sku_id.cmp(&b.sku_id).then(a.date.cmp(&b.date)));
        points
    }
}

impl Default for TimeSeriesReshaper {
    fn default() -> Self {
        Self {
            dates: reference_months(DEFAULT_REFERENCE_YEAR)
                .expect("default reference year is a valid calendar year"),
        }
    }
}

/// Split a `(sku_id, date)`-sorted long table into per-SKU slices
pub fn group_by_sku(points: &[TimeSeriesPoint]) -> Vec<(&str, &[TimeSeriesPoint])> {
    let mut groups = Vec::new();
    let mut start = 0;
    for i in 1..=points.len() {
        if i == points.len() || points[i].sku_id != points[start].sku_id {
            groups.push((points[start].sku_id.as_str(), &points[start..i]));
            start = i;
        }
    }
    groups
}

/// Present observations of one SKU's series, in order
pub fn observed(points: &[TimeSeriesPoint]) -> Vec<(NaiveDate, Quantity)> {
    points
        .iter()
        .filter_map(|p| p.qty_sold.map(|q| (p.date, q)))
        .collect()
}
