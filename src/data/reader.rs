//! Reader for the cleaned SKU table
//!
//! The table arrives already cleaned: currency and percent text has been
//! converted to plain numbers upstream. This reader only checks the schema,
//! parses numbers, validates records and drops duplicate SKUs.

use crate::calendar::Month;
use crate::error::{InventoryError, Result};
use crate::types::{MonthlyQuantities, SkuRecord};
use csv::{ReaderBuilder, StringRecord};
use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

/// Identifier column, with the accepted alias
const SKU_ID_COLUMNS: [&str; 2] = ["sku_id", "product_id"];

const LABEL_COLUMNS: [&str; 3] = ["product_name", "category", "sub_category"];

const COST_COLUMNS: [&str; 5] = [
    "lead_time_days",
    "ordering_cost",
    "unit_cost",
    "holding_cost_fraction",
    "service_level_target",
];

const OPENING_STOCK_COLUMN: &str = "opening_stock";

/// Column positions resolved from the header row
#[derive(Debug, Clone)]
struct ColumnIndex {
    sku_id: usize,
    labels: [usize; 3],
    months: [usize; 12],
    costs: [usize; 5],
    opening_stock: usize,
}

impl ColumnIndex {
    /// Resolve every required column, reporting all missing ones at once
    fn resolve(headers: &StringRecord) -> Result<Self> {
        let find = |name: &str| headers.iter().position(|h| h.trim().eq_ignore_ascii_case(name));
        let mut missing = Vec::new();

        let sku_id = SKU_ID_COLUMNS
            .iter()
            .find_map(|&name| find(name))
            .unwrap_or_else(|| {
                missing.push(SKU_ID_COLUMNS[0].to_string());
                usize::MAX
            });

        let mut require = |name: &str| {
            find(name).unwrap_or_else(|| {
                missing.push(name.to_string());
                usize::MAX
            })
        };

        let labels = LABEL_COLUMNS.map(&mut require);
        let months = Month::ALL.map(|m| require(m.column_name().as_str()));
        let costs = COST_COLUMNS.map(&mut require);
        let opening_stock = require(OPENING_STOCK_COLUMN);

        if !missing.is_empty() {
            return Err(InventoryError::SchemaValidation { missing });
        }

        Ok(Self {
            sku_id,
            labels,
            months,
            costs,
            opening_stock,
        })
    }
}

/// Names of every column the reader requires
pub fn required_columns() -> Vec<String> {
    let mut columns = vec![SKU_ID_COLUMNS[0].to_string()];
    columns.extend(LABEL_COLUMNS.iter().map(|c| c.to_string()));
    columns.extend(Month::ALL.iter().map(|m| m.column_name()));
    columns.push(OPENING_STOCK_COLUMN.to_string());
    columns.extend(COST_COLUMNS.iter().map(|c| c.to_string()));
    columns
}

/// CSV reader for cleaned SKU records
#[derive(Debug, Clone, Default)]
pub struct SkuTableReader;

impl SkuTableReader {
    pub fn new() -> Self {
        Self
    }

    /// Read records from a CSV file
    pub fn read_path(&self, path: &Path) -> Result<Vec<SkuRecord>> {
        let file = std::fs::File::open(path).map_err(|e| {
            InventoryError::DataError(format!("Failed to open {}: {}", path.display(), e))
        })?;
        let records = self.read(file)?;
        log::info!("Loaded {} SKU records from {}", records.len(), path.display());
        Ok(records)
    }

    /// Read records from any CSV source.
    ///
    /// Records are returned sorted by `sku_id`; for duplicate ids the first
    /// row in file order is kept.
    pub fn read<R: Read>(&self, source: R) -> Result<Vec<SkuRecord>> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(source);

        let headers = rdr.headers()?.clone();
        let index = ColumnIndex::resolve(&headers)?;

        let mut seen = HashSet::new();
        let mut records = Vec::new();
        let mut duplicates = 0usize;

        for row in rdr.records() {
            let row = row?;
            let record = Self::parse_row(&row, &index)?;
            record.validate()?;
            if seen.insert(record.sku_id.clone()) {
                records.push(record);
            } else {
                duplicates += 1;
            }
        }

        if duplicates > 0 {
            log::info!("Removed {} duplicated rows by SKU id", duplicates);
        }

        records.sort_by(|a, b| a.sku_id.cmp(&b.sku_id));
        Ok(records)
    }

    fn parse_row(row: &StringRecord, index: &ColumnIndex) -> Result<SkuRecord> {
        let sku_id = row.get(index.sku_id).unwrap_or("").to_string();
        if sku_id.is_empty() {
            return Err(InventoryError::DataError(format!(
                "Row {} has an empty SKU id",
                row.position().map(|p| p.line()).unwrap_or(0)
            )));
        }

        let text = |idx: usize| row.get(idx).unwrap_or("").to_string();
        let optional = |idx: usize, column: &str| -> Result<Option<f64>> {
            let cell = row.get(idx).unwrap_or("");
            if cell.is_empty() {
                return Ok(None);
            }
            cell.parse::<f64>().map(Some).map_err(|_| InventoryError::InvalidRecord {
                sku_id: sku_id.clone(),
                reason: format!("{} is not numeric: '{}'", column, cell),
            })
        };
        let required = |idx: usize, column: &str| -> Result<f64> {
            optional(idx, column)?.ok_or_else(|| InventoryError::InvalidRecord {
                sku_id: sku_id.clone(),
                reason: format!("{} is empty", column),
            })
        };

        let mut monthly_qty: MonthlyQuantities = [None; 12];
        for (slot, month) in monthly_qty.iter_mut().zip(Month::ALL) {
            *slot = optional(index.months[month.index()], month.column_name().as_str())?;
        }

        let [lead, ordering, unit, holding, service] = index.costs;

        Ok(SkuRecord {
            product_name: text(index.labels[0]),
            category: text(index.labels[1]),
            sub_category: text(index.labels[2]),
            monthly_qty,
            opening_stock: optional(index.opening_stock, OPENING_STOCK_COLUMN)?,
            lead_time_days: required(lead, COST_COLUMNS[0])?,
            ordering_cost: required(ordering, COST_COLUMNS[1])?,
            unit_cost: required(unit, COST_COLUMNS[2])?,
            holding_cost_fraction: required(holding, COST_COLUMNS[3])?,
            service_level_target: required(service, COST_COLUMNS[4])?,
            sku_id,
        })
    }
}
