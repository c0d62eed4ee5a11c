//! Monthly calendar used by the time-series reshaper and the forecaster
//!
//! All dates are month-start `NaiveDate`s.

use crate::error::{InventoryError, Result};
use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Calendar month of the fixed twelve-month sales window
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Month {
    Jan,
    Feb,
    Mar,
    Apr,
    May,
    Jun,
    Jul,
    Aug,
    Sep,
    Oct,
    Nov,
    Dec,
}

impl Month {
    /// All months in calendar order
    pub const ALL: [Month; 12] = [
        Month::Jan,
        Month::Feb,
        Month::Mar,
        Month::Apr,
        Month::May,
        Month::Jun,
        Month::Jul,
        Month::Aug,
        Month::Sep,
        Month::Oct,
        Month::Nov,
        Month::Dec,
    ];

    /// Zero-based position (Jan = 0)
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// One-based calendar number (Jan = 1)
    pub fn number(&self) -> u32 {
        self.index() as u32 + 1
    }

    /// Lower-case suffix used in `qty_sold_<suffix>` column names
    pub fn suffix(&self) -> &'static str {
        match self {
            Month::Jan => "jan",
            Month::Feb => "feb",
            Month::Mar => "mar",
            Month::Apr => "apr",
            Month::May => "may",
            Month::Jun => "jun",
            Month::Jul => "jul",
            Month::Aug => "aug",
            Month::Sep => "sep",
            Month::Oct => "oct",
            Month::Nov => "nov",
            Month::Dec => "dec",
        }
    }

    /// Input column holding this month's quantity
    pub fn column_name(&self) -> String {
        format!("qty_sold_{}", self.suffix())
    }

    /// Month-start date of this month in the given year
    pub fn start_date(&self, year: i32) -> Result<NaiveDate> {
        NaiveDate::from_ymd_opt(year, self.number(), 1).ok_or_else(|| {
            InventoryError::ConfigError(format!("year {} is out of the supported date range", year))
        })
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.suffix())
    }
}

/// Month-start dates of the twelve canonical months of `year`
pub fn reference_months(year: i32) -> Result<[NaiveDate; 12]> {
    let first = Month::Jan.start_date(year)?;
    let mut dates = [first; 12];
    for (slot, month) in dates.iter_mut().zip(Month::ALL) {
        *slot = month.start_date(year)?;
    }
    Ok(dates)
}

/// Truncate a date to the first day of its month
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Add `n` calendar months to a month-start date
pub fn add_months(date: NaiveDate, n: u32) -> Option<NaiveDate> {
    month_start(date).checked_add_months(Months::new(n))
}

/// First day of the month following `date`
pub fn next_month_start(date: NaiveDate) -> Option<NaiveDate> {
    add_months(date, 1)
}

/// `count` consecutive month-start dates beginning the month after `last`.
///
/// `None` if any of them falls outside chrono's date range.
pub fn monthly_schedule(last: NaiveDate, count: usize) -> Option<Vec<NaiveDate>> {
    (1..=count)
        .map(|step| u32::try_from(step).ok().and_then(|s| add_months(last, s)))
        .collect()
}
