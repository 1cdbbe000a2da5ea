//! User-supplied usage totals.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::NormalizeError;
use crate::interval::calendar::{first_of_month, parse_date};

/// One month's bill total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyUsage {
    pub year: i32,
    /// Month of the bill (1-12)
    pub month: u32,
    #[serde(alias = "total", alias = "kwh")]
    pub total_kwh: f64,
}

impl MonthlyUsage {
    pub fn new(year: i32, month: u32, total_kwh: f64) -> Self {
        Self { year, month, total_kwh }
    }

    /// # Errors
    /// `InvalidRange` for a month outside 1-12, `InvalidTotal` for a bad total.
    pub fn validate(&self) -> Result<(), NormalizeError> {
        first_of_month(self.year, self.month)?;
        validate_total(self.total_kwh)
    }
}

/// A single total over an inclusive date range, usually one year.
///
/// Dates stay as the caller supplied them and are parsed when the entry is
/// normalized, so a malformed date fails that conversion as a whole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnualUsage {
    pub start_date: String,
    pub end_date: String,
    #[serde(alias = "annual_usage", alias = "total")]
    pub total_kwh: f64,
}

impl AnnualUsage {
    pub fn new(total_kwh: f64, start_date: impl Into<String>, end_date: impl Into<String>) -> Self {
        Self {
            start_date: start_date.into(),
            end_date: end_date.into(),
            total_kwh,
        }
    }

    /// Parsed `(start, end)` dates.
    ///
    /// # Errors
    /// `InvalidDateFormat` if either date does not parse, `InvalidRange` if
    /// the end is before the start.
    pub fn date_range(&self) -> Result<(NaiveDate, NaiveDate), NormalizeError> {
        let start = parse_date("start_date", &self.start_date)?;
        let end = parse_date("end_date", &self.end_date)?;
        if end < start {
            return Err(NormalizeError::range(
                "end_date",
                format!("{end} is before start date {start}"),
            ));
        }
        Ok((start, end))
    }

    /// Inclusive day count of the range.
    pub fn total_days(&self) -> Result<i64, NormalizeError> {
        let (start, end) = self.date_range()?;
        Ok((end - start).num_days() + 1)
    }

    /// # Errors
    /// `InvalidDateFormat` or `InvalidRange` for the dates, `InvalidTotal` for
    /// a bad total.
    pub fn validate(&self) -> Result<(), NormalizeError> {
        self.date_range()?;
        validate_total(self.total_kwh)
    }
}

/// A usage total of either granularity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UsageEntry {
    Monthly(MonthlyUsage),
    Annual(AnnualUsage),
}

impl UsageEntry {
    pub fn total_kwh(&self) -> f64 {
        match self {
            UsageEntry::Monthly(m) => m.total_kwh,
            UsageEntry::Annual(a) => a.total_kwh,
        }
    }
}

impl From<MonthlyUsage> for UsageEntry {
    fn from(value: MonthlyUsage) -> Self {
        UsageEntry::Monthly(value)
    }
}

impl From<AnnualUsage> for UsageEntry {
    fn from(value: AnnualUsage) -> Self {
        UsageEntry::Annual(value)
    }
}

/// Check an energy total is finite and non-negative.
pub fn validate_total(total_kwh: f64) -> Result<(), NormalizeError> {
    if total_kwh.is_finite() && total_kwh >= 0.0 {
        Ok(())
    } else {
        Err(NormalizeError::InvalidTotal { value: total_kwh })
    }
}
