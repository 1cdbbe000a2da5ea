//! Billing period resolution.
//!
//! A billing period is a closed interval `[start, end]`. Without a cutoff day
//! it is the calendar month; with one it runs from the day after the cutoff in
//! the previous month through the cutoff day of the billed month, clamped to
//! the length of each month.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::calendar::{
    days_in_month, end_of_day, first_of_month, previous_month, start_of_day, BUCKET_MINUTES,
};
use crate::error::NormalizeError;

/// Largest accepted billing cutoff day.
pub const MAX_CUTOFF_DAY: u32 = 31;

/// Inclusive time window a total is spread over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BillingPeriod {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl BillingPeriod {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }

    /// Full calendar month, `[day 1 00:00:00, last day 23:59:59]`.
    pub fn calendar_month(year: i32, month: u32) -> Result<Self, NormalizeError> {
        let first = first_of_month(year, month)?;
        let last = date_in(year, month, days_in_month(year, month)?)?;
        Ok(Self::new(start_of_day(first)?, end_of_day(last)?))
    }

    /// Billing cycle closing on `cutoff_day` of `year`/`month`.
    pub fn with_cutoff(year: i32, month: u32, cutoff_day: u32) -> Result<Self, NormalizeError> {
        validate_cutoff_day(cutoff_day)?;

        let end_day = cutoff_day.min(days_in_month(year, month)?);
        let end = date_in(year, month, end_day)?;

        let prev = previous_month(first_of_month(year, month)?)?;
        let prev_len = days_in_month(prev.year(), prev.month())?;
        // Clamp against the previous month using the raw cutoff, not end_day.
        let start_day = (cutoff_day + 1).min(prev_len);
        let start = date_in(prev.year(), prev.month(), start_day)?;

        Ok(Self::new(start_of_day(start)?, end_of_day(end)?))
    }

    /// Length of the window in minutes, fractional seconds included.
    pub fn duration_minutes(&self) -> f64 {
        (self.end - self.start).num_seconds() as f64 / 60.0
    }

    /// Nominal number of buckets: the window length divided by the bucket
    /// width, rounded to the nearest whole bucket.
    pub fn bucket_count(&self) -> i64 {
        (self.duration_minutes() / f64::from(BUCKET_MINUTES)).round() as i64
    }

    pub fn contains(&self, ts: NaiveDateTime) -> bool {
        self.start <= ts && ts <= self.end
    }

    /// Whether the two closed windows share at least one instant.
    pub fn overlaps(&self, other: &BillingPeriod) -> bool {
        self.start <= other.end && other.start <= self.end
    }
}

/// Resolve the billing window for `year`/`month`.
///
/// # Errors
/// Returns `InvalidRange` for a month outside 1-12 or a cutoff day outside
/// 1-31.
pub fn resolve_period(
    year: i32,
    month: u32,
    cutoff_day: Option<u32>,
) -> Result<BillingPeriod, NormalizeError> {
    match cutoff_day {
        Some(day) => BillingPeriod::with_cutoff(year, month, day),
        None => BillingPeriod::calendar_month(year, month),
    }
}

/// Check a billing cutoff day is within 1-31.
pub fn validate_cutoff_day(day: u32) -> Result<(), NormalizeError> {
    if (1..=MAX_CUTOFF_DAY).contains(&day) {
        Ok(())
    } else {
        Err(NormalizeError::range(
            "cutoff_day",
            format!("{day} is outside 1-{MAX_CUTOFF_DAY}"),
        ))
    }
}

fn date_in(year: i32, month: u32, day: u32) -> Result<NaiveDate, NormalizeError> {
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
        NormalizeError::range("day", format!("{year}-{month:02}-{day:02} does not exist"))
    })
}
