//! Calendar helpers.
//!
//! All month-length, rollover and bucket-alignment arithmetic goes through
//! these functions so the rest of the crate never counts days by hand.

use chrono::{Datelike, Months, NaiveDate, NaiveDateTime, Timelike};

use crate::error::NormalizeError;

/// Width of one interval bucket in minutes.
pub const BUCKET_MINUTES: u32 = 15;

/// Date format accepted for user-supplied dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// First day of `year`/`month`.
///
/// # Errors
/// Returns `InvalidRange` if the month is outside 1-12 or the year is not
/// representable.
pub fn first_of_month(year: i32, month: u32) -> Result<NaiveDate, NormalizeError> {
    if !(1..=12).contains(&month) {
        return Err(NormalizeError::range(
            "month",
            format!("{month} is outside 1-12"),
        ));
    }
    NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| {
        NormalizeError::range("year", format!("{year} is outside the supported calendar"))
    })
}

/// Number of days in `year`/`month`, leap years included.
pub fn days_in_month(year: i32, month: u32) -> Result<u32, NormalizeError> {
    let first = first_of_month(year, month)?;
    let next = first
        .checked_add_months(Months::new(1))
        .ok_or_else(|| NormalizeError::range("year", format!("{year} is outside the supported calendar")))?;
    Ok((next - first).num_days() as u32)
}

/// First day of the month before `first`, rolling January back to December
/// of the previous year.
pub fn previous_month(first: NaiveDate) -> Result<NaiveDate, NormalizeError> {
    first.checked_sub_months(Months::new(1)).ok_or_else(|| {
        NormalizeError::range(
            "year",
            format!("{} has no previous month in the supported calendar", first.year()),
        )
    })
}

/// Combine a date with a wall-clock time.
pub fn at(date: NaiveDate, hour: u32, minute: u32, second: u32) -> Result<NaiveDateTime, NormalizeError> {
    date.and_hms_opt(hour, minute, second).ok_or_else(|| {
        NormalizeError::range("time", format!("{hour:02}:{minute:02}:{second:02} is not a valid time"))
    })
}

pub fn start_of_day(date: NaiveDate) -> Result<NaiveDateTime, NormalizeError> {
    at(date, 0, 0, 0)
}

/// Last second of the day, the inclusive end of a billing period.
pub fn end_of_day(date: NaiveDate) -> Result<NaiveDateTime, NormalizeError> {
    at(date, 23, 59, 59)
}

/// Start of the last bucket of the day.
pub fn last_bucket_of_day(date: NaiveDate) -> Result<NaiveDateTime, NormalizeError> {
    at(date, 23, 60 - BUCKET_MINUTES, 0)
}

/// Round a timestamp down to its 15-minute boundary, dropping seconds.
pub fn floor_to_bucket(ts: NaiveDateTime) -> NaiveDateTime {
    let minute = ts.minute() / BUCKET_MINUTES * BUCKET_MINUTES;
    ts.with_nanosecond(0)
        .and_then(|t| t.with_second(0))
        .and_then(|t| t.with_minute(minute))
        .unwrap_or(ts)
}

/// Parse a `YYYY-MM-DD` date, surrounding whitespace allowed.
///
/// # Errors
/// Returns `InvalidDateFormat` naming `field` when the text does not parse.
pub fn parse_date(field: &str, value: &str) -> Result<NaiveDate, NormalizeError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|_| NormalizeError::date_format(field, value))
}
