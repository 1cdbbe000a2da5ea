//! Travel exclusion ranges.
//!
//! A travel range marks whole days whose consumption is known to deviate
//! from the baseline. Buckets on those days are left out of the flat
//! distribution. Ranges are inclusive and behave as a union, so overlapping
//! ranges need no deduplication.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::calendar::parse_date;
use crate::error::{CoreError, NormalizeError, Result};

/// Inclusive date range, `start <= end` guaranteed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "RawTravelRange")]
pub struct TravelRange {
    start: NaiveDate,
    end: NaiveDate,
}

/// Travel range as stored upstream: `{"start": "YYYY-MM-DD", "end": "YYYY-MM-DD"}`.
#[derive(Debug, Clone, Deserialize)]
struct RawTravelRange {
    start: String,
    end: String,
}

impl TryFrom<RawTravelRange> for TravelRange {
    type Error = NormalizeError;

    fn try_from(raw: RawTravelRange) -> Result<Self, Self::Error> {
        TravelRange::parse(&raw.start, &raw.end)
    }
}

impl TravelRange {
    /// # Errors
    /// Returns `InvalidRange` when `end` is before `start`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, NormalizeError> {
        if end < start {
            return Err(NormalizeError::range(
                "travel",
                format!("end {end} is before start {start}"),
            ));
        }
        Ok(Self { start, end })
    }

    /// Single-day range.
    pub fn day(date: NaiveDate) -> Self {
        Self { start: date, end: date }
    }

    /// Parse both ends from `YYYY-MM-DD` text.
    pub fn parse(start: &str, end: &str) -> Result<Self, NormalizeError> {
        let start = parse_date("travel.start", start)?;
        let end = parse_date("travel.end", end)?;
        Self::new(start, end)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Number of days covered, both ends included.
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

/// Accepts `START:END` or a single `DATE`.
impl FromStr for TravelRange {
    type Err = NormalizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some((start, end)) => Self::parse(start, end),
            None => parse_date("travel", s).map(Self::day),
        }
    }
}

impl fmt::Display for TravelRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start, self.end)
    }
}

/// Whether `date` falls inside any of `ranges`.
pub fn is_excluded(date: NaiveDate, ranges: &[TravelRange]) -> bool {
    ranges.iter().any(|r| r.contains(date))
}

/// Parse the JSON array form, `[{"start": ..., "end": ...}, ...]`.
///
/// Blank input means no travel.
///
/// # Errors
/// Returns a JSON error for malformed text and a normalization error for the
/// first range with a bad date or reversed ends.
pub fn parse_travel_json(json: &str) -> Result<Vec<TravelRange>> {
    if json.trim().is_empty() {
        return Ok(Vec::new());
    }
    let raw: Vec<RawTravelRange> = serde_json::from_str(json)?;
    raw.into_iter()
        .map(|r| TravelRange::try_from(r).map_err(CoreError::from))
        .collect()
}
