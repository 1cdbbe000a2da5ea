//! Interval buckets and the output record shape.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::calendar::BUCKET_MINUTES;

/// Decimal places kept in output records.
pub const DEFAULT_PRECISION: u32 = 4;

/// Largest accepted output precision; [`round_to`] clamps to it.
pub const MAX_PRECISION: u32 = 10;

/// Timestamp format of output records: naive local ISO-8601.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Bucket start → energy in kWh, kept sorted by timestamp.
pub type BucketMap = BTreeMap<NaiveDateTime, f64>;

/// One 15-minute slot with its full-precision energy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntervalBucket {
    pub timestamp: NaiveDateTime,
    pub energy_kwh: f64,
    pub duration_minutes: u32,
}

impl IntervalBucket {
    pub fn new(timestamp: NaiveDateTime, energy_kwh: f64) -> Self {
        Self {
            timestamp,
            energy_kwh,
            duration_minutes: BUCKET_MINUTES,
        }
    }

    /// Rounded record for handing to persistence.
    pub fn to_record(&self, precision: u32) -> IntervalRecord {
        IntervalRecord {
            timestamp: self.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            energy_kwh: round_to(self.energy_kwh, precision),
            duration_minutes: self.duration_minutes,
        }
    }
}

/// Output record consumed by downstream storage, which upserts on
/// `(home, timestamp)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntervalRecord {
    pub timestamp: String,
    pub energy_kwh: f64,
    pub duration_minutes: u32,
}

/// Round half away from zero to `places` decimals, at most [`MAX_PRECISION`].
pub fn round_to(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places.min(MAX_PRECISION) as i32);
    (value * factor).round() / factor
}

/// Add every bucket of `source` into `target`, summing shared timestamps.
pub fn merge_additive(target: &mut BucketMap, source: BucketMap) {
    for (ts, kwh) in source {
        *target.entry(ts).or_insert(0.0) += kwh;
    }
}

/// Flatten a merged map into time-ordered buckets, optionally dropping
/// zero-energy slots.
pub fn into_buckets(map: BucketMap, drop_zero: bool) -> Vec<IntervalBucket> {
    map.into_iter()
        .filter(|(_, kwh)| !drop_zero || *kwh > 0.0)
        .map(|(ts, kwh)| IntervalBucket::new(ts, kwh))
        .collect()
}
