//! Interval building blocks.
//!
//! This module provides:
//! - Calendar helpers for month lengths, rollover and bucket alignment
//! - Billing period resolution with cutoff-day clamping
//! - Travel exclusion ranges
//! - Flat distribution of a period total into 15-minute buckets

pub mod calendar;
mod bucket;
mod distribute;
mod period;
mod travel;

pub use bucket::{
    into_buckets, merge_additive, round_to, BucketMap, IntervalBucket, IntervalRecord,
    DEFAULT_PRECISION, MAX_PRECISION, TIMESTAMP_FORMAT,
};
pub use calendar::BUCKET_MINUTES;
pub use distribute::{distribute_flat, Distribution, DistributionOutcome};
pub use period::{resolve_period, validate_cutoff_day, BillingPeriod, MAX_CUTOFF_DAY};
pub use travel::{is_excluded, parse_travel_json, TravelRange};
