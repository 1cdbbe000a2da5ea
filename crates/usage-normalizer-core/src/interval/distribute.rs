//! Flat distribution of a period total across 15-minute buckets.
//!
//! Every surviving bucket in a period gets the same share of the total. There
//! is no time-of-day or weather shaping. A shaped model would replace the
//! per-bucket share below with weights that still sum to the total.

use chrono::Duration;
use tracing::{debug, warn};

use super::bucket::BucketMap;
use super::calendar::{floor_to_bucket, BUCKET_MINUTES};
use super::period::BillingPeriod;
use super::travel::{is_excluded, TravelRange};
use crate::profile::HomeProfile;

/// How a single period's total ended up being spread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistributionOutcome {
    /// Period shorter than half a bucket; nothing to distribute into
    Empty,
    /// Buckets were produced; `excluded` candidates fell on travel days
    Distributed { kept: usize, excluded: usize },
    /// Every candidate fell on a travel day
    AllBucketsExcluded { candidates: usize },
}

/// Buckets for one period plus how they were produced.
#[derive(Debug, Clone, PartialEq)]
pub struct Distribution {
    pub period: BillingPeriod,
    pub total_kwh: f64,
    pub buckets: BucketMap,
    pub outcome: DistributionOutcome,
}

impl Distribution {
    /// Energy that could not be placed in any bucket.
    pub fn dropped_kwh(&self) -> f64 {
        match self.outcome {
            DistributionOutcome::Distributed { .. } => 0.0,
            DistributionOutcome::Empty | DistributionOutcome::AllBucketsExcluded { .. } => {
                self.total_kwh
            }
        }
    }

    pub fn distributed_kwh(&self) -> f64 {
        self.buckets.values().sum()
    }
}

/// Spread `total_kwh` evenly over the buckets of `period`, skipping travel days.
///
/// Candidates start at the period start floored to a 15-minute boundary and
/// step by 15 minutes while they are not after the period end. When the
/// surviving bucket count differs from the nominal count, each survivor gets
/// `total_kwh / kept` so the period total is conserved.
///
/// `_profile` is accepted for signature stability; the flat model ignores it.
pub fn distribute_flat(
    period: &BillingPeriod,
    total_kwh: f64,
    travel: &[TravelRange],
    _profile: &HomeProfile,
) -> Distribution {
    let nominal = period.bucket_count();
    if nominal <= 0 {
        debug!(start = %period.start, end = %period.end, "period shorter than one bucket");
        return Distribution {
            period: *period,
            total_kwh,
            buckets: BucketMap::new(),
            outcome: DistributionOutcome::Empty,
        };
    }

    let base_kwh = total_kwh / nominal as f64;
    let step = Duration::minutes(i64::from(BUCKET_MINUTES));

    let mut buckets = BucketMap::new();
    let mut candidates = 0usize;
    let mut current = floor_to_bucket(period.start);
    while current <= period.end {
        candidates += 1;
        if !is_excluded(current.date(), travel) {
            buckets.insert(current, base_kwh);
        }
        current += step;
    }

    let kept = buckets.len();
    if kept == 0 {
        warn!(
            start = %period.start,
            end = %period.end,
            dropped_kwh = total_kwh,
            "all buckets excluded by travel ranges"
        );
        return Distribution {
            period: *period,
            total_kwh,
            buckets,
            outcome: DistributionOutcome::AllBucketsExcluded { candidates },
        };
    }

    if kept as i64 != nominal {
        let adjusted = total_kwh / kept as f64;
        for kwh in buckets.values_mut() {
            *kwh = adjusted;
        }
    }

    debug!(
        start = %period.start,
        end = %period.end,
        kept,
        excluded = candidates - kept,
        "distributed period"
    );

    Distribution {
        period: *period,
        total_kwh,
        buckets,
        outcome: DistributionOutcome::Distributed {
            kept,
            excluded: candidates - kept,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interval::period::resolve_period;
    use chrono::NaiveDateTime;

    fn ts(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").unwrap()
    }

    fn relative_error(actual: f64, expected: f64) -> f64 {
        ((actual - expected) / expected).abs()
    }

    #[test]
    fn test_calendar_month_is_conserved() {
        let period = resolve_period(2024, 1, None).unwrap();
        let dist = distribute_flat(&period, 1200.0, &[], &HomeProfile::default());

        assert_eq!(dist.buckets.len(), 31 * 96);
        assert!(relative_error(dist.distributed_kwh(), 1200.0) < 1e-6);
        assert_eq!(
            dist.outcome,
            DistributionOutcome::Distributed { kept: 2976, excluded: 0 }
        );
        assert_eq!(dist.dropped_kwh(), 0.0);
    }

    #[test]
    fn test_buckets_are_aligned_and_inside_period() {
        let period = resolve_period(2024, 3, Some(15)).unwrap();
        let dist = distribute_flat(&period, 500.0, &[], &HomeProfile::default());

        assert_eq!(dist.buckets.keys().next(), Some(&ts("2024-02-16T00:00:00")));
        assert_eq!(dist.buckets.keys().last(), Some(&ts("2024-03-15T23:45:00")));
        for key in dist.buckets.keys() {
            assert!(period.contains(*key));
            assert_eq!(key.format("%S").to_string(), "00");
            assert!(["00", "15", "30", "45"].contains(&key.format("%M").to_string().as_str()));
        }
    }

    #[test]
    fn test_partial_exclusion_renormalizes() {
        let period = resolve_period(2023, 6, None).unwrap();
        let travel = vec![TravelRange::parse("2023-06-10", "2023-06-19").unwrap()];
        let dist = distribute_flat(&period, 900.0, &travel, &HomeProfile::default());

        assert_eq!(
            dist.outcome,
            DistributionOutcome::Distributed { kept: 20 * 96, excluded: 10 * 96 }
        );
        assert!(relative_error(dist.distributed_kwh(), 900.0) < 1e-6);
        let per_bucket = 900.0 / (20.0 * 96.0);
        assert!(dist.buckets.values().all(|v| (v - per_bucket).abs() < 1e-12));
        assert!(!dist.buckets.contains_key(&ts("2023-06-15T12:00:00")));
    }

    #[test]
    fn test_full_exclusion_drops_energy() {
        let period = resolve_period(2024, 2, None).unwrap();
        let travel = vec![TravelRange::parse("2024-01-20", "2024-03-05").unwrap()];
        let dist = distribute_flat(&period, 300.0, &travel, &HomeProfile::default());

        assert!(dist.buckets.is_empty());
        assert_eq!(
            dist.outcome,
            DistributionOutcome::AllBucketsExcluded { candidates: 29 * 96 }
        );
        assert_eq!(dist.dropped_kwh(), 300.0);
    }

    #[test]
    fn test_day_window_conserves_daily_total() {
        // [00:00, 23:45] is nominally 95 buckets but yields 96 candidates.
        let period = BillingPeriod::new(ts("2024-06-01T00:00:00"), ts("2024-06-01T23:45:00"));
        let dist = distribute_flat(&period, 24.0, &[], &HomeProfile::default());

        assert_eq!(dist.buckets.len(), 96);
        assert!(relative_error(dist.distributed_kwh(), 24.0) < 1e-9);
        assert!(dist.buckets.values().all(|v| (v - 0.25).abs() < 1e-12));
    }

    #[test]
    fn test_short_or_reversed_period_is_empty() {
        let short = BillingPeriod::new(ts("2024-06-01T00:00:00"), ts("2024-06-01T00:07:00"));
        let dist = distribute_flat(&short, 5.0, &[], &HomeProfile::default());
        assert_eq!(dist.outcome, DistributionOutcome::Empty);
        assert!(dist.buckets.is_empty());

        let reversed = BillingPeriod::new(ts("2024-06-02T00:00:00"), ts("2024-06-01T00:00:00"));
        let dist = distribute_flat(&reversed, 5.0, &[], &HomeProfile::default());
        assert_eq!(dist.outcome, DistributionOutcome::Empty);
    }

    #[test]
    fn test_unaligned_start_is_floored() {
        let period = BillingPeriod::new(ts("2024-06-01T10:07:30"), ts("2024-06-01T11:07:30"));
        let dist = distribute_flat(&period, 4.0, &[], &HomeProfile::default());

        assert_eq!(dist.buckets.keys().next(), Some(&ts("2024-06-01T10:00:00")));
        assert_eq!(dist.buckets.keys().last(), Some(&ts("2024-06-01T11:00:00")));
        assert!(relative_error(dist.distributed_kwh(), 4.0) < 1e-9);
    }

    #[test]
    fn test_zero_total_produces_zero_buckets() {
        let period = resolve_period(2024, 2, None).unwrap();
        let dist = distribute_flat(&period, 0.0, &[], &HomeProfile::default());
        assert_eq!(dist.buckets.len(), 29 * 96);
        assert!(dist.buckets.values().all(|v| *v == 0.0));
    }
}
