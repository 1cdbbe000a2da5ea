//! Property tests for energy conservation and bucket alignment.

use chrono::{Datelike, Duration, NaiveDate, Timelike};
use proptest::prelude::*;
use usage_normalizer_core::{
    distribute_flat, resolve_period, AnnualUsage, DistributionOutcome, HomeProfile, MonthlyUsage,
    Normalizer, TravelRange,
};

fn relative_error(actual: f64, expected: f64) -> f64 {
    if expected == 0.0 {
        actual.abs()
    } else {
        ((actual - expected) / expected).abs()
    }
}

proptest! {
    #[test]
    fn prop_monthly_entry_conserves_total(
        year in 1990i32..2100,
        month in 1u32..=12,
        cutoff in proptest::option::of(1u32..=31),
        total in 0.0f64..100_000.0,
    ) {
        let period = resolve_period(year, month, cutoff).unwrap();
        let dist = distribute_flat(&period, total, &[], &HomeProfile::default());
        prop_assert!(relative_error(dist.distributed_kwh(), total) < 1e-6);
    }

    #[test]
    fn prop_partial_travel_conserves_total(
        month in 1u32..=12,
        cutoff in proptest::option::of(1u32..=31),
        offset in 0i64..40,
        length in 0i64..20,
        total in 1.0f64..50_000.0,
    ) {
        let period = resolve_period(2023, month, cutoff).unwrap();
        let start = period.start.date() - Duration::days(5) + Duration::days(offset);
        let travel = vec![TravelRange::new(start, start + Duration::days(length)).unwrap()];
        let dist = distribute_flat(&period, total, &travel, &HomeProfile::default());

        match dist.outcome {
            DistributionOutcome::Distributed { .. } => {
                prop_assert!(relative_error(dist.distributed_kwh(), total) < 1e-6);
            }
            DistributionOutcome::AllBucketsExcluded { .. } => {
                prop_assert!(dist.buckets.is_empty());
                prop_assert_eq!(dist.dropped_kwh(), total);
            }
            DistributionOutcome::Empty => prop_assert!(false, "monthly periods are never empty"),
        }
    }

    #[test]
    fn prop_buckets_are_aligned_and_inside_period(
        year in 2000i32..2050,
        month in 1u32..=12,
        cutoff in proptest::option::of(1u32..=31),
    ) {
        let period = resolve_period(year, month, cutoff).unwrap();
        let dist = distribute_flat(&period, 100.0, &[], &HomeProfile::default());
        for ts in dist.buckets.keys() {
            prop_assert!(period.contains(*ts));
            prop_assert_eq!(ts.minute() % 15, 0);
            prop_assert_eq!(ts.second(), 0);
        }
    }

    #[test]
    fn prop_annual_range_conserves_and_counts(
        start_offset in 0i64..365,
        days in 1i64..120,
        total in 1.0f64..20_000.0,
    ) {
        let base = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        let start = base + Duration::days(start_offset);
        let end = start + Duration::days(days - 1);
        let entry = AnnualUsage::new(total, start.to_string(), end.to_string());

        let report = Normalizer::new().annual(&entry).unwrap();
        prop_assert_eq!(report.interval_count() as i64, days * 96);
        prop_assert!(relative_error(report.output_total_kwh(), total) < 1e-6);
    }

    #[test]
    fn prop_batch_of_calendar_months_sums_all_totals(
        totals in proptest::collection::vec(0.5f64..5_000.0, 1..=12),
    ) {
        let entries: Vec<_> = totals
            .iter()
            .enumerate()
            .map(|(i, t)| MonthlyUsage::new(2022, i as u32 + 1, *t))
            .collect();
        let report = Normalizer::new().monthly(&entries).unwrap();
        let expected: f64 = totals.iter().sum();

        prop_assert!(relative_error(report.output_total_kwh(), expected) < 1e-6);
        let last = report.last_timestamp().unwrap();
        prop_assert_eq!(last.month(), entries.len() as u32);
    }
}
