//! Annual (or arbitrary date-range) totals → merged interval series.

use tracing::{debug, info, warn};

use crate::error::NormalizeError;
use crate::interval::calendar::{last_bucket_of_day, start_of_day};
use crate::interval::{distribute_flat, BillingPeriod, TravelRange};
use crate::profile::HomeProfile;
use crate::report::Aggregation;
use crate::usage::AnnualUsage;

/// Spread an annual total over every day of its range, one distribution per
/// day from 00:00 to 23:45.
///
/// The daily share is the total divided by the inclusive day count. A day
/// covered by a travel range keeps none of its share: the distributor reports
/// it as fully excluded and the share is recorded as a dropped-energy warning.
///
/// # Errors
/// Fails as a whole, with no partial output: `InvalidDateFormat` for an
/// unparseable date, `InvalidRange` for an end before the start,
/// `InvalidTotal` for a negative or non-finite total.
pub fn aggregate_annual(
    entry: &AnnualUsage,
    travel: &[TravelRange],
    profile: &HomeProfile,
) -> Result<Aggregation, NormalizeError> {
    entry.validate()?;
    let (start, end) = entry.date_range()?;

    let windows = start
        .iter_days()
        .take_while(|d| *d <= end)
        .map(|day| Ok(BillingPeriod::new(start_of_day(day)?, last_bucket_of_day(day)?)))
        .collect::<Result<Vec<_>, NormalizeError>>()?;

    let daily_kwh = entry.total_kwh / windows.len() as f64;
    debug!(total_days = windows.len(), daily_kwh, "distributing annual total per day");

    let mut aggregation = Aggregation::default();
    aggregation.accept(entry.total_kwh);
    for window in &windows {
        aggregation.absorb(distribute_flat(window, daily_kwh, travel, profile));
    }

    let excluded_days = aggregation.warnings.len();
    if excluded_days > 0 {
        warn!(
            excluded_days,
            dropped_kwh = daily_kwh * excluded_days as f64,
            "annual range has days excluded by travel ranges"
        );
    }

    info!(
        total_kwh = entry.total_kwh,
        start = %start,
        end = %end,
        buckets = aggregation.buckets.len(),
        "aggregated annual usage"
    );
    Ok(aggregation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::Warning;
    use chrono::NaiveDate;

    fn run(entry: &AnnualUsage, travel: &[TravelRange]) -> Result<Aggregation, NormalizeError> {
        aggregate_annual(entry, travel, &HomeProfile::default())
    }

    #[test]
    fn test_full_common_year_bucket_count() {
        let agg = run(&AnnualUsage::new(10950.0, "2023-01-01", "2023-12-31"), &[]).unwrap();
        assert_eq!(agg.buckets.len(), 365 * 96);
        let total: f64 = agg.buckets.values().sum();
        assert!((total - 10950.0).abs() / 10950.0 < 1e-6);
        // 30 kWh/day over 96 buckets
        assert!(agg.buckets.values().all(|v| (v - 0.3125).abs() < 1e-12));
    }

    #[test]
    fn test_leap_year_has_extra_day() {
        let agg = run(&AnnualUsage::new(3660.0, "2024-01-01", "2024-12-31"), &[]).unwrap();
        assert_eq!(agg.buckets.len(), 366 * 96);
    }

    #[test]
    fn test_single_day_range() {
        let agg = run(&AnnualUsage::new(24.0, "2024-02-29", "2024-02-29"), &[]).unwrap();
        assert_eq!(agg.buckets.len(), 96);
        let total: f64 = agg.buckets.values().sum();
        assert!((total - 24.0).abs() < 1e-9);
    }

    #[test]
    fn test_travel_days_drop_their_share() {
        let travel = vec![TravelRange::parse("2023-07-01", "2023-07-14").unwrap()];
        let agg = run(&AnnualUsage::new(3650.0, "2023-01-01", "2023-12-31"), &travel).unwrap();

        assert_eq!(agg.buckets.len(), (365 - 14) * 96);
        let total: f64 = agg.buckets.values().sum();
        assert!((total - 3650.0 * 351.0 / 365.0).abs() < 1e-6);
        assert!(agg.buckets.values().all(|v| (v - 10.0 / 96.0).abs() < 1e-12));

        assert_eq!(agg.warnings.len(), 14);
        assert!(agg.warnings.iter().all(|w| matches!(
            w,
            Warning::AllBucketsExcluded { dropped_kwh, .. } if (*dropped_kwh - 10.0).abs() < 1e-9
        )));
        assert_eq!(agg.input_total_kwh, 3650.0);
    }

    #[test]
    fn test_excluded_day_keeps_other_days_unchanged() {
        let travel = vec![TravelRange::day(NaiveDate::from_ymd_opt(2024, 6, 2).unwrap())];
        let agg = run(&AnnualUsage::new(48.0, "2024-06-01", "2024-06-02"), &travel).unwrap();

        assert_eq!(agg.buckets.len(), 96);
        assert!(agg.buckets.values().all(|v| (v - 0.25).abs() < 1e-12));
        let total: f64 = agg.buckets.values().sum();
        assert!((total - 24.0).abs() < 1e-9);
        match agg.warnings.as_slice() {
            [Warning::AllBucketsExcluded { period_start, dropped_kwh, .. }] => {
                assert_eq!(period_start.date(), NaiveDate::from_ymd_opt(2024, 6, 2).unwrap());
                assert_eq!(*dropped_kwh, 24.0);
            }
            other => panic!("unexpected warnings: {other:?}"),
        }
    }

    #[test]
    fn test_fully_excluded_range_warns_per_day() {
        let travel = vec![TravelRange::parse("2023-12-01", "2024-01-31").unwrap()];
        let agg = run(&AnnualUsage::new(310.0, "2024-01-01", "2024-01-31"), &travel).unwrap();

        assert!(agg.buckets.is_empty());
        assert_eq!(agg.accepted_entries, 1);
        assert_eq!(agg.warnings.len(), 31);
        let dropped: f64 = agg
            .warnings
            .iter()
            .map(|w| match w {
                Warning::AllBucketsExcluded { dropped_kwh, .. } => *dropped_kwh,
                Warning::EmptyInput => 0.0,
            })
            .sum();
        assert!((dropped - 310.0).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_inputs_fail_atomically() {
        assert!(matches!(
            run(&AnnualUsage::new(100.0, "01/01/2023", "2023-12-31"), &[]),
            Err(NormalizeError::InvalidDateFormat { .. })
        ));
        assert!(matches!(
            run(&AnnualUsage::new(100.0, "2023-01-01", "not-a-date"), &[]),
            Err(NormalizeError::InvalidDateFormat { .. })
        ));
        assert!(matches!(
            run(&AnnualUsage::new(100.0, "2023-12-31", "2023-01-01"), &[]),
            Err(NormalizeError::InvalidRange { .. })
        ));
        assert!(matches!(
            run(&AnnualUsage::new(-1.0, "2023-01-01", "2023-12-31"), &[]),
            Err(NormalizeError::InvalidTotal { .. })
        ));
    }
}
