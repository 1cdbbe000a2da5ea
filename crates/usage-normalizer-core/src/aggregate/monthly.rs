//! Monthly bill totals → merged interval series.

use tracing::info;

use crate::error::NormalizeError;
use crate::interval::{distribute_flat, resolve_period, validate_cutoff_day, TravelRange};
use crate::profile::HomeProfile;
use crate::report::Aggregation;
use crate::usage::{MonthlyUsage, UsageEntry};

/// Distribute every monthly entry over its billing period and merge the
/// results additively.
///
/// All entries share `cutoff_day`. Adjacent periods can overlap near a
/// clamped cutoff, in which case the shared buckets carry the sum of both
/// entries' shares. An entry that fails validation is skipped and listed in
/// the aggregation; the rest of the batch still goes through.
///
/// # Errors
/// Returns `InvalidRange` only when `cutoff_day` is outside 1-31, since it
/// applies to every entry.
pub fn aggregate_monthly(
    entries: &[MonthlyUsage],
    cutoff_day: Option<u32>,
    travel: &[TravelRange],
    profile: &HomeProfile,
) -> Result<Aggregation, NormalizeError> {
    if let Some(day) = cutoff_day {
        validate_cutoff_day(day)?;
    }

    let mut aggregation = Aggregation::default();
    for (index, entry) in entries.iter().enumerate() {
        let period = match entry
            .validate()
            .and_then(|()| resolve_period(entry.year, entry.month, cutoff_day))
        {
            Ok(period) => period,
            Err(error) => {
                aggregation.skip(index, UsageEntry::Monthly(entry.clone()), error);
                continue;
            }
        };

        aggregation.accept(entry.total_kwh);
        aggregation.absorb(distribute_flat(&period, entry.total_kwh, travel, profile));
    }

    info!(
        entries = entries.len(),
        accepted = aggregation.accepted_entries,
        skipped = aggregation.skipped.len(),
        buckets = aggregation.buckets.len(),
        "aggregated monthly usage"
    );
    Ok(aggregation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::Warning;
    use chrono::NaiveDateTime;

    fn ts(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").unwrap()
    }

    fn run(entries: &[MonthlyUsage], cutoff: Option<u32>, travel: &[TravelRange]) -> Aggregation {
        aggregate_monthly(entries, cutoff, travel, &HomeProfile::default()).unwrap()
    }

    #[test]
    fn test_calendar_months_concatenate() {
        let entries = vec![
            MonthlyUsage::new(2024, 1, 1200.0),
            MonthlyUsage::new(2024, 2, 1100.0),
        ];
        let agg = run(&entries, None, &[]);

        assert_eq!(agg.buckets.len(), (31 + 29) * 96);
        assert_eq!(agg.accepted_entries, 2);
        let total: f64 = agg.buckets.values().sum();
        assert!((total - 2300.0).abs() / 2300.0 < 1e-6);
    }

    #[test]
    fn test_invalid_entries_are_skipped_not_fatal() {
        let entries = vec![
            MonthlyUsage::new(2024, 1, 100.0),
            MonthlyUsage::new(2024, 13, 100.0),
            MonthlyUsage::new(2024, 2, f64::NAN),
            MonthlyUsage::new(2024, 3, 100.0),
        ];
        let agg = run(&entries, None, &[]);

        assert_eq!(agg.accepted_entries, 2);
        assert_eq!(agg.skipped.len(), 2);
        assert_eq!(agg.skipped[0].index, 1);
        assert!(matches!(agg.skipped[0].error, NormalizeError::InvalidRange { .. }));
        assert_eq!(agg.skipped[1].index, 2);
        assert!(matches!(agg.skipped[1].error, NormalizeError::InvalidTotal { .. }));
        assert!((agg.input_total_kwh - 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_bad_cutoff_day_rejects_batch() {
        let entries = vec![MonthlyUsage::new(2024, 1, 100.0)];
        let err = aggregate_monthly(&entries, Some(32), &[], &HomeProfile::default()).unwrap_err();
        assert!(matches!(err, NormalizeError::InvalidRange { .. }));
    }

    #[test]
    fn test_overlapping_cutoff_periods_sum() {
        // Cutoff 31: April ends Apr 30, May starts Apr 30.
        let entries = vec![
            MonthlyUsage::new(2024, 4, 310.0),
            MonthlyUsage::new(2024, 5, 320.0),
        ];
        let agg = run(&entries, Some(31), &[]);

        let april_share = 310.0 / (31.0 * 96.0);
        let may_share = 320.0 / (32.0 * 96.0);
        let shared = agg.buckets[&ts("2024-04-30T12:00:00")];
        assert!((shared - (april_share + may_share)).abs() < 1e-12);
        assert!((agg.buckets[&ts("2024-04-29T12:00:00")] - april_share).abs() < 1e-12);
        assert!((agg.buckets[&ts("2024-05-01T12:00:00")] - may_share).abs() < 1e-12);
    }

    #[test]
    fn test_fully_excluded_month_warns() {
        let entries = vec![
            MonthlyUsage::new(2024, 6, 600.0),
            MonthlyUsage::new(2024, 7, 700.0),
        ];
        let travel = vec![TravelRange::parse("2024-06-01", "2024-06-30").unwrap()];
        let agg = run(&entries, None, &travel);

        assert_eq!(agg.accepted_entries, 2);
        assert_eq!(agg.buckets.len(), 31 * 96);
        assert_eq!(agg.warnings.len(), 1);
        assert!(matches!(
            agg.warnings[0],
            Warning::AllBucketsExcluded { dropped_kwh, .. } if dropped_kwh == 600.0
        ));
    }
}
