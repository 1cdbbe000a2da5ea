//! Normalization results.
//!
//! A report carries the merged bucket series together with everything that
//! did not make it into the series: skipped entries with their errors and
//! warnings for energy that was dropped.

use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::warn;

use crate::error::NormalizeError;
use crate::interval::{
    into_buckets, merge_additive, BucketMap, Distribution, DistributionOutcome, IntervalBucket,
    IntervalRecord,
};
use crate::usage::UsageEntry;

/// Non-fatal conditions worth surfacing to the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    /// No valid entries were supplied
    EmptyInput,
    /// A period was entirely covered by travel ranges; its energy is dropped
    AllBucketsExcluded {
        period_start: NaiveDateTime,
        period_end: NaiveDateTime,
        dropped_kwh: f64,
    },
}

/// An entry that failed validation and was left out.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedEntry {
    /// Position in the caller's input
    pub index: usize,
    pub entry: UsageEntry,
    pub error: NormalizeError,
}

/// Bucket map under construction plus diagnostics.
///
/// Aggregators fill one of these per call; mixed inputs merge several before
/// the final report is built.
#[derive(Debug, Clone, Default)]
pub struct Aggregation {
    pub buckets: BucketMap,
    pub skipped: Vec<SkippedEntry>,
    pub warnings: Vec<Warning>,
    /// Entries that passed validation
    pub accepted_entries: usize,
    /// Sum of the totals of accepted entries
    pub input_total_kwh: f64,
}

impl Aggregation {
    /// Record an accepted entry's total.
    pub fn accept(&mut self, total_kwh: f64) {
        self.accepted_entries += 1;
        self.input_total_kwh += total_kwh;
    }

    /// Merge one period's buckets, noting dropped energy.
    pub fn absorb(&mut self, distribution: Distribution) {
        if let DistributionOutcome::AllBucketsExcluded { .. } = distribution.outcome {
            self.warnings.push(Warning::AllBucketsExcluded {
                period_start: distribution.period.start,
                period_end: distribution.period.end,
                dropped_kwh: distribution.total_kwh,
            });
        }
        merge_additive(&mut self.buckets, distribution.buckets);
    }

    pub fn skip(&mut self, index: usize, entry: UsageEntry, error: NormalizeError) {
        warn!(index, %error, "skipping usage entry");
        self.skipped.push(SkippedEntry { index, entry, error });
    }

    /// Fold another aggregation into this one, summing shared buckets.
    pub fn merge(&mut self, other: Aggregation) {
        merge_additive(&mut self.buckets, other.buckets);
        self.skipped.extend(other.skipped);
        self.warnings.extend(other.warnings);
        self.accepted_entries += other.accepted_entries;
        self.input_total_kwh += other.input_total_kwh;
    }

    /// Freeze into a report. Adds an `EmptyInput` warning when nothing was
    /// accepted.
    pub fn into_report(mut self, home_id: Option<String>, drop_zero: bool) -> NormalizationReport {
        if self.accepted_entries == 0 && !self.warnings.contains(&Warning::EmptyInput) {
            warn!("no valid usage entries to normalize");
            self.warnings.push(Warning::EmptyInput);
        }
        self.skipped.sort_by_key(|s| s.index);

        NormalizationReport {
            home_id,
            buckets: into_buckets(self.buckets, drop_zero),
            skipped: self.skipped,
            warnings: self.warnings,
            input_total_kwh: self.input_total_kwh,
        }
    }
}

/// Final, time-ordered interval series with diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizationReport {
    /// Caller's label for the home, used downstream as part of the upsert key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub home_id: Option<String>,
    pub buckets: Vec<IntervalBucket>,
    pub skipped: Vec<SkippedEntry>,
    pub warnings: Vec<Warning>,
    pub input_total_kwh: f64,
}

impl NormalizationReport {
    pub fn interval_count(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Full-precision sum of all buckets.
    pub fn output_total_kwh(&self) -> f64 {
        self.buckets.iter().map(|b| b.energy_kwh).sum()
    }

    /// Energy lost to fully excluded periods.
    pub fn dropped_kwh(&self) -> f64 {
        self.warnings
            .iter()
            .map(|w| match w {
                Warning::AllBucketsExcluded { dropped_kwh, .. } => *dropped_kwh,
                Warning::EmptyInput => 0.0,
            })
            .sum()
    }

    pub fn first_timestamp(&self) -> Option<NaiveDateTime> {
        self.buckets.first().map(|b| b.timestamp)
    }

    pub fn last_timestamp(&self) -> Option<NaiveDateTime> {
        self.buckets.last().map(|b| b.timestamp)
    }

    /// Output records rounded to `precision` decimals.
    pub fn to_records(&self, precision: u32) -> Vec<IntervalRecord> {
        self.buckets.iter().map(|b| b.to_record(precision)).collect()
    }
}
