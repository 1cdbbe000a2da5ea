//! Normalizer facade.
//!
//! Holds the settings shared by every conversion (cutoff day, travel ranges,
//! home profile, output options) and dispatches monthly, annual and mixed
//! entry lists to the aggregators.

use tracing::{debug, info};

use crate::aggregate::{aggregate_annual, aggregate_monthly};
use crate::config::NormalizerConfig;
use crate::error::{ConfigError, NormalizeError};
use crate::interval::{validate_cutoff_day, TravelRange, DEFAULT_PRECISION};
use crate::profile::HomeProfile;
use crate::report::{Aggregation, NormalizationReport};
use crate::usage::{AnnualUsage, MonthlyUsage, UsageEntry};

/// Converts usage totals into 15-minute interval reports.
///
/// Pure and synchronous: the same inputs always produce the same report, and
/// a `Normalizer` can be shared across threads.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalizer {
    cutoff_day: Option<u32>,
    travel: Vec<TravelRange>,
    profile: HomeProfile,
    home_id: Option<String>,
    drop_zero_buckets: bool,
    precision: u32,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Normalizer {
    /// Calendar months, no travel, empty profile.
    pub fn new() -> Self {
        Self {
            cutoff_day: None,
            travel: Vec::new(),
            profile: HomeProfile::default(),
            home_id: None,
            drop_zero_buckets: true,
            precision: DEFAULT_PRECISION,
        }
    }

    /// Build from a validated configuration.
    pub fn from_config(config: &NormalizerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            cutoff_day: config.billing.cutoff_day,
            travel: config.travel.clone(),
            profile: config.home.clone(),
            home_id: None,
            drop_zero_buckets: config.output.drop_zero_buckets,
            precision: config.output.precision,
        })
    }

    /// # Errors
    /// Returns `InvalidRange` for a day outside 1-31.
    pub fn with_cutoff_day(mut self, cutoff_day: Option<u32>) -> Result<Self, NormalizeError> {
        if let Some(day) = cutoff_day {
            validate_cutoff_day(day)?;
        }
        self.cutoff_day = cutoff_day;
        Ok(self)
    }

    /// Add travel ranges on top of any already configured.
    pub fn with_travel(mut self, travel: impl IntoIterator<Item = TravelRange>) -> Self {
        self.travel.extend(travel);
        self
    }

    pub fn with_profile(mut self, profile: HomeProfile) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_home_id(mut self, home_id: impl Into<String>) -> Self {
        self.home_id = Some(home_id.into());
        self
    }

    pub fn with_drop_zero_buckets(mut self, drop_zero_buckets: bool) -> Self {
        self.drop_zero_buckets = drop_zero_buckets;
        self
    }

    pub fn cutoff_day(&self) -> Option<u32> {
        self.cutoff_day
    }

    pub fn travel(&self) -> &[TravelRange] {
        &self.travel
    }

    pub fn profile(&self) -> &HomeProfile {
        &self.profile
    }

    /// Decimal places used when rendering records.
    pub fn precision(&self) -> u32 {
        self.precision
    }

    /// Normalize a batch of monthly bills sharing this normalizer's cutoff day.
    ///
    /// Invalid entries are skipped and listed in the report.
    ///
    /// # Errors
    /// Only fails if the configured cutoff day is out of range.
    pub fn monthly(&self, entries: &[MonthlyUsage]) -> Result<NormalizationReport, NormalizeError> {
        let aggregation = aggregate_monthly(entries, self.cutoff_day, &self.travel, &self.profile)?;
        Ok(self.finish(aggregation))
    }

    /// Normalize one annual total.
    ///
    /// # Errors
    /// Fails as a whole on a malformed date, reversed range or invalid total.
    pub fn annual(&self, entry: &AnnualUsage) -> Result<NormalizationReport, NormalizeError> {
        let aggregation = aggregate_annual(entry, &self.travel, &self.profile)?;
        Ok(self.finish(aggregation))
    }

    /// Normalize a mixed list of entries into one merged series.
    ///
    /// Monthly entries run as one batch; each annual entry runs on its own.
    /// A failed annual entry is listed as skipped like an invalid monthly one.
    /// Skipped indices refer to positions in `entries`.
    pub fn normalize(&self, entries: &[UsageEntry]) -> NormalizationReport {
        let mut monthly = Vec::new();
        let mut monthly_index = Vec::new();
        let mut combined = Aggregation::default();

        let requested_kwh: f64 = entries.iter().map(UsageEntry::total_kwh).sum();
        debug!(entries = entries.len(), requested_kwh, "normalizing mixed entries");

        for (index, entry) in entries.iter().enumerate() {
            match entry {
                UsageEntry::Monthly(m) => {
                    monthly.push(m.clone());
                    monthly_index.push(index);
                }
                UsageEntry::Annual(a) => match aggregate_annual(a, &self.travel, &self.profile) {
                    Ok(aggregation) => combined.merge(aggregation),
                    Err(error) => combined.skip(index, entry.clone(), error),
                },
            }
        }

        if !monthly.is_empty() {
            match aggregate_monthly(&monthly, self.cutoff_day, &self.travel, &self.profile) {
                Ok(mut aggregation) => {
                    for skipped in &mut aggregation.skipped {
                        skipped.index = monthly_index[skipped.index];
                    }
                    combined.merge(aggregation);
                }
                Err(error) => {
                    for (entry, index) in monthly.into_iter().zip(monthly_index) {
                        combined.skip(index, UsageEntry::Monthly(entry), error.clone());
                    }
                }
            }
        }

        self.finish(combined)
    }

    fn finish(&self, aggregation: Aggregation) -> NormalizationReport {
        let report = aggregation.into_report(self.home_id.clone(), self.drop_zero_buckets);
        info!(
            home_id = self.home_id.as_deref().unwrap_or("-"),
            intervals = report.interval_count(),
            skipped = report.skipped.len(),
            warnings = report.warnings.len(),
            "normalization complete"
        );
        report
    }
}
