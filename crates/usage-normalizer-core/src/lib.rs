//! # Usage Normalizer Core Library
//!
//! This library turns coarse energy totals (a monthly bill or one annual
//! figure) into a deterministic series of 15-minute interval records. It is
//! the engine behind the `usage-normalizer-cli` binary and has no I/O of its
//! own beyond reading and writing its TOML configuration.
//!
//! ## Architecture
//!
//! - **Interval**: calendar helpers, billing period resolution, travel
//!   exclusions and the flat distributor
//! - **Aggregate**: monthly and annual aggregators that merge per-period
//!   buckets additively
//! - **Report**: merged series plus skipped entries and warnings
//! - **Config**: TOML-backed defaults for cutoff day, output and home profile
//!
//! ## Key Components
//!
//! - [`Normalizer`]: Facade for monthly, annual and mixed conversions
//! - [`resolve_period`]: Billing window for a month and optional cutoff day
//! - [`distribute_flat`]: Flat split of one period's total into buckets
//! - [`NormalizerConfig`]: Configuration management

pub mod aggregate;
pub mod config;
pub mod error;
pub mod interval;
pub mod normalizer;
pub mod profile;
pub mod report;
pub mod usage;

pub use aggregate::{aggregate_annual, aggregate_monthly};
pub use config::NormalizerConfig;
pub use error::{ConfigError, CoreError, NormalizeError};
pub use interval::{
    distribute_flat, is_excluded, parse_travel_json, resolve_period, BillingPeriod, Distribution,
    DistributionOutcome, IntervalBucket, IntervalRecord, TravelRange, BUCKET_MINUTES,
};
pub use normalizer::Normalizer;
pub use profile::{HomeProfile, InsulationLevel, WindowType};
pub use report::{NormalizationReport, SkippedEntry, Warning};
pub use usage::{AnnualUsage, MonthlyUsage, UsageEntry};
