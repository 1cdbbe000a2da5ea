//! Aggregators that turn usage entries into one merged bucket series.
//!
//! Both aggregators distribute per period, merge additively on timestamp and
//! leave sorting, zero-dropping and rounding to the final report.

mod annual;
mod monthly;

pub use annual::aggregate_annual;
pub use monthly::aggregate_monthly;
