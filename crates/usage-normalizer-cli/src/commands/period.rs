//! Billing window lookup.

use clap::Args;
use serde::Serialize;

use usage_normalizer_core::interval::TIMESTAMP_FORMAT;
use usage_normalizer_core::resolve_period;

#[derive(Args)]
pub struct PeriodArgs {
    /// Billing year
    #[arg(long)]
    year: i32,
    /// Billing month (1-12)
    #[arg(long)]
    month: u32,
    /// Day of month the bill closes (1-31); calendar month if omitted
    #[arg(long)]
    cutoff_day: Option<u32>,
}

#[derive(Serialize)]
struct PeriodView {
    start: String,
    end: String,
    buckets: i64,
}

pub fn run(args: PeriodArgs) -> Result<(), Box<dyn std::error::Error>> {
    let period = resolve_period(args.year, args.month, args.cutoff_day)?;
    let view = PeriodView {
        start: period.start.format(TIMESTAMP_FORMAT).to_string(),
        end: period.end.format(TIMESTAMP_FORMAT).to_string(),
        buckets: period.bucket_count(),
    };
    println!("{}", serde_json::to_string_pretty(&view)?);
    Ok(())
}
