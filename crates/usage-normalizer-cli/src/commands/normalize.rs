//! Monthly and annual normalization commands.

use std::io::Read;
use std::path::{Path, PathBuf};

use clap::{Args, ValueEnum};
use serde::Serialize;

use usage_normalizer_core::interval::MAX_PRECISION;
use usage_normalizer_core::{
    AnnualUsage, IntervalRecord, MonthlyUsage, NormalizationReport, Normalizer, SkippedEntry,
    TravelRange, Warning,
};

use super::load_config;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// JSON array of interval records
    Records,
    /// JSON object with records, skipped entries and warnings
    Report,
    /// Human-readable totals
    Summary,
}

/// Options shared by both normalization commands.
#[derive(Args)]
pub struct CommonArgs {
    /// Travel range to exclude, START:END or a single DATE (repeatable)
    #[arg(long = "travel", value_name = "START:END")]
    travel: Vec<TravelRange>,
    /// Label attached to the report for downstream storage
    #[arg(long)]
    home_id: Option<String>,
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Records)]
    format: OutputFormat,
    /// Decimal places in output records, 0-10 (overrides config)
    #[arg(long, value_parser = clap::value_parser!(u32).range(0..=i64::from(MAX_PRECISION)))]
    precision: Option<u32>,
}

#[derive(Args)]
pub struct MonthlyArgs {
    /// JSON file of [{"year", "month", "total_kwh"}], or - for stdin
    #[arg(long, short)]
    input: PathBuf,
    /// Day of month the bill closes (overrides config)
    #[arg(long)]
    cutoff_day: Option<u32>,
    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Args)]
pub struct AnnualArgs {
    /// Total consumption in kWh
    #[arg(long)]
    total: f64,
    /// First day (YYYY-MM-DD)
    #[arg(long)]
    start: String,
    /// Last day, inclusive (YYYY-MM-DD)
    #[arg(long)]
    end: String,
    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Serialize)]
struct ReportView<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    home_id: Option<&'a str>,
    interval_count: usize,
    input_total_kwh: f64,
    output_total_kwh: f64,
    dropped_kwh: f64,
    intervals: Vec<IntervalRecord>,
    skipped: &'a [SkippedEntry],
    warnings: &'a [Warning],
}

pub fn run_monthly(args: MonthlyArgs, config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let entries: Vec<MonthlyUsage> = serde_json::from_str(&read_input(&args.input)?)?;

    let mut normalizer = build_normalizer(&args.common, config_path)?;
    if args.cutoff_day.is_some() {
        normalizer = normalizer.with_cutoff_day(args.cutoff_day)?;
    }

    let report = normalizer.monthly(&entries)?;
    print_report(&report, &args.common, normalizer.precision())
}

pub fn run_annual(args: AnnualArgs, config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let entry = AnnualUsage::new(args.total, args.start, args.end);
    let normalizer = build_normalizer(&args.common, config_path)?;
    let report = normalizer.annual(&entry)?;
    print_report(&report, &args.common, normalizer.precision())
}

fn build_normalizer(
    common: &CommonArgs,
    config_path: Option<&Path>,
) -> Result<Normalizer, Box<dyn std::error::Error>> {
    let config = load_config(config_path)?;
    let mut normalizer = Normalizer::from_config(&config)?.with_travel(common.travel.iter().copied());
    if let Some(home_id) = &common.home_id {
        normalizer = normalizer.with_home_id(home_id.clone());
    }
    Ok(normalizer)
}

fn read_input(path: &Path) -> Result<String, Box<dyn std::error::Error>> {
    if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        std::fs::read_to_string(path)
            .map_err(|e| format!("cannot read {}: {e}", path.display()).into())
    }
}

fn print_report(
    report: &NormalizationReport,
    common: &CommonArgs,
    configured_precision: u32,
) -> Result<(), Box<dyn std::error::Error>> {
    let precision = common.precision.unwrap_or(configured_precision);

    match common.format {
        OutputFormat::Records => {
            println!("{}", serde_json::to_string_pretty(&report.to_records(precision))?);
        }
        OutputFormat::Report => {
            let view = ReportView {
                home_id: report.home_id.as_deref(),
                interval_count: report.interval_count(),
                input_total_kwh: report.input_total_kwh,
                output_total_kwh: report.output_total_kwh(),
                dropped_kwh: report.dropped_kwh(),
                intervals: report.to_records(precision),
                skipped: &report.skipped,
                warnings: &report.warnings,
            };
            println!("{}", serde_json::to_string_pretty(&view)?);
        }
        OutputFormat::Summary => print_summary(report),
    }

    for skipped in &report.skipped {
        eprintln!("skipped entry {}: {}", skipped.index, skipped.error);
    }
    Ok(())
}

fn print_summary(report: &NormalizationReport) {
    println!("\nNormalization Summary\n");
    println!("{}", "=".repeat(50));
    if let Some(home_id) = &report.home_id {
        println!("  Home: {home_id}");
    }
    println!("  Intervals: {}", report.interval_count());
    match (report.first_timestamp(), report.last_timestamp()) {
        (Some(first), Some(last)) => println!("  Range: {first} to {last}"),
        _ => println!("  Range: (none)"),
    }
    println!("  Input total: {:.4} kWh", report.input_total_kwh);
    println!("  Output total: {:.4} kWh", report.output_total_kwh());
    if report.dropped_kwh() > 0.0 {
        println!("  Dropped (fully excluded periods): {:.4} kWh", report.dropped_kwh());
    }
    println!("  Skipped entries: {}", report.skipped.len());

    for warning in &report.warnings {
        match warning {
            Warning::EmptyInput => println!("  ⚠ No valid entries"),
            Warning::AllBucketsExcluded {
                period_start,
                period_end,
                dropped_kwh,
            } => println!(
                "  ⚠ {period_start} to {period_end} fully excluded ({dropped_kwh:.4} kWh dropped)"
            ),
        }
    }
    println!("{}", "=".repeat(50));
}
