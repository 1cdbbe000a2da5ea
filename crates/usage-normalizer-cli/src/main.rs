use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(
    name = "usage-normalizer-cli",
    version,
    about = "Turn monthly or annual energy totals into 15-minute intervals"
)]
struct Cli {
    /// Config file (defaults to ~/.config/usage-normalizer/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the billing window for a month
    Period(commands::period::PeriodArgs),
    /// Normalize monthly bill totals
    Monthly(commands::normalize::MonthlyArgs),
    /// Normalize an annual total
    Annual(commands::normalize::AnnualArgs),
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    init_tracing();

    let cli = Cli::parse();
    let config_path = cli.config.as_deref();
    let result = match cli.command {
        Commands::Period(args) => commands::period::run(args),
        Commands::Monthly(args) => commands::normalize::run_monthly(args, config_path),
        Commands::Annual(args) => commands::normalize::run_annual(args, config_path),
        Commands::Config { action } => commands::config::run(action, config_path),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
