//! CLI entry point for the vacancy salary statistics tool.
//!
//! Provides subcommands for analyzing a vacancy dataset and for exporting its
//! salaries normalized into the base currency.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};
use vacancy_stats::analyzers::analyzer::{analyze_file, ingest_file};
use vacancy_stats::config::{AnalysisConfig, RateConfig, Strictness};
use vacancy_stats::output::{log_series, print_json, print_pretty, write_report, write_vacancies};

#[derive(Parser)]
#[command(name = "vacancy_stats")]
#[command(about = "Salary statistics for job-vacancy datasets", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute per-year and per-city salary statistics
    Analyze {
        /// Vacancy CSV (optionally .gz)
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Job title matched as a substring of vacancy names
        #[arg(short, long)]
        title: String,

        /// Month-indexed currency rate CSV; the embedded table is used if omitted
        #[arg(short, long)]
        rates: Option<PathBuf>,

        /// Row validation mode
        #[arg(short, long, value_enum, default_value_t = Strictness::Strict)]
        strictness: Strictness,

        /// Optional: write the report to this JSON file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also log the full report as pretty-printed JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Export vacancies with salaries converted to the base currency
    Convert {
        /// Vacancy CSV (optionally .gz)
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Month-indexed currency rate CSV; the embedded table is used if omitted
        #[arg(short, long)]
        rates: Option<PathBuf>,

        /// Row validation mode
        #[arg(short, long, value_enum, default_value_t = Strictness::Lenient)]
        strictness: Strictness,

        /// CSV file to write normalized rows to
        #[arg(short, long, default_value = "convert.csv")]
        output: PathBuf,

        /// Gzip compress the output file
        #[arg(long, default_value_t = false)]
        gzip: bool,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| "logs/vacancy_stats.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("vacancy_stats.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_filter = EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?);
    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(stderr_filter);

    let json_filter = EnvFilter::from_env("RUST_LOG_JSON")
        .add_directive("debug".parse()?);
    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(json_filter);

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            input,
            title,
            rates,
            strictness,
            output,
            json,
        } => {
            let config = AnalysisConfig::new(title)
                .with_strictness(strictness)
                .with_rates(RateConfig::from_path(rates));

            let report = analyze_file(&input, &config)?;
            print_pretty(&report);
            log_series(&report)?;
            if json {
                print_json(&report)?;
            }

            if let Some(path) = output {
                write_report(&path, &report)?;
                info!(path = %path.display(), "Report written");
            }
        }
        Commands::Convert {
            input,
            rates,
            strictness,
            output,
            gzip,
        } => {
            let config = AnalysisConfig::default()
                .with_strictness(strictness)
                .with_rates(RateConfig::from_path(rates));

            let ingested = ingest_file(&input, &config)?;
            let path = write_vacancies(&output, &ingested.vacancies, gzip)?;

            info!(
                path = %path.display(),
                rows = ingested.vacancies.len(),
                skipped = ingested.summary.rows_skipped(),
                "Normalized vacancies written"
            );
        }
    }

    Ok(())
}
