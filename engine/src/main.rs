// Engine main entry point: command-line front-end over the scan service.
use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use engine::config::EngineSettings;
use engine::data::CsvMarketDataProvider;
use engine::services::{ScanCancel, ScanService};
use engine::table::{render_candidates, render_results};
use shared::models::Market;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "engine", version, about = "Trend-following stock scanner")]
struct Cli {
    /// JSON settings file; unset fields keep their defaults
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding listing_<market>.csv and history/<code>.csv
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the instruments a scan would analyse
    Candidates {
        #[arg(long, default_value = "KOSDAQ")]
        market: Market,
        #[arg(long, default_value_t = 50)]
        count: usize,
    },
    /// Scan candidates and print the ones in an aligned uptrend, strongest first
    Scan {
        #[arg(long, default_value = "KOSDAQ")]
        market: Market,
        #[arg(long, default_value_t = 50)]
        count: usize,
        /// Candidates analysed at once (1 = sequential)
        #[arg(long)]
        concurrency: Option<usize>,
        /// Evaluate as of this date (YYYY-MM-DD) instead of today
        #[arg(long)]
        as_of: Option<NaiveDate>,
        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let mut settings = match &cli.config {
        Some(path) => EngineSettings::load(path).with_context(|| format!("loading settings from {}", path.display()))?,
        None => EngineSettings::default(),
    };
    if let Some(dir) = cli.data_dir {
        settings.data_dir = dir;
    }

    match cli.command {
        Command::Candidates { market, count } => {
            let service = build_service(settings, None);
            let candidates = service.select_candidates(market, count).await?;
            println!("{}", render_candidates(&candidates));
        }
        Command::Scan { market, count, concurrency, as_of, json } => {
            if let Some(k) = concurrency {
                settings.max_concurrency = k;
            }
            settings.validate()?;
            let service = build_service(settings, as_of);

            let cancel = ScanCancel::new();
            let on_signal = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    on_signal.cancel();
                }
            });

            let report = service
                .run_scan_with_cancel(market, count, &cancel, |p| {
                    eprint!("\r[{:>3.0}%] {}/{} analysing {:<30}", p.fraction() * 100.0, p.completed, p.total, p.current_name);
                    let _ = std::io::stderr().flush();
                })
                .await?;
            eprintln!();

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else if report.is_empty() {
                println!(
                    "No instruments matched the trend filter ({} analysed). The market may be in a downtrend.",
                    report.attempted
                );
            } else {
                println!(
                    "{} of {} instruments in an aligned uptrend (strongest first):",
                    report.results.len(),
                    report.attempted
                );
                println!("{}", render_results(market, &report.results));
            }
            if report.cancelled {
                eprintln!("Scan cancelled after {} of {} candidates.", report.attempted, report.candidates);
            }
        }
    }
    Ok(())
}

fn build_service(settings: EngineSettings, as_of: Option<NaiveDate>) -> ScanService {
    info!(data_dir = %settings.data_dir.display(), "Using CSV market data");
    let provider = Arc::new(CsvMarketDataProvider::new(settings.data_dir.clone()));
    let service = ScanService::new(provider, settings);
    match as_of {
        Some(date) => service.with_as_of(date),
        None => service,
    }
}
