//! FearLab CLI — query the fear-spike monitor from the terminal.
//!
//! Commands:
//! - `query` — fetch both index series for a window and report signals,
//!   forward returns and the benchmark baseline
//! - `relays` — show the relay chain a query would use

mod export;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use fearlab_core::data::{ReqwestTransport, RelayDescriptor};
use fearlab_core::domain::{QueryRange, WindowPreset};
use fearlab_core::{FearlabConfig, QueryEngine, QueryReport};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(
    name = "fearlab",
    about = "FearLab CLI — volatility fear-spike monitor with forward-return history"
)]
struct Cli {
    /// Log relay attempts and pipeline stages (debug level).
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch, detect and report for one display window.
    Query {
        /// Named window ending today: 1y, 2y, 5y, 10y, 20y, 50y. Defaults to 1y.
        #[arg(long, conflicts_with_all = ["start", "end"])]
        window: Option<WindowPreset>,

        /// Custom range start (YYYY-MM-DD). Requires --end.
        #[arg(long)]
        start: Option<String>,

        /// Custom range end (YYYY-MM-DD). Requires --start.
        #[arg(long)]
        end: Option<String>,

        /// Path to a TOML config file.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Per-relay timeout in seconds (overrides the config file).
        #[arg(long)]
        timeout_secs: Option<u64>,

        /// Also try the upstream directly after every relay has failed.
        #[arg(long, default_value_t = false)]
        direct: bool,

        /// Print the full report as JSON instead of a summary.
        #[arg(long, default_value_t = false)]
        json: bool,

        /// Write the signal table to this CSV file.
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// List the configured relay chain in fallback order.
    Relays {
        /// Path to a TOML config file.
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Query {
            window,
            start,
            end,
            config,
            timeout_secs,
            direct,
            json,
            csv,
        } => {
            run_query(
                window,
                start,
                end,
                config,
                timeout_secs,
                direct,
                json,
                csv,
            )
            .await
        }
        Commands::Relays { config } => run_relays(config.as_deref()),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "fearlab_core=debug,fearlab=debug" } else { "fearlab_core=info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .init();
}

fn load_config(path: Option<&Path>) -> Result<FearlabConfig> {
    match path {
        Some(path) => Ok(FearlabConfig::from_file(path)?),
        None => Ok(FearlabConfig::default()),
    }
}

fn parse_date(s: Option<&str>) -> Result<Option<NaiveDate>> {
    s.map(|s| {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").with_context(|| format!("invalid date '{s}'"))
    })
    .transpose()
}

#[allow(clippy::too_many_arguments)]
async fn run_query(
    window: Option<WindowPreset>,
    start: Option<String>,
    end: Option<String>,
    config_path: Option<PathBuf>,
    timeout_secs: Option<u64>,
    direct: bool,
    json: bool,
    csv_path: Option<PathBuf>,
) -> Result<()> {
    let mut config = load_config(config_path.as_deref())?;
    if let Some(secs) = timeout_secs {
        config.timeout_secs = secs;
    }
    if direct {
        config.relays.push(RelayDescriptor::direct());
    }
    config.validate()?;

    let range = if start.is_some() || end.is_some() {
        QueryRange::custom(parse_date(start.as_deref())?, parse_date(end.as_deref())?)?
    } else {
        let preset = window.unwrap_or(WindowPreset::OneYear);
        QueryRange::preset(preset, chrono::Utc::now().date_naive())
    };

    let transport = Arc::new(ReqwestTransport::new()?);
    let engine = QueryEngine::new(config, transport);

    let report = match engine.run(range).await {
        Ok(report) => report,
        Err(err) => {
            eprintln!("Status:         {}", err.status());
            bail!(err);
        }
    };

    if let Some(path) = &csv_path {
        let table = export::export_signals_csv(&report.result.signal_events)?;
        std::fs::write(path, table)
            .with_context(|| format!("failed to write signals CSV {}", path.display()))?;
    }

    if json {
        println!("{}", export::export_json(&report)?);
    } else {
        print_report(&report);
        if let Some(path) = &csv_path {
            println!("Signals saved to: {}", path.display());
        }
    }

    Ok(())
}

fn run_relays(config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;

    println!("Timeout per relay: {}s", config.timeout_secs);
    println!();
    println!("{:<4} {:<12} {:<8} {}", "#", "Relay", "Encoding", "Prefix");
    println!("{}", "-".repeat(72));
    for (i, relay) in config.relays.iter().enumerate() {
        println!(
            "{:<4} {:<12} {:<8} {}",
            i + 1,
            relay.id,
            format!("{:?}", relay.encoding).to_lowercase(),
            relay.prefix
        );
    }
    Ok(())
}

fn pct(value: Option<f64>) -> String {
    value
        .map(|v| format!("{v:.2}%"))
        .unwrap_or_else(|| "Pending".into())
}

fn print_report(report: &QueryReport) {
    let summary = &report.summary;
    let result = &report.result;

    println!();
    println!("=== Fear Spike Monitor ===");
    println!(
        "Window:         {} to {}",
        report.range.display_start, report.range.display_end
    );
    println!("Fetched until:  {}", report.fetch_window.end);
    for source in &report.sources {
        println!(
            "Source:         {} {} via {} ({} attempt(s))",
            source.series,
            source.symbol,
            source.relay_id,
            source.attempts.len()
        );
    }
    if let Some(latest) = result.latest() {
        println!(
            "Latest:         {}  primary {:.2}  volatility {:.2}",
            latest.date, latest.primary, latest.secondary
        );
    }
    println!("Status:         {}", summary.status);
    println!();
    println!("--- Forward Returns ---");
    println!("Signals:        {} ({} pending)", summary.signal_count, summary.pending_count);
    println!(
        "Avg 6M:         {}",
        pct(summary.average_six_month_return)
    );
    println!(
        "Avg 12M:        {}",
        pct(summary.average_twelve_month_return)
    );
    println!(
        "Benchmark 12M:  {}",
        pct(summary.benchmark_average_return)
    );
    if let Some(edge) = summary.edge_over_benchmark() {
        println!("Edge vs bench:  {edge:+.2}%");
    }

    if !result.signal_events.is_empty() {
        println!();
        println!(
            "{:<12} {:>10} {:>8} {:>10} {:>10}",
            "Date", "Primary", "Vol", "6M", "12M"
        );
        println!("{}", "-".repeat(54));
        for e in &result.signal_events {
            println!(
                "{:<12} {:>10.2} {:>8.2} {:>10} {:>10}",
                e.date.to_string(),
                e.primary_at_signal,
                e.secondary_at_signal,
                pct(e.six_month_return),
                pct(e.twelve_month_return)
            );
        }
    }
    println!();
    println!("Fingerprint:    {}", report.fingerprint);
}
