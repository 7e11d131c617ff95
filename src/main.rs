use analytics::AnalyticsEngine;
use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use configuration::{Config, LoggingSettings};
use core_types::Panel;
use dataset::{LoadOptions, OrderTable, load_orders};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod render;

/// The main entry point for the Orderscope dashboard.
fn main() -> anyhow::Result<()> {
    // Parse command-line arguments
    let cli = Cli::parse();

    let mut config = configuration::load_config(cli.config.as_deref())
        .context("Failed to load configuration")?;
    if let Some(data) = cli.data {
        config.dataset.path = data;
    }

    // Keep the guard alive for the whole run so buffered file logs are flushed on exit.
    let _log_guard = init_tracing(&config.logging)?;

    // Execute the appropriate command
    match cli.command {
        Commands::Report(args) => handle_report(args, &config),
        Commands::Bounds => handle_bounds(&config),
        Commands::Serve(args) => handle_serve(args, &config),
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Customer purchase analysis over a static e-commerce order dataset.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a TOML configuration file (defaults to ./config.toml when present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Path to the order dataset, overriding `dataset.path` from the configuration.
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the dashboard for a date range and print its panels.
    Report(ReportArgs),
    /// Print the purchase date range and row count of the dataset.
    Bounds,
    /// Serve the dashboard as a JSON API.
    Serve(ServeArgs),
}

#[derive(Parser)]
struct ReportArgs {
    /// First purchase date to include (format: YYYY-MM-DD). Defaults to the earliest in the data.
    #[arg(long)]
    from: Option<NaiveDate>,

    /// Last purchase date to include (format: YYYY-MM-DD). Defaults to the latest in the data.
    #[arg(long)]
    to: Option<NaiveDate>,

    /// Only print these panels (overview, regions, product-ratings, rfm, payment-methods).
    #[arg(long = "panel")]
    panels: Vec<Panel>,

    /// Print the full report as JSON instead of rendering panels.
    #[arg(long)]
    json: bool,
}

#[derive(Parser)]
struct ServeArgs {
    /// Address to bind, overriding `server.host` and `server.port`.
    #[arg(long)]
    addr: Option<SocketAddr>,
}

// ==============================================================================
// Commands
// ==============================================================================

fn load_table(config: &Config) -> anyhow::Result<OrderTable> {
    let options = LoadOptions {
        delimiter: config.dataset.delimiter_byte()?,
    };
    let table = load_orders(&config.dataset.path, &options)
        .with_context(|| format!("Failed to load dataset {}", config.dataset.path.display()))?;
    if table.is_empty() {
        tracing::warn!(path = %config.dataset.path.display(), "The dataset has no rows.");
    }
    Ok(table)
}

fn handle_report(args: ReportArgs, config: &Config) -> anyhow::Result<()> {
    let table = load_table(config)?;
    let range = table
        .resolve_range(args.from, args.to)
        .context("The dataset has no orders; pass both --from and --to")?;

    let report = AnalyticsEngine::new().calculate(table.records(), range)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Customer Purchase Analysis Dashboard");
    println!("Date range: {} to {}\n", range.start, range.end);

    let panels: &[Panel] = if args.panels.is_empty() {
        &Panel::ALL
    } else {
        &args.panels
    };
    for panel in panels {
        let mut text = String::new();
        render::render_panel(&mut text, &report, *panel, &config.display)?;
        println!("{text}");
    }
    Ok(())
}

fn handle_bounds(config: &Config) -> anyhow::Result<()> {
    let table = load_table(config)?;
    match table.purchase_date_bounds() {
        Some(range) => println!(
            "{} rows, purchases from {} to {} ({} days)",
            table.len(),
            range.start,
            range.end,
            range.num_days()
        ),
        None => println!("The dataset is empty."),
    }
    Ok(())
}

fn handle_serve(args: ServeArgs, config: &Config) -> anyhow::Result<()> {
    let table = load_table(config)?;
    let addr = match args.addr {
        Some(addr) => addr,
        None => config.server.socket_addr()?,
    };
    let state = web_server::AppState::new(table, config.display.limits());

    let runtime = tokio::runtime::Runtime::new().context("Failed to start the async runtime")?;
    runtime.block_on(web_server::run_server(addr, state))
}

// ==============================================================================
// Logging
// ==============================================================================

/// Installs the global subscriber: stderr always, plus a daily rolling file when a log
/// directory is configured. `RUST_LOG` takes precedence over the configured level.
fn init_tracing(settings: &LoggingSettings) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.level))
        .context("Invalid logging.level filter")?;

    let (file_layer, guard) = match &settings.directory {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, "orderscope.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();

    Ok(guard)
}
