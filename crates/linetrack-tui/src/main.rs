//! `linetrack`: terminal console for a tracking line.
//!
//! Two screens: a dashboard of per-station counter boxes that refresh on a
//! fixed interval, and a settings editor for businesses and their stations.
//! Screens are navigable via number keys (1-2) or Tab.
//!
//! Logs are written to a file (default `/tmp/linetrack.log`) to avoid
//! corrupting the terminal UI.
//!
//! Entry point: CLI argument parsing, tracing setup, panic hooks, config
//! loading, and app launch.

mod action;
mod app;
mod component;
mod counter_bridge;
mod event;
mod screen;
mod screens;
mod theme;
mod tui;
mod widgets;

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use linetrack_config::{Config, CounterConfig};
use linetrack_core::{Direction, LineClient};

use crate::app::App;

/// Terminal console for line counters and business/station settings.
#[derive(Parser, Debug)]
#[command(name = "linetrack", version, about)]
struct Cli {
    /// Config file (defaults to the platform config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Base URL of the counter endpoint
    #[arg(long, env = "LINETRACK_COUNTER_URL")]
    counter_url: Option<String>,

    /// Base URL of the business/station endpoints
    #[arg(long, env = "LINETRACK_ADMIN_URL")]
    admin_url: Option<String>,

    /// Seconds between counter fetches
    #[arg(short, long)]
    poll_interval: Option<u64>,

    /// Counter box as STATION:DIRECTION (e.g. 3:in); repeatable, replaces
    /// the configured boxes
    #[arg(long = "counter", value_name = "STATION:DIRECTION", value_parser = parse_counter)]
    counters: Vec<CounterConfig>,

    /// Accept invalid TLS certificates
    #[arg(short = 'k', long)]
    insecure: bool,

    /// Log file path (defaults to /tmp/linetrack.log)
    #[arg(long, default_value = "/tmp/linetrack.log")]
    log_file: PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Write the effective configuration to the config file and exit
    #[arg(long)]
    write_config: bool,
}

fn parse_counter(raw: &str) -> Result<CounterConfig, String> {
    let (station, direction) = raw
        .rsplit_once(':')
        .ok_or_else(|| format!("expected STATION:DIRECTION, got '{raw}'"))?;
    let station = station.trim();
    if station.is_empty() {
        return Err("station must not be empty".into());
    }
    Ok(CounterConfig {
        station: station.to_owned(),
        direction: direction.parse::<Direction>()?,
    })
}

/// CLI flags win over the config file and environment.
fn apply_overrides(cli: &Cli, config: &mut Config) {
    if let Some(url) = &cli.counter_url {
        config.api.counter_url.clone_from(url);
    }
    if let Some(url) = &cli.admin_url {
        config.api.admin_url.clone_from(url);
    }
    if let Some(secs) = cli.poll_interval {
        config.dashboard.poll_interval = secs;
    }
    if !cli.counters.is_empty() {
        config.dashboard.counters.clone_from(&cli.counters);
    }
    if cli.insecure {
        config.api.insecure = true;
    }
}

/// Set up file-based tracing. Nothing may log to stdout/stderr while the
/// TUI owns the terminal. Hold the returned guard until exit so logs flush.
fn setup_tracing(cli: &Cli) -> WorkerGuard {
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "linetrack={log_level},linetrack_core={log_level},linetrack_api={log_level}"
        ))
    });

    let log_dir = cli
        .log_file
        .parent()
        .unwrap_or(std::path::Path::new("/tmp"));
    let log_filename = cli
        .log_file
        .file_name()
        .unwrap_or(std::ffi::OsStr::new("linetrack.log"));

    let file_appender = tracing_appender::rolling::never(log_dir, log_filename);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true),
        )
        .init();

    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tui::install_hooks()?;
    let _log_guard = setup_tracing(&cli);

    let config_path = cli.config.clone().unwrap_or_else(linetrack_config::config_path);
    let mut config = linetrack_config::load_config_from(&config_path)
        .wrap_err_with(|| format!("loading {}", config_path.display()))?;
    apply_overrides(&cli, &mut config);
    let settings = config.to_settings()?;

    if cli.write_config {
        linetrack_config::save_config_to(&config_path, &config)?;
        println!("wrote {}", config_path.display());
        return Ok(());
    }

    info!(
        counter_url = %settings.counter_url,
        admin_url = %settings.admin_url,
        counters = settings.counters.len(),
        "starting linetrack"
    );

    let client = LineClient::new(
        settings.counter_url.clone(),
        settings.admin_url.clone(),
        &settings.transport,
    )?;
    let mut app = App::new(client, settings);
    app.run().await?;

    Ok(())
}
