mod categorize;
mod config;
mod db;
mod feed;
mod import;
mod ledger;
mod models;
mod run;
mod ui;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use config::{Config, DEFAULT_LOG_FILTER, LOG_FILTER_ENV};

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let config = Config::load()?;
    init_logging(&config)?;

    let mut db = db::Database::open(&config.db_path())?;

    match args.len() {
        1 => run::as_tui(&mut db),
        2.. => run::as_cli(&args, &mut db),
        _ => {
            eprintln!("Usage: budgetplanner [command]");
            Ok(())
        }
    }
}

/// Log to a file in the data directory; the terminal belongs to the TUI.
fn init_logging(config: &Config) -> Result<()> {
    let path = config.log_path();
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file: {}", path.display()))?;

    let filter =
        EnvFilter::try_from_env(LOG_FILTER_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .with_env_filter(filter)
        .init();
    Ok(())
}
