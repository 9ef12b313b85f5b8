use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use lonai_core::config::DEFAULT_LOG_FILTER;
use lonai_core::Config;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

mod app;
mod cli;
mod commands;
mod output;
mod progress;

use cli::{Cli, Commands};

const VERBOSE_LOG_FILTER: &str = "lonai=debug";

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    // Loading the config also loads `.env`, which may set LONAI_LOG
    let config = Config::load()?;
    init_tracing(cli.verbose, &config)?;

    match cli.command {
        Commands::Config => commands::config::run(&config),
        Commands::Research(args) => commands::research::run(&app::build(&config), args).await?,
        Commands::Chat(args) => commands::chat::run(&app::build(&config), args).await?,
        Commands::History(args) => commands::history::run(&app::build(&config), args)?,
        Commands::Batch(args) => commands::batch::run(&app::build(&config), args).await?,
    }

    Ok(())
}

/// `-v` forces debug output; otherwise the configured filter applies.
fn filter_directive(verbose: bool, configured: &str) -> &str {
    if verbose {
        VERBOSE_LOG_FILTER
    } else {
        configured
    }
}

/// Logs go to stderr, and also to `config.log_file` when one is set.
fn init_tracing(verbose: bool, config: &Config) -> Result<()> {
    let directive = filter_directive(verbose, &config.log_filter);
    let filter = EnvFilter::try_new(directive).unwrap_or_else(|e| {
        output::warning(&format!("Ignoring log filter '{directive}': {e}"));
        EnvFilter::new(DEFAULT_LOG_FILTER)
    });

    let file_layer = match &config.log_file {
        Some(path) => Some(
            fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(open_log_file(path)?)),
        ),
        None => None,
    };

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(file_layer)
        .try_init();

    Ok(())
}

fn open_log_file(path: &Path) -> Result<fs::File> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .wrap_err_with(|| format!("Failed to create log directory {}", dir.display()))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .wrap_err_with(|| format!("Failed to open log file {}", path.display()))
}
