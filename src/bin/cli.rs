// src/bin/cli.rs

//! tatsuzin-watch CLI
//!
//! Meant to be started by an external scheduler (cron, systemd timer). A run
//! never fails the process: errors are logged and the exit code stays 0.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tatsuzin_watch::{
    error::Result,
    models::Config,
    pipeline,
    storage::AnnouncementStore,
    utils::log as logging,
};

/// Tatsuzin release watcher
#[derive(Parser, Debug)]
#[command(
    name = "tatsuzin-watch",
    version,
    about = "Posts new Tatsuzin release announcements to a chat webhook"
)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check the feed once and notify about new releases (default)
    Run {
        /// Log the webhook messages instead of sending them
        #[arg(long)]
        dry_run: bool,
    },

    /// Validate the configuration file
    Validate,

    /// Show what the record store currently holds
    Info {
        /// Number of recent records to list
        #[arg(short, long, default_value_t = 5)]
        limit: usize,
    },
}

/// Main entry point for the CLI application.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let (config, load_error) = match Config::load(&cli.config) {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e)),
    };
    let config = config.with_env_overrides(|key| std::env::var(key).ok());

    let level = if cli.verbose {
        "debug"
    } else {
        config.logging.level.as_str()
    };
    logging::init(level, config.logging.file.as_deref());

    if let Some(e) = load_error {
        log::warn!(
            "Config load failed from {}: {}. Using defaults.",
            cli.config.display(),
            e
        );
    }

    match cli.command.unwrap_or(Command::Run { dry_run: false }) {
        Command::Run { dry_run } => {
            let checked = if dry_run {
                config.validate_without_webhook()
            } else {
                config.validate()
            };
            if let Err(e) = checked {
                log::error!("Config validation failed: {}", e);
                return Ok(());
            }
            if let Err(e) = pipeline::run_watch(config, dry_run).await {
                log::error!("Run aborted: {}", e);
                let mut source = std::error::Error::source(&e);
                while let Some(cause) = source {
                    log::error!("  caused by: {}", cause);
                    source = cause.source();
                }
            }
        }

        Command::Validate => {
            log::info!("Validating configuration...");
            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("✓ Config OK");
        }

        Command::Info { limit } => {
            log::info!("Record store: {}", config.store.path.display());
            if !config.store.path.exists() {
                log::info!("No record store found yet.");
                return Ok(());
            }

            let store = AnnouncementStore::open(&config.store.path)?;
            store.ensure_schema()?;
            log::info!("Records: {}", store.count()?);
            for record in store.recent(limit)? {
                log::info!(
                    "#{} {} {} {}",
                    record.id,
                    record.publication_date,
                    record.title,
                    record.url
                );
            }
            store.close()?;
        }
    }

    Ok(())
}
