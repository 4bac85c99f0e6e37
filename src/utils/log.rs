// src/utils/log.rs

//! Log output setup for the command-line binary.
//!
//! Lines look like `2024-10-01T09:00:00 [INFO] (tatsuzin_watch::pipeline) message`
//! and go to stderr, plus an optional log file.

use std::fs::{File, OpenOptions};
use std::path::Path;
use std::str::FromStr;

use log::LevelFilter;
use simplelog::{
    ColorChoice, CombinedLogger, Config, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    WriteLogger, format_description,
};

/// Environment variable that overrides the configured level.
pub const LEVEL_ENV: &str = "RUST_LOG";

/// Initialize logging to stderr and, when `file` is set, to that file too.
///
/// `RUST_LOG` (a plain level such as `debug`) takes precedence over
/// `default_level`. A log file that cannot be opened leaves stderr logging
/// in place.
pub fn init(default_level: &str, file: Option<&Path>) {
    let requested = std::env::var(LEVEL_ENV).ok();
    let level = parse_level(requested.as_deref().unwrap_or(default_level));
    let config = build_config();

    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        level,
        config.clone(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )];

    let mut file_error = None;
    if let Some(path) = file {
        match open_log_file(path) {
            Ok(file) => loggers.push(WriteLogger::new(level, config, file)),
            Err(e) => file_error = Some(e),
        }
    }

    // A second init keeps the first logger.
    let _ = CombinedLogger::init(loggers);

    if let (Some(path), Some(e)) = (file, file_error) {
        ::log::warn!("Cannot open log file {}: {}", path.display(), e);
    }
}

/// Parse a level name, falling back to `info`.
pub fn parse_level(name: &str) -> LevelFilter {
    LevelFilter::from_str(name.trim()).unwrap_or(LevelFilter::Info)
}

fn build_config() -> Config {
    ConfigBuilder::new()
        .set_time_format_custom(format_description!(
            "[year]-[month]-[day]T[hour]:[minute]:[second]"
        ))
        .set_target_level(LevelFilter::Error)
        .build()
}

fn open_log_file(path: &Path) -> std::io::Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}
