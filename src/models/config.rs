// src/models/config.rs

//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;
use scraper::Selector;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Environment variable overriding `notifier.webhook_url`.
pub const WEBHOOK_URL_ENV: &str = "SLACK_WEB_HOOK_URL";

/// Environment variable overriding `store.path`.
pub const DB_PATH_ENV: &str = "TATSUZIN_DB_PATH";

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Record store location
    #[serde(default)]
    pub store: StoreConfig,

    /// Feed source
    #[serde(default)]
    pub feed: FeedConfig,

    /// HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Announcement title matching
    #[serde(default)]
    pub filter: FilterConfig,

    /// Detail page extraction rules
    #[serde(default)]
    pub extraction: ExtractionConfig,

    /// Webhook notification settings
    #[serde(default)]
    pub notifier: NotifierConfig,

    /// Log output settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Apply overrides from the environment.
    ///
    /// `lookup` is normally `|key| std::env::var(key).ok()`.
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(WEBHOOK_URL_ENV).filter(|v| !v.trim().is_empty()) {
            self.notifier.webhook_url = url;
        }
        if let Some(path) = lookup(DB_PATH_ENV).filter(|v| !v.trim().is_empty()) {
            self.store.path = PathBuf::from(path);
        }
        self
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        self.validate_without_webhook()?;
        if self.notifier.webhook_url.trim().is_empty() {
            return Err(AppError::validation(format!(
                "notifier.webhook_url is empty (set it in the config or via {WEBHOOK_URL_ENV})"
            )));
        }
        url::Url::parse(&self.notifier.webhook_url)
            .map_err(|e| AppError::validation(format!("notifier.webhook_url is invalid: {e}")))?;
        Ok(())
    }

    /// Everything [`validate`](Self::validate) checks except the webhook,
    /// which a dry run never posts to.
    pub fn validate_without_webhook(&self) -> Result<()> {
        if self.http.user_agent.trim().is_empty() {
            return Err(AppError::validation("http.user_agent is empty"));
        }
        if self.http.timeout_secs == Some(0) {
            return Err(AppError::validation("http.timeout_secs must be > 0"));
        }
        if self.store.path.as_os_str().is_empty() {
            return Err(AppError::validation("store.path is empty"));
        }
        url::Url::parse(&self.feed.url)
            .map_err(|e| AppError::validation(format!("feed.url is invalid: {e}")))?;
        Regex::new(&self.filter.title_pattern)?;
        Regex::new(&self.extraction.version_pattern)?;
        Selector::parse(&self.extraction.content_selector)
            .map_err(|e| AppError::selector(&self.extraction.content_selector, format!("{e:?}")))?;
        Ok(())
    }
}

/// Record store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// SQLite database file
    #[serde(default = "defaults::db_path")]
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: defaults::db_path(),
        }
    }
}

/// Feed source settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// RSS feed URL
    #[serde(default = "defaults::feed_url")]
    pub url: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: defaults::feed_url(),
        }
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds; unset means requests may block indefinitely
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: None,
        }
    }
}

/// Title matching settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Regex searched for in each entry title
    #[serde(default = "defaults::title_pattern")]
    pub title_pattern: String,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            title_pattern: defaults::title_pattern(),
        }
    }
}

/// Detail page extraction settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// CSS selector for the region holding the release text
    #[serde(default = "defaults::content_selector")]
    pub content_selector: String,

    /// Regex searched for in the region's markup
    #[serde(default = "defaults::version_pattern")]
    pub version_pattern: String,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            content_selector: defaults::content_selector(),
            version_pattern: defaults::version_pattern(),
        }
    }
}

/// Webhook notification settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifierConfig {
    /// Incoming webhook endpoint
    #[serde(default)]
    pub webhook_url: String,

    /// Caution text placed above the announcement link
    #[serde(default = "defaults::caution_message")]
    pub message: String,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            webhook_url: String::new(),
            message: defaults::caution_message(),
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default level filter when `RUST_LOG` is unset
    #[serde(default = "defaults::log_level")]
    pub level: String,

    /// Optional file that receives a copy of every log line
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
            file: None,
        }
    }
}

mod defaults {
    use std::path::PathBuf;

    pub fn db_path() -> PathBuf {
        PathBuf::from("data/tatsuzin.articles")
    }
    pub fn feed_url() -> String {
        "https://www.tatsuzin.info/rss/".into()
    }
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; tatsuzin-watch/0.1)".into()
    }
    pub fn title_pattern() -> String {
        r".+の達人.+公開のお知らせ".into()
    }
    pub fn content_selector() -> String {
        "#Contents_main > p:nth-child(4)".into()
    }
    pub fn version_pattern() -> String {
        r"公開プログラムバージョン.+?(データベース.+?。)".into()
    }
    pub fn caution_message() -> String {
        concat!(
            "達人シリーズのバージョンアップデート情報が公開されました。\n",
            "サーバのアップデートが完了するまで、PCでのアップデートはお控えください。\n",
            "A Tatsuzin series version update has been published.\n",
            "Please hold off on updating PCs until the server update is complete.",
        )
        .into()
    }
    pub fn log_level() -> String {
        "info".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> Config {
        let mut config = Config::default();
        config.notifier.webhook_url = "https://hooks.example.com/T000/B000".to_string();
        config
    }

    #[test]
    fn validate_default_config_requires_webhook() {
        assert!(Config::default().validate().is_err());
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn dry_run_validation_skips_webhook() {
        let config = Config::default();
        assert!(config.validate_without_webhook().is_ok());

        let mut config = Config::default();
        config.feed.url = "not a url".to_string();
        assert!(config.validate_without_webhook().is_err());
    }

    #[test]
    fn validate_rejects_empty_user_agent() {
        let mut config = valid_config();
        config.http.user_agent = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_timeout() {
        let mut config = valid_config();
        config.http.timeout_secs = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_bad_selector_and_pattern() {
        let mut config = valid_config();
        config.extraction.content_selector = "[[invalid".to_string();
        assert!(matches!(
            config.validate(),
            Err(AppError::Selector { .. })
        ));

        let mut config = valid_config();
        config.filter.title_pattern = "(unclosed".to_string();
        assert!(matches!(config.validate(), Err(AppError::Regex(_))));
    }

    #[test]
    fn env_overrides_webhook_and_store_path() {
        let config = Config::default().with_env_overrides(|key| match key {
            WEBHOOK_URL_ENV => Some("https://hooks.example.com/env".to_string()),
            DB_PATH_ENV => Some("/tmp/articles.db".to_string()),
            _ => None,
        });
        assert_eq!(config.notifier.webhook_url, "https://hooks.example.com/env");
        assert_eq!(config.store.path, PathBuf::from("/tmp/articles.db"));
    }

    #[test]
    fn blank_env_values_are_ignored() {
        let config = valid_config().with_env_overrides(|_| Some("   ".to_string()));
        assert_eq!(
            config.notifier.webhook_url,
            "https://hooks.example.com/T000/B000"
        );
    }

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let config: Config = toml::from_str(
            r#"
            [notifier]
            webhook_url = "https://hooks.example.com/x"

            [http]
            timeout_secs = 15
            "#,
        )
        .unwrap();
        assert_eq!(config.feed.url, "https://www.tatsuzin.info/rss/");
        assert_eq!(config.http.timeout_secs, Some(15));
        assert!(config.notifier.message.starts_with("達人シリーズ"));
        assert!(config.validate().is_ok());
    }
}
