// src/models/mod.rs

//! Domain models for the watcher.
//!
//! This module contains the data structures shared by the services,
//! the record store and the pipeline driver.

mod announcement;
mod config;

// Re-export all public types
pub use announcement::{Announcement, FeedEntry, NewAnnouncement};
pub use config::{
    Config, DB_PATH_ENV, ExtractionConfig, FeedConfig, FilterConfig, HttpConfig, LoggingConfig,
    NotifierConfig, StoreConfig, WEBHOOK_URL_ENV,
};
