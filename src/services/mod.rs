// src/services/mod.rs

//! Service layer for the watcher.
//!
//! This module contains the business logic for:
//! - Feed reading (`FeedReader`)
//! - Title matching (`AnnouncementFilter`)
//! - Release text extraction (`DetailExtractor`)
//! - Webhook delivery (`Notifier`)

mod extractor;
mod feed;
mod filter;
mod notifier;

pub use extractor::{DetailExtractor, Extraction, collapse_tags};
pub use feed::{FeedReader, parse_feed};
pub use filter::{AnnouncementFilter, normalize_title};
pub use notifier::{Attachment, LogNotifier, Notifier, WebhookNotifier, WebhookPayload};
