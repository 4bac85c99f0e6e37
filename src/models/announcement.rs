// src/models/announcement.rs

//! Announcement records and the transient feed entries they come from.

use serde::{Deserialize, Serialize};

/// A release announcement that has been recorded in the store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Announcement {
    /// Store-assigned surrogate key
    pub id: i64,

    /// Display title with 「」 removed
    pub title: String,

    /// Plain-text release description, newline delimited
    pub version_info: String,

    /// Link to the announcement page; unique across the store
    pub url: String,

    /// Timestamp string exactly as published by the feed
    pub publication_date: String,
}

/// An announcement about to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAnnouncement {
    pub title: String,
    pub version_info: String,
    pub url: String,
    pub publication_date: String,
}

impl NewAnnouncement {
    /// Build the record for a feed entry whose page yielded `version_info`.
    ///
    /// `title` is expected to be normalized already.
    pub fn from_entry(entry: &FeedEntry, title: String, version_info: String) -> Self {
        Self {
            title,
            version_info,
            url: entry.link.clone(),
            publication_date: entry.updated.clone(),
        }
    }
}

/// One item of the upstream feed, read verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEntry {
    pub title: String,
    pub link: String,
    pub updated: String,
}
