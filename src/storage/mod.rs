// src/storage/mod.rs

//! Persistence for announcements that have already been notified.
//!
//! A single SQLite table is the only state kept between runs:
//!
//! ```text
//! articles(
//!     id               INTEGER PRIMARY KEY AUTOINCREMENT,
//!     title            TEXT,
//!     version_info     TEXT,
//!     url              TEXT UNIQUE,
//!     publication_date DATETIME
//! )
//! ```
//!
//! `url` is the dedupe key. A second insert of the same URL is reported as
//! [`InsertOutcome::AlreadyExists`] rather than as an error.

pub mod sqlite;

// Re-export for convenience
pub use sqlite::AnnouncementStore;

/// Result of inserting an announcement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The row was written and committed under this id.
    Inserted(i64),
    /// A row with the same URL already exists; nothing was written.
    AlreadyExists,
}

impl InsertOutcome {
    pub fn is_inserted(&self) -> bool {
        matches!(self, Self::Inserted(_))
    }
}
