// src/storage/sqlite.rs

//! SQLite-backed announcement store.

use std::path::Path;

use rusqlite::{Connection, ErrorCode, OptionalExtension, Row, params};

use crate::error::{AppError, Result};
use crate::models::{Announcement, NewAnnouncement};
use crate::storage::InsertOutcome;

const CREATE_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS articles(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT,
        version_info TEXT,
        url TEXT UNIQUE,
        publication_date DATETIME
    )
";

const SELECT_COLUMNS: &str = "SELECT id, title, version_info, url, publication_date FROM articles";

/// Durable table of announcements, keyed by URL.
///
/// Every insert runs in autocommit mode, so each record is committed on its
/// own and survives a failure later in the same run.
pub struct AnnouncementStore {
    conn: Connection,
}

impl AnnouncementStore {
    /// Open or create the database file at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        log::debug!("Opened record store at {}", path.display());
        Ok(Self { conn })
    }

    /// Create an in-memory store (useful for tests).
    pub fn open_in_memory() -> Result<Self> {
        Ok(Self {
            conn: Connection::open_in_memory()?,
        })
    }

    /// Create the `articles` table if it does not exist yet.
    pub fn ensure_schema(&self) -> Result<()> {
        self.conn.execute_batch(CREATE_TABLE)?;
        Ok(())
    }

    /// URL of the most recently published record, if any.
    ///
    /// `publication_date` is compared as stored text; ties resolve arbitrarily.
    pub fn latest_url(&self) -> Result<Option<String>> {
        let url = self
            .conn
            .query_row(
                "SELECT url FROM articles ORDER BY publication_date DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?;
        Ok(url)
    }

    /// The most recently published record, if any.
    pub fn latest(&self) -> Result<Option<Announcement>> {
        let sql = format!("{SELECT_COLUMNS} ORDER BY publication_date DESC LIMIT 1");
        let record = self
            .conn
            .query_row(&sql, [], Self::map_row)
            .optional()?;
        Ok(record)
    }

    /// Up to `limit` records, newest publication first.
    pub fn recent(&self, limit: usize) -> Result<Vec<Announcement>> {
        let sql = format!("{SELECT_COLUMNS} ORDER BY publication_date DESC LIMIT ?1");
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![limit], Self::map_row)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    /// Look up a record by its URL.
    pub fn find_by_url(&self, url: &str) -> Result<Option<Announcement>> {
        let sql = format!("{SELECT_COLUMNS} WHERE url = ?1");
        let record = self
            .conn
            .query_row(&sql, params![url], Self::map_row)
            .optional()?;
        Ok(record)
    }

    /// Number of stored records.
    pub fn count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM articles", [], |row| row.get(0))?;
        usize::try_from(count).map_err(|_| {
            AppError::validation(format!("record count '{count}' cannot be represented as usize"))
        })
    }

    /// Insert a new announcement.
    ///
    /// A UNIQUE violation on `url` yields [`InsertOutcome::AlreadyExists`];
    /// every other failure is returned as [`AppError::Storage`].
    pub fn insert(&self, record: &NewAnnouncement) -> Result<InsertOutcome> {
        let result = self.conn.execute(
            "INSERT INTO articles(title, version_info, url, publication_date) VALUES (?1, ?2, ?3, ?4)",
            params![
                record.title,
                record.version_info,
                record.url,
                record.publication_date
            ],
        );

        match result {
            Ok(_) => Ok(InsertOutcome::Inserted(self.conn.last_insert_rowid())),
            Err(err) if is_unique_violation(&err) => {
                log::debug!("Record for {} already exists", record.url);
                Ok(InsertOutcome::AlreadyExists)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Release the connection, reporting any error raised while closing.
    pub fn close(self) -> Result<()> {
        self.conn.close().map_err(|(_, err)| AppError::from(err))
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<Announcement> {
        Ok(Announcement {
            id: row.get(0)?,
            title: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
            version_info: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
            url: row.get(3)?,
            publication_date: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
        })
    }
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(e, _) => {
            e.code == ErrorCode::ConstraintViolation
                && e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> AnnouncementStore {
        let store = AnnouncementStore::open_in_memory().unwrap();
        store.ensure_schema().unwrap();
        store
    }

    fn record(url: &str, date: &str) -> NewAnnouncement {
        NewAnnouncement {
            title: "給与計算の達人V10公開のお知らせ".to_string(),
            version_info: "公開プログラムバージョン\nV10.1".to_string(),
            url: url.to_string(),
            publication_date: date.to_string(),
        }
    }

    #[test]
    fn ensure_schema_is_idempotent() {
        let store = store();
        store.ensure_schema().unwrap();
        store.ensure_schema().unwrap();
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn latest_url_on_empty_store_is_none() {
        assert_eq!(store().latest_url().unwrap(), None);
        assert_eq!(store().latest().unwrap(), None);
    }

    #[test]
    fn repeated_url_is_stored_once() {
        let store = store();
        let first = store.insert(&record("https://a.example/1", "2024-01-01")).unwrap();
        assert!(first.is_inserted());

        for _ in 0..3 {
            let again = store.insert(&record("https://a.example/1", "2024-02-01")).unwrap();
            assert_eq!(again, InsertOutcome::AlreadyExists);
        }

        assert_eq!(store.count().unwrap(), 1);
        let kept = store.find_by_url("https://a.example/1").unwrap().unwrap();
        assert_eq!(kept.publication_date, "2024-01-01");
    }

    #[test]
    fn latest_orders_by_publication_date_not_insertion() {
        let store = store();
        store.insert(&record("https://a.example/new", "2024-03-01")).unwrap();
        store.insert(&record("https://a.example/old", "2023-12-01")).unwrap();

        assert_eq!(
            store.latest_url().unwrap().as_deref(),
            Some("https://a.example/new")
        );
        let recent = store.recent(10).unwrap();
        let urls: Vec<_> = recent.iter().map(|r| r.url.as_str()).collect();
        assert_eq!(urls, ["https://a.example/new", "https://a.example/old"]);
    }

    #[test]
    fn ids_increase_and_are_not_reused() {
        let store = store();
        let InsertOutcome::Inserted(a) = store.insert(&record("https://a.example/1", "1")).unwrap()
        else {
            panic!("expected insert");
        };
        store.insert(&record("https://a.example/1", "1")).unwrap();
        let InsertOutcome::Inserted(b) = store.insert(&record("https://a.example/2", "2")).unwrap()
        else {
            panic!("expected insert");
        };
        assert!(b > a);
    }

    #[test]
    fn insert_without_schema_is_a_storage_error() {
        let store = AnnouncementStore::open_in_memory().unwrap();
        let err = store.insert(&record("https://a.example/1", "1")).unwrap_err();
        assert!(matches!(err, AppError::Storage(_)));
    }

    #[test]
    fn version_info_keeps_newlines() {
        let store = store();
        store.insert(&record("https://a.example/1", "1")).unwrap();
        let stored = store.latest().unwrap().unwrap();
        assert_eq!(stored.version_info, "公開プログラムバージョン\nV10.1");
        store.close().unwrap();
    }
}
