// src/pipeline/watch.rs

//! One watch run: feed → filter → dedupe → extract → persist → notify.
//!
//! ```text
//! Init -> SchemaReady -> Scanning -> StoppedAtKnown | Exhausted -> Done
//! ```
//!
//! The latest stored URL is read once before scanning. The feed is newest
//! first, so meeting that URL among the matching entries ends the scan.

use std::fmt;

use chrono::{DateTime, Utc};
use reqwest::Client;

use crate::error::Result;
use crate::models::{Config, FeedEntry, NewAnnouncement};
use crate::services::{
    AnnouncementFilter, DetailExtractor, Extraction, FeedReader, LogNotifier, Notifier,
    WebhookNotifier, normalize_title,
};
use crate::storage::{AnnouncementStore, InsertOutcome};
use crate::utils::http;

/// Driver states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Init,
    SchemaReady,
    Scanning,
    /// Hit the previously latest announcement
    StoppedAtKnown,
    /// Ran out of feed entries
    Exhausted,
    Done,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunState::Init => "init",
            RunState::SchemaReady => "schema-ready",
            RunState::Scanning => "scanning",
            RunState::StoppedAtKnown => "stopped-at-known",
            RunState::Exhausted => "exhausted",
            RunState::Done => "done",
        };
        f.write_str(name)
    }
}

/// Counters for a finished scan.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// `StoppedAtKnown` or `Exhausted`
    pub end_state: RunState,
    pub entries: usize,
    pub matched: usize,
    pub stored: usize,
    pub duplicates: usize,
    pub notified: usize,
    pub notify_failures: usize,
    pub misses: usize,
    pub fetch_failures: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunSummary {
    fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            end_state: RunState::Scanning,
            entries: 0,
            matched: 0,
            stored: 0,
            duplicates: 0,
            notified: 0,
            notify_failures: 0,
            misses: 0,
            fetch_failures: 0,
            started_at,
            finished_at: started_at,
        }
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} entries, {} matched, {} stored, {} notified, {} duplicates, {} misses, {} fetch failures, {} notify failures in {}ms",
            self.end_state,
            self.entries,
            self.matched,
            self.stored,
            self.notified,
            self.duplicates,
            self.misses,
            self.fetch_failures,
            self.notify_failures,
            (self.finished_at - self.started_at).num_milliseconds()
        )
    }
}

/// Orchestrates a watch run.
pub struct Pipeline {
    config: Config,
    feed: FeedReader,
    filter: AnnouncementFilter,
    extractor: DetailExtractor,
    notifier: Box<dyn Notifier>,
    dry_run: bool,
}

impl Pipeline {
    /// Build a pipeline around an existing client and notifier.
    pub fn new(config: Config, client: Client, notifier: Box<dyn Notifier>) -> Result<Self> {
        Ok(Self {
            feed: FeedReader::new(client.clone()),
            filter: AnnouncementFilter::new(&config.filter)?,
            extractor: DetailExtractor::new(client, &config.extraction)?,
            notifier,
            config,
            dry_run: false,
        })
    }

    /// In a dry run the store is read but never written.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Build a pipeline posting to the configured webhook, or only logging
    /// the messages when `dry_run` is set.
    pub fn from_config(config: Config, dry_run: bool) -> Result<Self> {
        let client = http::create_client(&config.http)?;
        let notifier: Box<dyn Notifier> = if dry_run {
            Box::new(LogNotifier::new(&config.notifier))
        } else {
            Box::new(WebhookNotifier::new(client.clone(), &config.notifier))
        };
        Ok(Self::new(config, client, notifier)?.with_dry_run(dry_run))
    }

    /// Open the configured store, run once, and release the store on every path.
    pub async fn run(&self) -> Result<RunSummary> {
        let store = AnnouncementStore::open(&self.config.store.path)?;
        let result = self.run_with_store(&store).await;

        if let Err(error) = store.close() {
            log::warn!("Failed to close record store cleanly: {}", error);
        }
        log::debug!("Run state: {}", RunState::Done);
        result
    }

    /// Run once against an already open store.
    ///
    /// Only storage failures are returned; feed, page and webhook failures
    /// are logged and counted.
    pub async fn run_with_store(&self, store: &AnnouncementStore) -> Result<RunSummary> {
        let mut summary = RunSummary::new(Utc::now());
        log::debug!("Run state: {}", RunState::Init);

        store.ensure_schema()?;
        log::debug!("Run state: {}", RunState::SchemaReady);

        let latest_url = store.latest_url()?;
        let entries = self.feed.read(&self.config.feed.url).await;
        summary.entries = entries.len();
        log::debug!("Run state: {}", RunState::Scanning);

        summary.end_state = RunState::Exhausted;
        for entry in &entries {
            if !self.filter.is_release_announcement(&entry.title) {
                continue;
            }
            summary.matched += 1;

            if latest_url.as_deref() == Some(entry.link.as_str()) {
                log::info!("No new announcements");
                summary.end_state = RunState::StoppedAtKnown;
                break;
            }

            self.process_entry(store, entry, &mut summary).await?;
        }

        summary.finished_at = Utc::now();
        log::debug!("Run state: {}", summary.end_state);
        Ok(summary)
    }

    async fn process_entry(
        &self,
        store: &AnnouncementStore,
        entry: &FeedEntry,
        summary: &mut RunSummary,
    ) -> Result<()> {
        let version_info = match self.extractor.extract(&entry.link).await {
            Ok(Extraction::Found(text)) => text,
            Ok(Extraction::Miss) => {
                summary.misses += 1;
                log::debug!("No version information on {}", entry.link);
                return Ok(());
            }
            Err(error) => {
                summary.fetch_failures += 1;
                log::warn!("Skipping {}: {}", entry.link, error);
                return Ok(());
            }
        };

        let title = normalize_title(&entry.title);
        let record = NewAnnouncement::from_entry(entry, title, version_info);

        if self.dry_run {
            if store.find_by_url(&record.url)?.is_some() {
                summary.duplicates += 1;
                return Ok(());
            }
            log::info!("New info (not stored): {}\n{}", record.title, record.version_info);
        } else {
            match store.insert(&record)? {
                InsertOutcome::Inserted(id) => {
                    summary.stored += 1;
                    log::info!("New info: {}\n{}", record.title, record.version_info);
                    log::debug!("Stored {} as record {}", record.url, id);
                }
                // The UNIQUE url is the at-most-once guarantee, so a record
                // another run already stored is not announced again.
                InsertOutcome::AlreadyExists => {
                    summary.duplicates += 1;
                    log::debug!("{} is already stored", record.url);
                    return Ok(());
                }
            }
        }

        match self
            .notifier
            .notify(&record.url, &record.title, &record.version_info)
            .await
        {
            Ok(()) => summary.notified += 1,
            Err(error) => {
                summary.notify_failures += 1;
                log::error!("Failed to notify {}: {}", record.url, error);
            }
        }
        Ok(())
    }
}

/// Build a pipeline from `config` and run it once.
pub async fn run_watch(config: Config, dry_run: bool) -> Result<RunSummary> {
    let pipeline = Pipeline::from_config(config, dry_run)?;
    let summary = pipeline.run().await?;
    log::info!("Run finished ({})", summary);
    Ok(summary)
}
