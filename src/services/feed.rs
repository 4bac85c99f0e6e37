// src/services/feed.rs

//! Feed reader service.
//!
//! Fetches the vendor feed (RSS or Atom) and turns it into [`FeedEntry`] values in
//! document order (newest first on the upstream feed).

use reqwest::Client;
use atom_syndication::Feed as AtomFeed;
use rss::Channel;

use crate::error::Result;
use crate::models::FeedEntry;
use crate::utils::{http, resolve};

/// Service for reading the announcement feed.
pub struct FeedReader {
    client: Client,
}

impl FeedReader {
    /// Create a feed reader sharing the given client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Fetch and parse the feed at `source_url`.
    ///
    /// A feed that cannot be fetched or parsed yields no entries; the failure
    /// is logged and the run carries on with nothing to process.
    pub async fn read(&self, source_url: &str) -> Vec<FeedEntry> {
        match self.try_read(source_url).await {
            Ok(entries) => {
                log::debug!("Read {} entries from {}", entries.len(), source_url);
                entries
            }
            Err(error) => {
                log::warn!("Failed to read feed {}: {}", source_url, error);
                Vec::new()
            }
        }
    }

    async fn try_read(&self, source_url: &str) -> Result<Vec<FeedEntry>> {
        let body = http::fetch_bytes(&self.client, source_url).await?;
        parse_feed(&body, source_url)
    }
}

/// Parse feed bytes into entries, resolving relative links against `base_url`.
///
/// RSS is tried first, then Atom. Items without a link are dropped.
pub fn parse_feed(bytes: &[u8], base_url: &str) -> Result<Vec<FeedEntry>> {
    match Channel::read_from(bytes) {
        Ok(channel) => Ok(rss_entries(&channel, base_url)),
        Err(rss_error) => match AtomFeed::read_from(bytes) {
            Ok(feed) => Ok(atom_entries(&feed, base_url)),
            Err(atom_error) => {
                log::debug!("Not an Atom feed either: {}", atom_error);
                Err(rss_error.into())
            }
        },
    }
}

/// `updated` is the item's `pubDate`, or its first `dc:date`, verbatim;
/// empty when neither is present.
fn rss_entries(channel: &Channel, base_url: &str) -> Vec<FeedEntry> {
    channel
        .items()
        .iter()
        .filter_map(|item| {
            let link = non_empty(item.link())?;
            let updated = item
                .pub_date()
                .map(str::to_string)
                .or_else(|| {
                    item.dublin_core_ext()
                        .and_then(|dc| dc.dates().first().cloned())
                })
                .unwrap_or_default();

            Some(FeedEntry {
                title: item.title().unwrap_or_default().to_string(),
                link: resolve(base_url, link),
                updated,
            })
        })
        .collect()
}

/// The link is the `alternate` one when present, else the first. `updated`
/// is `published`, else `updated`, in RFC 3339 form.
fn atom_entries(feed: &AtomFeed, base_url: &str) -> Vec<FeedEntry> {
    feed.entries()
        .iter()
        .filter_map(|entry| {
            let link = entry
                .links()
                .iter()
                .find(|l| l.rel() == "alternate")
                .or_else(|| entry.links().first())?;
            let link = non_empty(Some(link.href()))?;
            let updated = entry.published().unwrap_or(entry.updated()).to_rfc3339();

            Some(FeedEntry {
                title: entry.title().value.clone(),
                link: resolve(base_url, link),
                updated,
            })
        })
        .collect()
}

fn non_empty(link: Option<&str>) -> Option<&str> {
    link.map(str::trim).filter(|l| !l.is_empty())
}
