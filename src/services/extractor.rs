// src/services/extractor.rs

//! Detail page extractor.
//!
//! Pulls the release description out of an announcement page. The content
//! region is located with a CSS selector, serialized back to markup, and the
//! version pattern is searched in that markup. Tags inside the match become
//! line breaks:
//!
//! ```text
//! 公開プログラムバージョン<b>V10</b><br>データベース全体を更新します。
//!   -> 公開プログラムバージョン\nV10\nデータベース全体を更新します。
//! ```

use std::sync::LazyLock;

use regex::Regex;
use reqwest::Client;
use scraper::{Html, Selector};

use crate::error::{AppError, Result};
use crate::models::ExtractionConfig;
use crate::utils::http;

/// Replacement for each tag in the matched markup.
const TAG_PLACEHOLDER: &str = "__";

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<.+?>").unwrap());
static PLACEHOLDER_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(__)+").unwrap());

/// Outcome of looking for release text on a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    /// Plain-text release description
    Found(String),
    /// The page has no release text where it is expected
    Miss,
}

/// Service for extracting version information from announcement pages.
pub struct DetailExtractor {
    client: Client,
    content_selector: Selector,
    version_pattern: Regex,
}

impl DetailExtractor {
    /// Create an extractor from configuration, sharing the given client.
    pub fn new(client: Client, config: &ExtractionConfig) -> Result<Self> {
        Ok(Self {
            client,
            content_selector: parse_selector(&config.content_selector)?,
            version_pattern: Regex::new(&config.version_pattern)?,
        })
    }

    /// Fetch `link` and extract its release description.
    ///
    /// Fails with [`AppError::Fetch`] when the page cannot be retrieved.
    pub async fn extract(&self, link: &str) -> Result<Extraction> {
        let html = http::fetch_html(&self.client, link).await?;
        Ok(self.extract_from_html(&html))
    }

    /// Extract the release description from a full HTML document.
    pub fn extract_from_html(&self, html: &str) -> Extraction {
        let document = Html::parse_document(html);
        let Some(region) = document.select(&self.content_selector).next() else {
            log::debug!("Content region not found");
            return Extraction::Miss;
        };
        self.extract_from_markup(&region.html())
    }

    /// Search serialized markup for the version pattern and flatten the match.
    pub fn extract_from_markup(&self, markup: &str) -> Extraction {
        match self.version_pattern.find(markup) {
            Some(m) => Extraction::Found(collapse_tags(m.as_str())),
            None => Extraction::Miss,
        }
    }
}

/// Replace every tag with a placeholder, then every run of placeholders with
/// a single newline.
pub fn collapse_tags(markup: &str) -> String {
    let marked = TAG.replace_all(markup, TAG_PLACEHOLDER);
    PLACEHOLDER_RUN.replace_all(&marked, "\n").into_owned()
}

fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}
