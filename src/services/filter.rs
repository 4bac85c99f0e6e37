// src/services/filter.rs

//! Announcement title filter.

use regex::Regex;

use crate::error::Result;
use crate::models::FilterConfig;

/// Quote brackets stripped from titles before they are stored or shown.
const TITLE_BRACKETS: [char; 2] = ['「', '」'];

/// Decides which feed titles announce a new program version.
#[derive(Debug, Clone)]
pub struct AnnouncementFilter {
    pattern: Regex,
}

impl AnnouncementFilter {
    /// Compile the filter from configuration.
    pub fn new(config: &FilterConfig) -> Result<Self> {
        Ok(Self {
            pattern: Regex::new(&config.title_pattern)?,
        })
    }

    /// True when the title matches the release-announcement pattern anywhere.
    pub fn is_release_announcement(&self, title: &str) -> bool {
        self.pattern.is_match(title)
    }
}

/// Remove 「 and 」 from a title, leaving everything else as is.
pub fn normalize_title(title: &str) -> String {
    title.chars().filter(|c| !TITLE_BRACKETS.contains(c)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter() -> AnnouncementFilter {
        AnnouncementFilter::new(&FilterConfig::default()).unwrap()
    }

    #[test]
    fn matches_release_announcements() {
        let filter = filter();
        assert!(filter.is_release_announcement(
            "「達人シリーズ」Webデータベースの達人V10 公開のお知らせ"
        ));
        assert!(filter.is_release_announcement("「フォーム入力の達人V10」公開のお知らせ"));
    }

    #[test]
    fn rejects_other_notices() {
        let filter = filter();
        assert!(!filter.is_release_announcement("お知らせ：メンテナンス完了"));
        // Needs at least one character on each side of の達人.
        assert!(!filter.is_release_announcement("の達人公開のお知らせ"));
        assert!(!filter.is_release_announcement("年末調整の達人 サポート終了のお知らせ"));
    }

    #[test]
    fn normalize_strips_only_brackets() {
        assert_eq!(
            normalize_title("「フォーム入力の達人V10」公開のお知らせ"),
            "フォーム入力の達人V10公開のお知らせ"
        );
        assert_eq!(normalize_title("A|B 公開"), "A|B 公開");
        assert_eq!(normalize_title(""), "");
    }
}
