// src/utils/mod.rs

//! Utility functions and helpers.

pub mod decode;
pub mod http;
#[cfg(feature = "cli")]
pub mod log;

use url::Url;

/// Resolve a potentially relative URL against a base URL.
///
/// An href that already parses as an absolute URL is returned as given.
pub fn resolve_url(base: &Url, href: &str) -> String {
    if Url::parse(href).is_ok() {
        return href.to_string();
    }
    base.join(href)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| href.to_string())
}

/// Resolve a URL string against a base URL string.
///
/// Returns `href` untouched when `base_url` itself does not parse.
pub fn resolve(base_url: &str, href: &str) -> String {
    match Url::parse(base_url) {
        Ok(base) => resolve_url(&base, href),
        Err(_) => href.to_string(),
    }
}
