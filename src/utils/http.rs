// src/utils/http.rs

//! HTTP client utilities.

use std::time::Duration;

use reqwest::Client;
use reqwest::header::CONTENT_TYPE;

use crate::error::{AppError, Result};
use crate::models::HttpConfig;
use crate::utils::decode::decode_html;

/// Create the shared asynchronous HTTP client.
///
/// No timeout is applied unless `timeout_secs` is configured.
pub fn create_client(config: &HttpConfig) -> Result<Client> {
    let mut builder = Client::builder().user_agent(&config.user_agent);
    if let Some(secs) = config.timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    Ok(builder.build()?)
}

/// GET `url` and return the raw body.
///
/// Transport failures and non-success statuses become [`AppError::Fetch`].
pub async fn fetch_bytes(client: &Client, url: &str) -> Result<Vec<u8>> {
    let response = send_get(client, url).await?;
    let bytes = response
        .bytes()
        .await
        .map_err(|e| AppError::fetch(url, e))?;
    Ok(bytes.to_vec())
}

/// GET an HTML page and decode it.
///
/// The charset comes from the `Content-Type` header, then from a `<meta>`
/// declaration in the page, then defaults to UTF-8.
pub async fn fetch_html(client: &Client, url: &str) -> Result<String> {
    let response = send_get(client, url).await?;
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let bytes = response
        .bytes()
        .await
        .map_err(|e| AppError::fetch(url, e))?;
    Ok(decode_html(&bytes, content_type.as_deref()))
}

async fn send_get(client: &Client, url: &str) -> Result<reqwest::Response> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| AppError::fetch(url, e))?;
    response
        .error_for_status()
        .map_err(|e| AppError::fetch(url, e))
}
