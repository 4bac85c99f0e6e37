// src/services/notifier.rs

//! Chat webhook notifications.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use crate::error::Result;
use crate::models::NotifierConfig;

/// Sink for new-announcement notifications.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Announce a newly discovered release.
    async fn notify(&self, url: &str, title: &str, version_info: &str) -> Result<()>;
}

/// Incoming-webhook message body.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct WebhookPayload {
    pub text: String,
    pub attachments: Vec<Attachment>,
}

/// A secondary text block shown under the main message.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Attachment {
    pub text: String,
}

impl WebhookPayload {
    /// Build the message: caution text, then a `<url|title>` link, with the
    /// version description attached verbatim.
    pub fn new(message: &str, url: &str, title: &str, version_info: &str) -> Self {
        Self {
            text: format!("{message}\n<{url}|{title}>"),
            attachments: vec![Attachment {
                text: version_info.to_string(),
            }],
        }
    }
}

/// Posts messages to an incoming webhook.
pub struct WebhookNotifier {
    client: Client,
    endpoint: String,
    message: String,
}

impl WebhookNotifier {
    pub fn new(client: Client, config: &NotifierConfig) -> Self {
        Self {
            client,
            endpoint: config.webhook_url.clone(),
            message: config.message.clone(),
        }
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    /// The response is not inspected; only transport failures are reported.
    async fn notify(&self, url: &str, title: &str, version_info: &str) -> Result<()> {
        let payload = WebhookPayload::new(&self.message, url, title, version_info);
        let response = self
            .client
            .post(&self.endpoint)
            .json(&payload)
            .send()
            .await?;
        log::debug!("Webhook answered {} for {}", response.status(), url);
        Ok(())
    }
}

/// Logs the message instead of sending it (used for dry runs).
pub struct LogNotifier {
    message: String,
}

impl LogNotifier {
    pub fn new(config: &NotifierConfig) -> Self {
        Self {
            message: config.message.clone(),
        }
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, url: &str, title: &str, version_info: &str) -> Result<()> {
        let payload = WebhookPayload::new(&self.message, url, title, version_info);
        log::info!("[dry-run] {}", serde_json::to_string(&payload)?);
        Ok(())
    }
}
