//! Outbound notification transports.
//!
//! The monitor hands each rendered message to a [`Notifier`] together with
//! the destination channel. Delivery is best-effort: the caller logs a
//! failure and moves on.

use crate::config::{NotifierConfig, NotifierKind};
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("destination rejected message {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("notifier misconfigured: {0}")]
    Config(String),
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, channel: &str, text: &str) -> Result<(), NotifyError>;
}

/// Writes messages to stdout.
#[derive(Debug, Default)]
pub struct ConsoleNotifier;

#[async_trait]
impl Notifier for ConsoleNotifier {
    async fn send(&self, channel: &str, text: &str) -> Result<(), NotifyError> {
        use std::io::Write;
        let mut out = std::io::stdout().lock();
        writeln!(out, "[{channel}] {text}")?;
        out.flush()?;
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    channel: &'a str,
    text: &'a str,
}

/// POSTs `{"channel", "text"}` JSON to a chat webhook.
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: String, timeout: Duration) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, url })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn send(&self, channel: &str, text: &str) -> Result<(), NotifyError> {
        let resp = self
            .client
            .post(&self.url)
            .json(&WebhookPayload { channel, text })
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        debug!(channel = channel, status = status.as_u16(), "webhook delivered");
        Ok(())
    }
}

/// Build the notifier selected in config.
pub fn from_config(
    config: &NotifierConfig,
    timeout: Duration,
) -> Result<Box<dyn Notifier>, NotifyError> {
    match config.kind {
        NotifierKind::Console => Ok(Box::new(ConsoleNotifier)),
        NotifierKind::Webhook => {
            let url = config
                .webhook_url
                .clone()
                .filter(|u| !u.is_empty())
                .ok_or_else(|| NotifyError::Config("webhook_url is not set".to_string()))?;
            Ok(Box::new(WebhookNotifier::new(url, timeout)?))
        }
    }
}

#[async_trait]
impl<N: Notifier + ?Sized> Notifier for Box<N> {
    async fn send(&self, channel: &str, text: &str) -> Result<(), NotifyError> {
        (**self).send(channel, text).await
    }
}
