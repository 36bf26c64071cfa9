//! Mail-sending collaborator used by the email destination

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::MailConfig;
use crate::io::HttpClient;

/// A fully rendered alert mail
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MailMessage {
    pub recipients: Vec<String>,
    pub subject: String,
    pub html: String,
}

/// Trait for handing a message to a mail transport
#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &MailMessage) -> crate::Result<()>;
}

#[derive(Serialize)]
struct RelayRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    sender: Option<&'a str>,
    #[serde(flatten)]
    message: &'a MailMessage,
}

/// Sends mail by posting it as JSON to an HTTP mail relay
pub struct RelayMailer {
    relay_url: String,
    sender: Option<String>,
    http: Arc<dyn HttpClient>,
}

impl std::fmt::Debug for RelayMailer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayMailer")
            .field("relay_url", &self.relay_url)
            .finish()
    }
}

impl RelayMailer {
    pub fn new(relay_url: &str, sender: Option<&str>, http: Arc<dyn HttpClient>) -> Self {
        Self {
            relay_url: relay_url.to_string(),
            sender: sender.map(str::to_string),
            http,
        }
    }
}

#[async_trait]
impl Mailer for RelayMailer {
    async fn send(&self, message: &MailMessage) -> crate::Result<()> {
        let body = serde_json::to_string(&RelayRequest {
            sender: self.sender.as_deref(),
            message,
        })?;

        tracing::debug!(
            "Relaying mail '{}' to {} recipient(s)",
            message.subject,
            message.recipients.len()
        );

        let response = self
            .http
            .post_body(
                &self.relay_url,
                &[("Content-Type", "application/json")],
                &body,
            )
            .await?;

        if !response.is_success() {
            return Err(crate::BeaconError::Mail(format!(
                "Mail relay returned status {}: {}",
                response.status, response.body
            )));
        }
        Ok(())
    }
}

/// Mailer used when no relay is configured
#[derive(Debug, Default)]
pub struct DisabledMailer;

#[async_trait]
impl Mailer for DisabledMailer {
    async fn send(&self, _message: &MailMessage) -> crate::Result<()> {
        Err(crate::BeaconError::Mail(
            "no mail relay configured".to_string(),
        ))
    }
}

/// Build the mailer described by the mail configuration
pub fn mailer_from_config(config: &MailConfig, http: Arc<dyn HttpClient>) -> Arc<dyn Mailer> {
    match &config.relay_url {
        Some(url) => Arc::new(RelayMailer::new(url, config.sender.as_deref(), http)),
        None => Arc::new(DisabledMailer),
    }
}
