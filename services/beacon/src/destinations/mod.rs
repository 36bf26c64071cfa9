//! Destination trait for sending alert notifications
//!
//! Every destination receives the same notification contract and a map of
//! options validated against its [`ConfigurationSchema`]. `notify` never
//! fails: transport problems are logged and swallowed.

pub mod chatwork;
pub mod email;
pub mod hangoutschat;
pub mod mattermost;
pub mod microsoft_teams_webhook;
pub mod pagerduty;
pub mod registry;
pub mod schema;

pub use registry::{ConfiguredDestination, DestinationDescriptor, DestinationRegistry};
pub use schema::{ConfigurationSchema, Property};

use async_trait::async_trait;

use crate::alert::{Alert, AlertState, Query, User};
use crate::io::HttpResponse;

/// Options a destination was configured with
pub type Options = serde_json::Map<String, serde_json::Value>;

/// Everything the alerting subsystem hands to a destination
#[derive(Debug, Clone, Copy)]
pub struct AlertNotification<'a> {
    pub alert: &'a Alert,
    pub query: &'a Query,
    pub user: Option<&'a User>,
    pub new_state: AlertState,
    /// Name of the application raising the alert
    pub app: Option<&'a str>,
    /// Base URL links are built from
    pub host: Option<&'a str>,
    pub metadata: Option<&'a serde_json::Value>,
}

impl<'a> AlertNotification<'a> {
    pub fn new(alert: &'a Alert, query: &'a Query, new_state: AlertState) -> Self {
        Self {
            alert,
            query,
            user: None,
            new_state,
            app: None,
            host: None,
            metadata: None,
        }
    }

    pub fn with_host(mut self, host: &'a str) -> Self {
        self.host = Some(host);
        self
    }

    pub fn with_user(mut self, user: &'a User) -> Self {
        self.user = Some(user);
        self
    }

    pub fn with_app(mut self, app: &'a str) -> Self {
        self.app = Some(app);
        self
    }

    pub fn with_metadata(mut self, metadata: &'a serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub(crate) fn host_or_empty(&self) -> &'a str {
        self.host.unwrap_or_default()
    }

    pub(crate) fn alert_url(&self) -> String {
        self.alert.url(self.host_or_empty())
    }

    pub(crate) fn query_url(&self) -> String {
        self.query.url(self.host_or_empty())
    }
}

/// Trait for sending alert notifications
#[async_trait]
pub trait Destination: Send + Sync + std::fmt::Debug {
    /// Human readable name (e.g. "Google Hangouts Chat")
    fn name(&self) -> &'static str;

    /// Registry key (e.g. "hangouts_chat")
    fn type_name(&self) -> &'static str;

    fn icon(&self) -> &'static str;

    /// Whether the destination can be used in this build
    fn enabled(&self) -> bool {
        true
    }

    fn configuration_schema(&self) -> ConfigurationSchema;

    /// Deliver a notification; failures are logged, never returned
    async fn notify(&self, notification: &AlertNotification<'_>, options: &Options);
}

/// Look up a non-empty string option
pub(crate) fn option_str<'o>(options: &'o Options, key: &str) -> Option<&'o str> {
    options
        .get(key)
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
}

/// Log the outcome of a single delivery attempt
pub(crate) fn report_delivery(failure_message: &str, result: crate::Result<HttpResponse>) {
    match result {
        Ok(response) if response.is_success() => {
            tracing::debug!("Delivery succeeded with status {}", response.status);
        }
        Ok(response) => {
            tracing::error!(
                "{} status_code => {}, body => {}",
                failure_message,
                response.status,
                response.body
            );
        }
        Err(e) => {
            tracing::error!(error = %e, "{}", failure_message);
        }
    }
}
