//! PagerDuty Events API v2 destination

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use crate::alert::AlertState;
use crate::config::Settings;
use crate::destinations::{
    option_str, report_delivery, AlertNotification, ConfigurationSchema, Destination, Options,
    Property,
};
use crate::io::HttpClient;
use crate::template::substitute;

pub const TYPE_NAME: &str = "pagerduty";

/// Incident and dedup key shared by every event for one alert and query
pub const KEY_STRING: &str = "{alert_id}_{query_id}";
pub const DESCRIPTION_STR: &str = "Alert: {alert_name}";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventPayload {
    pub summary: String,
    pub severity: &'static str,
    pub source: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_details: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    pub routing_key: String,
    pub incident_key: String,
    pub dedup_key: String,
    pub event_action: &'static str,
    pub payload: EventPayload,
}

pub struct PagerDuty {
    events_url: String,
    http: Arc<dyn HttpClient>,
}

impl std::fmt::Debug for PagerDuty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PagerDuty")
            .field("events_url", &self.events_url)
            .finish()
    }
}

impl PagerDuty {
    pub fn new(settings: &Settings, http: Arc<dyn HttpClient>) -> Self {
        Self {
            events_url: settings.pagerduty_events_url.clone(),
            http,
        }
    }

    /// Build the event for a state change, or `None` when the state maps to no action
    pub fn event(notification: &AlertNotification<'_>, options: &Options) -> Option<Event> {
        let event_action = match notification.new_state {
            AlertState::Triggered => "trigger",
            AlertState::Ok => "resolve",
            AlertState::Unknown => return None,
        };

        let alert = notification.alert;
        let summary = match (&alert.custom_subject, option_str(options, "description")) {
            (Some(subject), _) => subject.clone(),
            (None, Some(description)) => description.to_string(),
            (None, None) => substitute(DESCRIPTION_STR, &[("alert_name", alert.name.as_str())]),
        };

        let alert_id = alert.id.to_string();
        let query_id = notification.query.id.to_string();
        let key = substitute(
            KEY_STRING,
            &[("alert_id", alert_id.as_str()), ("query_id", query_id.as_str())],
        );

        Some(Event {
            routing_key: option_str(options, "integration_key")
                .unwrap_or_default()
                .to_string(),
            incident_key: key.clone(),
            dedup_key: key,
            event_action,
            payload: EventPayload {
                summary,
                severity: "error",
                source: "redash",
                custom_details: alert.custom_body.clone(),
            },
        })
    }
}

#[async_trait]
impl Destination for PagerDuty {
    fn name(&self) -> &'static str {
        "PagerDuty"
    }

    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn icon(&self) -> &'static str {
        "creative-commons-pd-alt"
    }

    fn configuration_schema(&self) -> ConfigurationSchema {
        ConfigurationSchema::object()
            .property(
                "integration_key",
                Property::string("PagerDuty Service Integration Key"),
            )
            .property(
                "description",
                Property::string("Description for the event, defaults to alert name"),
            )
            .required(&["integration_key"])
            .secret(&["integration_key"])
    }

    async fn notify(&self, notification: &AlertNotification<'_>, options: &Options) {
        let Some(event) = Self::event(notification, options) else {
            tracing::info!("Unknown state, doing nothing");
            return;
        };

        let body = match serde_json::to_string(&event) {
            Ok(body) => body,
            Err(e) => {
                tracing::error!(error = %e, "PagerDuty trigger failed!");
                return;
            }
        };

        tracing::debug!(
            "Sending PagerDuty {} event for {}",
            event.event_action,
            event.dedup_key
        );

        let result = self
            .http
            .post_body(
                &self.events_url,
                &[("Content-Type", "application/json")],
                &body,
            )
            .await;
        report_delivery("PagerDuty trigger failed!", result);
    }
}
