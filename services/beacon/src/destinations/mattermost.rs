//! Mattermost incoming-webhook destination

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use crate::alert::AlertState;
use crate::destinations::{
    option_str, report_delivery, AlertNotification, ConfigurationSchema, Destination, Options,
    Property,
};
use crate::io::HttpClient;

pub const TYPE_NAME: &str = "mattermost";

pub struct Mattermost {
    http: Arc<dyn HttpClient>,
}

impl std::fmt::Debug for Mattermost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mattermost").finish()
    }
}

impl Mattermost {
    pub fn new(http: Arc<dyn HttpClient>) -> Self {
        Self { http }
    }

    pub fn payload(notification: &AlertNotification<'_>, options: &Options) -> serde_json::Value {
        let alert = notification.alert;
        let text = match (&alert.custom_subject, notification.new_state) {
            (Some(subject), _) => subject.clone(),
            (None, AlertState::Triggered) => format!("#### {} just triggered", alert.name),
            (None, _) => format!("#### {} went back to normal", alert.name),
        };

        let mut payload = json!({ "text": text });
        if let Some(body) = &alert.custom_body {
            payload["attachments"] = json!([{
                "fields": [{ "title": "Description", "value": body }]
            }]);
        }
        for key in ["username", "icon_url", "channel"] {
            if let Some(value) = option_str(options, key) {
                payload[key] = json!(value);
            }
        }
        payload
    }
}

#[async_trait]
impl Destination for Mattermost {
    fn name(&self) -> &'static str {
        "Mattermost"
    }

    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn icon(&self) -> &'static str {
        "fa-bolt"
    }

    fn configuration_schema(&self) -> ConfigurationSchema {
        ConfigurationSchema::object()
            .property("url", Property::string("Mattermost Webhook URL"))
            .property("username", Property::string("Username"))
            .property("icon_url", Property::string("Icon (URL)"))
            .property("channel", Property::string("Channel"))
            .secret(&["url"])
    }

    async fn notify(&self, notification: &AlertNotification<'_>, options: &Options) {
        let url = option_str(options, "url").unwrap_or_default();
        let body = Self::payload(notification, options).to_string();

        tracing::debug!("Sending Mattermost message for alert {}", notification.alert.id);

        let result = self
            .http
            .post_body(url, &[("Content-Type", "application/json")], &body)
            .await;
        report_delivery("Mattermost webhook send ERROR.", result);
    }
}
