//! Google Hangouts Chat webhook destination

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use crate::alert::AlertState;
use crate::destinations::{
    option_str, report_delivery, AlertNotification, ConfigurationSchema, Destination, Options,
    Property,
};
use crate::io::HttpClient;

pub const TYPE_NAME: &str = "hangouts_chat";

const TRIGGERED_TEXT: &str = r##"<b><font color="#c0392b">Triggered</font></b>"##;
const OK_TEXT: &str = r##"<font color="#27ae60">Went back to normal</font>"##;
const UNKNOWN_TEXT: &str = "Unable to determine status. Check Query and Alert configuration.";

pub struct HangoutsChat {
    http: Arc<dyn HttpClient>,
}

impl std::fmt::Debug for HangoutsChat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HangoutsChat").finish()
    }
}

impl HangoutsChat {
    pub fn new(http: Arc<dyn HttpClient>) -> Self {
        Self { http }
    }

    /// Build the card message posted to the webhook
    pub fn card(notification: &AlertNotification<'_>, options: &Options) -> serde_json::Value {
        let alert = notification.alert;
        let text = match notification.new_state {
            AlertState::Triggered => TRIGGERED_TEXT,
            AlertState::Ok => OK_TEXT,
            AlertState::Unknown => UNKNOWN_TEXT,
        };
        let title = alert.custom_subject.as_deref().unwrap_or(&alert.name);

        let mut header = json!({ "title": title });
        if let Some(icon_url) = option_str(options, "icon_url") {
            header["imageUrl"] = json!(icon_url);
        }

        let mut widgets = vec![json!({ "textParagraph": { "text": text } })];
        if let Some(host) = notification.host {
            widgets.push(json!({
                "buttons": [{
                    "textButton": {
                        "text": "OPEN QUERY",
                        "onClick": { "openLink": { "url": notification.query.url(host) } }
                    }
                }]
            }));
        }

        let mut sections = vec![json!({ "widgets": widgets })];
        if let Some(body) = &alert.custom_body {
            sections.push(json!({
                "widgets": [{ "textParagraph": { "text": body } }]
            }));
        }

        json!({ "cards": [{ "header": header, "sections": sections }] })
    }
}

#[async_trait]
impl Destination for HangoutsChat {
    fn name(&self) -> &'static str {
        "Google Hangouts Chat"
    }

    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn icon(&self) -> &'static str {
        "fa-bolt"
    }

    fn configuration_schema(&self) -> ConfigurationSchema {
        ConfigurationSchema::object()
            .property(
                "url",
                Property::string("Webhook URL (get it from the room settings)"),
            )
            .property(
                "icon_url",
                Property::string("Icon URL (32x32 or multiple, png format)"),
            )
            .required(&["url"])
            .secret(&["url"])
    }

    async fn notify(&self, notification: &AlertNotification<'_>, options: &Options) {
        let url = option_str(options, "url").unwrap_or_default();
        let body = Self::card(notification, options).to_string();

        tracing::debug!("Sending Hangouts Chat card for alert {}", notification.alert.id);

        let result = self
            .http
            .post_body(
                url,
                &[("Content-Type", "application/json; charset=UTF-8")],
                &body,
            )
            .await;
        report_delivery("webhook send ERROR.", result);
    }
}
