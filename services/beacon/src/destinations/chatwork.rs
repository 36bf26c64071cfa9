//! ChatWork room message destination

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::Settings;
use crate::destinations::{
    option_str, report_delivery, AlertNotification, ConfigurationSchema, Destination, Options,
    Property,
};
use crate::io::HttpClient;
use crate::template::{substitute, unescape_newlines};

pub const TYPE_NAME: &str = "chatwork";

/// Default message; the `\n` sequences are literal, as typed into a settings form
pub const ALERTS_DEFAULT_MESSAGE_TEMPLATE: &str =
    "{alert_name} changed state to {new_state}.\\n{alert_url}\\n{query_url}";

pub struct ChatWork {
    api_url: String,
    http: Arc<dyn HttpClient>,
}

impl std::fmt::Debug for ChatWork {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatWork")
            .field("api_url", &self.api_url)
            .finish()
    }
}

impl ChatWork {
    pub fn new(settings: &Settings, http: Arc<dyn HttpClient>) -> Self {
        Self {
            api_url: settings.chatwork_api_url.trim_end_matches('/').to_string(),
            http,
        }
    }

    fn message(notification: &AlertNotification<'_>, options: &Options) -> String {
        let alert = notification.alert;
        let mut message = String::new();

        if let Some(subject) = &alert.custom_subject {
            message.push_str(subject);
            message.push('\n');
        }

        match &alert.custom_body {
            Some(body) => message.push_str(body),
            None => {
                let template = option_str(options, "message_template")
                    .unwrap_or(ALERTS_DEFAULT_MESSAGE_TEMPLATE);
                let new_state = notification.new_state.display_upper();
                let alert_url = notification.alert_url();
                let query_url = notification.query_url();
                message.push_str(&substitute(
                    &unescape_newlines(template),
                    &[
                        ("alert_name", alert.name.as_str()),
                        ("new_state", new_state.as_str()),
                        ("alert_url", alert_url.as_str()),
                        ("query_url", query_url.as_str()),
                    ],
                ));
            }
        }

        message
    }
}

#[async_trait]
impl Destination for ChatWork {
    fn name(&self) -> &'static str {
        "ChatWork"
    }

    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn icon(&self) -> &'static str {
        "fa-comment"
    }

    fn configuration_schema(&self) -> ConfigurationSchema {
        ConfigurationSchema::object()
            .property("api_token", Property::string("API Token"))
            .property("room_id", Property::string("Room ID"))
            .property(
                "message_template",
                Property::string("Message Template").with_default(ALERTS_DEFAULT_MESSAGE_TEMPLATE),
            )
            .required(&["message_template", "api_token", "room_id"])
            .secret(&["api_token"])
    }

    async fn notify(&self, notification: &AlertNotification<'_>, options: &Options) {
        let room_id = option_str(options, "room_id").unwrap_or_default();
        let api_token = option_str(options, "api_token").unwrap_or_default();
        let url = format!("{}/rooms/{}/messages", self.api_url, room_id);
        let message = Self::message(notification, options);

        tracing::debug!("Sending ChatWork message to room {}", room_id);

        let result = self
            .http
            .post_form(
                &url,
                &[("X-ChatWorkToken", api_token)],
                &[("body", message.as_str())],
            )
            .await;
        report_delivery("ChatWork send ERROR.", result);
    }
}
