//! Microsoft Teams incoming-webhook destination

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::destinations::{
    option_str, report_delivery, AlertNotification, ConfigurationSchema, Destination, Options,
    Property,
};
use crate::io::HttpClient;
use crate::template::{json_escape, json_string_substitute};

pub const TYPE_NAME: &str = "microsoft_teams_webhook";

/// MessageCard posted when the options carry no template of their own
pub const ALERTS_DEFAULT_MESSAGE_TEMPLATE: &str = r#"{
    "@type": "MessageCard",
    "@context": "http://schema.org/extensions",
    "themeColor": "0076D7",
    "summary": "A Redash Alert was Triggered",
    "sections": [{
        "activityTitle": "A Redash Alert was Triggered",
        "facts": [{
            "name": "Alert Name",
            "value": "{alert_name}"
        }, {
            "name": "Alert URL",
            "value": "{alert_url}"
        }, {
            "name": "Query",
            "value": "{query_text}"
        }, {
            "name": "Query URL",
            "value": "{query_url}"
        }],
        "markdown": true
    }]
}"#;

pub struct MicrosoftTeamsWebhook {
    http: Arc<dyn HttpClient>,
}

impl std::fmt::Debug for MicrosoftTeamsWebhook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MicrosoftTeamsWebhook").finish()
    }
}

impl MicrosoftTeamsWebhook {
    pub fn new(http: Arc<dyn HttpClient>) -> Self {
        Self { http }
    }

    /// The card is built from the template alone; custom subject and body
    /// are not part of it
    fn message(notification: &AlertNotification<'_>, options: &Options) -> String {
        let template =
            option_str(options, "message_template").unwrap_or(ALERTS_DEFAULT_MESSAGE_TEMPLATE);

        let substitutions = HashMap::from([
            ("alert_name".to_string(), json_escape(&notification.alert.name)),
            ("alert_url".to_string(), json_escape(&notification.alert_url())),
            (
                "query_text".to_string(),
                json_escape(&notification.query.query_text),
            ),
            ("query_url".to_string(), json_escape(&notification.query_url())),
        ]);

        json_string_substitute(template, Some(&substitutions))
    }
}

#[async_trait]
impl Destination for MicrosoftTeamsWebhook {
    fn name(&self) -> &'static str {
        "Microsoft Teams Webhook"
    }

    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn icon(&self) -> &'static str {
        "fa-bolt"
    }

    fn configuration_schema(&self) -> ConfigurationSchema {
        ConfigurationSchema::object()
            .property("url", Property::string("Microsoft Teams Webhook URL"))
            .property(
                "message_template",
                Property::string("Message Template")
                    .with_default(ALERTS_DEFAULT_MESSAGE_TEMPLATE),
            )
            .required(&["url"])
    }

    async fn notify(&self, notification: &AlertNotification<'_>, options: &Options) {
        let url = option_str(options, "url").unwrap_or_default();
        let body = Self::message(notification, options);

        tracing::debug!("Sending Teams message for alert {}", notification.alert.id);

        let result = self
            .http
            .post_body(url, &[("Content-Type", "application/json")], &body)
            .await;
        report_delivery("MS Teams Webhook send ERROR.", result);
    }
}
