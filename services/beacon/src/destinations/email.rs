//! Email destination

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;

use crate::config::Settings;
use crate::destinations::{
    option_str, AlertNotification, ConfigurationSchema, Destination, Options, Property,
};
use crate::mail::{MailMessage, Mailer};
use crate::template::substitute;

pub const TYPE_NAME: &str = "email";

/// Body used when no template file is configured
pub const DEFAULT_MAIL_BODY_TEMPLATE: &str = r#"<html>
<body>
<p><a href="{{ALERT_URL}}">{{ALERT_NAME}}</a> changed status to <b>{{ALERT_STATUS}}</b>.</p>
<p>Condition: {{QUERY_RESULT_VALUE}} {{ALERT_CONDITION}} {{ALERT_THRESHOLD}}</p>
<p>Query: <a href="{{QUERY_URL}}">{{QUERY_NAME}}</a></p>
</body>
</html>
"#;

/// Split a comma separated address list, dropping only empty segments
pub fn parse_recipients(addresses: &str) -> Vec<String> {
    addresses
        .split(',')
        .filter(|address| !address.is_empty())
        .map(str::to_string)
        .collect()
}

pub struct Email {
    default_subject_template: String,
    body_template_file: Option<PathBuf>,
    mailer: Arc<dyn Mailer>,
}

impl std::fmt::Debug for Email {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Email")
            .field("default_subject_template", &self.default_subject_template)
            .field("body_template_file", &self.body_template_file)
            .finish()
    }
}

impl Email {
    pub fn new(settings: &Settings, mailer: Arc<dyn Mailer>) -> Self {
        Self {
            default_subject_template: settings.default_mail_subject_template.clone(),
            body_template_file: settings.mail_body_template_file.clone(),
            mailer,
        }
    }

    fn body_template(&self) -> crate::Result<String> {
        match &self.body_template_file {
            Some(path) => std::fs::read_to_string(path).map_err(|e| {
                crate::BeaconError::Template(format!(
                    "Failed to read mail body template {:?}: {}",
                    path, e
                ))
            }),
            None => Ok(DEFAULT_MAIL_BODY_TEMPLATE.to_string()),
        }
    }

    fn build_message(
        &self,
        notification: &AlertNotification<'_>,
        options: &Options,
        recipients: Vec<String>,
    ) -> crate::Result<MailMessage> {
        let alert = notification.alert;

        let html = match &alert.custom_body {
            Some(body) => body.clone(),
            None => alert.render_template(
                &self.body_template()?,
                notification.new_state,
                notification.host,
                notification.query,
            ),
        };

        let subject = match &alert.custom_subject {
            Some(subject) => subject.clone(),
            None => {
                let template = option_str(options, "subject_template")
                    .unwrap_or(self.default_subject_template.as_str());
                let state = notification.new_state.display_upper();
                substitute(
                    template,
                    &[("alert_name", alert.name.as_str()), ("state", state.as_str())],
                )
            }
        };

        Ok(MailMessage {
            recipients,
            subject,
            html,
        })
    }
}

#[async_trait]
impl Destination for Email {
    fn name(&self) -> &'static str {
        "Email"
    }

    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn icon(&self) -> &'static str {
        "fa-envelope"
    }

    fn configuration_schema(&self) -> ConfigurationSchema {
        ConfigurationSchema::object()
            .property(
                "addresses",
                Property::string("Addresses (comma separated)"),
            )
            .property(
                "subject_template",
                Property::string("Subject Template")
                    .with_default(&self.default_subject_template),
            )
            .required(&["addresses"])
            .extra_options(&["subject_template"])
    }

    async fn notify(&self, notification: &AlertNotification<'_>, options: &Options) {
        let addresses = options
            .get("addresses")
            .and_then(|v| v.as_str())
            .unwrap_or_default();
        let recipients = parse_recipients(addresses);
        if recipients.is_empty() {
            tracing::warn!("No emails given. Skipping send.");
            return;
        }

        tracing::debug!("Notifying: {:?}", recipients);

        let result = match self.build_message(notification, options, recipients) {
            Ok(message) => self.mailer.send(&message).await,
            Err(e) => Err(e),
        };

        if let Err(e) = result {
            tracing::error!(error = %e, "Mail send error.");
        }
    }
}
