//! Alert, query and user records handed to destinations

use std::fmt;

use serde::{Deserialize, Serialize};

/// State an alert moved into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertState {
    Triggered,
    Ok,
    #[serde(other)]
    Unknown,
}

impl AlertState {
    /// Case-insensitive; anything unrecognised is `Unknown`
    pub fn parse(s: &str) -> Self {
        if s.eq_ignore_ascii_case("triggered") {
            AlertState::Triggered
        } else if s.eq_ignore_ascii_case("ok") {
            AlertState::Ok
        } else {
            AlertState::Unknown
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AlertState::Triggered => "triggered",
            AlertState::Ok => "ok",
            AlertState::Unknown => "unknown",
        }
    }

    /// Upper-cased form used in human-facing text
    pub fn display_upper(&self) -> String {
        self.as_str().to_uppercase()
    }
}

impl fmt::Display for AlertState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Condition the alert evaluates against its query result
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AlertOptions {
    #[serde(default)]
    pub column: Option<String>,
    #[serde(default)]
    pub op: Option<String>,
    #[serde(default)]
    pub value: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub custom_subject: Option<String>,
    #[serde(default)]
    pub custom_body: Option<String>,
    #[serde(default)]
    pub options: AlertOptions,
    /// Value of the watched column in the latest query result
    #[serde(default)]
    pub query_result_value: Option<serde_json::Value>,
}

impl Alert {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            custom_subject: None,
            custom_body: None,
            options: AlertOptions::default(),
            query_result_value: None,
        }
    }

    pub fn url(&self, host: &str) -> String {
        format!("{}/alerts/{}", host, self.id)
    }

    /// Render a mail body template with the alert's `{{PLACEHOLDER}}` variables
    pub fn render_template(
        &self,
        template: &str,
        state: AlertState,
        host: Option<&str>,
        query: &Query,
    ) -> String {
        let host = host.unwrap_or_default();
        let vars = [
            ("ALERT_NAME", self.name.clone()),
            ("ALERT_URL", self.url(host)),
            ("ALERT_STATUS", state.display_upper()),
            ("ALERT_CONDITION", self.options.op.clone().unwrap_or_default()),
            (
                "ALERT_THRESHOLD",
                self.options.value.as_ref().map(value_text).unwrap_or_default(),
            ),
            ("QUERY_NAME", query.name.clone()),
            ("QUERY_URL", query.url(host)),
            (
                "QUERY_RESULT_VALUE",
                self.query_result_value
                    .as_ref()
                    .map(value_text)
                    .unwrap_or_default(),
            ),
        ];

        vars.iter().fold(template.to_string(), |rendered, (name, value)| {
            rendered.replace(&format!("{{{{{}}}}}", name), value)
        })
    }
}

fn value_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Query {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub query_text: String,
}

impl Query {
    pub fn new(id: i64, query_text: impl Into<String>) -> Self {
        Self {
            id,
            name: String::new(),
            query_text: query_text.into(),
        }
    }

    pub fn url(&self, host: &str) -> String {
        format!("{}/queries/{}", host, self.id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
}
