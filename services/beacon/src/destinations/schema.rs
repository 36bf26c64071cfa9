//! Declarative configuration schema for destination options

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::Options;

/// Placeholder shown instead of secret option values
pub const SECRET_PLACEHOLDER: &str = "--------";

/// A single option a destination accepts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    #[serde(rename = "type")]
    pub property_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
}

impl Property {
    pub fn string(title: &str) -> Self {
        Self {
            property_type: "string".to_string(),
            title: Some(title.to_string()),
            default: None,
        }
    }

    pub fn with_default(mut self, default: &str) -> Self {
        self.default = Some(serde_json::Value::String(default.to_string()));
        self
    }
}

/// JSON-schema-like description of a destination's options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigurationSchema {
    #[serde(rename = "type")]
    pub schema_type: String,
    pub properties: BTreeMap<String, Property>,
    #[serde(default)]
    pub required: Vec<String>,
    #[serde(default)]
    pub secret: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra_options: Vec<String>,
}

impl ConfigurationSchema {
    pub fn object() -> Self {
        Self {
            schema_type: "object".to_string(),
            properties: BTreeMap::new(),
            required: Vec::new(),
            secret: Vec::new(),
            extra_options: Vec::new(),
        }
    }

    pub fn property(mut self, name: &str, property: Property) -> Self {
        self.properties.insert(name.to_string(), property);
        self
    }

    pub fn required(mut self, names: &[&str]) -> Self {
        self.required = names.iter().map(|n| n.to_string()).collect();
        self
    }

    pub fn secret(mut self, names: &[&str]) -> Self {
        self.secret = names.iter().map(|n| n.to_string()).collect();
        self
    }

    pub fn extra_options(mut self, names: &[&str]) -> Self {
        self.extra_options = names.iter().map(|n| n.to_string()).collect();
        self
    }

    pub fn is_secret(&self, name: &str) -> bool {
        self.secret.iter().any(|s| s == name)
    }

    /// Default value declared for a string property
    pub fn default_str(&self, name: &str) -> Option<&str> {
        self.properties
            .get(name)
            .and_then(|p| p.default.as_ref())
            .and_then(|d| d.as_str())
    }

    /// Check required options are present and string options hold strings
    pub fn validate(&self, options: &Options) -> crate::Result<()> {
        for name in &self.required {
            match options.get(name) {
                None | Some(serde_json::Value::Null) => {
                    return Err(crate::BeaconError::Validation(format!(
                        "missing required option '{}'",
                        name
                    )));
                }
                Some(_) => {}
            }
        }

        for (name, value) in options {
            let Some(property) = self.properties.get(name) else {
                continue;
            };
            if property.property_type == "string" && !value.is_string() && !value.is_null() {
                return Err(crate::BeaconError::Validation(format!(
                    "option '{}' must be a string",
                    name
                )));
            }
        }

        Ok(())
    }

    /// Copy of `options` with every secret value replaced by a placeholder
    pub fn mask_secrets(&self, options: &Options) -> Options {
        options
            .iter()
            .map(|(name, value)| {
                let value = if self.is_secret(name) {
                    serde_json::Value::String(SECRET_PLACEHOLDER.to_string())
                } else {
                    value.clone()
                };
                (name.clone(), value)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema() -> ConfigurationSchema {
        ConfigurationSchema::object()
            .property("url", Property::string("Webhook URL"))
            .property("channel", Property::string("Channel").with_default("#general"))
            .required(&["url"])
            .secret(&["url"])
    }

    fn opts(value: serde_json::Value) -> Options {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn serializes_like_a_json_schema() {
        let value = serde_json::to_value(schema()).unwrap();
        assert_eq!(value["type"], "object");
        assert_eq!(value["properties"]["url"]["type"], "string");
        assert_eq!(value["properties"]["channel"]["default"], "#general");
        assert_eq!(value["required"], json!(["url"]));
        assert_eq!(value["secret"], json!(["url"]));
        assert!(value.get("extra_options").is_none());
    }

    #[test]
    fn validate_accepts_complete_options() {
        schema()
            .validate(&opts(json!({"url": "https://hooks", "other": 3})))
            .unwrap();
    }

    #[test]
    fn validate_rejects_missing_required() {
        let err = schema().validate(&opts(json!({"channel": "#x"}))).unwrap_err();
        assert!(err.to_string().contains("missing required option 'url'"));

        let err = schema().validate(&opts(json!({"url": null}))).unwrap_err();
        assert!(err.to_string().contains("'url'"));
    }

    #[test]
    fn validate_rejects_non_string_values() {
        let err = schema()
            .validate(&opts(json!({"url": "https://hooks", "channel": 5})))
            .unwrap_err();
        assert!(err.to_string().contains("option 'channel' must be a string"));
    }

    #[test]
    fn mask_secrets_hides_only_secret_fields() {
        let masked = schema().mask_secrets(&opts(json!({"url": "https://hooks/abc", "channel": "#x"})));
        assert_eq!(masked["url"], SECRET_PLACEHOLDER);
        assert_eq!(masked["channel"], "#x");
    }

    #[test]
    fn default_str_reads_property_defaults() {
        assert_eq!(schema().default_str("channel"), Some("#general"));
        assert_eq!(schema().default_str("url"), None);
        assert_eq!(schema().default_str("missing"), None);
    }
}
