//! Configuration types for the beacon service

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::catalog::CatalogTable;
use crate::destinations::{ConfiguredDestination, DestinationRegistry, Options};

/// Prefix marking an option value that is read from the environment
const ENV_PREFIX: &str = "env:";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub destinations: Vec<DestinationConfig>,
    #[serde(default)]
    pub mail: MailConfig,
    #[serde(default)]
    pub data_sources: Vec<DataSourceConfig>,
}

/// Global destination settings threaded into every destination constructor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_mail_subject_template")]
    pub default_mail_subject_template: String,
    /// HTML body template for mail alerts; the built-in template is used when unset
    #[serde(default)]
    pub mail_body_template_file: Option<PathBuf>,
    #[serde(default = "default_pagerduty_events_url")]
    pub pagerduty_events_url: String,
    #[serde(default = "default_chatwork_api_url")]
    pub chatwork_api_url: String,
    #[serde(default = "default_http_timeout")]
    pub http_timeout_seconds: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_mail_subject_template: default_mail_subject_template(),
            mail_body_template_file: None,
            pagerduty_events_url: default_pagerduty_events_url(),
            chatwork_api_url: default_chatwork_api_url(),
            http_timeout_seconds: default_http_timeout(),
        }
    }
}

/// A configured destination instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DestinationConfig {
    pub name: String,
    #[serde(rename = "type")]
    pub destination_type: String,
    #[serde(default)]
    pub options: Options,
}

/// Mail relay used by the email destination
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MailConfig {
    #[serde(default)]
    pub relay_url: Option<String>,
    #[serde(default)]
    pub sender: Option<String>,
}

/// Data source configuration with tagged enum for extensibility
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DataSourceConfig {
    #[serde(rename = "catalog")]
    Catalog {
        id: i64,
        name: String,
        #[serde(default)]
        databases: BTreeMap<String, Vec<CatalogTable>>,
    },
}

impl DataSourceConfig {
    pub fn id(&self) -> i64 {
        match self {
            DataSourceConfig::Catalog { id, .. } => *id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            DataSourceConfig::Catalog { name, .. } => name,
        }
    }
}

impl Config {
    /// Replace every `env:NAME` option value with the named environment variable
    pub fn resolve_secrets(&mut self) -> crate::Result<()> {
        for destination in &mut self.destinations {
            for (key, value) in destination.options.iter_mut() {
                let Some(var) = value.as_str().and_then(|s| s.strip_prefix(ENV_PREFIX)) else {
                    continue;
                };
                let resolved = std::env::var(var).map_err(|_| {
                    crate::BeaconError::Config(format!(
                        "Destination '{}' option '{}' refers to unset environment variable {}",
                        destination.name, key, var
                    ))
                })?;
                tracing::debug!(
                    "Resolved option '{}' of destination '{}' from environment",
                    key,
                    destination.name
                );
                *value = serde_json::Value::String(resolved);
            }
        }
        Ok(())
    }

    /// Configure every destination, rejecting duplicate names, unregistered
    /// types and options that fail the type's schema
    pub fn validate(
        &self,
        registry: &DestinationRegistry,
    ) -> crate::Result<Vec<ConfiguredDestination>> {
        let mut seen = std::collections::HashSet::new();
        let mut configured = Vec::with_capacity(self.destinations.len());
        for destination in &self.destinations {
            if !seen.insert(destination.name.as_str()) {
                return Err(crate::BeaconError::Config(format!(
                    "Duplicate destination name '{}'",
                    destination.name
                )));
            }
            configured.push(registry.configure(destination)?);
        }
        Ok(configured)
    }

    pub fn destination(&self, name: &str) -> Option<&DestinationConfig> {
        self.destinations.iter().find(|d| d.name == name)
    }
}

fn default_mail_subject_template() -> String {
    "Alert: {alert_name} changed status to {state}".to_string()
}

fn default_pagerduty_events_url() -> String {
    "https://events.pagerduty.com/v2/enqueue".to_string()
}

fn default_chatwork_api_url() -> String {
    "https://api.chatwork.com/v2".to_string()
}

fn default_http_timeout() -> u64 {
    5
}

/// Load configuration from a JSON file
pub fn load_config(path: &Path) -> crate::Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        crate::BeaconError::Config(format!("Failed to read config file {:?}: {}", path, e))
    })?;
    let config: Config = serde_json::from_str(&content)?;
    Ok(config)
}
