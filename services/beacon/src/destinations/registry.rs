//! Lookup table of destination implementations keyed by type name

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use crate::config::{DestinationConfig, Settings};
use crate::destinations::{
    chatwork::ChatWork, email::Email, hangoutschat::HangoutsChat, mattermost::Mattermost,
    microsoft_teams_webhook::MicrosoftTeamsWebhook, pagerduty::PagerDuty, AlertNotification,
    ConfigurationSchema, Destination, Options,
};
use crate::io::HttpClient;
use crate::mail::Mailer;

/// Public description of a destination type
#[derive(Debug, Clone, Serialize)]
pub struct DestinationDescriptor {
    #[serde(rename = "type")]
    pub destination_type: &'static str,
    pub name: &'static str,
    pub icon: &'static str,
    pub enabled: bool,
    pub configuration_schema: ConfigurationSchema,
}

#[derive(Debug, Default)]
pub struct DestinationRegistry {
    destinations: BTreeMap<&'static str, Arc<dyn Destination>>,
}

impl DestinationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in destination
    pub fn with_defaults(
        settings: &Settings,
        http: Arc<dyn HttpClient>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(Email::new(settings, mailer)));
        registry.register(Arc::new(ChatWork::new(settings, Arc::clone(&http))));
        registry.register(Arc::new(HangoutsChat::new(Arc::clone(&http))));
        registry.register(Arc::new(Mattermost::new(Arc::clone(&http))));
        registry.register(Arc::new(MicrosoftTeamsWebhook::new(Arc::clone(&http))));
        registry.register(Arc::new(PagerDuty::new(settings, http)));
        registry
    }

    /// Add a destination; one registered under the same type is replaced
    pub fn register(&mut self, destination: Arc<dyn Destination>) {
        tracing::debug!("Registering destination type {}", destination.type_name());
        self.destinations.insert(destination.type_name(), destination);
    }

    pub fn get(&self, type_name: &str) -> Option<Arc<dyn Destination>> {
        self.destinations.get(type_name).cloned()
    }

    pub fn types(&self) -> Vec<&'static str> {
        self.destinations.keys().copied().collect()
    }

    pub fn descriptors(&self) -> Vec<DestinationDescriptor> {
        self.destinations
            .values()
            .map(|destination| DestinationDescriptor {
                destination_type: destination.type_name(),
                name: destination.name(),
                icon: destination.icon(),
                enabled: destination.enabled(),
                configuration_schema: destination.configuration_schema(),
            })
            .collect()
    }

    /// Bind a configured destination to its implementation after validating its options
    pub fn configure(&self, config: &DestinationConfig) -> crate::Result<ConfiguredDestination> {
        let destination = self.get(&config.destination_type).ok_or_else(|| {
            crate::BeaconError::Config(format!(
                "Unknown destination type '{}' for destination '{}'",
                config.destination_type, config.name
            ))
        })?;

        if !destination.enabled() {
            return Err(crate::BeaconError::Config(format!(
                "Destination type '{}' is disabled",
                config.destination_type
            )));
        }

        destination
            .configuration_schema()
            .validate(&config.options)
            .inspect_err(|e| tracing::warn!("Destination '{}' rejected: {}", config.name, e))?;

        Ok(ConfiguredDestination {
            name: config.name.clone(),
            destination,
            options: config.options.clone(),
        })
    }
}

/// A destination implementation paired with validated options
#[derive(Debug, Clone)]
pub struct ConfiguredDestination {
    pub name: String,
    pub destination: Arc<dyn Destination>,
    pub options: Options,
}

impl ConfiguredDestination {
    pub async fn notify(&self, notification: &AlertNotification<'_>) {
        tracing::info!(
            "Notifying destination '{}' ({}) of alert {} state {}",
            self.name,
            self.destination.type_name(),
            notification.alert.id,
            notification.new_state
        );
        self.destination.notify(notification, &self.options).await;
    }

    /// Options with secret values replaced, safe to display
    pub fn masked_options(&self) -> Options {
        self.destination
            .configuration_schema()
            .mask_secrets(&self.options)
    }
}
