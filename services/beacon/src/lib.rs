//! Beacon - alert notification destinations and warehouse schema tasks
//!
//! Delivers alert state changes to chat, paging and mail destinations, and
//! serves cached database metadata from configured data sources.

pub mod alert;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod destinations;
pub mod error;
pub mod io;
pub mod mail;
pub mod tasks;
pub mod template;

pub use config::{load_config, Config};
pub use error::{BeaconError, Result};

use std::sync::Arc;
use std::time::Duration;

use crate::cache::{Cache, MemoryCache};
use crate::catalog::{DataSourceRegistry, DataSourceStore};
use crate::destinations::{AlertNotification, ConfiguredDestination, DestinationRegistry};
use crate::io::{HttpClient, ReqwestHttpClient};
use crate::mail::mailer_from_config;
use crate::tasks::SchemaTasks;

/// Assembles a [`Beacon`] from configuration and optional collaborators
pub struct BeaconBuilder {
    config: Config,
    http: Option<Arc<dyn HttpClient>>,
    cache: Option<Arc<dyn Cache>>,
    store: Option<Arc<dyn DataSourceStore>>,
}

impl BeaconBuilder {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            http: None,
            cache: None,
            store: None,
        }
    }

    pub fn with_http_client(mut self, http: Arc<dyn HttpClient>) -> Self {
        self.http = Some(http);
        self
    }

    pub fn with_cache(mut self, cache: Arc<dyn Cache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_data_source_store(mut self, store: Arc<dyn DataSourceStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Validate the configured destinations and wire everything together
    pub fn build(self) -> Result<Beacon> {
        let timeout = Duration::from_secs(self.config.settings.http_timeout_seconds);
        let http: Arc<dyn HttpClient> = match self.http {
            Some(http) => http,
            None => Arc::new(ReqwestHttpClient::with_timeout(timeout)),
        };
        let mailer = mailer_from_config(&self.config.mail, Arc::clone(&http));
        let registry = DestinationRegistry::with_defaults(&self.config.settings, http, mailer);

        let destinations = self.config.validate(&registry)?;

        let store: Arc<dyn DataSourceStore> = match self.store {
            Some(store) => store,
            None => Arc::new(DataSourceRegistry::from_config(&self.config.data_sources)),
        };
        let cache: Arc<dyn Cache> = match self.cache {
            Some(cache) => cache,
            None => Arc::new(MemoryCache::new()),
        };

        tracing::debug!(
            "Built beacon with {} destination(s) and {} data source(s)",
            destinations.len(),
            self.config.data_sources.len()
        );

        Ok(Beacon {
            registry,
            destinations,
            tasks: SchemaTasks::new(store, cache),
        })
    }
}

/// Configured destinations and schema tasks ready to serve
#[derive(Debug)]
pub struct Beacon {
    registry: DestinationRegistry,
    destinations: Vec<ConfiguredDestination>,
    tasks: SchemaTasks,
}

impl Beacon {
    pub fn registry(&self) -> &DestinationRegistry {
        &self.registry
    }

    pub fn destinations(&self) -> &[ConfiguredDestination] {
        &self.destinations
    }

    pub fn destination(&self, name: &str) -> Option<&ConfiguredDestination> {
        self.destinations.iter().find(|d| d.name == name)
    }

    /// Deliver through one named destination; only an unknown name is an error
    pub async fn notify(&self, name: &str, notification: &AlertNotification<'_>) -> Result<()> {
        let destination = self.destination(name).ok_or_else(|| {
            BeaconError::Config(format!("No destination named '{}'", name))
        })?;
        destination.notify(notification).await;
        Ok(())
    }

    /// Deliver through every configured destination in order
    pub async fn notify_all(&self, notification: &AlertNotification<'_>) {
        for destination in &self.destinations {
            destination.notify(notification).await;
        }
    }

    pub fn tasks(&self) -> &SchemaTasks {
        &self.tasks
    }
}
