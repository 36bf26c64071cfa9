//! BDD test world for beacon

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use beacon::alert::{Alert, Query};
use beacon::cache::MemoryCache;
use beacon::catalog::CatalogTable;
use beacon::config::DataSourceConfig;
use beacon::io::{HttpClient, HttpResponse};
use beacon::{Beacon, BeaconBuilder, BeaconError, Config};
use cucumber::World;

/// A request captured by [`RecordingClient`]
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub form: Vec<(String, String)>,
    pub body: String,
}

impl RecordedRequest {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).expect("request body is not JSON")
    }

    pub fn form_field(&self, name: &str) -> Option<&str> {
        self.form
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Reply {
    Status(u16),
    Unreachable,
}

/// HTTP client that records every request and answers with a fixed reply
#[derive(Debug)]
pub struct RecordingClient {
    pub requests: Mutex<Vec<RecordedRequest>>,
    pub reply: Mutex<Reply>,
}

impl Default for RecordingClient {
    fn default() -> Self {
        Self {
            requests: Mutex::default(),
            reply: Mutex::new(Reply::Status(200)),
        }
    }
}

impl RecordingClient {
    fn record(&self, request: RecordedRequest) -> beacon::Result<HttpResponse> {
        self.requests.lock().unwrap().push(request);
        match *self.reply.lock().unwrap() {
            Reply::Status(status) => Ok(HttpResponse {
                status,
                body: String::new(),
            }),
            Reply::Unreachable => Err(BeaconError::Http("connection refused".to_string())),
        }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

fn owned(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[async_trait::async_trait]
impl HttpClient for RecordingClient {
    async fn post_form(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        params: &[(&str, &str)],
    ) -> beacon::Result<HttpResponse> {
        self.record(RecordedRequest {
            url: url.to_string(),
            headers: owned(headers),
            form: owned(params),
            body: String::new(),
        })
    }

    async fn post_body(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: &str,
    ) -> beacon::Result<HttpResponse> {
        self.record(RecordedRequest {
            url: url.to_string(),
            headers: owned(headers),
            form: Vec::new(),
            body: body.to_string(),
        })
    }
}

#[derive(Debug, Default, World)]
pub struct BeaconWorld {
    pub config: Config,
    pub http: Arc<RecordingClient>,
    pub cache: Arc<MemoryCache>,
    pub catalogs: BTreeMap<i64, BTreeMap<String, Vec<CatalogTable>>>,

    pub beacon: Option<Beacon>,
    pub build_error: Option<BeaconError>,

    // Destination testing
    pub alert: Option<Alert>,
    pub query: Option<Query>,
    pub notify_result: Option<beacon::Result<()>>,

    // Schema task testing
    pub task_result: Option<serde_json::Value>,
}

impl BeaconWorld {
    /// Build the beacon from the accumulated configuration on first use
    pub fn beacon(&mut self) -> &Beacon {
        if self.beacon.is_none() {
            let mut config = self.config.clone();
            config.data_sources = self
                .catalogs
                .iter()
                .map(|(id, databases)| DataSourceConfig::Catalog {
                    id: *id,
                    name: format!("catalog-{}", id),
                    databases: databases.clone(),
                })
                .collect();

            let http: Arc<dyn HttpClient> = self.http.clone();
            let built = BeaconBuilder::new(config)
                .with_http_client(http)
                .with_cache(self.cache.clone())
                .build()
                .expect("beacon failed to build");
            self.beacon = Some(built);
        }
        self.beacon.as_ref().expect("beacon not built")
    }

    pub fn try_build(&mut self) {
        let http: Arc<dyn HttpClient> = self.http.clone();
        match BeaconBuilder::new(self.config.clone())
            .with_http_client(http)
            .build()
        {
            Ok(built) => self.beacon = Some(built),
            Err(e) => self.build_error = Some(e),
        }
    }
}
