use std::sync::Arc;

use reqwest::Client;
use serde_json::Value;

use crate::api::{AlertsApi, FleetApi, TelemetryApi, TerminalsApi};
use crate::auth::{Credential, TokenManager};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::http_client::HttpClient;

/// Entry point for talking to the Fleetlink API
///
/// Construction resolves the credential and fails if none is available, so a
/// client is always able to authenticate. Cheap to clone; all clones share
/// one transport and one token manager.
#[derive(Clone)]
pub struct FleetlinkClient {
    http: Arc<HttpClient>,
}

impl std::fmt::Debug for FleetlinkClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FleetlinkClient").finish_non_exhaustive()
    }
}

impl FleetlinkClient {
    /// Build a client from resolved configuration.
    pub fn new(config: Config) -> Result<Self> {
        let credential = Credential::resolve(config.api_secret.clone())?;

        let transport = Client::builder()
            .pool_max_idle_per_host(config.max_connections)
            .connect_timeout(config.connect_timeout_duration())
            .timeout(config.request_timeout_duration())
            .build()
            .map_err(|e| Error::InvalidRequest(format!("failed to build HTTP transport: {}", e)))?;

        let auth = Arc::new(TokenManager::new(
            transport.clone(),
            &config.base_url,
            credential,
        ));
        let http = Arc::new(HttpClient::new(
            transport,
            &config.base_url,
            auth,
            config.max_retries,
        ));

        tracing::debug!(base_url = %config.base_url, "fleetlink client initialized");

        Ok(Self { http })
    }

    /// Build a client from `FLEETLINK_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(Config::from_env()?)
    }

    /// API liveness probe.
    pub async fn health_check(&self) -> Result<Value> {
        self.http.get("/health", &[]).await
    }

    /// Basic API metadata.
    pub async fn api_info(&self) -> Result<Value> {
        self.http.get("/", &[]).await
    }

    /// Fleet-wide health summaries.
    pub fn fleet(&self) -> FleetApi {
        FleetApi::new(self.http.clone())
    }

    /// Terminal listing, detail, and metrics.
    pub fn terminals(&self) -> TerminalsApi {
        TerminalsApi::new(self.http.clone())
    }

    /// Alert listing and updates.
    pub fn alerts(&self) -> AlertsApi {
        AlertsApi::new(self.http.clone())
    }

    /// Telemetry ingestion.
    pub fn telemetry(&self) -> TelemetryApi {
        TelemetryApi::new(self.http.clone())
    }
}
