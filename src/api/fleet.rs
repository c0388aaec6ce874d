use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::http_client::HttpClient;
use crate::models::FleetHealth;

/// Fleet-level API methods
pub struct FleetApi {
    http: Arc<HttpClient>,
}

impl FleetApi {
    pub(crate) fn new(http: Arc<HttpClient>) -> Self {
        Self { http }
    }

    /// Fleet health summary over the given time window.
    pub async fn health(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Result<FleetHealth> {
        let query = [("from", from.to_rfc3339()), ("to", to.to_rfc3339())];
        self.http.get("/v1/fleet/health", &query).await
    }
}
