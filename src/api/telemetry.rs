use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderValue};

use super::IDEMPOTENCY_KEY;
use crate::error::{Error, Result};
use crate::http_client::HttpClient;
use crate::models::{TelemetryIngest, TelemetryReceipt};
use crate::utils::validate_resource_id;

/// Telemetry ingestion API methods
pub struct TelemetryApi {
    http: Arc<HttpClient>,
}

impl TelemetryApi {
    pub(crate) fn new(http: Arc<HttpClient>) -> Self {
        Self { http }
    }

    /// Ingest one telemetry batch.
    ///
    /// The server deduplicates batches on the idempotency key, so retried
    /// submissions with the same key are accepted exactly once.
    pub async fn ingest(
        &self,
        batch: &TelemetryIngest,
        idempotency_key: &str,
    ) -> Result<TelemetryReceipt> {
        validate_resource_id("terminal", &batch.terminal_id)?;

        let value = HeaderValue::from_str(idempotency_key).map_err(|_| {
            Error::InvalidRequest("idempotency key is not a valid header value".to_string())
        })?;
        let mut headers = HeaderMap::new();
        headers.insert(IDEMPOTENCY_KEY, value);

        self.http.post("/v1/telemetry", batch, headers).await
    }
}
