use std::sync::Arc;

use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue};

use super::{DEFAULT_PAGE_LIMIT, IDEMPOTENCY_KEY};
use crate::error::{Error, Result};
use crate::http_client::HttpClient;
use crate::models::{Alert, AlertPage, AlertSeverity, AlertStatus, AlertUpdate, UpdatedAlert};
use crate::utils::{clamp_limit, validate_resource_id};

/// Filters for alert listings
#[derive(Debug, Clone)]
pub struct AlertListParams {
    pub status: AlertStatus,
    pub severity: Option<AlertSeverity>,
    pub terminal_id: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    /// Page size, clamped to the range the API accepts before transmission
    pub limit: u32,
    pub cursor: Option<String>,
}

impl Default for AlertListParams {
    fn default() -> Self {
        Self {
            status: AlertStatus::Open,
            severity: None,
            terminal_id: None,
            from: None,
            to: None,
            limit: DEFAULT_PAGE_LIMIT,
            cursor: None,
        }
    }
}

/// Alert API methods
pub struct AlertsApi {
    http: Arc<HttpClient>,
}

impl AlertsApi {
    pub(crate) fn new(http: Arc<HttpClient>) -> Self {
        Self { http }
    }

    /// List one page of alerts.
    pub async fn list(&self, params: &AlertListParams) -> Result<AlertPage> {
        let mut query: Vec<(&str, String)> = vec![
            ("status", params.status.as_str().to_string()),
            ("limit", clamp_limit(params.limit).to_string()),
        ];
        if let Some(severity) = params.severity {
            query.push(("severity", severity.as_str().to_string()));
        }
        if let Some(terminal_id) = &params.terminal_id {
            query.push(("terminal_id", terminal_id.clone()));
        }
        if let Some(from) = params.from {
            query.push(("from", from.to_rfc3339()));
        }
        if let Some(to) = params.to {
            query.push(("to", to.to_rfc3339()));
        }
        if let Some(cursor) = &params.cursor {
            query.push(("cursor", cursor.clone()));
        }

        self.http.get("/v1/alerts", &query).await
    }

    /// Walk the cursor chain and collect every matching alert.
    pub async fn list_all(
        &self,
        params: &AlertListParams,
        max_pages: Option<usize>,
    ) -> Result<Vec<Alert>> {
        let mut all = Vec::new();
        let mut cursor = params.cursor.clone();
        let mut pages = 0usize;

        loop {
            if max_pages.is_some_and(|max| pages >= max) {
                break;
            }

            let mut page_params = params.clone();
            page_params.cursor = cursor;
            let page = self.list(&page_params).await?;

            all.extend(page.items);
            pages += 1;

            match page.next_cursor {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        Ok(all)
    }

    /// Change an alert's status.
    ///
    /// Pass an idempotency key when the call may be retried by outer layers;
    /// the server deduplicates on it.
    pub async fn update(
        &self,
        alert_id: &str,
        update: &AlertUpdate,
        idempotency_key: Option<&str>,
    ) -> Result<UpdatedAlert> {
        validate_resource_id("alert", alert_id)?;

        let mut headers = HeaderMap::new();
        if let Some(key) = idempotency_key {
            let value = HeaderValue::from_str(key).map_err(|_| {
                Error::InvalidRequest("idempotency key is not a valid header value".to_string())
            })?;
            headers.insert(IDEMPOTENCY_KEY, value);
        }

        self.http
            .patch(&format!("/v1/alerts/{}", alert_id), update, headers)
            .await
    }
}
