use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::DEFAULT_PAGE_LIMIT;
use crate::error::Result;
use crate::http_client::HttpClient;
use crate::models::{Interval, TerminalDetail, TerminalMetrics, TerminalPage, TerminalStatus, TerminalSummary};
use crate::utils::{clamp_limit, validate_resource_id};

/// Filters for terminal listings
#[derive(Debug, Clone)]
pub struct TerminalListParams {
    pub status: Option<TerminalStatus>,
    /// Page size, clamped to the range the API accepts before transmission
    pub limit: u32,
    pub cursor: Option<String>,
}

impl Default for TerminalListParams {
    fn default() -> Self {
        Self {
            status: None,
            limit: DEFAULT_PAGE_LIMIT,
            cursor: None,
        }
    }
}

/// Time window and shape of a metrics query
#[derive(Debug, Clone)]
pub struct MetricsQuery {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    pub interval: Interval,
    /// Metric keys to retrieve; empty means the server default set
    pub metrics: Vec<String>,
}

impl MetricsQuery {
    pub fn new(from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        Self {
            from,
            to,
            interval: Interval::FiveMinutes,
            metrics: Vec::new(),
        }
    }
}

/// Terminal API methods
pub struct TerminalsApi {
    http: Arc<HttpClient>,
}

impl TerminalsApi {
    pub(crate) fn new(http: Arc<HttpClient>) -> Self {
        Self { http }
    }

    /// List one page of terminals.
    pub async fn list(&self, params: &TerminalListParams) -> Result<TerminalPage> {
        let mut query: Vec<(&str, String)> =
            vec![("limit", clamp_limit(params.limit).to_string())];
        if let Some(status) = params.status {
            query.push(("status", status.as_str().to_string()));
        }
        if let Some(cursor) = &params.cursor {
            query.push(("cursor", cursor.clone()));
        }

        self.http.get("/v1/terminals", &query).await
    }

    /// Walk the cursor chain and collect every terminal.
    ///
    /// `max_pages` bounds how many pages are fetched; `None` walks to
    /// exhaustion.
    pub async fn list_all(
        &self,
        params: &TerminalListParams,
        max_pages: Option<usize>,
    ) -> Result<Vec<TerminalSummary>> {
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

    /// Detailed information about one terminal.
    pub async fn get(&self, terminal_id: &str) -> Result<TerminalDetail> {
        validate_resource_id("terminal", terminal_id)?;
        self.http
            .get(&format!("/v1/terminals/{}", terminal_id), &[])
            .await
    }

    /// Time-series metrics for one terminal.
    pub async fn metrics(&self, terminal_id: &str, query: &MetricsQuery) -> Result<TerminalMetrics> {
        validate_resource_id("terminal", terminal_id)?;

        let mut q: Vec<(&str, String)> = vec![
            ("from", query.from.to_rfc3339()),
            ("to", query.to.to_rfc3339()),
            ("interval", query.interval.as_str().to_string()),
        ];
        if !query.metrics.is_empty() {
            q.push(("metrics", query.metrics.join(",")));
        }

        self.http
            .get(&format!("/v1/terminals/{}/metrics", terminal_id), &q)
            .await
    }
}
