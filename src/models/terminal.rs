use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Terminal connectivity states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TerminalStatus {
    Online,
    Offline,
    Degraded,
}

impl TerminalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TerminalStatus::Online => "online",
            TerminalStatus::Offline => "offline",
            TerminalStatus::Degraded => "degraded",
        }
    }
}

/// Derived health classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Offline,
}

/// Aggregation interval for metric series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Interval {
    #[serde(rename = "1m")]
    OneMinute,
    #[serde(rename = "5m")]
    FiveMinutes,
    #[serde(rename = "1h")]
    OneHour,
}

impl Interval {
    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::OneMinute => "1m",
            Interval::FiveMinutes => "5m",
            Interval::OneHour => "1h",
        }
    }
}

/// Geographic position of a terminal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub label: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

/// One factor contributing to a terminal's health classification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthFactor {
    pub factor: String,
    pub value: f64,
    pub threshold: f64,
    pub message: String,
}

/// Terminal as returned by list endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerminalSummary {
    pub terminal_id: String,
    pub health_status: HealthStatus,
    pub last_seen: DateTime<Utc>,
    pub status: TerminalStatus,
    pub name: Option<String>,
    pub location: Option<Location>,
}

/// One page of a terminal listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerminalPage {
    pub items: Vec<TerminalSummary>,
    pub next_cursor: Option<String>,
}

/// Terminal as returned by the single-terminal endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerminalDetail {
    pub terminal_id: String,
    pub health_status: HealthStatus,
    pub last_seen: DateTime<Utc>,
    pub status: TerminalStatus,
    pub name: Option<String>,
    pub location: Option<Location>,
    pub account_id: Option<String>,
    pub firmware_version: Option<String>,
    pub health_factors: Option<Vec<HealthFactor>>,
}

/// Single point in a metric series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricPoint {
    /// Timestamp
    pub t: DateTime<Utc>,
    /// Value
    pub v: f64,
}

/// Time-series metrics for one terminal, keyed by metric name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerminalMetrics {
    pub terminal_id: String,
    pub from_time: DateTime<Utc>,
    pub to_time: DateTime<Utc>,
    pub interval: Interval,
    pub series: HashMap<String, Vec<MetricPoint>>,
}
