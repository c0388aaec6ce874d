use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Terminal counts by health classification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FleetCounts {
    pub healthy: u64,
    pub degraded: u64,
    pub offline: u64,
}

/// One of the most frequent issues across the fleet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopIssue {
    #[serde(rename = "type")]
    pub kind: String,
    pub count: u64,
    pub message: String,
}

/// Fleet-wide health summary over a time window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FleetHealth {
    pub from_time: DateTime<Utc>,
    pub to_time: DateTime<Utc>,
    pub counts: FleetCounts,
    pub top_issues: Option<Vec<TopIssue>>,
}
