use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One batch of telemetry readings for a terminal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryIngest {
    pub terminal_id: String,
    pub timestamp: DateTime<Utc>,
    /// Free-form metric readings, e.g. `latency_ms`, `downlink_mbps`
    pub metrics: HashMap<String, Value>,
}

/// Server acknowledgement of an ingested batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryReceipt {
    pub request_id: String,
    pub accepted: bool,
}
