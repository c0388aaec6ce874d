// Resource facades
// Shape query parameters and bodies, dispatch through the HTTP client,
// deserialize typed responses

mod alerts;
mod fleet;
mod telemetry;
mod terminals;

pub use alerts::{AlertListParams, AlertsApi};
pub use fleet::FleetApi;
pub use telemetry::TelemetryApi;
pub use terminals::{MetricsQuery, TerminalListParams, TerminalsApi};

use reqwest::header::HeaderName;

/// Header letting the server deduplicate retried mutating requests
pub const IDEMPOTENCY_KEY: HeaderName = HeaderName::from_static("idempotency-key");

/// Default page size for list endpoints
pub(crate) const DEFAULT_PAGE_LIMIT: u32 = 100;
