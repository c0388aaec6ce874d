// Data models for the Fleetlink API

mod alert;
mod fleet;
mod telemetry;
mod terminal;

pub use alert::{Alert, AlertPage, AlertSeverity, AlertStatus, AlertUpdate, UpdatedAlert};
pub use fleet::{FleetCounts, FleetHealth, TopIssue};
pub use telemetry::{TelemetryIngest, TelemetryReceipt};
pub use terminal::{
    HealthFactor, HealthStatus, Interval, Location, MetricPoint, TerminalDetail, TerminalMetrics,
    TerminalPage, TerminalStatus, TerminalSummary,
};
