// Fleetlink API client
// Token lifecycle management, authenticated request dispatch, typed resource
// facades

pub mod api;
pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod http_client;
pub mod models;
pub mod utils;

pub use client::FleetlinkClient;
pub use config::{Config, Environment};
pub use error::{Error, ErrorDetail, Result};
