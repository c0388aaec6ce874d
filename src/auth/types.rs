// Authentication types

use chrono::{DateTime, Duration, Utc};
use reqwest::header::HeaderValue;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Safety margin subtracted from a token's declared expiry, covering clock
/// drift and in-flight request latency
pub(crate) const EXPIRY_SKEW_SECS: i64 = 30;

/// Body sent to the token endpoint
#[derive(Serialize)]
pub(crate) struct TokenRequest<'a> {
    pub api_secret: &'a str,
}

/// Body returned by the token endpoint
#[derive(Deserialize)]
pub(crate) struct TokenGrant {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    #[allow(dead_code)]
    pub token_type: String,
    /// Lifetime in seconds
    pub expires_in: i64,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

/// A minted bearer token with its expiry instant.
///
/// Replaced wholesale on refresh, never mutated in place.
#[derive(Debug, Clone)]
pub(crate) struct BearerToken {
    value: String,
    expires_at: DateTime<Utc>,
}

impl BearerToken {
    pub fn new(value: String, expires_at: DateTime<Utc>) -> Self {
        Self { value, expires_at }
    }

    /// Usable only while `now` is more than the skew window before expiry.
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at - Duration::seconds(EXPIRY_SKEW_SECS)
    }

    /// Render as an `Authorization` header value, marked sensitive so the
    /// token never shows up in logs.
    pub fn header_value(&self) -> Result<HeaderValue> {
        let mut header = HeaderValue::from_str(&format!("Bearer {}", self.value))
            .map_err(|e| Error::auth_with_source("token is not a valid header value", e))?;
        header.set_sensitive(true);
        Ok(header)
    }
}
