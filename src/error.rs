// Error handling module
// Defines the error taxonomy surfaced by every fallible client operation

use serde_json::Value;
use thiserror::Error;

/// Structured detail extracted from a non-success response body.
///
/// The server usually returns JSON, but proxies and load balancers in front
/// of it may not, so the raw text is preserved when parsing fails.
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorDetail {
    /// Body parsed as JSON
    Json(Value),

    /// Body kept as raw text
    Text(String),
}

impl ErrorDetail {
    /// Build detail from a raw response body, preferring JSON.
    pub fn from_body(body: String) -> Self {
        match serde_json::from_str::<Value>(&body) {
            Ok(value) => ErrorDetail::Json(value),
            Err(_) => ErrorDetail::Text(body),
        }
    }
}

impl std::fmt::Display for ErrorDetail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorDetail::Json(value) => write!(f, "{}", value),
            ErrorDetail::Text(text) => write!(f, "{}", text),
        }
    }
}

/// Errors that can occur while talking to the Fleetlink API
#[derive(Error, Debug)]
pub enum Error {
    /// Credential missing or rejected, token refresh failed, or the server
    /// kept answering 401 after a forced refresh
    #[error("authentication failed: {message}")]
    Auth {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Non-success HTTP response from the API
    #[error("API request failed with status {status}: {detail}")]
    Api { status: u16, detail: ErrorDetail },

    /// Rate limit exceeded (HTTP 429)
    #[error("rate limit exceeded: {detail}")]
    RateLimited {
        detail: ErrorDetail,
        /// Server-provided retry hint in seconds, if any
        retry_after: Option<u64>,
    },

    /// Request validation failed (HTTP 422)
    #[error("request validation failed: {detail}")]
    Validation { detail: ErrorDetail },

    /// Resource not found (HTTP 404)
    #[error("resource not found: {detail}")]
    NotFound { detail: ErrorDetail },

    /// Access denied (HTTP 403)
    #[error("access denied: {detail}")]
    Permission { detail: ErrorDetail },

    /// Transport-level failure that persisted after the retry budget
    #[error("transport failure after {attempts} attempts: {source}")]
    Transport {
        attempts: u32,
        #[source]
        source: reqwest::Error,
    },

    /// Malformed caller input rejected before any network call
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Successful response whose body could not be deserialized
    #[error("failed to decode response body: {source}")]
    Decode {
        #[source]
        source: reqwest::Error,
    },
}

impl Error {
    /// Shorthand for an authentication failure without an underlying cause.
    pub(crate) fn auth(message: impl Into<String>) -> Self {
        Error::Auth {
            message: message.into(),
            source: None,
        }
    }

    /// Authentication failure wrapping the error that caused it.
    pub(crate) fn auth_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Error::Auth {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Map a non-success HTTP status to its error variant.
    ///
    /// Total over all status codes: the well-known ones get their dedicated
    /// variant, everything else becomes a plain API error.
    pub fn from_status(status: u16, detail: ErrorDetail, retry_after: Option<u64>) -> Self {
        match status {
            403 => Error::Permission { detail },
            404 => Error::NotFound { detail },
            422 => Error::Validation { detail },
            429 => Error::RateLimited {
                detail,
                retry_after,
            },
            _ => Error::Api { status, detail },
        }
    }

    /// HTTP status associated with this error, if it came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } => Some(*status),
            Error::Permission { .. } => Some(403),
            Error::NotFound { .. } => Some(404),
            Error::Validation { .. } => Some(422),
            Error::RateLimited { .. } => Some(429),
            _ => None,
        }
    }

    /// Structured error body returned by the server, if any.
    pub fn detail(&self) -> Option<&ErrorDetail> {
        match self {
            Error::Api { detail, .. }
            | Error::RateLimited { detail, .. }
            | Error::Validation { detail }
            | Error::NotFound { detail }
            | Error::Permission { detail } => Some(detail),
            _ => None,
        }
    }
}

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, Error>;
