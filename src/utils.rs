// Shared helpers for facades

use uuid::Uuid;

use crate::error::{Error, Result};

/// Largest page size the API accepts
pub const MAX_PAGE_LIMIT: u32 = 500;

/// Generate a unique idempotency key for mutating requests.
pub fn generate_idempotency_key() -> String {
    Uuid::new_v4().to_string()
}

/// Clamp a caller-supplied page limit into the range the API accepts.
pub(crate) fn clamp_limit(limit: u32) -> u32 {
    limit.clamp(1, MAX_PAGE_LIMIT)
}

/// Validate a resource identifier before it is spliced into a request path.
///
/// Identifiers are 1-64 characters of alphanumerics, `-` and `_`.
pub(crate) fn validate_resource_id(kind: &str, id: &str) -> Result<()> {
    if id.is_empty() || id.len() > 64 {
        return Err(Error::InvalidRequest(format!(
            "{} id must be 1-64 characters, got {}",
            kind,
            id.len()
        )));
    }

    if !id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
        return Err(Error::InvalidRequest(format!(
            "{} id contains invalid characters: {:?}",
            kind, id
        )));
    }

    Ok(())
}
