// Credential resolution

use crate::error::{Error, Result};

pub(crate) const ENV_API_SECRET: &str = "FLEETLINK_API_SECRET";

/// Shared secret used to mint bearer tokens.
///
/// Owned by the token manager that resolved it; `Debug` output is redacted.
pub struct Credential(String);

impl Credential {
    /// Resolve the secret: explicit value first, then the environment.
    ///
    /// Fails when neither source yields a non-empty secret, so a client is
    /// never constructed in an unusable state.
    pub(crate) fn resolve(explicit: Option<String>) -> Result<Self> {
        Self::from_sources(explicit, std::env::var(ENV_API_SECRET).ok())
    }

    fn from_sources(explicit: Option<String>, env: Option<String>) -> Result<Self> {
        let secret = explicit
            .filter(|s| !s.is_empty())
            .or_else(|| env.filter(|s| !s.is_empty()));

        match secret {
            Some(secret) => Ok(Self(secret)),
            None => Err(Error::auth(format!(
                "API secret not provided; set {} or pass one explicitly",
                ENV_API_SECRET
            ))),
        }
    }

    pub(crate) fn expose(&self) -> &str {
        &self.0
    }

    #[cfg(test)]
    pub(crate) fn for_testing(secret: &str) -> Self {
        Self(secret.to_string())
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_wins_over_env() {
        let credential =
            Credential::from_sources(Some("explicit".to_string()), Some("from-env".to_string()))
                .unwrap();
        assert_eq!(credential.expose(), "explicit");
    }

    #[test]
    fn test_env_fallback() {
        let credential = Credential::from_sources(None, Some("from-env".to_string())).unwrap();
        assert_eq!(credential.expose(), "from-env");
    }

    #[test]
    fn test_empty_explicit_falls_back() {
        let credential =
            Credential::from_sources(Some(String::new()), Some("from-env".to_string())).unwrap();
        assert_eq!(credential.expose(), "from-env");
    }

    #[test]
    fn test_missing_everywhere_is_auth_error() {
        let err = Credential::from_sources(None, None).unwrap_err();
        assert!(matches!(err, Error::Auth { .. }));
        assert!(err.to_string().contains(ENV_API_SECRET));
    }

    #[test]
    fn test_debug_is_redacted() {
        let credential = Credential::for_testing("super-secret");
        let rendered = format!("{:?}", credential);
        assert!(!rendered.contains("super-secret"));
    }
}
