use std::time::Duration;

use crate::error::{Error, Result};

/// Named Fleetlink deployments
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Environment {
    Production,
    Staging,
    Development,
    Demo,
    Local,
}

impl Environment {
    /// Base URL for this deployment
    pub fn base_url(&self) -> &'static str {
        match self {
            Environment::Production => "https://api.fleetlink.io",
            Environment::Staging => "https://staging.api.fleetlink.io",
            Environment::Development => "http://fleetlink-api:8000",
            Environment::Demo => "http://localhost:8000",
            Environment::Local => "http://localhost:8000",
        }
    }

    fn parse(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "production" => Ok(Environment::Production),
            "staging" => Ok(Environment::Staging),
            "development" => Ok(Environment::Development),
            "demo" => Ok(Environment::Demo),
            "local" => Ok(Environment::Local),
            other => Err(Error::InvalidRequest(format!(
                "invalid environment '{}', expected one of: production, staging, development, demo, local",
                other
            ))),
        }
    }
}

impl std::str::FromStr for Environment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Environment::parse(s)
    }
}

/// Client configuration, resolved once at construction and immutable after
#[derive(Clone, Debug)]
pub struct Config {
    /// Base URL of the API, without a trailing slash
    pub base_url: String,

    /// API secret used to mint bearer tokens; falls back to
    /// FLEETLINK_API_SECRET when not set explicitly
    pub api_secret: Option<String>,

    /// Per-attempt request timeout in seconds
    pub request_timeout: u64,

    /// Connection establishment timeout in seconds
    pub connect_timeout: u64,

    /// Transport retries on top of the initial attempt
    pub max_retries: u32,

    /// Idle connections kept per host
    pub max_connections: usize,
}

impl Config {
    /// Configuration for a named deployment with default tuning.
    pub fn new(environment: Environment) -> Self {
        Self::with_base_url(environment.base_url())
    }

    /// Configuration for an explicit base URL.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            api_secret: None,
            request_timeout: 30,
            connect_timeout: 10,
            max_retries: 3,
            max_connections: 20,
        }
    }

    /// Load configuration from the environment, priority ENV > default.
    ///
    /// Reads `.env` if present, then FLEETLINK_ENVIRONMENT (or
    /// FLEETLINK_BASE_URL to bypass the deployment mapping) plus the
    /// FLEETLINK_* tuning variables.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let mut config = match std::env::var("FLEETLINK_BASE_URL") {
            Ok(url) => Self::with_base_url(url),
            Err(_) => {
                let name = std::env::var("FLEETLINK_ENVIRONMENT")
                    .unwrap_or_else(|_| "production".to_string());
                Self::new(Environment::parse(&name)?)
            }
        };

        config.api_secret = std::env::var("FLEETLINK_API_SECRET").ok();

        if let Some(timeout) = env_parse("FLEETLINK_REQUEST_TIMEOUT") {
            config.request_timeout = timeout;
        }
        if let Some(timeout) = env_parse("FLEETLINK_CONNECT_TIMEOUT") {
            config.connect_timeout = timeout;
        }
        if let Some(retries) = env_parse("FLEETLINK_MAX_RETRIES") {
            config.max_retries = retries;
        }
        if let Some(connections) = env_parse("FLEETLINK_MAX_CONNECTIONS") {
            config.max_connections = connections;
        }

        Ok(config)
    }

    /// Set the API secret explicitly, overriding the environment.
    pub fn api_secret(mut self, secret: impl Into<String>) -> Self {
        self.api_secret = Some(secret.into());
        self
    }

    /// Set the per-attempt request timeout in seconds.
    pub fn request_timeout(mut self, seconds: u64) -> Self {
        self.request_timeout = seconds;
        self
    }

    /// Set the transport retry budget.
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    pub(crate) fn request_timeout_duration(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    pub(crate) fn connect_timeout_duration(&self) -> Duration {
        Duration::from_secs(self.connect_timeout)
    }
}

/// Parse an environment variable, ignoring unset or malformed values
fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_parse() {
        assert_eq!(Environment::parse("production").unwrap(), Environment::Production);
        assert_eq!(Environment::parse("Staging").unwrap(), Environment::Staging);
        assert_eq!(Environment::parse("LOCAL").unwrap(), Environment::Local);

        let err = Environment::parse("qa").unwrap_err();
        assert!(matches!(err, Error::InvalidRequest(_)));
        assert!(err.to_string().contains("invalid environment"));
    }

    #[test]
    fn test_environment_urls() {
        assert_eq!(Environment::Production.base_url(), "https://api.fleetlink.io");
        assert_eq!(Environment::Demo.base_url(), "http://localhost:8000");
    }

    #[test]
    fn test_base_url_normalization() {
        let config = Config::with_base_url("http://localhost:8000/");
        assert_eq!(config.base_url, "http://localhost:8000");

        let config = Config::with_base_url("http://localhost:8000///");
        assert_eq!(config.base_url, "http://localhost:8000");
    }

    #[test]
    fn test_defaults() {
        let config = Config::new(Environment::Production);
        assert_eq!(config.request_timeout, 30);
        assert_eq!(config.connect_timeout, 10);
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.max_connections, 20);
        assert!(config.api_secret.is_none());
    }

    #[test]
    fn test_from_env_overrides() {
        // The only test touching FLEETLINK_* variables, safe under the
        // parallel test runner
        std::env::set_var("FLEETLINK_BASE_URL", "http://example.test:9000/");
        std::env::set_var("FLEETLINK_MAX_RETRIES", "7");

        let config = Config::from_env().unwrap();
        assert_eq!(config.base_url, "http://example.test:9000");
        assert_eq!(config.max_retries, 7);

        std::env::remove_var("FLEETLINK_BASE_URL");
        std::env::remove_var("FLEETLINK_MAX_RETRIES");
    }

    #[test]
    fn test_builder_overrides() {
        let config = Config::new(Environment::Local)
            .api_secret("sk-test")
            .request_timeout(5)
            .max_retries(1);

        assert_eq!(config.api_secret.as_deref(), Some("sk-test"));
        assert_eq!(config.request_timeout, 5);
        assert_eq!(config.max_retries, 1);
    }
}
