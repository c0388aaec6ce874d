use chrono::Utc;
use reqwest::header::HeaderValue;
use reqwest::Client;
use tokio::sync::{Mutex, RwLock};

use super::credentials::Credential;
use super::types::{BearerToken, TokenGrant, TokenRequest};
use crate::error::{Error, Result};

/// Token state shared between callers.
///
/// `attempts` counts completed refreshes, successful or not. A caller records
/// it before waiting for the refresh gate; if it advanced while waiting,
/// another caller's refresh finished and its outcome is reused.
#[derive(Default)]
struct TokenStore {
    token: Option<BearerToken>,
    attempts: u64,
    /// Failure message of the most recent refresh, cleared on success
    last_failure: Option<String>,
}

/// Token lifecycle manager
///
/// Owns the credential and the cached bearer token. The fast path is a shared
/// read of the store; refreshes are single-flight behind `refresh_gate`, so at
/// most one token request is in flight per manager no matter how many callers
/// race on an expired token.
pub struct TokenManager {
    /// Shared HTTP transport
    http: Client,

    /// Token endpoint, derived from the base URL at construction
    token_url: String,

    /// Secret posted to the token endpoint
    credential: Credential,

    store: RwLock<TokenStore>,

    refresh_gate: Mutex<()>,
}

impl TokenManager {
    pub(crate) fn new(http: Client, base_url: &str, credential: Credential) -> Self {
        Self {
            http,
            token_url: format!("{}/v1/auth/token", base_url.trim_end_matches('/')),
            credential,
            store: RwLock::new(TokenStore::default()),
            refresh_gate: Mutex::new(()),
        }
    }

    /// Create a manager with a pre-seeded token, no token endpoint required
    #[cfg(test)]
    pub(crate) fn with_token_for_testing(
        http: Client,
        base_url: &str,
        token: &str,
        expires_in_secs: i64,
    ) -> Self {
        let expires_at = Utc::now() + chrono::Duration::seconds(expires_in_secs);
        Self {
            http,
            token_url: format!("{}/v1/auth/token", base_url.trim_end_matches('/')),
            credential: Credential::for_testing("test-secret"),
            store: RwLock::new(TokenStore {
                token: Some(BearerToken::new(token.to_string(), expires_at)),
                attempts: 0,
                last_failure: None,
            }),
            refresh_gate: Mutex::new(()),
        }
    }

    /// `Authorization` header carrying a token outside the expiry skew window.
    ///
    /// Returns the cached token without any network traffic while it is
    /// fresh; otherwise refreshes, or fails with an authentication error.
    /// Never returns a token inside the skew window.
    pub async fn auth_header(&self) -> Result<HeaderValue> {
        self.bearer(false).await
    }

    /// Refresh even if the cached token still looks fresh.
    ///
    /// Used by the request dispatcher after the server rejected the current
    /// token; the freshness check is the wrong oracle at that point.
    pub async fn force_refresh(&self) -> Result<HeaderValue> {
        self.bearer(true).await
    }

    async fn bearer(&self, force: bool) -> Result<HeaderValue> {
        let observed = {
            let store = self.store.read().await;
            if !force {
                if let Some(token) = store.token.as_ref().filter(|t| t.is_fresh(Utc::now())) {
                    return token.header_value();
                }
            }
            store.attempts
        };

        let _gate = self.refresh_gate.lock().await;

        // A refresh completed while this caller waited on the gate: reuse its
        // outcome instead of issuing a redundant token request.
        {
            let store = self.store.read().await;
            if store.attempts != observed {
                if let Some(token) = store.token.as_ref().filter(|t| t.is_fresh(Utc::now())) {
                    return token.header_value();
                }
                if let Some(message) = store.last_failure.clone() {
                    return Err(Error::auth(message));
                }
            }
        }

        match self.refresh().await {
            Ok(token) => {
                let header = token.header_value()?;
                let mut store = self.store.write().await;
                store.attempts += 1;
                store.last_failure = None;
                store.token = Some(token);
                Ok(header)
            }
            Err(err) => {
                let message = match &err {
                    Error::Auth { message, .. } => message.clone(),
                    other => other.to_string(),
                };
                let mut store = self.store.write().await;
                store.attempts += 1;
                store.last_failure = Some(message);
                // No stale token may survive a failed refresh
                store.token = None;
                Err(err)
            }
        }
    }

    /// Mint a new token from the credential.
    async fn refresh(&self) -> Result<BearerToken> {
        tracing::debug!(url = %self.token_url, "refreshing bearer token");

        let response = self
            .http
            .post(&self.token_url)
            .json(&TokenRequest {
                api_secret: self.credential.expose(),
            })
            .send()
            .await
            .map_err(|e| Error::auth_with_source("token request failed", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = match status.as_u16() {
                401 => "API secret rejected by the token endpoint".to_string(),
                403 => "API secret is not authorized".to_string(),
                code => format!("token endpoint returned {}: {}", code, body),
            };
            tracing::warn!(status = status.as_u16(), "token refresh rejected");
            return Err(Error::auth(message));
        }

        let grant: TokenGrant = response
            .json()
            .await
            .map_err(|e| Error::auth_with_source("malformed token response", e))?;

        let expires_at = Utc::now() + chrono::Duration::seconds(grant.expires_in);
        tracing::info!(expires_at = %expires_at.to_rfc3339(), "bearer token refreshed");

        Ok(BearerToken::new(grant.access_token, expires_at))
    }
}
