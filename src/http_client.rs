use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, AUTHORIZATION, RETRY_AFTER};
use reqwest::{Client, Method, Request, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::auth::TokenManager;
use crate::error::{Error, ErrorDetail, Result};

/// Authenticated request dispatcher with retry logic
///
/// Transport failures are retried with capped exponential backoff; a 401 is
/// answered with one forced token refresh and one retry of the same request.
/// Every other non-success response fails immediately with a typed error.
pub struct HttpClient {
    /// Shared HTTP transport with connection pooling
    client: Client,

    /// Base URL without a trailing slash
    base_url: String,

    /// Token manager; this dispatcher is the only caller of its forced
    /// refresh path
    auth: Arc<TokenManager>,

    /// Transport retries on top of the initial attempt
    max_retries: u32,

    /// Base delay for exponential backoff (milliseconds)
    base_delay_ms: u64,
}

impl HttpClient {
    pub(crate) fn new(
        client: Client,
        base_url: &str,
        auth: Arc<TokenManager>,
        max_retries: u32,
    ) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth,
            max_retries,
            base_delay_ms: 1000,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// GET and deserialize the response body.
    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let response = self
            .send(Method::GET, path, query, None, HeaderMap::new())
            .await?;
        decode(response).await
    }

    /// POST a JSON body and deserialize the response.
    pub(crate) async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &impl Serialize,
        headers: HeaderMap,
    ) -> Result<T> {
        let body = to_body(body)?;
        let response = self
            .send(Method::POST, path, &[], Some(body), headers)
            .await?;
        decode(response).await
    }

    /// PATCH a JSON body and deserialize the response.
    pub(crate) async fn patch<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &impl Serialize,
        headers: HeaderMap,
    ) -> Result<T> {
        let body = to_body(body)?;
        let response = self
            .send(Method::PATCH, path, &[], Some(body), headers)
            .await?;
        decode(response).await
    }

    /// Build an authenticated request and dispatch it.
    ///
    /// Caller headers are applied after the auth header, so on a key
    /// collision the caller wins.
    async fn send(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        json: Option<Value>,
        headers: HeaderMap,
    ) -> Result<Response> {
        let auth_header = self.auth.auth_header().await?;

        let mut builder = self.client.request(method, self.url(path));
        if !query.is_empty() {
            builder = builder.query(query);
        }
        if let Some(ref body) = json {
            builder = builder.json(body);
        }

        let mut request = builder
            .build()
            .map_err(|e| Error::InvalidRequest(format!("failed to build request: {}", e)))?;
        request.headers_mut().insert(AUTHORIZATION, auth_header);
        for (name, value) in headers.iter() {
            request.headers_mut().insert(name.clone(), value.clone());
        }

        self.execute(request).await
    }

    /// Dispatch a request with transport retries and a single
    /// reauthentication.
    ///
    /// The 401 budget (one forced refresh per request) and the transport
    /// budget (`max_retries`) are tracked independently.
    pub(crate) async fn execute(&self, mut request: Request) -> Result<Response> {
        let method = request.method().clone();
        let url = request.url().clone();
        let mut transport_failures: u32 = 0;
        let mut reauthenticated = false;

        loop {
            let attempt = request.try_clone().ok_or_else(|| {
                Error::InvalidRequest("request body is not cloneable".to_string())
            })?;

            tracing::debug!(
                method = %method,
                url = %url,
                attempt = transport_failures + 1,
                "sending request"
            );

            match self.client.execute(attempt).await {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        tracing::debug!(status = %status, "request successful");
                        return Ok(response);
                    }

                    if status == StatusCode::UNAUTHORIZED {
                        if reauthenticated {
                            tracing::warn!(url = %url, "still unauthorized after token refresh");
                            return Err(Error::auth(
                                "request rejected with 401 twice, token refresh did not help",
                            ));
                        }
                        reauthenticated = true;

                        tracing::warn!(url = %url, "received 401, refreshing token and retrying");
                        let fresh = self.auth.force_refresh().await?;
                        request.headers_mut().insert(AUTHORIZATION, fresh);
                        continue;
                    }

                    let retry_after = response
                        .headers()
                        .get(RETRY_AFTER)
                        .and_then(|v| v.to_str().ok())
                        .and_then(|v| v.parse().ok());
                    let body = response.text().await.unwrap_or_default();

                    tracing::warn!(
                        status = status.as_u16(),
                        url = %url,
                        "request failed with error response"
                    );
                    return Err(Error::from_status(
                        status.as_u16(),
                        ErrorDetail::from_body(body),
                        retry_after,
                    ));
                }

                Err(err) => {
                    transport_failures += 1;

                    if transport_failures > self.max_retries {
                        tracing::error!(
                            error = %err,
                            url = %url,
                            attempts = transport_failures,
                            "transport failure, retries exhausted"
                        );
                        return Err(Error::Transport {
                            attempts: transport_failures,
                            source: err,
                        });
                    }

                    let delay = self.backoff_delay(transport_failures - 1);
                    tracing::warn!(
                        error = %err,
                        delay_ms = delay,
                        attempt = transport_failures,
                        max_retries = self.max_retries,
                        "transport failure, backing off before retry"
                    );
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                }
            }
        }
    }

    /// Capped exponential backoff with jitter
    fn backoff_delay(&self, prior_failures: u32) -> u64 {
        const MAX_DELAY_MS: u64 = 10_000;

        let delay = self
            .base_delay_ms
            .saturating_mul(2u64.saturating_pow(prior_failures))
            .min(MAX_DELAY_MS);
        let jitter = (delay as f64 * 0.1 * jitter::unit()) as u64;
        delay + jitter
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    response.json().await.map_err(|source| Error::Decode { source })
}

fn to_body(body: &impl Serialize) -> Result<Value> {
    serde_json::to_value(body)
        .map_err(|e| Error::InvalidRequest(format!("failed to serialize request body: {}", e)))
}

// Simple random source for backoff jitter
mod jitter {
    use std::collections::hash_map::RandomState;
    use std::hash::{BuildHasher, Hash, Hasher};

    pub fn unit() -> f64 {
        let state = RandomState::new();
        let mut hasher = state.build_hasher();
        std::time::SystemTime::now().hash(&mut hasher);
        (hasher.finish() % 1000) as f64 / 1000.0
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio_test::assert_ok;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn grant(token: &str) -> Value {
        serde_json::json!({
            "access_token": token,
            "token_type": "bearer",
            "expires_in": 3600,
        })
    }

    /// Dispatcher with a pre-seeded fresh token and fast backoff
    fn seeded_client(resource_url: &str, token: &str, max_retries: u32) -> HttpClient {
        let transport = Client::new();
        let auth = Arc::new(TokenManager::with_token_for_testing(
            transport.clone(),
            resource_url,
            token,
            3600,
        ));
        let mut http = HttpClient::new(transport, resource_url, auth, max_retries);
        http.base_delay_ms = 10;
        http
    }

    /// URL of a port nothing is listening on
    fn dead_url() -> String {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{}", addr)
    }

    /// Server that drops the first `failures` connections before answering
    /// with a canned 200
    async fn flaky_server(failures: usize, body: &'static str) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let mut dropped = 0usize;
            loop {
                let (mut socket, _) = match listener.accept().await {
                    Ok(conn) => conn,
                    Err(_) => break,
                };

                if dropped < failures {
                    dropped += 1;
                    drop(socket);
                    continue;
                }

                let mut buf = [0u8; 4096];
                let _ = socket.read(&mut buf).await;
                let response = format!(
                    "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
            }
        });

        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_success_passes_through() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/ping"))
            .and(header("Authorization", "Bearer tok"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let http = seeded_client(&server.uri(), "tok", 3);
        let value: Value = assert_ok!(http.get("/v1/ping", &[]).await);
        assert_eq!(value, serde_json::json!({"ok": true}));
    }

    #[tokio::test]
    async fn test_401_forces_one_refresh_then_succeeds() {
        let server = MockServer::start().await;

        // First attempt with the seeded token is rejected
        Mock::given(method("GET"))
            .and(path("/v1/ping"))
            .and(header("Authorization", "Bearer stale-tok"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;
        // Retry with the freshly minted token succeeds
        Mock::given(method("GET"))
            .and(path("/v1/ping"))
            .and(header("Authorization", "Bearer fresh-tok"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/auth/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(grant("fresh-tok")))
            .expect(1)
            .mount(&server)
            .await;

        let http = seeded_client(&server.uri(), "stale-tok", 3);
        let value: Value = http.get("/v1/ping", &[]).await.unwrap();
        assert_eq!(value, serde_json::json!({"ok": true}));
    }

    #[tokio::test]
    async fn test_second_401_fails_without_third_attempt() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/ping"))
            .respond_with(ResponseTemplate::new(401))
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/auth/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(grant("fresh-tok")))
            .expect(1)
            .mount(&server)
            .await;

        let http = seeded_client(&server.uri(), "stale-tok", 3);
        let err = http.get::<Value>("/v1/ping", &[]).await.unwrap_err();
        assert!(matches!(err, Error::Auth { .. }));

        // Exactly two resource attempts and one forced refresh, verified by
        // the mock expectations on drop
    }

    #[tokio::test]
    async fn test_failed_forced_refresh_propagates() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/ping"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/auth/token"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let http = seeded_client(&server.uri(), "stale-tok", 3);
        let err = http.get::<Value>("/v1/ping", &[]).await.unwrap_err();
        match err {
            Error::Auth { message, .. } => assert!(message.contains("rejected")),
            other => panic!("expected Auth error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_http_error_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/ping"))
            .respond_with(
                ResponseTemplate::new(500).set_body_string(r#"{"detail":"database is down"}"#),
            )
            .expect(1)
            .mount(&server)
            .await;

        let http = seeded_client(&server.uri(), "tok", 3);
        let err = http.get::<Value>("/v1/ping", &[]).await.unwrap_err();
        match err {
            Error::Api { status, detail } => {
                assert_eq!(status, 500);
                assert_eq!(
                    detail,
                    ErrorDetail::Json(serde_json::json!({"detail": "database is down"}))
                );
            }
            other => panic!("expected Api error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_rate_limit_carries_retry_after() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/ping"))
            .respond_with(
                ResponseTemplate::new(429)
                    .insert_header("retry-after", "7")
                    .set_body_string("slow down"),
            )
            .mount(&server)
            .await;

        let http = seeded_client(&server.uri(), "tok", 3);
        let err = http.get::<Value>("/v1/ping", &[]).await.unwrap_err();
        match err {
            Error::RateLimited { retry_after, .. } => assert_eq!(retry_after, Some(7)),
            other => panic!("expected RateLimited error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_transport_failures_exhaust_retry_budget() {
        let http = seeded_client(&dead_url(), "tok", 2);

        let err = http.get::<Value>("/v1/ping", &[]).await.unwrap_err();
        match err {
            Error::Transport { attempts, .. } => assert_eq!(attempts, 3),
            other => panic!("expected Transport error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_transport_failures_then_success() {
        let url = flaky_server(2, r#"{"ok":true}"#).await;
        let http = seeded_client(&url, "tok", 3);

        let value: Value = http.get("/v1/ping", &[]).await.unwrap();
        assert_eq!(value, serde_json::json!({"ok": true}));
    }

    #[tokio::test]
    async fn test_caller_headers_win_over_seeded() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/ping"))
            .and(header("Authorization", "Bearer caller-supplied"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let http = seeded_client(&server.uri(), "tok", 3);
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, "Bearer caller-supplied".parse().unwrap());
        let _: Value = http
            .post("/v1/ping", &serde_json::json!({}), headers)
            .await
            .unwrap();
    }

    #[test]
    fn test_backoff_is_capped_exponential() {
        let transport = Client::new();
        let auth = Arc::new(TokenManager::with_token_for_testing(
            transport.clone(),
            "http://localhost:0",
            "tok",
            3600,
        ));
        let http = HttpClient::new(transport, "http://localhost:0", auth, 3);

        let delay0 = http.backoff_delay(0);
        let delay1 = http.backoff_delay(1);
        let delay2 = http.backoff_delay(2);
        let delay9 = http.backoff_delay(9);

        assert!((1000..=1100).contains(&delay0));
        assert!((2000..=2200).contains(&delay1));
        assert!((4000..=4400).contains(&delay2));
        // Past the cap, only the jitter varies
        assert!((10_000..=11_000).contains(&delay9));
    }
}
