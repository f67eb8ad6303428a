//! HTTP transport for Azure Resource Manager REST calls

use std::time::Duration;

use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{Client, Method, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// Maximum length of response body to log
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Upper bound on a server Retry-After hint between transport retries
const MAX_RETRY_AFTER: Duration = Duration::from_secs(60);

/// Truncate a response body for logging
fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        let mut end = MAX_LOG_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... [truncated, {} bytes total]", &body[..end], body.len())
    } else {
        body.to_string()
    };
    truncated.replace(|c: char| !c.is_ascii_graphic() && c != ' ', "")
}

/// A successful response
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl RawResponse {
    /// Parse the body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> ClientResult<T> {
        Ok(serde_json::from_str(&self.body)?)
    }

    /// Get a header as a string
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Retry-After hint in seconds
    pub fn retry_after(&self) -> Option<Duration> {
        retry_after(&self.headers)
    }
}

fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

/// Delay before transport retry `attempt`, honouring a capped Retry-After
fn retry_delay(hint: Option<Duration>, base: Duration, attempt: u32) -> Duration {
    hint.map(|h| h.min(MAX_RETRY_AFTER))
        .unwrap_or(base * attempt)
}

/// ARM error envelope: `{"error": {"code": "...", "message": "..."}}`
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: Option<ErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    code: Option<String>,
    message: Option<String>,
}

fn status_error(status: StatusCode, body: &str) -> ClientError {
    let (code, message) = serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .and_then(|e| e.error)
        .map(|e| (e.code, e.message))
        .unwrap_or((None, None));
    ClientError::Status {
        status,
        code,
        message,
    }
}

/// HTTP client wrapper for Resource Manager calls
#[derive(Clone)]
pub struct ArmHttpClient {
    client: Client,
    config: ClientConfig,
}

impl ArmHttpClient {
    /// Create a new HTTP client
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        let client = Client::builder().user_agent(&config.user_agent).build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Build `{endpoint}/subscriptions/{sub}/{segments...}?api-version=...`
    ///
    /// Each segment is percent-encoded.
    pub fn resource_url(&self, segments: &[&str], api_version: &str) -> ClientResult<Url> {
        let mut url = self.config.endpoint.clone();
        {
            let mut path = url.path_segments_mut().map_err(|_| {
                ClientError::Configuration(format!(
                    "Endpoint cannot be used as a base URL: {}",
                    self.config.endpoint
                ))
            })?;
            path.pop_if_empty();
            path.push("subscriptions");
            path.push(&self.config.subscription_id);
            path.extend(segments);
        }
        url.query_pairs_mut().append_pair("api-version", api_version);
        Ok(url)
    }

    pub async fn get(&self, url: &Url) -> ClientResult<RawResponse> {
        self.send(Method::GET, url, None).await
    }

    pub async fn put(&self, url: &Url, body: &serde_json::Value) -> ClientResult<RawResponse> {
        self.send(Method::PUT, url, Some(body)).await
    }

    pub async fn delete(&self, url: &Url) -> ClientResult<RawResponse> {
        self.send(Method::DELETE, url, None).await
    }

    /// Send a request, retrying transient failures
    pub async fn send(
        &self,
        method: Method,
        url: &Url,
        body: Option<&serde_json::Value>,
    ) -> ClientResult<RawResponse> {
        let mut attempt = 0;
        loop {
            match self.send_once(method.clone(), url, body).await {
                Ok(response) => return Ok(response),
                Err((err, hint)) if err.is_transient() && attempt < self.config.max_retries => {
                    attempt += 1;
                    let delay = retry_delay(hint, self.config.retry_delay, attempt);
                    log::warn!(
                        "{} {} failed ({}), retry {}/{} in {:?}",
                        method,
                        url,
                        err,
                        attempt,
                        self.config.max_retries,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                }
                Err((err, _)) => return Err(err),
            }
        }
    }

    async fn send_once(
        &self,
        method: Method,
        url: &Url,
        body: Option<&serde_json::Value>,
    ) -> Result<RawResponse, (ClientError, Option<Duration>)> {
        log::debug!("{} {}", method, url);

        let mut request = self
            .client
            .request(method, url.clone())
            .bearer_auth(&self.config.access_token);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| (e.into(), None))?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text().await.map_err(|e| (e.into(), None))?;

        if !status.is_success() {
            log::debug!("API error: {} - {}", status, sanitize_for_log(&body));
            return Err((status_error(status, &body), retry_after(&headers)));
        }

        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(endpoint: &str) -> ArmHttpClient {
        let config = ClientConfig::new("00000000-0000-0000-0000-000000000000", "token")
            .unwrap()
            .with_endpoint(endpoint)
            .unwrap();
        ArmHttpClient::new(config).unwrap()
    }

    #[test]
    fn resource_url_encodes_segments() {
        let url = client("https://management.azure.com/")
            .resource_url(&["resourceGroups", "my rg", "providers", "P"], "2019-09-16")
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://management.azure.com/subscriptions/00000000-0000-0000-0000-000000000000/resourceGroups/my%20rg/providers/P?api-version=2019-09-16"
        );
    }

    #[test]
    fn resource_url_without_trailing_slash() {
        let url = client("http://127.0.0.1:8080")
            .resource_url(&["resourceGroups", "rg"], "v1")
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:8080/subscriptions/00000000-0000-0000-0000-000000000000/resourceGroups/rg?api-version=v1"
        );
    }

    #[test]
    fn status_error_parses_arm_envelope() {
        let err = status_error(
            StatusCode::NOT_FOUND,
            r#"{"error":{"code":"ResourceNotFound","message":"gone"}}"#,
        );
        match err {
            ClientError::Status { code, message, .. } => {
                assert_eq!(code.as_deref(), Some("ResourceNotFound"));
                assert_eq!(message.as_deref(), Some("gone"));
            }
            other => panic!("Expected Status error, got {:?}", other),
        }
    }

    #[test]
    fn status_error_tolerates_non_json_body() {
        let err = status_error(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>");
        assert!(err.is_transient());
        assert_eq!(err.to_string(), "Status=502");
    }

    #[test]
    fn retry_delay_caps_server_hint() {
        let base = Duration::from_millis(100);
        assert_eq!(
            retry_delay(Some(Duration::from_secs(86_400)), base, 1),
            MAX_RETRY_AFTER
        );
        assert_eq!(
            retry_delay(Some(Duration::from_secs(2)), base, 1),
            Duration::from_secs(2)
        );
        assert_eq!(retry_delay(None, base, 3), Duration::from_millis(300));
    }

    #[test]
    fn sanitize_truncates_long_bodies() {
        let long = "x".repeat(500);
        let sanitized = sanitize_for_log(&long);
        assert!(sanitized.contains("[truncated, 500 bytes total]"));
    }
}
