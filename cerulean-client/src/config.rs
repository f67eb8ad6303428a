//! Client configuration

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use url::Url;

use crate::error::{ClientError, ClientResult};
use crate::poller::{ExponentialBackoff, Poller};

/// Public Azure Resource Manager endpoint
pub const DEFAULT_ENDPOINT: &str = "https://management.azure.com/";

/// Default number of retries for transient failures
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Long-running operation polling settings
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Delay before the second poll
    pub initial_interval: Duration,
    /// Upper bound for the delay between polls
    pub max_interval: Duration,
    /// Growth factor between consecutive delays
    pub multiplier: u32,
    /// Give up waiting after this long
    pub timeout: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            initial_interval: Duration::from_secs(5),
            max_interval: Duration::from_secs(60),
            multiplier: 2,
            timeout: Duration::from_secs(60 * 60),
        }
    }
}

impl PollConfig {
    pub fn backoff(&self) -> ExponentialBackoff {
        ExponentialBackoff {
            initial: self.initial_interval,
            max: self.max_interval,
            multiplier: self.multiplier,
        }
    }

    pub fn poller(&self) -> Poller {
        Poller::new(Arc::new(self.backoff())).with_timeout(self.timeout)
    }
}

/// Configuration for [`crate::ArmHttpClient`]
#[derive(Clone)]
pub struct ClientConfig {
    /// Resource Manager endpoint
    pub endpoint: Url,
    /// Subscription all requests are scoped to
    pub subscription_id: String,
    /// Bearer token sent with every request
    pub access_token: String,
    pub user_agent: String,
    /// Retries for transient failures (429, 5xx, connection errors)
    pub max_retries: u32,
    /// Base delay between retries when the server sends no Retry-After
    pub retry_delay: Duration,
    pub poll: PollConfig,
}

impl ClientConfig {
    pub fn new(
        subscription_id: impl Into<String>,
        access_token: impl Into<String>,
    ) -> ClientResult<Self> {
        Ok(Self {
            endpoint: Url::parse(DEFAULT_ENDPOINT)?,
            subscription_id: subscription_id.into(),
            access_token: access_token.into(),
            user_agent: format!("cerulean/{}", env!("CARGO_PKG_VERSION")),
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay: Duration::from_secs(2),
            poll: PollConfig::default(),
        })
    }

    /// Load configuration from `ARM_SUBSCRIPTION_ID`, `ARM_ACCESS_TOKEN`
    /// and optionally `ARM_ENDPOINT`
    pub fn from_env() -> ClientResult<Self> {
        let subscription_id = required_env("ARM_SUBSCRIPTION_ID")?;
        let access_token = required_env("ARM_ACCESS_TOKEN")?;
        let config = Self::new(subscription_id, access_token)?;
        match std::env::var("ARM_ENDPOINT") {
            Ok(endpoint) if !endpoint.is_empty() => config.with_endpoint(&endpoint),
            _ => Ok(config),
        }
    }

    pub fn with_endpoint(mut self, endpoint: &str) -> ClientResult<Self> {
        self.endpoint = Url::parse(endpoint)?;
        Ok(self)
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub fn with_poll(mut self, poll: PollConfig) -> Self {
        self.poll = poll;
        self
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("endpoint", &self.endpoint.as_str())
            .field("subscription_id", &self.subscription_id)
            .field("access_token", &"<redacted>")
            .field("user_agent", &self.user_agent)
            .field("max_retries", &self.max_retries)
            .field("retry_delay", &self.retry_delay)
            .field("poll", &self.poll)
            .finish()
    }
}

fn required_env(key: &str) -> ClientResult<String> {
    match std::env::var(key) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => Err(ClientError::Configuration(format!(
            "Missing required environment variable: {}",
            key
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_target_public_cloud() {
        let config = ClientConfig::new("sub", "token").unwrap();
        assert_eq!(config.endpoint.as_str(), DEFAULT_ENDPOINT);
        assert_eq!(config.max_retries, DEFAULT_MAX_RETRIES);
        assert!(config.user_agent.starts_with("cerulean/"));
    }

    #[test]
    fn debug_redacts_access_token() {
        let config = ClientConfig::new("sub", "super-secret").unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn invalid_endpoint_is_rejected() {
        let config = ClientConfig::new("sub", "token").unwrap();
        assert!(matches!(
            config.with_endpoint("not a url"),
            Err(ClientError::InvalidUrl(_))
        ));
    }

    #[test]
    fn poll_config_builds_capped_backoff() {
        let backoff = PollConfig::default().backoff();
        assert_eq!(backoff.initial, Duration::from_secs(5));
        assert_eq!(backoff.max, Duration::from_secs(60));
    }
}
