//! Transport error types

use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;

/// Errors that can occur when talking to Azure Resource Manager
#[derive(Debug, Error)]
pub enum ClientError {
    /// Missing or invalid client configuration
    #[error("Client configuration error: {0}")]
    Configuration(String),

    /// A request parameter failed client-side validation
    #[error("Invalid value for {field}: {message}")]
    Validation { field: String, message: String },

    /// The request could not be sent or the response could not be read
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status
    #[error("{}", format_status(*status, code.as_deref(), message.as_deref()))]
    Status {
        status: StatusCode,
        code: Option<String>,
        message: Option<String>,
    },

    /// The response body did not match the expected shape
    #[error("Failed to parse response: {0}")]
    Deserialize(#[from] serde_json::Error),

    /// A long-running operation reached a failed or canceled state
    #[error("Long-running operation ended with status {status}: {message}")]
    OperationFailed { status: String, message: String },

    /// Waiting was aborted by the caller
    #[error("Operation was cancelled")]
    Cancelled,

    /// The long-running operation did not finish in time
    #[error("Operation timed out after {0:?}")]
    TimedOut(Duration),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

fn format_status(status: StatusCode, code: Option<&str>, message: Option<&str>) -> String {
    match (code, message) {
        (Some(code), Some(message)) => format!(
            "Status={} Code={:?} Message={:?}",
            status.as_u16(),
            code,
            message
        ),
        (Some(code), None) => format!("Status={} Code={:?}", status.as_u16(), code),
        (None, Some(message)) => format!("Status={} Message={:?}", status.as_u16(), message),
        (None, None) => format!("Status={}", status.as_u16()),
    }
}

impl ClientError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// HTTP status of the failed response, if any
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Http(e) => e.status(),
            _ => None,
        }
    }

    /// Whether the server reported the resource as missing
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }

    /// Whether retrying the same request may succeed
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(e) => e.is_timeout() || e.is_connect(),
            Self::Status { status, .. } => is_transient_status(*status),
            _ => false,
        }
    }
}

pub(crate) fn is_transient_status(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::TOO_MANY_REQUESTS
            | StatusCode::INTERNAL_SERVER_ERROR
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT
    )
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;
