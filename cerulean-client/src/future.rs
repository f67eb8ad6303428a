//! Long-running operation handles
//!
//! Resource Manager answers a mutating request in one of three ways:
//! an `Azure-AsyncOperation` header naming a status resource, a `Location`
//! header that keeps answering 202 until the operation ends, or a resource
//! body whose `properties.provisioningState` is not yet terminal. An
//! [`OperationFuture`] captures whichever applies and polls it to the end.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::error::{ClientError, ClientResult};
use crate::http::{ArmHttpClient, RawResponse};
use crate::poller::{PollSource, PollStatus, Poller};

pub const AZURE_ASYNC_OPERATION: &str = "azure-asyncoperation";
pub const LOCATION: &str = "location";

/// Handle to an in-flight server-side operation
pub struct OperationFuture {
    source: Option<Box<dyn PollSource>>,
}

impl std::fmt::Debug for OperationFuture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationFuture")
            .field("done", &self.is_done())
            .finish()
    }
}

impl OperationFuture {
    /// An operation that finished synchronously
    pub fn completed() -> Self {
        Self { source: None }
    }

    /// An operation that must be polled
    pub fn pending(source: Box<dyn PollSource>) -> Self {
        Self {
            source: Some(source),
        }
    }

    /// Build a handle from the initial response of a PUT or DELETE
    ///
    /// `resource_url` is polled for its provisioning state when the
    /// response carries no polling headers.
    pub fn from_response(
        http: &ArmHttpClient,
        response: &RawResponse,
        resource_url: &Url,
    ) -> ClientResult<Self> {
        if let Some(url) = response.header(AZURE_ASYNC_OPERATION) {
            return Ok(Self::pending(Box::new(AsyncOperationSource {
                http: http.clone(),
                url: Url::parse(url)?,
            })));
        }

        if response.status == StatusCode::ACCEPTED
            && let Some(url) = response.header(LOCATION)
        {
            return Ok(Self::pending(Box::new(LocationSource {
                http: http.clone(),
                url: Url::parse(url)?,
            })));
        }

        if response.status == StatusCode::ACCEPTED {
            return Ok(Self::pending(Box::new(ProvisioningStateSource {
                http: http.clone(),
                url: resource_url.clone(),
            })));
        }

        match provisioning_state(&response.body) {
            Some(state) if !is_terminal_state(&state) => {
                Ok(Self::pending(Box::new(ProvisioningStateSource {
                    http: http.clone(),
                    url: resource_url.clone(),
                })))
            }
            Some(state) => match PollStatus::from_azure_status(&state, None) {
                PollStatus::Failed(message) => Err(ClientError::OperationFailed {
                    status: state,
                    message,
                }),
                PollStatus::Canceled => Err(ClientError::OperationFailed {
                    status: state,
                    message: "operation was canceled".to_string(),
                }),
                _ => Ok(Self::completed()),
            },
            None => Ok(Self::completed()),
        }
    }

    /// Whether the operation finished without needing to poll
    pub fn is_done(&self) -> bool {
        self.source.is_none()
    }

    /// Block until the operation reaches a terminal state
    ///
    /// The handle is consumed; it has no use once terminal.
    pub async fn wait_for_completion(
        self,
        poller: &Poller,
        cancel: &CancellationToken,
    ) -> ClientResult<()> {
        match self.source {
            None => Ok(()),
            Some(source) => poller.wait(source.as_ref(), cancel).await,
        }
    }
}

#[derive(Debug, Deserialize)]
struct AsyncOperationStatus {
    status: Option<String>,
    error: Option<OperationError>,
}

#[derive(Debug, Deserialize)]
struct OperationError {
    code: Option<String>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProvisioningEnvelope {
    properties: Option<ProvisioningProperties>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProvisioningProperties {
    provisioning_state: Option<String>,
}

fn provisioning_state(body: &str) -> Option<String> {
    serde_json::from_str::<ProvisioningEnvelope>(body)
        .ok()?
        .properties?
        .provisioning_state
}

fn is_terminal_state(state: &str) -> bool {
    !matches!(
        PollStatus::from_azure_status(state, None),
        PollStatus::InProgress { .. }
    )
}

/// Polls the URL from an `Azure-AsyncOperation` header
struct AsyncOperationSource {
    http: ArmHttpClient,
    url: Url,
}

#[async_trait]
impl PollSource for AsyncOperationSource {
    async fn poll(&self) -> ClientResult<PollStatus> {
        let response = self.http.get(&self.url).await?;
        let body: AsyncOperationStatus = response.json()?;
        let message = body.error.map(|e| match (e.code, e.message) {
            (Some(code), Some(message)) => format!("{}: {}", code, message),
            (_, Some(message)) => message,
            (Some(code), None) => code,
            (None, None) => "operation failed".to_string(),
        });
        let status = body.status.unwrap_or_default();
        Ok(match PollStatus::from_azure_status(&status, message) {
            PollStatus::InProgress { .. } => PollStatus::InProgress {
                retry_after: response.retry_after(),
            },
            terminal => terminal,
        })
    }
}

/// Polls the URL from a `Location` header: 202 while running
struct LocationSource {
    http: ArmHttpClient,
    url: Url,
}

#[async_trait]
impl PollSource for LocationSource {
    async fn poll(&self) -> ClientResult<PollStatus> {
        let response = self.http.get(&self.url).await?;
        Ok(match response.status {
            StatusCode::ACCEPTED => PollStatus::InProgress {
                retry_after: response.retry_after(),
            },
            _ => PollStatus::Succeeded,
        })
    }
}

/// Polls the resource itself for `properties.provisioningState`
struct ProvisioningStateSource {
    http: ArmHttpClient,
    url: Url,
}

#[async_trait]
impl PollSource for ProvisioningStateSource {
    async fn poll(&self) -> ClientResult<PollStatus> {
        let response = match self.http.get(&self.url).await {
            Ok(response) => response,
            // A delete that has finished leaves nothing to read
            Err(e) if e.is_not_found() => return Ok(PollStatus::Succeeded),
            Err(e) => return Err(e),
        };
        if response.status == StatusCode::ACCEPTED {
            return Ok(PollStatus::InProgress {
                retry_after: response.retry_after(),
            });
        }
        Ok(match provisioning_state(&response.body) {
            Some(state) => match PollStatus::from_azure_status(&state, None) {
                PollStatus::InProgress { .. } => PollStatus::InProgress {
                    retry_after: response.retry_after(),
                },
                PollStatus::Failed(_) => {
                    PollStatus::Failed(format!("provisioning state is {}", state))
                }
                terminal => terminal,
            },
            None => PollStatus::Succeeded,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{HeaderMap, HeaderValue};

    fn http() -> ArmHttpClient {
        let config = crate::config::ClientConfig::new("sub", "token").unwrap();
        ArmHttpClient::new(config).unwrap()
    }

    fn response(status: StatusCode, headers: &[(&'static str, &str)], body: &str) -> RawResponse {
        let mut map = HeaderMap::new();
        for (k, v) in headers {
            map.insert(*k, HeaderValue::from_str(v).unwrap());
        }
        RawResponse {
            status,
            headers: map,
            body: body.to_string(),
        }
    }

    fn resource_url() -> Url {
        Url::parse("https://management.azure.com/subscriptions/sub/x?api-version=1").unwrap()
    }

    #[test]
    fn ok_without_headers_is_complete() {
        let resp = response(
            StatusCode::OK,
            &[],
            r#"{"properties":{"provisioningState":"Succeeded"}}"#,
        );
        let future = OperationFuture::from_response(&http(), &resp, &resource_url()).unwrap();
        assert!(future.is_done());
    }

    #[test]
    fn no_content_is_complete() {
        let resp = response(StatusCode::NO_CONTENT, &[], "");
        let future = OperationFuture::from_response(&http(), &resp, &resource_url()).unwrap();
        assert!(future.is_done());
    }

    #[test]
    fn async_operation_header_requires_polling() {
        let resp = response(
            StatusCode::CREATED,
            &[("azure-asyncoperation", "https://management.azure.com/operations/1")],
            "{}",
        );
        let future = OperationFuture::from_response(&http(), &resp, &resource_url()).unwrap();
        assert!(!future.is_done());
    }

    #[test]
    fn accepted_with_location_requires_polling() {
        let resp = response(
            StatusCode::ACCEPTED,
            &[("location", "https://management.azure.com/operationResults/1")],
            "",
        );
        let future = OperationFuture::from_response(&http(), &resp, &resource_url()).unwrap();
        assert!(!future.is_done());
    }

    #[test]
    fn non_terminal_provisioning_state_requires_polling() {
        let resp = response(
            StatusCode::CREATED,
            &[],
            r#"{"properties":{"provisioningState":"Creating"}}"#,
        );
        let future = OperationFuture::from_response(&http(), &resp, &resource_url()).unwrap();
        assert!(!future.is_done());
    }

    #[test]
    fn failed_provisioning_state_is_an_error() {
        let resp = response(
            StatusCode::OK,
            &[],
            r#"{"properties":{"provisioningState":"Failed"}}"#,
        );
        let err = OperationFuture::from_response(&http(), &resp, &resource_url()).unwrap_err();
        assert!(matches!(err, ClientError::OperationFailed { .. }));
    }

    #[tokio::test]
    async fn completed_future_resolves_immediately() {
        OperationFuture::completed()
            .wait_for_completion(&Poller::default(), &CancellationToken::new())
            .await
            .unwrap();
    }
}
