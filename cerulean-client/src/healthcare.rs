//! Microsoft.HealthcareApis/services bindings (api-version 2019-09-16)

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::error::{ClientError, ClientResult};
use crate::future::OperationFuture;
use crate::http::ArmHttpClient;
use crate::poller::Poller;

pub const API_VERSION: &str = "2019-09-16";
pub const PROVIDER_NAMESPACE: &str = "Microsoft.HealthcareApis";
pub const RESOURCE_TYPE: &str = "services";

static SERVICE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9][a-z0-9-]{1,21}[a-z0-9]$").expect("valid regex"));
static RESOURCE_GROUP_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-\w._()]+$").expect("valid regex"));

/// Kind of FHIR service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Kind {
    #[default]
    #[serde(rename = "fhir")]
    Fhir,
    #[serde(rename = "fhir-Stu3")]
    FhirStu3,
    #[serde(rename = "fhir-R4")]
    FhirR4,
}

impl Kind {
    pub const ALL: [Kind; 3] = [Kind::Fhir, Kind::FhirStu3, Kind::FhirR4];

    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Fhir => "fhir",
            Kind::FhirStu3 => "fhir-Stu3",
            Kind::FhirR4 => "fhir-R4",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Kind {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Kind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| ClientError::validation("kind", format!("unknown kind '{}'", s)))
    }
}

/// The description of a Healthcare service
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServicesDescription {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<HashMap<String, String>>,
    /// Kinds this client does not know deserialize as `None`
    #[serde(
        default,
        deserialize_with = "lenient_kind",
        skip_serializing_if = "Option::is_none"
    )]
    pub kind: Option<Kind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<ServicesProperties>,
}

fn lenient_kind<'de, D>(deserializer: D) -> Result<Option<Kind>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|s| match s.parse::<Kind>() {
        Ok(kind) => Some(kind),
        Err(_) => {
            log::warn!("ignoring unrecognised service kind {:?}", s);
            None
        }
    }))
}

/// The properties of a Healthcare service instance
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServicesProperties {
    /// Read-only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provisioning_state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_policies: Option<Vec<ServiceAccessPolicyEntry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cosmos_db_configuration: Option<ServiceCosmosDbConfigurationInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authentication_configuration: Option<ServiceAuthenticationConfigurationInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cors_configuration: Option<ServiceCorsConfigurationInfo>,
}

/// An access policy entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceAccessPolicyEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_id: Option<String>,
}

/// The settings for the Cosmos DB database backing the service
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceCosmosDbConfigurationInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offer_throughput: Option<i32>,
}

/// Authentication configuration information
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceAuthenticationConfigurationInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authority: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audience: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub smart_proxy_enabled: Option<bool>,
}

/// The settings for the CORS configuration of the service instance
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceCorsConfigurationInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origins: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub methods: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_age: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_credentials: Option<bool>,
}

/// Healthcare services operations consumed by resource handlers
#[async_trait]
pub trait HealthcareServicesApi: Send + Sync {
    /// Get a service; a missing service is `Ok(None)`
    async fn get(
        &self,
        resource_group: &str,
        name: &str,
    ) -> ClientResult<Option<ServicesDescription>>;

    /// Submit a create or update
    async fn create_or_update(
        &self,
        resource_group: &str,
        name: &str,
        service: &ServicesDescription,
    ) -> ClientResult<OperationFuture>;

    /// Submit a delete
    async fn delete(&self, resource_group: &str, name: &str) -> ClientResult<OperationFuture>;

    /// Block until a submitted operation is terminal
    async fn wait(
        &self,
        future: OperationFuture,
        cancel: &CancellationToken,
    ) -> ClientResult<()>;
}

/// Resource Manager implementation of [`HealthcareServicesApi`]
#[derive(Clone)]
pub struct ServicesClient {
    http: ArmHttpClient,
    poller: Poller,
}

impl ServicesClient {
    pub fn new(http: ArmHttpClient) -> Self {
        let poller = http.config().poll.poller();
        Self { http, poller }
    }

    pub fn with_poller(mut self, poller: Poller) -> Self {
        self.poller = poller;
        self
    }

    fn service_url(&self, resource_group: &str, name: &str) -> ClientResult<Url> {
        validate_resource_group(resource_group)?;
        validate_service_name(name)?;
        self.http.resource_url(
            &[
                "resourceGroups",
                resource_group,
                "providers",
                PROVIDER_NAMESPACE,
                RESOURCE_TYPE,
                name,
            ],
            API_VERSION,
        )
    }
}

#[async_trait]
impl HealthcareServicesApi for ServicesClient {
    async fn get(
        &self,
        resource_group: &str,
        name: &str,
    ) -> ClientResult<Option<ServicesDescription>> {
        let url = self.service_url(resource_group, name)?;
        match self.http.get(&url).await {
            Ok(response) => Ok(Some(response.json()?)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn create_or_update(
        &self,
        resource_group: &str,
        name: &str,
        service: &ServicesDescription,
    ) -> ClientResult<OperationFuture> {
        let url = self.service_url(resource_group, name)?;
        validate_description(service)?;
        let body = serde_json::to_value(service)?;
        let response = self.http.put(&url, &body).await?;
        OperationFuture::from_response(&self.http, &response, &url)
    }

    async fn delete(&self, resource_group: &str, name: &str) -> ClientResult<OperationFuture> {
        let url = self.service_url(resource_group, name)?;
        let response = self.http.delete(&url).await?;
        OperationFuture::from_response(&self.http, &response, &url)
    }

    async fn wait(
        &self,
        future: OperationFuture,
        cancel: &CancellationToken,
    ) -> ClientResult<()> {
        future.wait_for_completion(&self.poller, cancel).await
    }
}

fn validate_service_name(name: &str) -> ClientResult<()> {
    if name.len() < 3 || name.len() > 24 {
        return Err(ClientError::validation(
            "resourceName",
            format!("'{}' must be between 3 and 24 characters", name),
        ));
    }
    if !SERVICE_NAME.is_match(name) {
        return Err(ClientError::validation(
            "resourceName",
            format!("'{}' must match {}", name, SERVICE_NAME.as_str()),
        ));
    }
    Ok(())
}

fn validate_resource_group(resource_group: &str) -> ClientResult<()> {
    if resource_group.is_empty() || resource_group.len() > 90 {
        return Err(ClientError::validation(
            "resourceGroupName",
            "must be between 1 and 90 characters",
        ));
    }
    if !RESOURCE_GROUP_NAME.is_match(resource_group) {
        return Err(ClientError::validation(
            "resourceGroupName",
            format!(
                "'{}' must match {}",
                resource_group,
                RESOURCE_GROUP_NAME.as_str()
            ),
        ));
    }
    Ok(())
}

fn validate_description(service: &ServicesDescription) -> ClientResult<()> {
    let throughput = service
        .properties
        .as_ref()
        .and_then(|p| p.cosmos_db_configuration.as_ref())
        .and_then(|c| c.offer_throughput);
    if let Some(t) = throughput
        && !(400..=10000).contains(&t)
    {
        return Err(ClientError::validation(
            "properties.cosmosDbConfiguration.offerThroughput",
            format!("{} must be between 400 and 10000", t),
        ));
    }
    Ok(())
}
