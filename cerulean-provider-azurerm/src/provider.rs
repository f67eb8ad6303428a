//! AzureRM provider implementation
//!
//! Owns one handler per supported resource type. Handlers receive their
//! API client explicitly; nothing is looked up from shared global state.

use std::sync::Arc;

use cerulean_client::{
    ArmHttpClient, ClientConfig, ClientResult, HealthcareServicesApi, ServicesClient,
};
use cerulean_core::provider::ResourceHandler;

use crate::config::ProviderConfig;
use crate::healthcare_service::{self, HealthcareServiceResource};

/// Azure Resource Manager provider
pub struct AzureRmProvider {
    handlers: Vec<Box<dyn ResourceHandler>>,
}

impl AzureRmProvider {
    /// Create a provider talking to Resource Manager
    pub fn new(client: ClientConfig, config: ProviderConfig) -> ClientResult<Self> {
        let http = ArmHttpClient::new(client)?;
        Ok(Self::with_api(Arc::new(ServicesClient::new(http)), config))
    }

    /// Create a provider configured from `ARM_*` environment variables
    pub fn from_env() -> ClientResult<Self> {
        Self::new(ClientConfig::from_env()?, ProviderConfig::from_env())
    }

    /// Create a provider over an explicit services API
    pub fn with_api(api: Arc<dyn HealthcareServicesApi>, config: ProviderConfig) -> Self {
        log::debug!(
            "registering {} (import protection: {}, ignore missing on delete: {})",
            healthcare_service::RESOURCE_TYPE,
            config.require_resources_to_be_imported,
            config.ignore_missing_on_delete
        );
        Self {
            handlers: vec![Box::new(HealthcareServiceResource::new(api, config))],
        }
    }

    pub(crate) fn handlers(&self) -> &[Box<dyn ResourceHandler>] {
        &self.handlers
    }
}
