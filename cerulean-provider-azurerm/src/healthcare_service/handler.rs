//! Lifecycle handler for azurerm_healthcare_service

use std::sync::Arc;

use cerulean_client::HealthcareServicesApi;
use cerulean_core::id::AzureResourceId;
use cerulean_core::provider::{BoxFuture, ProviderError, ProviderResult, ResourceHandler};
use cerulean_core::resource::{ResourceData, Value};
use cerulean_core::schema::ResourceSchema;
use tokio_util::sync::CancellationToken;

use super::mapper::{expand, flatten};
use super::model::HealthcareService;
use super::schema::{RESOURCE_TYPE, healthcare_service_schema};
use crate::config::ProviderConfig;

const DISPLAY_NAME: &str = "Healthcare Service";

/// Identifier path key holding the service name
const ID_SEGMENT: &str = "services";

/// Create, Read, Update and Delete for Healthcare Services
pub struct HealthcareServiceResource {
    api: Arc<dyn HealthcareServicesApi>,
    config: ProviderConfig,
}

impl HealthcareServiceResource {
    pub fn new(api: Arc<dyn HealthcareServicesApi>, config: ProviderConfig) -> Self {
        Self { api, config }
    }

    async fn create_or_update(
        &self,
        data: &mut dyn ResourceData,
        cancel: &CancellationToken,
    ) -> ProviderResult<()> {
        log::info!("preparing arguments for Azure ARM Healthcare Service creation");

        let service = HealthcareService::from_data(&*data)?;
        healthcare_service_schema()
            .validate(&service.to_attributes())
            .map_err(|errors| {
                let message = errors
                    .iter()
                    .map(|e| e.to_string())
                    .collect::<Vec<_>>()
                    .join("; ");
                ProviderError::invalid_attribute(RESOURCE_TYPE, message)
            })?;
        let name = service.name.as_str();
        let resource_group = service.resource_group_name.as_str();

        if self.config.require_resources_to_be_imported && data.is_new_resource() {
            let existing = self.api.get(resource_group, name).await.map_err(|e| {
                ProviderError::remote(
                    "checking for presence of existing",
                    DISPLAY_NAME,
                    name,
                    resource_group,
                    e,
                )
            })?;
            if let Some(id) = existing.and_then(|s| s.id).filter(|id| !id.is_empty()) {
                return Err(ProviderError::AlreadyExists {
                    resource_type: RESOURCE_TYPE.to_string(),
                    id,
                });
            }
        }

        let request = expand(&service);
        let future = self
            .api
            .create_or_update(resource_group, name, &request)
            .await
            .map_err(|e| {
                ProviderError::remote("Creating/Updating", DISPLAY_NAME, name, resource_group, e)
            })?;

        log::debug!(
            "waiting for {} {:?} (Resource Group {:?}) to be provisioned",
            DISPLAY_NAME,
            name,
            resource_group
        );
        self.api.wait(future, cancel).await.map_err(|e| {
            ProviderError::remote("Creating/Updating", DISPLAY_NAME, name, resource_group, e)
        })?;

        let read = self.api.get(resource_group, name).await.map_err(|e| {
            ProviderError::remote("Retrieving", DISPLAY_NAME, name, resource_group, e)
        })?;
        let id = read
            .and_then(|s| s.id)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ProviderError::MissingId {
                resource: DISPLAY_NAME,
                name: name.to_string(),
                resource_group: resource_group.to_string(),
            })?;

        data.set_id(&id);
        self.read_resource(data).await
    }

    async fn read_resource(&self, data: &mut dyn ResourceData) -> ProviderResult<()> {
        let id = AzureResourceId::parse(data.id())?;
        let resource_group = id.resource_group.clone();
        let name = id.path_value(ID_SEGMENT)?.to_string();

        let service = self.api.get(&resource_group, &name).await.map_err(|e| {
            ProviderError::remote(
                "making Read request on Azure",
                DISPLAY_NAME,
                &name,
                &resource_group,
                e,
            )
        })?;

        let Some(service) = service else {
            log::warn!(
                "{} {:?} was not found (Resource Group {:?})",
                DISPLAY_NAME,
                name,
                resource_group
            );
            data.set_id("");
            return Ok(());
        };

        let mut observed = flatten(&service);
        observed.insert("name".to_string(), Value::String(name));
        observed.insert("resource_group_name".to_string(), Value::String(resource_group));

        // Whatever the remote no longer reports is dropped from state
        for key in healthcare_service_schema().attributes.into_keys() {
            if !observed.contains_key(&key) {
                data.remove(&key);
            }
        }
        for (key, value) in observed {
            set_attribute(data, &key, value)?;
        }
        Ok(())
    }

    async fn delete_resource(
        &self,
        data: &mut dyn ResourceData,
        cancel: &CancellationToken,
    ) -> ProviderResult<()> {
        let id = AzureResourceId::parse(data.id())?;
        let resource_group = id.resource_group.as_str();
        let name = id.path_value(ID_SEGMENT)?;

        let future = match self.api.delete(resource_group, name).await {
            Ok(future) => future,
            Err(e) if e.is_not_found() => return self.missing_on_delete(name, resource_group),
            Err(e) => {
                return Err(ProviderError::remote(
                    "deleting",
                    DISPLAY_NAME,
                    name,
                    resource_group,
                    e,
                ));
            }
        };

        match self.api.wait(future, cancel).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_not_found() => self.missing_on_delete(name, resource_group),
            Err(e) => Err(ProviderError::remote(
                "waiting for the deleting",
                DISPLAY_NAME,
                name,
                resource_group,
                e,
            )),
        }
    }

    fn missing_on_delete(&self, name: &str, resource_group: &str) -> ProviderResult<()> {
        if self.config.ignore_missing_on_delete {
            log::info!(
                "{} {:?} (Resource Group {:?}) is already gone",
                DISPLAY_NAME,
                name,
                resource_group
            );
            return Ok(());
        }
        Err(ProviderError::NotFound {
            resource: DISPLAY_NAME,
            name: name.to_string(),
            resource_group: resource_group.to_string(),
        })
    }
}

fn set_attribute(data: &mut dyn ResourceData, key: &str, value: Value) -> ProviderResult<()> {
    data.set(key, value)
        .map_err(|e| ProviderError::invalid_attribute(key, e))
}

impl ResourceHandler for HealthcareServiceResource {
    fn name(&self) -> &'static str {
        RESOURCE_TYPE
    }

    fn schema(&self) -> ResourceSchema {
        healthcare_service_schema()
    }

    fn create<'a>(
        &'a self,
        data: &'a mut dyn ResourceData,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, ProviderResult<()>> {
        Box::pin(self.create_or_update(data, cancel))
    }

    fn read<'a>(
        &'a self,
        data: &'a mut dyn ResourceData,
        _cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, ProviderResult<()>> {
        Box::pin(self.read_resource(data))
    }

    fn update<'a>(
        &'a self,
        data: &'a mut dyn ResourceData,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, ProviderResult<()>> {
        Box::pin(self.create_or_update(data, cancel))
    }

    fn delete<'a>(
        &'a self,
        data: &'a mut dyn ResourceData,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, ProviderResult<()>> {
        Box::pin(self.delete_resource(data, cancel))
    }
}
