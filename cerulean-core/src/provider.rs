//! Provider - Traits abstracting resource lifecycle operations
//!
//! A Provider exposes a fixed set of resource handlers. Each handler maps
//! one declarative resource type onto a remote management API and runs
//! Create, Read, Update and Delete against it.

use std::future::Future;
use std::pin::Pin;

use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::resource::ResourceData;
use crate::schema::ResourceSchema;

/// Boxed transport or remote error carried by [`ProviderError::Remote`]
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Error type for Provider operations
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The remote resource does not exist
    #[error("{resource} \"{name}\" (Resource Group \"{resource_group}\") was not found")]
    NotFound {
        resource: &'static str,
        name: String,
        resource_group: String,
    },

    /// A transport-level or remote failure
    #[error("Error {action} {resource} \"{name}\" (Resource Group \"{resource_group}\"): {source}")]
    Remote {
        action: &'static str,
        resource: &'static str,
        name: String,
        resource_group: String,
        #[source]
        source: BoxError,
    },

    /// Create found a remote resource that was never imported
    #[error(
        "A resource with the ID \"{id}\" already exists - to be managed via Terraform this resource needs to be imported into the State. Please see the resource documentation for \"{resource_type}\" for more information."
    )]
    AlreadyExists { resource_type: String, id: String },

    /// The stored identifier cannot be parsed
    #[error("Error parsing Azure Resource ID \"{id}\": {reason}")]
    MalformedId { id: String, reason: String },

    /// A configuration attribute could not be read or written
    #[error("Error setting or reading `{name}`: {message}")]
    InvalidAttribute { name: String, message: String },

    /// The remote API returned a resource without an identifier
    #[error("Cannot read {resource} \"{name}\" (Resource Group \"{resource_group}\") ID")]
    MissingId {
        resource: &'static str,
        name: String,
        resource_group: String,
    },

    /// Import target does not exist
    #[error("Cannot import non-existent remote object {resource_type} with ID \"{id}\"")]
    ImportNotFound { resource_type: String, id: String },
}

impl ProviderError {
    /// Wrap a transport error with the resource name and group
    pub fn remote(
        action: &'static str,
        resource: &'static str,
        name: impl Into<String>,
        resource_group: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Remote {
            action,
            resource,
            name: name.into(),
            resource_group: resource_group.into(),
            source: Box::new(source),
        }
    }

    pub fn invalid_attribute(name: impl Into<String>, message: impl ToString) -> Self {
        Self::InvalidAttribute {
            name: name.into(),
            message: message.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::ImportNotFound { .. })
    }
}

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Return type for async operations
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Lifecycle handler for one resource type
///
/// Every operation runs to completion before returning. The only suspension
/// point is waiting for a long-running operation, which stops early when
/// `cancel` fires.
pub trait ResourceHandler: Send + Sync {
    /// Resource type name (e.g., "azurerm_healthcare_service")
    fn name(&self) -> &'static str;

    /// Attribute schema for this resource type
    fn schema(&self) -> ResourceSchema;

    /// Create the resource and persist its identifier
    ///
    /// The identifier is written only after the remote side confirms the
    /// resource exists.
    fn create<'a>(
        &'a self,
        data: &'a mut dyn ResourceData,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, ProviderResult<()>>;

    /// Refresh the data from the remote resource
    ///
    /// A resource that no longer exists clears the identifier and is not an
    /// error.
    fn read<'a>(
        &'a self,
        data: &'a mut dyn ResourceData,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, ProviderResult<()>>;

    /// Update the resource in place
    fn update<'a>(
        &'a self,
        data: &'a mut dyn ResourceData,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, ProviderResult<()>>;

    /// Delete the resource
    fn delete<'a>(
        &'a self,
        data: &'a mut dyn ResourceData,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, ProviderResult<()>>;
}

/// Main Provider trait
pub trait Provider: Send + Sync {
    /// Name of this Provider (e.g., "azurerm")
    fn name(&self) -> &'static str;

    /// List of resource types this Provider can handle
    fn resource_types(&self) -> Vec<&'static str>;

    /// Look up the handler for a resource type
    fn resource(&self, resource_type: &str) -> Option<&dyn ResourceHandler>;
}

/// Import an existing remote resource by identifier
///
/// Sets the identifier and refreshes through Read. If Read clears the
/// identifier the remote object does not exist.
pub async fn import_passthrough(
    handler: &dyn ResourceHandler,
    id: &str,
    data: &mut dyn ResourceData,
    cancel: &CancellationToken,
) -> ProviderResult<()> {
    log::info!("importing {} with ID {:?}", handler.name(), id);
    data.set_id(id);
    handler.read(data, cancel).await?;
    if data.id().is_empty() {
        return Err(ProviderError::ImportNotFound {
            resource_type: handler.name().to_string(),
            id: id.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::{ResourceState, Value};

    // Mock handler: a resource exists only while `exists` is true
    struct MockHandler {
        exists: bool,
    }

    impl ResourceHandler for MockHandler {
        fn name(&self) -> &'static str {
            "mock_resource"
        }

        fn schema(&self) -> ResourceSchema {
            ResourceSchema::new("mock_resource")
        }

        fn create<'a>(
            &'a self,
            data: &'a mut dyn ResourceData,
            _cancel: &'a CancellationToken,
        ) -> BoxFuture<'a, ProviderResult<()>> {
            Box::pin(async move {
                data.set_id("mock-id-123");
                Ok(())
            })
        }

        fn read<'a>(
            &'a self,
            data: &'a mut dyn ResourceData,
            _cancel: &'a CancellationToken,
        ) -> BoxFuture<'a, ProviderResult<()>> {
            Box::pin(async move {
                if self.exists {
                    data.set("name", Value::String("mock".into()))
                        .map_err(|e| ProviderError::invalid_attribute("name", e))?;
                } else {
                    data.set_id("");
                }
                Ok(())
            })
        }

        fn update<'a>(
            &'a self,
            data: &'a mut dyn ResourceData,
            cancel: &'a CancellationToken,
        ) -> BoxFuture<'a, ProviderResult<()>> {
            self.read(data, cancel)
        }

        fn delete<'a>(
            &'a self,
            _data: &'a mut dyn ResourceData,
            _cancel: &'a CancellationToken,
        ) -> BoxFuture<'a, ProviderResult<()>> {
            Box::pin(async { Ok(()) })
        }
    }

    #[tokio::test]
    async fn import_passthrough_reads_existing_resource() {
        let handler = MockHandler { exists: true };
        let mut data = ResourceState::untyped();
        import_passthrough(&handler, "mock-id-123", &mut data, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(data.id(), "mock-id-123");
        assert_eq!(data.get_string("name").as_deref(), Some("mock"));
    }

    #[tokio::test]
    async fn import_passthrough_fails_for_missing_resource() {
        let handler = MockHandler { exists: false };
        let mut data = ResourceState::untyped();
        let err = import_passthrough(&handler, "gone", &mut data, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::ImportNotFound { .. }));
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn mock_handler_create_sets_identifier() {
        let handler = MockHandler { exists: true };
        let mut data = ResourceState::untyped();
        handler
            .create(&mut data, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(data.id(), "mock-id-123");
        assert!(!data.is_new_resource());
    }

    #[test]
    fn remote_error_keeps_context_and_source() {
        let io = std::io::Error::other("connection reset");
        let err = ProviderError::remote("deleting", "Healthcare Service", "fhir1", "rg1", io);
        assert_eq!(
            err.to_string(),
            "Error deleting Healthcare Service \"fhir1\" (Resource Group \"rg1\"): connection reset"
        );
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn already_exists_names_type_and_id() {
        let err = ProviderError::AlreadyExists {
            resource_type: "azurerm_healthcare_service".to_string(),
            id: "/subscriptions/s/resourceGroups/rg/providers/P/services/n".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("azurerm_healthcare_service"));
        assert!(msg.contains("/services/n"));
    }
}
