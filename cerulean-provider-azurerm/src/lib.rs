//! Cerulean AzureRM Provider
//!
//! Azure Resource Manager provider implementation.
//!
//! ## Module Structure
//!
//! - `provider` - AzureRmProvider construction and handler registry
//! - `config` - Provider-wide switches (import protection, delete policy)
//! - `tags` - Tag schema and conversion helpers
//! - `healthcare_service` - azurerm_healthcare_service schema, typed
//!   configuration, mapper and lifecycle handler

pub mod config;
pub mod healthcare_service;
pub mod provider;
pub mod tags;

// Re-export main types
pub use config::ProviderConfig;
pub use healthcare_service::HealthcareServiceResource;
pub use provider::AzureRmProvider;

use cerulean_core::provider::{Provider, ResourceHandler};

// =============================================================================
// Provider Trait Implementation
// =============================================================================

impl Provider for AzureRmProvider {
    fn name(&self) -> &'static str {
        "azurerm"
    }

    fn resource_types(&self) -> Vec<&'static str> {
        self.handlers().iter().map(|h| h.name()).collect()
    }

    fn resource(&self, resource_type: &str) -> Option<&dyn ResourceHandler> {
        self.handlers()
            .iter()
            .find(|h| h.name() == resource_type)
            .map(|h| &**h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cerulean_client::ClientConfig;

    #[test]
    fn registers_healthcare_service() {
        let client = ClientConfig::new("00000000-0000-0000-0000-000000000000", "token").unwrap();
        let provider = AzureRmProvider::new(client, ProviderConfig::default()).unwrap();

        assert_eq!(provider.name(), "azurerm");
        assert_eq!(provider.resource_types(), vec!["azurerm_healthcare_service"]);

        let handler = provider.resource("azurerm_healthcare_service").unwrap();
        assert_eq!(handler.schema().resource_type, "azurerm_healthcare_service");
        assert!(provider.resource("azurerm_storage_account").is_none());
    }
}
