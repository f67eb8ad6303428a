//! azurerm_healthcare_service (Azure API for FHIR)

pub mod handler;
pub mod mapper;
pub mod model;
pub mod schema;

pub use handler::HealthcareServiceResource;
pub use model::{AuthenticationConfiguration, CorsConfiguration, HealthcareService};
pub use schema::{RESOURCE_TYPE, healthcare_service_schema};
