//! Cerulean Core
//!
//! Shared building blocks for Azure resource handlers: the attribute value
//! model and configuration accessor, schemas, resource identifiers and the
//! handler traits every resource type implements.

pub mod id;
pub mod provider;
pub mod resource;
pub mod schema;
pub mod utils;

pub use id::AzureResourceId;
pub use provider::{
    BoxFuture, Provider, ProviderError, ProviderResult, ResourceHandler, import_passthrough,
};
pub use resource::{ResourceData, ResourceState, Value};
pub use schema::{AttributeSchema, AttributeType, ResourceSchema, TypeError};
