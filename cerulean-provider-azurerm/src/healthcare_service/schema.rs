//! azurerm_healthcare_service schema definition
//!
//! Microsoft.HealthcareApis/services

use cerulean_client::healthcare::Kind;
use cerulean_core::resource::Value;
use cerulean_core::schema::{AttributeSchema, AttributeType, ResourceSchema, types};

use crate::tags::tags_type;

pub const RESOURCE_TYPE: &str = "azurerm_healthcare_service";

pub const DEFAULT_COSMOSDB_THROUGHPUT: i64 = 1000;

const VALID_CORS_METHODS: &[&str] = &["DELETE", "GET", "HEAD", "MERGE", "POST", "OPTIONS", "PUT"];

const MAX_AGE_RANGE: std::ops::RangeInclusive<i64> = 1..=2_000_000_000;

fn validate_max_age(value: &Value) -> Result<(), String> {
    match value {
        Value::Int(i) if MAX_AGE_RANGE.contains(i) => Ok(()),
        Value::Int(i) => Err(format!(
            "max_age_in_seconds must be between {} and {}, got {}",
            MAX_AGE_RANGE.start(),
            MAX_AGE_RANGE.end(),
            i
        )),
        _ => Err("Expected integer".to_string()),
    }
}

fn block(schema: ResourceSchema) -> AttributeType {
    AttributeType::List(Box::new(AttributeType::Block(Box::new(schema))))
}

fn string_list(item: AttributeType) -> AttributeType {
    AttributeType::List(Box::new(item))
}

fn authentication_configuration_schema() -> ResourceSchema {
    ResourceSchema::new("authentication_configuration")
        .attribute(
            AttributeSchema::new("authority", AttributeType::String)
                .with_description("The authority URL for the service."),
        )
        .attribute(
            AttributeSchema::new("audience", AttributeType::String)
                .with_description("The audience URL for the service."),
        )
        .attribute(
            AttributeSchema::new("smart_proxy_enabled", AttributeType::Bool)
                .with_description("Whether the SMART on FHIR proxy is enabled."),
        )
}

fn cors_configuration_schema() -> ResourceSchema {
    let methods = AttributeType::Enum(VALID_CORS_METHODS.iter().map(|m| m.to_string()).collect());

    ResourceSchema::new("cors_configuration")
        .attribute(
            AttributeSchema::new("allowed_origins", string_list(types::non_empty_string()))
                .required()
                .with_max_items(64)
                .with_description("The origins to be allowed via CORS."),
        )
        .attribute(
            AttributeSchema::new("allowed_headers", string_list(types::non_empty_string()))
                .required()
                .with_max_items(64)
                .with_description("The headers to be allowed via CORS."),
        )
        .attribute(
            AttributeSchema::new("allowed_methods", string_list(methods))
                .required()
                .with_max_items(64)
                .with_description("The methods to be allowed via CORS."),
        )
        .attribute(
            AttributeSchema::new(
                "max_age_in_seconds",
                AttributeType::Custom {
                    name: "MaxAgeInSeconds".to_string(),
                    base: Box::new(AttributeType::Int),
                    validate: validate_max_age,
                },
            )
            .required()
            .with_description("The max age to be allowed via CORS."),
        )
        .attribute(
            AttributeSchema::new("allow_credentials", AttributeType::Bool)
                .with_description("Whether credentials are allowed via CORS."),
        )
}

/// Returns the schema for azurerm_healthcare_service
pub fn healthcare_service_schema() -> ResourceSchema {
    let kinds = AttributeType::Enum(Kind::ALL.iter().map(|k| k.as_str().to_string()).collect());

    ResourceSchema::new(RESOURCE_TYPE)
        .with_description("Manages a Healthcare Service (Azure API for FHIR).")
        .attribute(
            AttributeSchema::new("name", types::non_empty_string())
                .required()
                .with_description(
                    "The name of the service instance. Changing this forces a new resource.",
                ),
        )
        .attribute(
            AttributeSchema::new("location", types::location())
                .required()
                .with_description("The Azure region where the service should be created."),
        )
        .attribute(
            AttributeSchema::new("resource_group_name", types::non_empty_string())
                .required()
                .with_description("The name of the Resource Group in which to create the service."),
        )
        .attribute(
            AttributeSchema::new("kind", kinds)
                .with_default(Value::String(Kind::default().as_str().to_string()))
                .with_description("The type of the service."),
        )
        .attribute(
            AttributeSchema::new("cosmosdb_throughput", AttributeType::Int)
                .with_default(Value::Int(DEFAULT_COSMOSDB_THROUGHPUT))
                .with_description("The provisioned throughput for the backing database."),
        )
        .attribute(
            AttributeSchema::new("access_policy_object_ids", string_list(types::uuid()))
                .required()
                .with_min_items(1)
                .with_description("Azure AD object IDs allowed to access the service."),
        )
        .attribute(
            AttributeSchema::new(
                "authentication_configuration",
                block(authentication_configuration_schema()),
            )
            .with_max_items(3),
        )
        .attribute(
            AttributeSchema::new("cors_configuration", block(cors_configuration_schema()))
                .with_max_items(5),
        )
        .attribute(
            AttributeSchema::new("tags", tags_type())
                .with_description("A mapping of tags to assign to the resource."),
        )
}
