//! Expand and flatten between configuration and the services API shape
//!
//! Expand always sends the authentication and CORS sub-structs, empty when
//! unconfigured. Flatten writes only what the remote side reports; absent
//! or empty remote structs produce nothing.

use std::collections::HashMap;

use cerulean_client::healthcare::{
    ServiceAccessPolicyEntry, ServiceAuthenticationConfigurationInfo,
    ServiceCorsConfigurationInfo, ServiceCosmosDbConfigurationInfo, ServicesDescription,
    ServicesProperties,
};
use cerulean_core::resource::Value;
use cerulean_core::utils::normalize_location;

use super::model::{
    AuthenticationConfiguration, CorsConfiguration, HealthcareService, string_values,
};
use crate::tags::flatten_tags;

/// Build the create/update request body
pub fn expand(service: &HealthcareService) -> ServicesDescription {
    ServicesDescription {
        location: Some(normalize_location(&service.location)),
        tags: service.tags.clone(),
        kind: Some(service.kind),
        properties: Some(ServicesProperties {
            access_policies: Some(expand_access_policies(&service.access_policy_object_ids)),
            cosmos_db_configuration: Some(ServiceCosmosDbConfigurationInfo {
                offer_throughput: Some(service.cosmosdb_throughput),
            }),
            cors_configuration: Some(expand_cors_configuration(
                service.cors_configuration.as_ref(),
            )),
            authentication_configuration: Some(expand_authentication_configuration(
                service.authentication_configuration.as_ref(),
            )),
            ..Default::default()
        }),
        ..Default::default()
    }
}

pub fn expand_access_policies(object_ids: &[String]) -> Vec<ServiceAccessPolicyEntry> {
    object_ids
        .iter()
        .map(|id| ServiceAccessPolicyEntry {
            object_id: Some(id.clone()),
        })
        .collect()
}

pub fn expand_cors_configuration(cors: Option<&CorsConfiguration>) -> ServiceCorsConfigurationInfo {
    let Some(cors) = cors else {
        return ServiceCorsConfigurationInfo::default();
    };
    ServiceCorsConfigurationInfo {
        origins: Some(cors.allowed_origins.clone()),
        headers: Some(cors.allowed_headers.clone()),
        methods: Some(cors.allowed_methods.clone()),
        max_age: Some(cors.max_age_in_seconds),
        allow_credentials: cors.allow_credentials,
    }
}

pub fn expand_authentication_configuration(
    auth: Option<&AuthenticationConfiguration>,
) -> ServiceAuthenticationConfigurationInfo {
    let Some(auth) = auth else {
        return ServiceAuthenticationConfigurationInfo::default();
    };
    ServiceAuthenticationConfigurationInfo {
        authority: auth.authority.clone(),
        audience: auth.audience.clone(),
        smart_proxy_enabled: auth.smart_proxy_enabled,
    }
}

/// Convert a remote service into attribute values
///
/// `name` and `resource_group_name` come from the identifier and are not
/// part of the result.
pub fn flatten(service: &ServicesDescription) -> HashMap<String, Value> {
    let mut attributes = HashMap::new();

    if let Some(location) = &service.location {
        attributes.insert(
            "location".to_string(),
            Value::String(normalize_location(location)),
        );
    }
    if let Some(kind) = service.kind {
        attributes.insert(
            "kind".to_string(),
            Value::String(kind.as_str().to_string()),
        );
    }

    if let Some(properties) = &service.properties {
        if let Some(policies) =
            flatten_access_policies(properties.access_policies.as_deref())
        {
            attributes.insert("access_policy_object_ids".to_string(), policies);
        }
        if let Some(throughput) = properties
            .cosmos_db_configuration
            .as_ref()
            .and_then(|c| c.offer_throughput)
        {
            attributes.insert(
                "cosmosdb_throughput".to_string(),
                Value::Int(i64::from(throughput)),
            );
        }
        if let Some(auth) =
            flatten_authentication_configuration(properties.authentication_configuration.as_ref())
        {
            attributes.insert("authentication_configuration".to_string(), auth);
        }
        if let Some(cors) = flatten_cors_configuration(properties.cors_configuration.as_ref()) {
            attributes.insert("cors_configuration".to_string(), cors);
        }
    }

    if let Some(tags) = flatten_tags(service.tags.as_ref()) {
        attributes.insert("tags".to_string(), tags);
    }

    attributes
}

/// Object IDs of the access policies, in remote order
pub fn flatten_access_policies(policies: Option<&[ServiceAccessPolicyEntry]>) -> Option<Value> {
    let ids: Vec<String> = policies?
        .iter()
        .filter_map(|p| p.object_id.clone())
        .collect();
    Some(string_values(&ids))
}

pub fn flatten_authentication_configuration(
    auth: Option<&ServiceAuthenticationConfigurationInfo>,
) -> Option<Value> {
    let auth = auth?;
    let mut block = HashMap::new();
    if let Some(authority) = &auth.authority {
        block.insert("authority".to_string(), Value::String(authority.clone()));
    }
    if let Some(audience) = &auth.audience {
        block.insert("audience".to_string(), Value::String(audience.clone()));
    }
    if let Some(enabled) = auth.smart_proxy_enabled {
        block.insert("smart_proxy_enabled".to_string(), Value::Bool(enabled));
    }
    single_block(block)
}

pub fn flatten_cors_configuration(cors: Option<&ServiceCorsConfigurationInfo>) -> Option<Value> {
    let cors = cors?;
    let mut block = HashMap::new();
    if let Some(origins) = &cors.origins {
        block.insert("allowed_origins".to_string(), string_values(origins));
    }
    if let Some(headers) = &cors.headers {
        block.insert("allowed_headers".to_string(), string_values(headers));
    }
    if let Some(methods) = &cors.methods {
        block.insert("allowed_methods".to_string(), string_values(methods));
    }
    if let Some(max_age) = cors.max_age {
        block.insert(
            "max_age_in_seconds".to_string(),
            Value::Int(i64::from(max_age)),
        );
    }
    if let Some(allow) = cors.allow_credentials {
        block.insert("allow_credentials".to_string(), Value::Bool(allow));
    }
    single_block(block)
}

fn single_block(block: HashMap<String, Value>) -> Option<Value> {
    if block.is_empty() {
        None
    } else {
        Some(Value::List(vec![Value::Map(block)]))
    }
}
