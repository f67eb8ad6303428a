//! Typed configuration for azurerm_healthcare_service
//!
//! [`HealthcareService::from_data`] is the adapter from the generic
//! attribute map. Singleton blocks are declared as lists in the schema;
//! when more than one element is supplied only the last one is used.

use std::collections::HashMap;

use cerulean_client::healthcare::Kind;
use cerulean_core::provider::{ProviderError, ProviderResult};
use cerulean_core::resource::{ResourceData, Value};

use super::schema::DEFAULT_COSMOSDB_THROUGHPUT;
use crate::tags::expand_tags;

const AUTH: &str = "authentication_configuration";
const CORS: &str = "cors_configuration";

#[derive(Debug, Clone, PartialEq)]
pub struct HealthcareService {
    pub name: String,
    pub resource_group_name: String,
    pub location: String,
    pub kind: Kind,
    pub cosmosdb_throughput: i32,
    pub access_policy_object_ids: Vec<String>,
    pub authentication_configuration: Option<AuthenticationConfiguration>,
    pub cors_configuration: Option<CorsConfiguration>,
    pub tags: Option<HashMap<String, String>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthenticationConfiguration {
    pub authority: Option<String>,
    pub audience: Option<String>,
    pub smart_proxy_enabled: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CorsConfiguration {
    pub allowed_origins: Vec<String>,
    pub allowed_headers: Vec<String>,
    pub allowed_methods: Vec<String>,
    pub max_age_in_seconds: i32,
    pub allow_credentials: Option<bool>,
}

impl HealthcareService {
    /// Read the desired configuration
    pub fn from_data(data: &dyn ResourceData) -> ProviderResult<Self> {
        let kind = match data.get_string("kind") {
            Some(kind) => kind
                .parse::<Kind>()
                .map_err(|e| ProviderError::invalid_attribute("kind", e))?,
            None => Kind::default(),
        };

        let cosmosdb_throughput = to_i32(
            "cosmosdb_throughput",
            data.get_int("cosmosdb_throughput")
                .unwrap_or(DEFAULT_COSMOSDB_THROUGHPUT),
        )?;

        let tags = match data.get("tags") {
            Some(Value::Map(tags)) => Some(expand_tags(&tags)),
            Some(other) => {
                return Err(ProviderError::invalid_attribute(
                    "tags",
                    format!("expected a map, got {:?}", other),
                ));
            }
            None => None,
        };

        Ok(Self {
            name: required_string(data, "name")?,
            resource_group_name: required_string(data, "resource_group_name")?,
            location: required_string(data, "location")?,
            kind,
            cosmosdb_throughput,
            access_policy_object_ids: strings(
                "access_policy_object_ids",
                &data.get_list("access_policy_object_ids"),
            )?,
            authentication_configuration: singleton_block(data, AUTH)?
                .map(|block| AuthenticationConfiguration::from_block(&block))
                .transpose()?,
            cors_configuration: singleton_block(data, CORS)?
                .map(|block| CorsConfiguration::from_block(&block))
                .transpose()?,
            tags,
        })
    }

    /// Generic attribute map view
    pub fn to_attributes(&self) -> HashMap<String, Value> {
        let mut attributes = HashMap::from([
            ("name".to_string(), Value::String(self.name.clone())),
            (
                "resource_group_name".to_string(),
                Value::String(self.resource_group_name.clone()),
            ),
            ("location".to_string(), Value::String(self.location.clone())),
            (
                "kind".to_string(),
                Value::String(self.kind.as_str().to_string()),
            ),
            (
                "cosmosdb_throughput".to_string(),
                Value::Int(i64::from(self.cosmosdb_throughput)),
            ),
            (
                "access_policy_object_ids".to_string(),
                string_values(&self.access_policy_object_ids),
            ),
        ]);

        if let Some(auth) = &self.authentication_configuration {
            attributes.insert(
                "authentication_configuration".to_string(),
                Value::List(vec![auth.to_block()]),
            );
        }
        if let Some(cors) = &self.cors_configuration {
            attributes.insert(
                "cors_configuration".to_string(),
                Value::List(vec![cors.to_block()]),
            );
        }
        if let Some(tags) = &self.tags {
            attributes.insert(
                "tags".to_string(),
                Value::Map(
                    tags.iter()
                        .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                        .collect(),
                ),
            );
        }

        attributes
    }
}

impl AuthenticationConfiguration {
    fn from_block(block: &HashMap<String, Value>) -> ProviderResult<Self> {
        Ok(Self {
            authority: optional_string(block, AUTH, "authority")?,
            audience: optional_string(block, AUTH, "audience")?,
            smart_proxy_enabled: optional_bool(block, AUTH, "smart_proxy_enabled")?,
        })
    }

    fn to_block(&self) -> Value {
        let mut block = HashMap::new();
        if let Some(authority) = &self.authority {
            block.insert("authority".to_string(), Value::String(authority.clone()));
        }
        if let Some(audience) = &self.audience {
            block.insert("audience".to_string(), Value::String(audience.clone()));
        }
        if let Some(enabled) = self.smart_proxy_enabled {
            block.insert("smart_proxy_enabled".to_string(), Value::Bool(enabled));
        }
        Value::Map(block)
    }
}

impl CorsConfiguration {
    fn from_block(block: &HashMap<String, Value>) -> ProviderResult<Self> {
        let list = |key: &str| -> ProviderResult<Vec<String>> {
            let path = format!("{}.{}", CORS, key);
            match block.get(key) {
                Some(Value::List(items)) => strings(&path, items),
                Some(other) => Err(ProviderError::invalid_attribute(
                    path,
                    format!("expected a list, got {:?}", other),
                )),
                None => Err(ProviderError::invalid_attribute(path, "is required")),
            }
        };

        let max_age = match block.get("max_age_in_seconds") {
            Some(Value::Int(i)) => to_i32("cors_configuration.max_age_in_seconds", *i)?,
            _ => {
                return Err(ProviderError::invalid_attribute(
                    "cors_configuration.max_age_in_seconds",
                    "is required",
                ));
            }
        };

        Ok(Self {
            allowed_origins: list("allowed_origins")?,
            allowed_headers: list("allowed_headers")?,
            allowed_methods: list("allowed_methods")?,
            max_age_in_seconds: max_age,
            allow_credentials: optional_bool(block, CORS, "allow_credentials")?,
        })
    }

    fn to_block(&self) -> Value {
        let mut block = HashMap::from([
            (
                "allowed_origins".to_string(),
                string_values(&self.allowed_origins),
            ),
            (
                "allowed_headers".to_string(),
                string_values(&self.allowed_headers),
            ),
            (
                "allowed_methods".to_string(),
                string_values(&self.allowed_methods),
            ),
            (
                "max_age_in_seconds".to_string(),
                Value::Int(i64::from(self.max_age_in_seconds)),
            ),
        ]);
        if let Some(allow) = self.allow_credentials {
            block.insert("allow_credentials".to_string(), Value::Bool(allow));
        }
        Value::Map(block)
    }
}

pub(crate) fn string_values(items: &[String]) -> Value {
    Value::List(items.iter().map(|s| Value::String(s.clone())).collect())
}

fn required_string(data: &dyn ResourceData, key: &str) -> ProviderResult<String> {
    data.get_string(key)
        .ok_or_else(|| ProviderError::invalid_attribute(key, "is required"))
}

fn strings(path: &str, items: &[Value]) -> ProviderResult<Vec<String>> {
    items
        .iter()
        .map(|item| match item {
            Value::String(s) => Ok(s.clone()),
            other => Err(ProviderError::invalid_attribute(
                path,
                format!("expected a string item, got {:?}", other),
            )),
        })
        .collect()
}

fn to_i32(path: &str, value: i64) -> ProviderResult<i32> {
    i32::try_from(value).map_err(|e| ProviderError::invalid_attribute(path, e))
}

/// Last map element of a block list, if any
fn singleton_block(
    data: &dyn ResourceData,
    key: &str,
) -> ProviderResult<Option<HashMap<String, Value>>> {
    let items = data.get_list(key);
    if items.len() > 1 {
        log::warn!(
            "{} has {} blocks; only the last one is applied",
            key,
            items.len()
        );
    }
    match items.into_iter().last() {
        Some(Value::Map(block)) => Ok(Some(block)),
        Some(other) => Err(ProviderError::invalid_attribute(
            key,
            format!("expected a block, got {:?}", other),
        )),
        None => Ok(None),
    }
}

fn optional_string(
    block: &HashMap<String, Value>,
    parent: &str,
    key: &str,
) -> ProviderResult<Option<String>> {
    match block.get(key) {
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(ProviderError::invalid_attribute(
            format!("{}.{}", parent, key),
            format!("expected a string, got {:?}", other),
        )),
        None => Ok(None),
    }
}

fn optional_bool(
    block: &HashMap<String, Value>,
    parent: &str,
    key: &str,
) -> ProviderResult<Option<bool>> {
    match block.get(key) {
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(other) => Err(ProviderError::invalid_attribute(
            format!("{}.{}", parent, key),
            format!("expected a bool, got {:?}", other),
        )),
        None => Ok(None),
    }
}
