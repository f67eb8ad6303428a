//! Azure Resource Manager identifiers
//!
//! `/subscriptions/{sub}/resourceGroups/{rg}/providers/{namespace}/{type}/{name}`
//! is parsed into its subscription, resource group, provider namespace and
//! the remaining type/name pairs keyed by resource type.

use std::collections::HashMap;
use std::fmt;

use crate::provider::{ProviderError, ProviderResult};

/// Parsed Azure resource identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AzureResourceId {
    pub subscription_id: String,
    pub resource_group: String,
    pub provider: Option<String>,
    /// Remaining key/value segments (e.g., "services" -> "my-fhir")
    pub path: HashMap<String, String>,
    /// Segment keys in their original order, for formatting
    order: Vec<String>,
}

impl AzureResourceId {
    /// Build an identifier for a provider resource
    pub fn new(
        subscription_id: impl Into<String>,
        resource_group: impl Into<String>,
        provider: impl Into<String>,
        segments: &[(&str, &str)],
    ) -> Self {
        Self {
            subscription_id: subscription_id.into(),
            resource_group: resource_group.into(),
            provider: Some(provider.into()),
            path: segments
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            order: segments.iter().map(|(k, _)| k.to_string()).collect(),
        }
    }

    /// Parse an identifier string
    pub fn parse(id: &str) -> ProviderResult<Self> {
        let malformed = |reason: &str| ProviderError::MalformedId {
            id: id.to_string(),
            reason: reason.to_string(),
        };

        let trimmed = id.trim_matches('/');
        if trimmed.is_empty() {
            return Err(malformed("identifier is empty"));
        }

        let components: Vec<&str> = trimmed.split('/').collect();
        if components.len() % 2 != 0 {
            return Err(malformed("the number of path segments is not divisible by 2"));
        }

        let mut subscription_id = None;
        let mut resource_group = None;
        let mut provider = None;
        let mut path = HashMap::new();
        let mut order = Vec::new();

        for pair in components.chunks(2) {
            let (key, value) = (pair[0], pair[1]);
            if key.is_empty() || value.is_empty() {
                return Err(malformed("key/value segments must not be empty"));
            }
            match key {
                "subscriptions" => subscription_id = Some(value.to_string()),
                k if k.eq_ignore_ascii_case("resourceGroups") => {
                    resource_group = Some(value.to_string())
                }
                "providers" => provider = Some(value.to_string()),
                _ => {
                    if path.insert(key.to_string(), value.to_string()).is_none() {
                        order.push(key.to_string());
                    }
                }
            }
        }

        let subscription_id =
            subscription_id.ok_or_else(|| malformed("no subscription ID found"))?;
        let resource_group =
            resource_group.ok_or_else(|| malformed("no resource group name found"))?;

        Ok(Self {
            subscription_id,
            resource_group,
            provider,
            path,
            order,
        })
    }

    /// Get the name stored under a resource type key (e.g., "services")
    pub fn path_value(&self, key: &str) -> ProviderResult<&str> {
        self.path
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| ProviderError::MalformedId {
                id: self.to_string(),
                reason: format!("no '{}' segment found", key),
            })
    }
}

impl fmt::Display for AzureResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "/subscriptions/{}/resourceGroups/{}",
            self.subscription_id, self.resource_group
        )?;
        if let Some(provider) = &self.provider {
            write!(f, "/providers/{}", provider)?;
        }
        for key in &self.order {
            if let Some(value) = self.path.get(key) {
                write!(f, "/{}/{}", key, value)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SERVICE_ID: &str = "/subscriptions/00000000-0000-0000-0000-000000000000/resourceGroups/rg1/providers/Microsoft.HealthcareApis/services/fhir1";

    #[test]
    fn parse_provider_resource() {
        let id = AzureResourceId::parse(SERVICE_ID).unwrap();
        assert_eq!(id.subscription_id, "00000000-0000-0000-0000-000000000000");
        assert_eq!(id.resource_group, "rg1");
        assert_eq!(id.provider.as_deref(), Some("Microsoft.HealthcareApis"));
        assert_eq!(id.path_value("services").unwrap(), "fhir1");
        assert_eq!(id.to_string(), SERVICE_ID);
    }

    #[test]
    fn parse_accepts_lowercase_resource_groups_key() {
        let id = AzureResourceId::parse("/subscriptions/s/resourcegroups/rg/providers/P/services/n")
            .unwrap();
        assert_eq!(id.resource_group, "rg");
    }

    #[test]
    fn parse_rejects_odd_segment_count() {
        let err = AzureResourceId::parse("/subscriptions/s/resourceGroups").unwrap_err();
        assert!(matches!(err, ProviderError::MalformedId { .. }));
        assert!(err.to_string().contains("not divisible by 2"));
    }

    #[test]
    fn parse_requires_subscription_and_resource_group() {
        let err = AzureResourceId::parse("/resourceGroups/rg/services/n").unwrap_err();
        assert!(err.to_string().contains("no subscription ID"));

        let err = AzureResourceId::parse("/subscriptions/s/services/n").unwrap_err();
        assert!(err.to_string().contains("no resource group"));
    }

    #[test]
    fn parse_rejects_empty() {
        assert!(AzureResourceId::parse("").is_err());
        assert!(AzureResourceId::parse("/").is_err());
    }

    #[test]
    fn missing_path_segment_is_malformed() {
        let id = AzureResourceId::parse(SERVICE_ID).unwrap();
        let err = id.path_value("workspaces").unwrap_err();
        assert!(err.to_string().contains("workspaces"));
    }

    #[test]
    fn new_formats_canonical_id() {
        let id = AzureResourceId::new(
            "00000000-0000-0000-0000-000000000000",
            "rg1",
            "Microsoft.HealthcareApis",
            &[("services", "fhir1")],
        );
        assert_eq!(id.to_string(), SERVICE_ID);
    }
}
