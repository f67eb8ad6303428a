//! Provider-wide behaviour switches

/// Environment variable enabling import protection
pub const STRICT_ENV: &str = "ARM_PROVIDER_STRICT";

/// Settings shared by every resource handler of the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    /// Refuse to create a resource that already exists remotely but was
    /// never imported
    pub require_resources_to_be_imported: bool,
    /// Treat a Delete of an already-missing resource as success
    pub ignore_missing_on_delete: bool,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            require_resources_to_be_imported: false,
            ignore_missing_on_delete: true,
        }
    }
}

impl ProviderConfig {
    /// Load settings from the environment
    pub fn from_env() -> Self {
        Self::from_strict_flag(std::env::var(STRICT_ENV).ok().as_deref())
    }

    fn from_strict_flag(flag: Option<&str>) -> Self {
        let strict = flag.is_some_and(|v| v.trim().eq_ignore_ascii_case("true"));
        Self {
            require_resources_to_be_imported: strict,
            ..Self::default()
        }
    }

    pub fn with_import_protection(mut self, enabled: bool) -> Self {
        self.require_resources_to_be_imported = enabled;
        self
    }

    pub fn with_ignore_missing_on_delete(mut self, ignore: bool) -> Self {
        self.ignore_missing_on_delete = ignore;
        self
    }
}
