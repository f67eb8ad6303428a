//! Utility functions for value normalization

/// Normalize an Azure location (e.g., "West Europe" -> "westeurope")
pub fn normalize_location(location: &str) -> String {
    location.replace(' ', "").to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_location() {
        assert_eq!(normalize_location("West Europe"), "westeurope");
        assert_eq!(normalize_location("westeurope"), "westeurope");
        assert_eq!(normalize_location("UK South"), "uksouth");
    }
}
