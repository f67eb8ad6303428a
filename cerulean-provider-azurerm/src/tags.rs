//! Resource tags

use std::collections::HashMap;

use cerulean_core::resource::Value;
use cerulean_core::schema::AttributeType;

const MAX_TAGS: usize = 50;
const MAX_KEY_LENGTH: usize = 512;
const MAX_VALUE_LENGTH: usize = 256;

fn validate_tags(value: &Value) -> Result<(), String> {
    let Value::Map(tags) = value else {
        return Err("Expected map".to_string());
    };
    if tags.len() > MAX_TAGS {
        return Err(format!(
            "a maximum of {} tags can be applied to each ARM resource",
            MAX_TAGS
        ));
    }
    for (key, value) in tags {
        if key.len() > MAX_KEY_LENGTH {
            return Err(format!(
                "the maximum length for a tag key is {} characters: {:?} is {} characters",
                MAX_KEY_LENGTH,
                key,
                key.len()
            ));
        }
        if let Value::String(v) = value
            && v.len() > MAX_VALUE_LENGTH
        {
            return Err(format!(
                "the maximum length for a tag value is {} characters: the value for {:?} is {} characters",
                MAX_VALUE_LENGTH,
                key,
                v.len()
            ));
        }
    }
    Ok(())
}

/// Tags type for ARM resources (string map)
pub fn tags_type() -> AttributeType {
    AttributeType::Custom {
        name: "Tags".to_string(),
        base: Box::new(AttributeType::Map(Box::new(AttributeType::String))),
        validate: validate_tags,
    }
}

/// Convert configured tags to the request shape
pub fn expand_tags(tags: &HashMap<String, Value>) -> HashMap<String, String> {
    tags.iter()
        .map(|(k, v)| {
            let value = match v {
                Value::String(s) => s.clone(),
                Value::Int(i) => i.to_string(),
                Value::Bool(b) => b.to_string(),
                other => other.to_json().to_string(),
            };
            (k.clone(), value)
        })
        .collect()
}

/// Convert remote tags to an attribute value
///
/// Absent and empty tag sets both yield `None`.
pub fn flatten_tags(tags: Option<&HashMap<String, String>>) -> Option<Value> {
    tags.filter(|tags| !tags.is_empty()).map(|tags| {
        Value::Map(
            tags.iter()
                .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                .collect(),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expand_stringifies_values() {
        let tags = HashMap::from([
            ("env".to_string(), Value::String("prod".to_string())),
            ("count".to_string(), Value::Int(3)),
        ]);
        let expanded = expand_tags(&tags);
        assert_eq!(expanded.get("env").map(String::as_str), Some("prod"));
        assert_eq!(expanded.get("count").map(String::as_str), Some("3"));
    }

    #[test]
    fn flatten_absent_is_none() {
        assert_eq!(flatten_tags(None), None);
        assert_eq!(flatten_tags(Some(&HashMap::new())), None);
        let remote = HashMap::from([("env".to_string(), "prod".to_string())]);
        assert_eq!(
            flatten_tags(Some(&remote)),
            Some(Value::Map(HashMap::from([(
                "env".to_string(),
                Value::String("prod".to_string())
            )])))
        );
    }

    #[test]
    fn tag_limits_are_validated() {
        let t = tags_type();
        let too_many: HashMap<String, Value> = (0..51)
            .map(|i| (format!("k{}", i), Value::String("v".to_string())))
            .collect();
        assert!(t.validate(&Value::Map(too_many)).is_err());

        let long_value = HashMap::from([("k".to_string(), Value::String("v".repeat(257)))]);
        assert!(t.validate(&Value::Map(long_value)).is_err());

        let long_key = HashMap::from([("k".repeat(513), Value::String("v".to_string()))]);
        assert!(t.validate(&Value::Map(long_key)).is_err());

        let ok = HashMap::from([("env".to_string(), Value::String("prod".to_string()))]);
        assert!(t.validate(&Value::Map(ok)).is_ok());
        assert!(t.validate(&Value::Int(1)).is_err());
    }
}
