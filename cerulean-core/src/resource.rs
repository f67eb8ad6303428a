//! Resource - Attribute values and the configuration accessor
//!
//! Handlers never own configuration. They read the desired state and write
//! the observed state through [`ResourceData`], which the surrounding
//! framework implements. [`ResourceState`] is the in-memory implementation
//! used by the provider entry points and by tests.

use std::collections::HashMap;

use crate::schema::{ResourceSchema, TypeError};

/// Attribute value of a resource
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Int(i64),
    Bool(bool),
    List(Vec<Value>),
    Map(HashMap<String, Value>),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&HashMap<String, Value>> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Convert a JSON value into an attribute value.
    ///
    /// `null` has no attribute representation and yields `None`; inside
    /// lists and maps such entries are dropped.
    pub fn from_json(value: &serde_json::Value) -> Option<Value> {
        match value {
            serde_json::Value::String(s) => Some(Value::String(s.clone())),
            serde_json::Value::Bool(b) => Some(Value::Bool(*b)),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Some(Value::Int(i))
                } else {
                    n.as_f64().map(|f| Value::Int(f as i64))
                }
            }
            serde_json::Value::Array(arr) => {
                Some(Value::List(arr.iter().filter_map(Value::from_json).collect()))
            }
            serde_json::Value::Object(obj) => Some(Value::Map(
                obj.iter()
                    .filter_map(|(k, v)| Value::from_json(v).map(|v| (k.clone(), v)))
                    .collect(),
            )),
            serde_json::Value::Null => None,
        }
    }

    /// Convert an attribute value into JSON
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Int(i) => serde_json::Value::from(*i),
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::List(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Map(map) => serde_json::Value::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
        }
    }

    pub(crate) fn type_name(&self) -> &'static str {
        match self {
            Value::String(_) => "String",
            Value::Int(_) => "Int",
            Value::Bool(_) => "Bool",
            Value::List(_) => "List",
            Value::Map(_) => "Map",
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

/// Configuration accessor for a single resource instance
///
/// The identifier is an opaque string. An empty identifier means the
/// resource is not (or no longer) tracked.
pub trait ResourceData: Send + Sync {
    /// Get an attribute, falling back to the schema default
    fn get(&self, key: &str) -> Option<Value>;

    /// Set an attribute, type-checked against the schema when one is attached
    ///
    /// Required attributes of nested blocks are not enforced here.
    fn set(&mut self, key: &str, value: Value) -> Result<(), TypeError>;

    /// Drop an attribute; later reads fall back to the schema default
    fn remove(&mut self, key: &str);

    /// Stored identifier, empty when none
    fn id(&self) -> &str;

    /// Replace the stored identifier; an empty string clears it
    fn set_id(&mut self, id: &str);

    /// Whether this is the first Create of the resource
    fn is_new_resource(&self) -> bool;

    fn get_string(&self, key: &str) -> Option<String> {
        match self.get(key) {
            Some(Value::String(s)) => Some(s),
            _ => None,
        }
    }

    fn get_int(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(|v| v.as_int())
    }

    fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(|v| v.as_bool())
    }

    /// Get a list attribute; absent lists read as empty
    fn get_list(&self, key: &str) -> Vec<Value> {
        match self.get(key) {
            Some(Value::List(items)) => items,
            _ => Vec::new(),
        }
    }
}

/// In-memory resource data
#[derive(Debug, Clone, Default)]
pub struct ResourceState {
    schema: Option<ResourceSchema>,
    attributes: HashMap<String, Value>,
    id: String,
    new_resource: bool,
}

impl ResourceState {
    /// Create data for a resource that has never been created
    pub fn new(schema: ResourceSchema) -> Self {
        Self {
            schema: Some(schema),
            attributes: HashMap::new(),
            id: String::new(),
            new_resource: true,
        }
    }

    /// Create data without a schema; every `set` is accepted
    pub fn untyped() -> Self {
        Self {
            new_resource: true,
            ..Self::default()
        }
    }

    /// Build data from a JSON object of attributes
    pub fn from_json(
        schema: ResourceSchema,
        json: &serde_json::Value,
    ) -> Result<Self, TypeError> {
        let mut state = Self::new(schema);
        let obj = json.as_object().ok_or_else(|| TypeError::TypeMismatch {
            expected: "Map".to_string(),
            got: "non-object JSON".to_string(),
        })?;
        for (key, value) in obj {
            if let Some(v) = Value::from_json(value) {
                state.set(key, v)?;
            }
        }
        Ok(state)
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Attach an existing identifier, marking the resource as not new
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self.new_resource = false;
        self
    }

    pub fn schema(&self) -> Option<&ResourceSchema> {
        self.schema.as_ref()
    }

    pub fn attributes(&self) -> &HashMap<String, Value> {
        &self.attributes
    }

    /// Generic map view of the stored attributes
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.attributes
                .iter()
                .map(|(k, v)| (k.clone(), v.to_json()))
                .collect(),
        )
    }
}

impl ResourceData for ResourceState {
    fn get(&self, key: &str) -> Option<Value> {
        if let Some(value) = self.attributes.get(key) {
            return Some(value.clone());
        }
        self.schema
            .as_ref()
            .and_then(|s| s.attributes.get(key))
            .and_then(|a| a.default.clone())
    }

    fn set(&mut self, key: &str, value: Value) -> Result<(), TypeError> {
        if let Some(schema) = &self.schema {
            let attr = schema
                .attributes
                .get(key)
                .ok_or_else(|| TypeError::UnknownAttribute {
                    name: key.to_string(),
                })?;
            attr.attr_type.check_type(&value)?;
        }
        self.attributes.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) {
        self.attributes.remove(key);
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: &str) {
        self.id = id.to_string();
        if !id.is_empty() {
            self.new_resource = false;
        }
    }

    fn is_new_resource(&self) -> bool {
        self.new_resource
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{AttributeSchema, AttributeType};
    use serde_json::json;

    fn schema() -> ResourceSchema {
        ResourceSchema::new("test_resource")
            .attribute(AttributeSchema::new("name", AttributeType::String).required())
            .attribute(
                AttributeSchema::new("count", AttributeType::Int).with_default(Value::Int(3)),
            )
    }

    #[test]
    fn get_falls_back_to_schema_default() {
        let data = ResourceState::new(schema());
        assert_eq!(data.get("count"), Some(Value::Int(3)));
        assert_eq!(data.get("name"), None);
    }

    #[test]
    fn set_rejects_type_mismatch() {
        let mut data = ResourceState::new(schema());
        assert!(data.set("count", Value::String("x".into())).is_err());
        assert!(data.set("count", Value::Int(7)).is_ok());
        assert_eq!(data.get_int("count"), Some(7));
    }

    #[test]
    fn set_rejects_unknown_attribute() {
        let mut data = ResourceState::new(schema());
        let err = data.set("bogus", Value::Bool(true)).unwrap_err();
        assert!(matches!(err, TypeError::UnknownAttribute { .. }));

        let mut untyped = ResourceState::untyped();
        assert!(untyped.set("bogus", Value::Bool(true)).is_ok());
    }

    #[test]
    fn remove_restores_schema_default() {
        let mut data = ResourceState::new(schema())
            .with_attribute("name", "a")
            .with_attribute("count", Value::Int(9));
        data.remove("count");
        data.remove("name");
        data.remove("never_set");
        assert_eq!(data.get("count"), Some(Value::Int(3)));
        assert_eq!(data.get("name"), None);
        assert!(data.attributes().is_empty());
    }

    #[test]
    fn set_id_clears_new_resource_flag() {
        let mut data = ResourceState::new(schema());
        assert!(data.is_new_resource());
        data.set_id("/subscriptions/x");
        assert!(!data.is_new_resource());
        data.set_id("");
        assert_eq!(data.id(), "");
    }

    #[test]
    fn from_json_drops_nulls() {
        let data =
            ResourceState::from_json(schema(), &json!({"name": "a", "count": null})).unwrap();
        assert_eq!(data.get_string("name").as_deref(), Some("a"));
        assert_eq!(data.attributes().get("count"), None);
    }

    #[test]
    fn json_conversion_preserves_nesting() {
        let json = json!({"list": [1, "two", true], "map": {"k": "v"}});
        let value = Value::from_json(&json).unwrap();
        assert_eq!(value.to_json(), json);
    }
}
