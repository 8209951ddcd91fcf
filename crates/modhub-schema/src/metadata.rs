//! Default narrowing for module metadata.
//!
//! After metadata passes its module's schema, absent properties that declare
//! a `default` are filled in, recursively through nested object schemas.
//! Present values are never overwritten.

use serde_json::{Map, Value};

/// Fill schema `default`s into `value` for every absent property.
pub fn apply_defaults(schema: &Value, value: &Value) -> Value {
    let Some(properties) = schema.get("properties").and_then(Value::as_object) else {
        return value.clone();
    };
    let Some(object) = value.as_object() else {
        return value.clone();
    };

    let mut narrowed: Map<String, Value> = object.clone();
    for (name, property_schema) in properties {
        match object.get(name) {
            Some(present) => {
                narrowed.insert(name.clone(), apply_defaults(property_schema, present));
            }
            None => {
                if let Some(default) = property_schema.get("default") {
                    narrowed.insert(name.clone(), apply_defaults(property_schema, default));
                }
            }
        }
    }
    Value::Object(narrowed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_present_values_are_kept() {
        let schema = json!({
            "properties": { "limit": { "type": "integer", "default": 10 } }
        });
        assert_eq!(
            apply_defaults(&schema, &json!({ "limit": 3 })),
            json!({ "limit": 3 })
        );
    }

    #[test]
    fn test_nested_defaults() {
        let schema = json!({
            "type": "object",
            "properties": {
                "reminders": {
                    "type": "object",
                    "properties": {
                        "enabled": { "type": "boolean", "default": true },
                        "hoursBefore": { "type": "integer", "default": 24 }
                    }
                }
            }
        });
        let narrowed = apply_defaults(&schema, &json!({ "reminders": { "hoursBefore": 2 } }));
        assert_eq!(
            narrowed,
            json!({ "reminders": { "enabled": true, "hoursBefore": 2 } })
        );
    }

    #[test]
    fn test_absent_object_without_default_stays_absent() {
        let schema = json!({
            "properties": {
                "reminders": {
                    "type": "object",
                    "properties": { "enabled": { "default": true } }
                }
            }
        });
        assert_eq!(apply_defaults(&schema, &json!({})), json!({}));
    }

    #[test]
    fn test_extra_properties_survive() {
        let schema = json!({ "properties": { "a": { "default": 1 } } });
        assert_eq!(
            apply_defaults(&schema, &json!({ "b": 2 })),
            json!({ "a": 1, "b": 2 })
        );
    }

    #[test]
    fn test_non_object_value_untouched() {
        let schema = json!({ "properties": { "a": { "default": 1 } } });
        assert_eq!(apply_defaults(&schema, &json!([1, 2])), json!([1, 2]));
    }
}
