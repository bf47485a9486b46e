//! # Function Entry

use serde::Serialize;
use serde_json::Value;

/// A callable function exposed by the gateway
///
/// `arg_names` is the canonical positional ordering of the function's
/// arguments. It is taken from the keys of `schema.properties` in insertion
/// order and never changes after construction.
#[derive(Debug, Clone, Serialize)]
pub struct FunctionEntry {
    /// Function name (unique key)
    pub name: String,

    /// Content identifier of the module exporting the function
    pub content_id: String,

    /// Parameter schema as derived from the declaration
    pub schema: Value,

    /// Argument names in schema property order
    pub arg_names: Vec<String>,
}

impl FunctionEntry {
    /// Create an entry, deriving `arg_names` from `schema.properties`
    pub fn new(name: String, content_id: String, schema: Value) -> Self {
        let arg_names = schema
            .get("properties")
            .and_then(Value::as_object)
            .map(|props| props.keys().cloned().collect())
            .unwrap_or_default();

        Self {
            name,
            content_id,
            schema,
            arg_names,
        }
    }

    /// Number of positional arguments
    pub fn arity(&self) -> usize {
        self.arg_names.len()
    }

    /// Schema of a single parameter
    pub fn param_schema(&self, arg: &str) -> Option<&Value> {
        self.schema.get("properties").and_then(|props| props.get(arg))
    }

    /// Parameter schemas in positional order
    pub fn param_schemas(&self) -> Vec<Value> {
        self.arg_names
            .iter()
            .map(|arg| self.param_schema(arg).cloned().unwrap_or(Value::Bool(true)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_arg_names_follow_property_order() {
        let schema = json!({
            "type": "object",
            "properties": { "b": { "type": "number" }, "a": { "type": "string" } }
        });
        let entry = FunctionEntry::new("f".into(), "bafy".into(), schema);

        assert_eq!(entry.arg_names, ["b", "a"]);
        assert_eq!(entry.arity(), 2);
        assert_eq!(entry.param_schemas()[1], json!({ "type": "string" }));
    }

    #[test]
    fn test_schema_without_properties() {
        let entry = FunctionEntry::new("now".into(), "bafy".into(), json!({ "type": "object" }));
        assert!(entry.arg_names.is_empty());
        assert!(entry.param_schema("x").is_none());
    }
}
