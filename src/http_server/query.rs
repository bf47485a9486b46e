//! Query-string coercion.
//!
//! Query values are strings. Before validation each declared parameter is
//! converted to its schema's type where the text allows it; text that does
//! not convert stays a string so the validator can reject it.

use axum::async_trait;
use axum::extract::{FromRequestParts, Query};
use axum::http::request::Parts;
use serde_json::{Map, Number, Value};

use super::errors::ApiError;
use crate::functions::FunctionEntry;
use crate::validation::CONTENT_TYPE_PROPERTY;

/// Raw query pairs in request order, repeated keys preserved.
///
/// A malformed query string is rejected with a JSON `ApiError`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryPairs(pub Vec<(String, String)>);

impl QueryPairs {
    /// Last value given for `key`
    pub fn last(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for QueryPairs {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Query::<Vec<(String, String)>>::try_from_uri(&parts.uri)
            .map(|Query(pairs)| QueryPairs(pairs))
            .map_err(|e| ApiError::InvalidBody(e.body_text()))
    }
}

/// Build request input from raw query pairs.
///
/// Keys that are neither parameters nor `content-type` are dropped. For a
/// scalar parameter given more than once, the last value wins.
pub fn coerce_query(entry: &FunctionEntry, pairs: &[(String, String)]) -> Map<String, Value> {
    let mut input = Map::new();

    for name in &entry.arg_names {
        let values: Vec<&str> = pairs
            .iter()
            .filter(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
            .collect();
        if values.is_empty() {
            continue;
        }

        let schema = entry.param_schema(name).unwrap_or(&Value::Null);
        input.insert(name.clone(), coerce_values(schema, &values));
    }

    insert_content_type(&mut input, pairs);
    input
}

/// Copy the last `content-type` query value into `input`, unless `input`
/// already carries one.
pub fn insert_content_type(input: &mut Map<String, Value>, pairs: &[(String, String)]) {
    if input.contains_key(CONTENT_TYPE_PROPERTY) {
        return;
    }
    if let Some((_, content_type)) = pairs
        .iter()
        .rev()
        .find(|(key, _)| key == CONTENT_TYPE_PROPERTY)
    {
        input.insert(
            CONTENT_TYPE_PROPERTY.to_string(),
            Value::String(content_type.clone()),
        );
    }
}

fn schema_type(schema: &Value) -> Option<&str> {
    schema.get("type").and_then(Value::as_str)
}

fn coerce_values(schema: &Value, values: &[&str]) -> Value {
    if schema_type(schema) == Some("array") {
        let items = schema.get("items").unwrap_or(&Value::Null);
        if let [single] = values {
            if let Ok(Value::Array(parsed)) = serde_json::from_str::<Value>(single) {
                return Value::Array(parsed);
            }
        }
        return Value::Array(values.iter().map(|v| coerce_scalar(items, v)).collect());
    }

    match values.last() {
        Some(last) => coerce_scalar(schema, last),
        None => Value::Null,
    }
}

fn coerce_scalar(schema: &Value, raw: &str) -> Value {
    let coerced = match schema_type(schema) {
        Some("integer") => raw.trim().parse::<i64>().ok().map(Value::from),
        Some("number") => parse_number(raw.trim()).map(Value::Number),
        Some("boolean") => match raw {
            "true" => Some(Value::Bool(true)),
            "false" => Some(Value::Bool(false)),
            _ => None,
        },
        _ => None,
    };
    coerced.unwrap_or_else(|| Value::String(raw.to_string()))
}

fn parse_number(raw: &str) -> Option<Number> {
    if let Ok(n) = raw.parse::<i64>() {
        return Some(Number::from(n));
    }
    raw.parse::<f64>().ok().and_then(Number::from_f64)
}
