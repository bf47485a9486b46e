//! # Signature Declarations
//!
//! A compiled module ships with a declaration document describing its
//! exports. Each exported function is turned into a JSON-Schema object whose
//! `properties` follow parameter declaration order.
//!
//! ```json
//! { "functions": [
//!     { "name": "add",
//!       "params": [ { "name": "a", "type": "number" }, { "name": "b", "type": "number" } ],
//!       "returns": "number" } ] }
//! ```

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::errors::{FunctionError, FunctionResult};
use crate::validation::CONTENT_TYPE_PROPERTY;

/// Types a parameter or return value may be declared with
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeDecl {
    String,
    Boolean,
    Number,
    Integer,
    /// Raw byte buffer
    Bytes,
    Array(Box<TypeDecl>),
}

impl TypeDecl {
    /// Parse a type expression such as `string`, `number[]` or `array<bytes>`
    pub fn parse(expr: &str) -> Result<Self, String> {
        let expr = expr.trim();

        if let Some(inner) = expr.strip_suffix("[]") {
            return Ok(TypeDecl::Array(Box::new(Self::parse(inner)?)));
        }

        let generic = expr
            .strip_prefix("array<")
            .or_else(|| expr.strip_prefix("Array<"))
            .and_then(|rest| rest.strip_suffix('>'));
        if let Some(inner) = generic {
            return Ok(TypeDecl::Array(Box::new(Self::parse(inner)?)));
        }

        match expr {
            "string" => Ok(TypeDecl::String),
            "boolean" | "bool" => Ok(TypeDecl::Boolean),
            "number" => Ok(TypeDecl::Number),
            "integer" => Ok(TypeDecl::Integer),
            "bytes" | "Uint8Array" => Ok(TypeDecl::Bytes),
            "" => Err("empty type expression".to_string()),
            other => Err(format!("unsupported type `{}`", other)),
        }
    }

    /// JSON-Schema fragment for this type
    pub fn to_schema(&self) -> Value {
        match self {
            TypeDecl::String => json!({ "type": "string" }),
            TypeDecl::Boolean => json!({ "type": "boolean" }),
            TypeDecl::Number => json!({ "type": "number" }),
            TypeDecl::Integer => json!({ "type": "integer" }),
            TypeDecl::Bytes => json!({
                "type": "array",
                "items": { "type": "integer", "minimum": 0, "maximum": 255 }
            }),
            TypeDecl::Array(inner) => json!({
                "type": "array",
                "items": inner.to_schema()
            }),
        }
    }
}

impl fmt::Display for TypeDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDecl::String => write!(f, "string"),
            TypeDecl::Boolean => write!(f, "boolean"),
            TypeDecl::Number => write!(f, "number"),
            TypeDecl::Integer => write!(f, "integer"),
            TypeDecl::Bytes => write!(f, "bytes"),
            TypeDecl::Array(inner) => write!(f, "{}[]", inner),
        }
    }
}

/// One declared parameter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParamDecl {
    pub name: String,

    #[serde(rename = "type")]
    pub ty: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// One exported function
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionDecl {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub params: Vec<ParamDecl>,

    pub returns: String,
}

impl FunctionDecl {
    /// Convenience constructor used by tests and embedders
    pub fn new(name: &str, params: &[(&str, &str)], returns: &str) -> Self {
        Self {
            name: name.to_string(),
            description: None,
            params: params
                .iter()
                .map(|(name, ty)| ParamDecl {
                    name: name.to_string(),
                    ty: ty.to_string(),
                    description: None,
                })
                .collect(),
            returns: returns.to_string(),
        }
    }
}

/// Declaration document of a module
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Declarations {
    #[serde(default)]
    pub functions: Vec<FunctionDecl>,
}

/// Derive the parameter schema of a declared function.
///
/// Fails if the return type or any parameter type is outside the supported
/// set, or if parameter names are empty or repeated.
pub fn extract_schema(decl: &FunctionDecl) -> FunctionResult<Value> {
    if decl.name.trim().is_empty() {
        return Err(FunctionError::extraction(&decl.name, "function name is empty"));
    }

    TypeDecl::parse(&decl.returns)
        .map_err(|e| FunctionError::extraction(&decl.name, format!("return type: {}", e)))?;

    let mut properties = Map::new();
    let mut required = Vec::with_capacity(decl.params.len());
    let mut seen = HashSet::new();

    for param in &decl.params {
        if param.name.is_empty() {
            return Err(FunctionError::extraction(&decl.name, "parameter name is empty"));
        }
        // the request schema owns this name for the response override
        if param.name == CONTENT_TYPE_PROPERTY {
            return Err(FunctionError::extraction(
                &decl.name,
                format!("parameter name `{}` is reserved", CONTENT_TYPE_PROPERTY),
            ));
        }
        if !seen.insert(param.name.as_str()) {
            return Err(FunctionError::extraction(
                &decl.name,
                format!("parameter `{}` declared twice", param.name),
            ));
        }

        let ty = TypeDecl::parse(&param.ty).map_err(|e| {
            FunctionError::extraction(&decl.name, format!("parameter `{}`: {}", param.name, e))
        })?;

        let mut schema = ty.to_schema();
        if let (Some(description), Some(obj)) = (&param.description, schema.as_object_mut()) {
            obj.insert("description".into(), Value::String(description.clone()));
        }

        properties.insert(param.name.clone(), schema);
        required.push(Value::String(param.name.clone()));
    }

    let mut schema = Map::new();
    schema.insert("type".into(), json!("object"));
    if let Some(description) = &decl.description {
        schema.insert("description".into(), Value::String(description.clone()));
    }
    schema.insert("properties".into(), Value::Object(properties));
    schema.insert("required".into(), Value::Array(required));
    schema.insert("additionalProperties".into(), Value::Bool(false));

    Ok(Value::Object(schema))
}
