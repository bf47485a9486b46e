//! Validation schema compiler.
//!
//! Two kinds of schema are derived from the registry:
//!
//! - a request schema per function: the parameter schema plus an optional
//!   `content-type` string property, used for single-function GET/POST
//! - one batch schema for `{ tasks: [...] }` submissions, in which every
//!   function contributes an `if func == name then args matches` branch
//!
//! Inside a batch, any argument may instead be a template placeholder such
//! as `"{{needs.first.output}}"`. Placeholders are resolved by the engine,
//! so they are accepted regardless of the parameter's declared type.

use serde_json::{json, Map, Value};

use crate::functions::{FunctionEntry, FunctionRegistry};

/// Placeholder strings deferred to the engine
pub const TEMPLATE_PATTERN: &str = r"^\{\{.*\}\}$";

/// Property injected into every request schema
pub const CONTENT_TYPE_PROPERTY: &str = "content-type";

/// Default declared response type
pub const DEFAULT_CONTENT_TYPE: &str = "text/plain";

const DRAFT7: &str = "http://json-schema.org/draft-07/schema#";

/// Request schema of a single function
pub fn request_schema(entry: &FunctionEntry) -> Value {
    let mut schema = match &entry.schema {
        Value::Object(obj) => obj.clone(),
        _ => Map::new(),
    };

    let mut properties = match schema.remove("properties") {
        Some(Value::Object(props)) => props,
        _ => Map::new(),
    };
    properties.insert(
        CONTENT_TYPE_PROPERTY.to_string(),
        json!({ "type": "string", "default": DEFAULT_CONTENT_TYPE }),
    );
    schema.insert("properties".into(), Value::Object(properties));

    Value::Object(schema)
}

fn template_placeholder() -> Value {
    json!({ "type": "string", "pattern": TEMPLATE_PATTERN })
}

/// `if func == name then args` branch of one function
fn function_branch(entry: &FunctionEntry) -> Value {
    let arity = entry.arity();

    let mut args = Map::new();
    args.insert("type".into(), json!("array"));
    args.insert("minItems".into(), json!(arity));
    args.insert("maxItems".into(), json!(arity));
    if arity > 0 {
        let items: Vec<Value> = entry
            .param_schemas()
            .into_iter()
            .map(|param| json!({ "anyOf": [param, template_placeholder()] }))
            .collect();
        args.insert("items".into(), Value::Array(items));
        args.insert("additionalItems".into(), json!(false));
    }

    json!({
        "if": {
            "properties": { "func": { "const": entry.name } },
            "required": ["func"]
        },
        "then": {
            "required": ["args"],
            "properties": { "args": Value::Object(args) }
        }
    })
}

/// Batch submission schema for every registered function
pub fn batch_schema(registry: &FunctionRegistry) -> Value {
    let names = registry.names();
    let func = if names.is_empty() {
        Value::Bool(false)
    } else {
        json!({
            "type": "string",
            "enum": names,
            "description": "Function to call"
        })
    };

    let branches: Vec<Value> = registry.iter().map(function_branch).collect();

    let mut input = json!({
        "type": "object",
        "required": ["func", "args"],
        "properties": {
            "func": func,
            "args": {
                "type": "array",
                "description": "Arguments to pass to the function",
                "items": {
                    "anyOf": [
                        { "type": "string" },
                        { "type": "number" },
                        { "type": "boolean" },
                        { "type": "object" },
                        { "type": "array" }
                    ]
                }
            }
        }
    });
    // allOf must not be empty
    if !branches.is_empty() {
        if let Some(obj) = input.as_object_mut() {
            obj.insert("allOf".into(), Value::Array(branches));
        }
    }

    json!({
        "$schema": DRAFT7,
        "type": "object",
        "additionalProperties": false,
        "required": ["tasks"],
        "properties": {
            "tasks": {
                "type": "array",
                "minItems": 1,
                "items": { "$ref": "#/definitions/invocation" }
            }
        },
        "definitions": {
            "input": input,
            "task": {
                "type": "object",
                "required": ["name", "input"],
                "properties": {
                    "name": { "type": "string", "description": "Task name" },
                    "nnc": { "type": "string", "description": "Task nonce" },
                    "op": { "type": "string", "description": "Wasm operation" },
                    "rsc": { "type": "string", "description": "Resource to operate on" },
                    "input": { "$ref": "#/definitions/input" }
                }
            },
            "meta": {
                "type": "object",
                "required": ["memory", "time"],
                "properties": {
                    "memory": { "type": "number" },
                    "time": { "type": "number" }
                }
            },
            "invocation": {
                "type": "object",
                "required": ["run"],
                "properties": {
                    "v": { "type": "string" },
                    "run": { "$ref": "#/definitions/task" },
                    "cause": { "type": "null" },
                    "auth": { "type": "string" },
                    "meta": { "$ref": "#/definitions/meta" },
                    "prf": { "type": "array", "items": { "type": "string" } }
                }
            }
        }
    })
}

/// True when every task passes an empty argument list.
///
/// Such batches skip schema validation entirely, including the `func` name
/// check.
pub fn all_tasks_zero_args(body: &Value) -> bool {
    let Some(tasks) = body.get("tasks").and_then(Value::as_array) else {
        return false;
    };

    tasks.iter().all(|task| {
        task.pointer("/run/input/args")
            .and_then(Value::as_array)
            .is_some_and(|args| args.is_empty())
    })
}
