//! Composite Batch Schema Invariant Tests
//!
//! For every registered function the batch schema constrains `args` to the
//! function's arity and parameter types, while letting any argument be a
//! `{{...}}` placeholder resolved later by the engine.

use serde_json::{json, Value};

use wasmgate::functions::{extract_schema, FunctionDecl, FunctionRegistry};
use wasmgate::validation::{batch_schema, CompiledSchemas, ValidationError};

fn registry() -> FunctionRegistry {
    let mut registry = FunctionRegistry::new();
    for decl in [
        FunctionDecl::new("add", &[("a", "number"), ("b", "number")], "number"),
        FunctionDecl::new("qr", &[("data", "string")], "string"),
        FunctionDecl::new("flags", &[("on", "boolean[]")], "integer"),
        FunctionDecl::new("now", &[], "integer"),
    ] {
        registry
            .register(&decl.name, "bafymath", extract_schema(&decl).unwrap())
            .unwrap();
    }
    registry
}

fn task(name: &str, func: &str, args: Value) -> Value {
    json!({ "run": { "name": name, "input": { "func": func, "args": args } } })
}

fn batch(tasks: Vec<Value>) -> Value {
    json!({ "tasks": tasks })
}

fn validate(body: &Value) -> Result<(), ValidationError> {
    CompiledSchemas::build(&registry()).unwrap().validate_batch(body)
}

// =============================================================================
// SCHEMA SHAPE
// =============================================================================

#[test]
fn test_one_branch_per_function() {
    let registry = registry();
    let schema = batch_schema(&registry);
    let branches = schema["definitions"]["input"]["allOf"].as_array().unwrap();

    assert_eq!(branches.len(), registry.len());
    for (branch, entry) in branches.iter().zip(registry.iter()) {
        let args = &branch["then"]["properties"]["args"];
        assert_eq!(branch["if"]["properties"]["func"]["const"], entry.name.as_str());
        assert_eq!(args["minItems"], entry.arity());
        assert_eq!(args["maxItems"], entry.arity());
    }
}

#[test]
fn test_empty_registry_schema_compiles() {
    let registry = FunctionRegistry::new();
    assert!(CompiledSchemas::build(&registry).is_ok());
}

// =============================================================================
// REJECTIONS
// =============================================================================

#[test]
fn test_unknown_function_rejected() {
    let body = batch(vec![task("t", "ghost", json!([1]))]);
    assert!(matches!(validate(&body), Err(ValidationError::Invalid(_))));
}

#[test]
fn test_wrong_argument_count_rejected() {
    let too_few = batch(vec![task("t", "add", json!([1]))]);
    let too_many = batch(vec![task("t", "add", json!([1, 2, 3]))]);

    assert!(validate(&too_few).is_err());
    assert!(validate(&too_many).is_err());
}

#[test]
fn test_wrong_literal_type_rejected() {
    let body = batch(vec![task("t", "add", json!(["two", 3]))]);

    let err = validate(&body).unwrap_err();
    assert_eq!(err.status_code(), 400);
    assert!(!err.issues().is_empty());
}

#[test]
fn test_wrong_item_type_in_array_parameter_rejected() {
    let body = batch(vec![task("t", "flags", json!([[true, "yes"]]))]);
    assert!(validate(&body).is_err());
}

#[test]
fn test_unknown_top_level_property_rejected() {
    let mut body = batch(vec![task("t", "add", json!([1, 2]))]);
    body["extra"] = json!(true);
    assert!(validate(&body).is_err());
}

#[test]
fn test_empty_batch_rejected() {
    assert!(matches!(
        validate(&batch(vec![])),
        Err(ValidationError::EmptyBatch)
    ));
}

#[test]
fn test_missing_tasks_rejected() {
    assert!(validate(&json!({})).is_err());
}

// =============================================================================
// ACCEPTANCE
// =============================================================================

#[test]
fn test_literal_arguments_accepted() {
    let body = batch(vec![
        task("sum", "add", json!([1, 2.5])),
        task("code", "qr", json!(["hello"])),
        task("bits", "flags", json!([[true, false]])),
    ]);
    assert!(validate(&body).is_ok());
}

#[test]
fn test_placeholder_accepted_for_any_type() {
    let body = batch(vec![
        task("sum", "add", json!([1, 2])),
        task("double", "add", json!(["{{needs.sum.output}}", 4])),
        task("bits", "flags", json!(["{{needs.double.output}}"])),
    ]);
    assert!(validate(&body).is_ok());
}

#[test]
fn test_string_that_is_not_placeholder_rejected() {
    let body = batch(vec![task("t", "add", json!(["{needs.sum.output}", 4]))]);
    assert!(validate(&body).is_err());
}

#[test]
fn test_engine_fields_in_template_tolerated() {
    let body = json!({ "tasks": [ {
        "run": {
            "name": "t", "op": "wasm/run", "rsc": "ipfs://x", "nnc": "",
            "input": { "func": "qr", "args": ["hi"] }
        },
        "meta": { "memory": 1, "time": 1 },
        "prf": []
    } ] });
    assert!(validate(&body).is_ok());
}

// =============================================================================
// ZERO-ARGUMENT SHORT-CIRCUIT
// =============================================================================

#[test]
fn test_zero_argument_batch_skips_schema() {
    let known = batch(vec![task("a", "now", json!([])), task("b", "now", json!([]))]);
    // func names are not checked on this path
    let unknown = batch(vec![task("a", "ghost", json!([]))]);

    assert!(validate(&known).is_ok());
    assert!(validate(&unknown).is_ok());
}

#[test]
fn test_zero_argument_short_circuit_ignores_arity() {
    let all_empty = batch(vec![task("a", "now", json!([])), task("b", "add", json!([]))]);
    let mixed = batch(vec![task("a", "now", json!([])), task("b", "add", json!([1]))]);

    assert!(validate(&all_empty).is_ok());
    assert!(validate(&mixed).is_err());
}
