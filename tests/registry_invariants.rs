//! Function Registry Invariant Tests
//!
//! - argument names follow declared parameter order, everywhere
//! - a duplicate name is rejected and the first entry survives
//! - unrepresentable signatures drop only the affected function

use serde_json::json;

use wasmgate::functions::{
    extract_schema, register_declarations, Declarations, FunctionDecl, FunctionError,
    FunctionRegistry,
};
use wasmgate::http_server::query::coerce_query;

fn declarations(value: serde_json::Value) -> Declarations {
    serde_json::from_value(value).unwrap()
}

// =============================================================================
// ARGUMENT ORDER
// =============================================================================

#[test]
fn test_arg_names_match_schema_properties() {
    let mut registry = FunctionRegistry::new();
    let decls = declarations(json!({ "functions": [
        { "name": "blend", "params": [
            { "name": "zeta", "type": "number" },
            { "name": "alpha", "type": "string" },
            { "name": "mid", "type": "boolean[]" }
        ], "returns": "string" },
        { "name": "now", "params": [], "returns": "integer" }
    ] }));
    register_declarations(&mut registry, "bafymix", &decls).unwrap();

    for entry in registry.iter() {
        let properties = entry.schema["properties"].as_object().unwrap();
        let keys: Vec<&String> = properties.keys().collect();

        assert_eq!(entry.arg_names.len(), properties.len());
        assert_eq!(entry.arg_names.iter().collect::<Vec<_>>(), keys);
    }

    let blend = registry.lookup("blend").unwrap();
    assert_eq!(blend.arg_names, ["zeta", "alpha", "mid"]);
}

#[test]
fn test_query_extraction_reads_declared_order() {
    let mut registry = FunctionRegistry::new();
    let decl = FunctionDecl::new("sub", &[("minuend", "number"), ("subtrahend", "number")], "number");
    registry
        .register("sub", "bafysub", extract_schema(&decl).unwrap())
        .unwrap();
    let entry = registry.lookup("sub").unwrap();

    // query order is irrelevant
    let pairs = vec![
        ("subtrahend".to_string(), "1".to_string()),
        ("minuend".to_string(), "10".to_string()),
    ];
    let input = coerce_query(entry, &pairs);
    let args: Vec<_> = entry.arg_names.iter().map(|n| input[n].clone()).collect();

    assert_eq!(args, vec![json!(10), json!(1)]);
}

// =============================================================================
// DUPLICATE NAMES
// =============================================================================

#[test]
fn test_duplicate_name_rejected_first_kept() {
    let mut registry = FunctionRegistry::new();
    let first = FunctionDecl::new("qr", &[("data", "string")], "string");
    let second = FunctionDecl::new("qr", &[("text", "string"), ("size", "integer")], "string");

    registry
        .register("qr", "bafyfirst", extract_schema(&first).unwrap())
        .unwrap();
    let err = registry
        .register("qr", "bafysecond", extract_schema(&second).unwrap())
        .unwrap_err();

    assert!(matches!(err, FunctionError::DuplicateName(ref n) if n == "qr"));
    assert_eq!(registry.len(), 1);
    let entry = registry.lookup("qr").unwrap();
    assert_eq!(entry.content_id, "bafyfirst");
    assert_eq!(entry.arg_names, ["data"]);
}

#[test]
fn test_duplicate_across_modules_is_fatal() {
    let mut registry = FunctionRegistry::new();
    let decls = declarations(json!({ "functions": [
        { "name": "add", "params": [], "returns": "number" }
    ] }));

    register_declarations(&mut registry, "bafyone", &decls).unwrap();
    let err = register_declarations(&mut registry, "bafytwo", &decls).unwrap_err();

    assert!(err.is_fatal());
    assert_eq!(registry.lookup("add").unwrap().content_id, "bafyone");
}

// =============================================================================
// SCHEMA EXTRACTION FAILURES
// =============================================================================

#[test]
fn test_unsupported_signature_skipped_others_kept() {
    let mut registry = FunctionRegistry::new();
    let decls = declarations(json!({ "functions": [
        { "name": "lookup", "params": [{ "name": "m", "type": "Map<string, number>" }], "returns": "number" },
        { "name": "promise", "params": [], "returns": "Promise<string>" },
        { "name": "echo", "params": [{ "name": "s", "type": "string" }], "returns": "string" }
    ] }));

    let skipped = register_declarations(&mut registry, "bafy", &decls).unwrap();

    assert_eq!(skipped, ["lookup", "promise"]);
    assert_eq!(registry.names(), vec!["echo"]);
}

#[test]
fn test_reserved_parameter_name_skipped() {
    let mut registry = FunctionRegistry::new();
    let decls = declarations(json!({ "functions": [
        { "name": "f", "params": [{ "name": "content-type", "type": "number" }], "returns": "string" },
        { "name": "g", "params": [{ "name": "mime", "type": "string" }], "returns": "string" }
    ] }));

    let skipped = register_declarations(&mut registry, "bafy", &decls).unwrap();

    assert_eq!(skipped, ["f"]);
    assert!(!registry.contains("f"));
    assert!(registry.contains("g"));
}

#[test]
fn test_discovery_in_registration_order() {
    let mut registry = FunctionRegistry::new();
    for name in ["zeta", "alpha", "mid"] {
        let decl = FunctionDecl::new(name, &[], "string");
        registry
            .register(name, "bafy", extract_schema(&decl).unwrap())
            .unwrap();
    }

    let names: Vec<String> = registry.all().into_iter().map(|(name, _)| name).collect();
    assert_eq!(names, ["zeta", "alpha", "mid"]);
}
