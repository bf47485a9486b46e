//! Gateway End-to-End Tests
//!
//! Full router against an in-process engine: registry, validation,
//! workflow construction, receipt collection and response encoding.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use wasmgate::engine::{Engine, StubEngine};
use wasmgate::functions::{extract_schema, FunctionDecl, FunctionRegistry};
use wasmgate::http_server::{GatewayServer, GatewayState};
use wasmgate::response::SVG_PREAMBLE;
use wasmgate::workflow::{Invocation, InvocationOptions};

fn registry() -> FunctionRegistry {
    let mut registry = FunctionRegistry::new();
    for (decl, cid) in [
        (
            FunctionDecl::new("add", &[("a", "number"), ("b", "number")], "number"),
            "bafyadd",
        ),
        (FunctionDecl::new("qr", &[("data", "string")], "string"), "bafyqr"),
    ] {
        registry
            .register(&decl.name, cid, extract_schema(&decl).unwrap())
            .unwrap();
    }
    registry
}

fn compute(invocation: &Invocation) -> Value {
    let args = &invocation.run.input.args;
    match invocation.run.input.func.as_str() {
        "add" => json!(args.iter().map(|a| a.as_f64().unwrap_or(0.0)).sum::<f64>()),
        "qr" => json!(format!(
            r#"{SVG_PREAMBLE} data="{}"></svg>"#,
            args[0].as_str().unwrap_or_default()
        )),
        _ => Value::Null,
    }
}

fn gateway(engine: Arc<StubEngine>) -> Router {
    let state = GatewayState::new(
        registry(),
        engine as Arc<dyn Engine>,
        InvocationOptions::default(),
    )
    .unwrap();
    GatewayServer::build_router(Arc::new(state))
}

fn stub() -> Arc<StubEngine> {
    Arc::new(StubEngine::new(compute))
}

async fn send(router: Router, method: Method, uri: &str, body: Option<Value>) -> Response {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => request.body(Body::empty()),
    };
    router.oneshot(request.unwrap()).await.unwrap()
}

async fn get(router: Router, uri: &str) -> Response {
    send(router, Method::GET, uri, None).await
}

async fn post(router: Router, uri: &str, body: Value) -> Response {
    send(router, Method::POST, uri, Some(body)).await
}

fn content_type(response: &Response) -> &str {
    response.headers()[header::CONTENT_TYPE].to_str().unwrap()
}

async fn text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn json_body(response: Response) -> Value {
    serde_json::from_str(&text(response).await).unwrap()
}

// =============================================================================
// SINGLE FUNCTION
// =============================================================================

#[tokio::test]
async fn test_add_from_query() {
    let response = get(gateway(stub()), "/add?a=2&b=3").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(content_type(&response), "text/plain");
    assert_eq!(text(response).await, "5");
}

#[tokio::test]
async fn test_svg_result() {
    let response = get(gateway(stub()), "/qr?data=hello").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(content_type(&response), "image/svg+xml");
    assert!(text(response).await.starts_with(SVG_PREAMBLE));
}

#[tokio::test]
async fn test_content_type_override() {
    let response = get(gateway(stub()), "/qr?data=hello&content-type=text/html").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(content_type(&response), "text/html");
}

#[tokio::test]
async fn test_content_type_override_on_post() {
    let response = post(gateway(stub()), "/qr?content-type=text/html", json!({ "data": "hi" })).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(content_type(&response), "text/html");
}

#[tokio::test]
async fn test_body_content_type_wins_over_query() {
    let body = json!({ "data": "hi", "content-type": "image/svg+xml" });
    let response = post(gateway(stub()), "/qr?content-type=text/html", body).await;

    assert_eq!(content_type(&response), "image/svg+xml");
}

#[tokio::test]
async fn test_add_from_json_body() {
    let engine = stub();
    let response = post(gateway(engine.clone()), "/add", json!({ "b": 3, "a": 2 })).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(text(response).await, "5");

    let submitted = engine.submitted();
    assert_eq!(submitted.len(), 1);
    assert_eq!(submitted[0].name, "add");
    assert_eq!(submitted[0].workflow.tasks[0].run.input.args, vec![json!(2), json!(3)]);
}

#[tokio::test]
async fn test_invalid_argument_type() {
    let engine = stub();
    let response = get(gateway(engine.clone()), "/add?a=two&b=3").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert!(!body["details"].as_array().unwrap().is_empty());
    assert!(engine.submitted().is_empty());
}

#[tokio::test]
async fn test_unknown_function() {
    let response = get(gateway(stub()), "/nope?a=1").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_engine_failure() {
    let engine = Arc::new(StubEngine::new(compute).with_failure("workflow rejected"));
    let response = get(gateway(engine), "/add?a=2&b=3").await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json_body(response).await["error"], "workflow rejected");
}

// =============================================================================
// PREVIEW AND DISCOVERY
// =============================================================================

#[tokio::test]
async fn test_workflow_preview_does_not_run() {
    let engine = stub();
    let response = get(gateway(engine.clone()), "/add/workflow?a=2&b=3").await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    let run = &body["workflow"]["tasks"][0]["run"];
    assert_eq!(body["name"], "add");
    assert_eq!(run["op"], "wasm/run");
    assert_eq!(run["rsc"], "ipfs://bafyadd");
    assert_eq!(run["input"]["args"], json!([2, 3]));
    assert!(engine.submitted().is_empty());
}

#[tokio::test]
async fn test_request_schema_includes_content_type() {
    let response = get(gateway(stub()), "/add/schema").await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    let keys: Vec<&String> = body["properties"].as_object().unwrap().keys().collect();
    assert_eq!(keys, ["a", "b", "content-type"]);
}

#[tokio::test]
async fn test_discovery_lists_functions_in_order() {
    let response = get(gateway(stub()), "/").await;

    let body = json_body(response).await;
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|pair| pair[0].as_str().unwrap())
        .collect();
    assert_eq!(names, ["add", "qr"]);
}

// =============================================================================
// BATCH
// =============================================================================

fn chained_batch() -> Value {
    json!({ "tasks": [
        { "run": { "name": "sum", "input": { "func": "add", "args": [1, 2] } } },
        { "run": { "name": "more", "input": { "func": "add", "args": ["{{needs.sum.output}}", 4] } } }
    ] })
}

#[tokio::test]
async fn test_batch_run_with_placeholder() {
    let engine = stub();
    let response = post(gateway(engine.clone()), "/run", chained_batch()).await;

    assert_eq!(response.status(), StatusCode::OK);
    // placeholders resolve engine-side; the stub reads them as 0
    assert_eq!(text(response).await, "4");

    let submitted = engine.submitted();
    assert_eq!(submitted.len(), 1);
    assert_eq!(submitted[0].name, "test");
    let second = &submitted[0].workflow.tasks[1].run;
    assert_eq!(second.name, "more");
    assert_eq!(second.input.args, vec![json!("{{needs.sum.output}}"), json!(4)]);
    assert_eq!(second.rsc, "ipfs://bafyadd");
}

#[tokio::test]
async fn test_batch_all_results() {
    let response = post(gateway(stub()), "/run?allResults=true", chained_batch()).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    let results = body.as_array().unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["out"], json!(3));
    assert_eq!(results[0]["type"], "number");
    assert_eq!(results[0]["headers"]["Content-Type"], "text/plain");
    assert_eq!(results[0]["replayed"], false);
}

#[tokio::test]
async fn test_batch_repeated_flag_last_wins() {
    let response = post(gateway(stub()), "/run?allResults=1&allResults=0", chained_batch()).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(content_type(&response), "text/plain");
    assert_eq!(text(response).await, "4");
}

#[tokio::test]
async fn test_batch_empty_tasks_rejected() {
    let engine = stub();
    let response = post(gateway(engine.clone()), "/run", json!({ "tasks": [] })).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(engine.submitted().is_empty());
}

#[tokio::test]
async fn test_batch_workflow_unknown_function() {
    let body = json!({ "tasks": [
        { "run": { "name": "t", "input": { "func": "ghost", "args": [] } } }
    ] });
    let response = post(gateway(stub()), "/workflow", body).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
