//! Function HTTP Routes
//!
//! Per-function endpoints generated from the registry. Arguments are always
//! read by parameter name, from the query string (GET) or a JSON object
//! body (POST), and passed to the engine in declared parameter order.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::{Map, Value};

use super::context::FunctionContext;
use super::errors::{ApiError, ApiResult};
use super::query::{coerce_query, insert_content_type, QueryPairs};
use super::state::GatewayState;
use crate::batch::{BatchOutcome, CollectMode};
use crate::response::encode;

/// Build the function routes
pub fn function_routes(state: Arc<GatewayState>) -> Router {
    Router::new()
        .route("/", get(discovery))
        .route("/:name/schema", get(function_schema))
        .route("/:name/workflow", get(workflow_query).post(workflow_body))
        .route("/:name", get(execute_query).post(execute_body))
        .with_state(state)
}

/// Parse a POST body into named arguments; an empty body has none
pub(crate) fn parse_object_body(body: &Bytes) -> ApiResult<Map<String, Value>> {
    if body.is_empty() {
        return Ok(Map::new());
    }
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(input)) => Ok(input),
        Ok(_) => Err(ApiError::InvalidBody(
            "expected a JSON object keyed by parameter name".into(),
        )),
        Err(e) => Err(ApiError::InvalidBody(e.to_string())),
    }
}

// ==================
// Handlers
// ==================

/// GET / - every function's name and schema, in registration order
async fn discovery(State(state): State<Arc<GatewayState>>) -> Json<Vec<(String, Value)>> {
    Json(state.registry.all())
}

/// GET /:name/schema
async fn function_schema(
    State(state): State<Arc<GatewayState>>,
    Path(name): Path<String>,
) -> ApiResult<Json<Value>> {
    let ctx = FunctionContext::resolve(&state, &name)?;
    Ok(Json(ctx.schema.schema().clone()))
}

/// GET /:name/workflow
async fn workflow_query(
    State(state): State<Arc<GatewayState>>,
    Path(name): Path<String>,
    QueryPairs(pairs): QueryPairs,
) -> ApiResult<Response> {
    let ctx = FunctionContext::resolve(&state, &name)?;
    let input = coerce_query(ctx.entry, &pairs);
    preview(&state, &ctx, input)
}

/// POST /:name/workflow
async fn workflow_body(
    State(state): State<Arc<GatewayState>>,
    Path(name): Path<String>,
    QueryPairs(pairs): QueryPairs,
    body: Bytes,
) -> ApiResult<Response> {
    let ctx = FunctionContext::resolve(&state, &name)?;
    let mut input = parse_object_body(&body)?;
    insert_content_type(&mut input, &pairs);
    preview(&state, &ctx, input)
}

/// GET /:name
async fn execute_query(
    State(state): State<Arc<GatewayState>>,
    Path(name): Path<String>,
    QueryPairs(pairs): QueryPairs,
) -> ApiResult<Response> {
    let ctx = FunctionContext::resolve(&state, &name)?;
    let input = coerce_query(ctx.entry, &pairs);
    execute(&state, &ctx, input).await
}

/// POST /:name
///
/// A `content-type` body key takes precedence over `?content-type=`.
async fn execute_body(
    State(state): State<Arc<GatewayState>>,
    Path(name): Path<String>,
    QueryPairs(pairs): QueryPairs,
    body: Bytes,
) -> ApiResult<Response> {
    let ctx = FunctionContext::resolve(&state, &name)?;
    let mut input = parse_object_body(&body)?;
    insert_content_type(&mut input, &pairs);
    execute(&state, &ctx, input).await
}

fn preview(
    state: &GatewayState,
    ctx: &FunctionContext<'_>,
    input: Map<String, Value>,
) -> ApiResult<Response> {
    ctx.validate(&input)?;
    Ok(Json(ctx.workflow(&input, &state.options)).into_response())
}

async fn execute(
    state: &GatewayState,
    ctx: &FunctionContext<'_>,
    input: Map<String, Value>,
) -> ApiResult<Response> {
    ctx.validate(&input)?;
    let workflow = ctx.workflow(&input, &state.options);

    let encoded = match state.runner.run(&workflow, CollectMode::Last).await? {
        BatchOutcome::Last(receipt) => encode(&receipt.out),
        BatchOutcome::All(results) => return Ok(Json(results).into_response()),
    };

    let encoded = match FunctionContext::content_type_override(&input) {
        Some(content_type) => encoded.with_content_type(content_type),
        None => encoded,
    };
    Ok(encoded.into_response())
}
