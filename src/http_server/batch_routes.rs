//! Batch HTTP Routes
//!
//! `POST /run` executes several invocations as one workflow;
//! `POST /workflow` only builds that workflow.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::Value;

use super::errors::{ApiError, ApiResult};
use super::query::QueryPairs;
use super::state::GatewayState;
use crate::batch::{BatchOutcome, CollectMode};
use crate::response::encode;
use crate::workflow::{build_batch, BatchRequest, Workflow};

/// Build the batch routes
pub fn batch_routes(state: Arc<GatewayState>) -> Router {
    Router::new()
        .route("/run", post(run_batch))
        .route("/workflow", post(build_batch_workflow))
        .with_state(state)
}

/// Query flag switching `POST /run` to all-results mode
pub const ALL_RESULTS_PARAM: &str = "allResults";

#[derive(Debug, Default)]
pub struct RunParams {
    pub all_results: Option<String>,
}

impl RunParams {
    /// Read the flag; when repeated, the last value wins
    pub fn from_query(query: &QueryPairs) -> Self {
        Self {
            all_results: query.last(ALL_RESULTS_PARAM).map(str::to_string),
        }
    }

    /// On when present and not `""`, `false` or `0`
    pub fn collect_mode(&self) -> CollectMode {
        match self.all_results.as_deref() {
            None | Some("") | Some("false") | Some("0") => CollectMode::Last,
            Some(_) => CollectMode::All,
        }
    }
}

fn parse_json(body: &Bytes) -> ApiResult<Value> {
    serde_json::from_slice(body).map_err(|e| ApiError::InvalidBody(e.to_string()))
}

fn parse_batch(body: Value) -> ApiResult<BatchRequest> {
    serde_json::from_value(body).map_err(|e| ApiError::InvalidBody(e.to_string()))
}

/// POST /run
async fn run_batch(
    State(state): State<Arc<GatewayState>>,
    query: QueryPairs,
    body: Bytes,
) -> ApiResult<Response> {
    let params = RunParams::from_query(&query);
    let body = parse_json(&body)?;
    state.schemas.validate_batch(&body)?;

    let request = parse_batch(body)?;
    let invocations = build_batch(&state.registry, request.tasks, &state.options)?;
    let workflow = Workflow::new(&state.batch_workflow_name, invocations);

    match state.runner.run(&workflow, params.collect_mode()).await? {
        BatchOutcome::Last(receipt) => Ok(encode(&receipt.out).into_response()),
        BatchOutcome::All(results) => Ok(Json(results).into_response()),
    }
}

/// POST /workflow
async fn build_batch_workflow(
    State(state): State<Arc<GatewayState>>,
    body: Bytes,
) -> ApiResult<Json<Workflow>> {
    let request = parse_batch(parse_json(&body)?)?;
    let invocations = build_batch(&state.registry, request.tasks, &state.options)?;
    Ok(Json(Workflow::new(&state.batch_workflow_name, invocations)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mode(flag: Option<&str>) -> CollectMode {
        RunParams {
            all_results: flag.map(str::to_string),
        }
        .collect_mode()
    }

    #[test]
    fn test_all_results_flag() {
        assert_eq!(mode(None), CollectMode::Last);
        assert_eq!(mode(Some("")), CollectMode::Last);
        assert_eq!(mode(Some("false")), CollectMode::Last);
        assert_eq!(mode(Some("0")), CollectMode::Last);
        assert_eq!(mode(Some("true")), CollectMode::All);
        assert_eq!(mode(Some("1")), CollectMode::All);
    }

    #[test]
    fn test_repeated_flag_last_wins() {
        let query = QueryPairs(vec![
            (ALL_RESULTS_PARAM.to_string(), "1".to_string()),
            (ALL_RESULTS_PARAM.to_string(), "0".to_string()),
        ]);
        assert_eq!(RunParams::from_query(&query).collect_mode(), CollectMode::Last);
    }
}
