use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use loan_contract::{ContractError, ErrorKind, OperationInfo, Outcome};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::error;

use crate::error::GatewayError;
use crate::join::{find_view, JOIN_VIEWS};
use crate::state::AppState;

/// Body of `POST /v1/invoke`.
#[derive(Debug, Deserialize)]
pub struct InvokeRequest {
    pub function: String,
    #[serde(default)]
    pub args: Vec<String>,
}

/// Body returned with every failure.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub kind: String,
    pub message: String,
}

/// Health check handler.
pub async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Info handler.
pub async fn info_handler(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "name": "loan-gateway",
        "version": env!("CARGO_PKG_VERSION"),
        "operations": state.contract().len(),
        "views": JOIN_VIEWS.iter().map(|view| view.route()).collect::<Vec<_>>(),
    }))
}

/// Lists every operation with its parameter names.
pub async fn operations_handler(State(state): State<Arc<AppState>>) -> Json<Vec<OperationInfo>> {
    Json(state.contract().operations().collect())
}

/// Positional invocation: `{"function": "...", "args": [...]}`.
pub async fn invoke_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<InvokeRequest>,
) -> Response {
    run(&state, &request.function, &request.args).await
}

/// Named-parameter invocation from a JSON object body.
pub async fn named_body_handler(
    State(state): State<Arc<AppState>>,
    Path(function): Path<String>,
    Json(body): Json<Map<String, Value>>,
) -> Response {
    let args = named_args(&state, &function, |param| match body.get(param) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(other) => Some(other.to_string()),
    });
    run(&state, &function, &args).await
}

/// Named-parameter invocation from the query string.
pub async fn named_query_handler(
    State(state): State<Arc<AppState>>,
    Path(function): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let args = named_args(&state, &function, |param| params.get(param).cloned());
    run(&state, &function, &args).await
}

/// Joined view from the query string: `GET /api/{app}/{view}`.
pub async fn join_handler(
    State(state): State<Arc<AppState>>,
    Path((app, view)): Path<(String, String)>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let route = format!("{app}/{view}");
    let Some(join) = find_view(&app, &view) else {
        return outcome_response(&route, ContractError::UnknownOperation(route.clone()).into());
    };
    let args = named_args(&state, join.base, |param| params.get(param).cloned());
    let outcome = state.join(join, &args).await;
    outcome_response(&route, outcome)
}

/// Map named parameters onto the operation's positional arguments, stopping
/// at the first missing one so arity checks behave as for positional calls.
/// Unknown functions map to no arguments and fail at dispatch.
fn named_args(
    state: &AppState,
    function: &str,
    mut lookup: impl FnMut(&str) -> Option<String>,
) -> Vec<String> {
    let Some(operation) = state.contract().operation(function) else {
        return Vec::new();
    };
    operation
        .params()
        .iter()
        .map_while(|param| lookup(param))
        .collect()
}

async fn run(state: &AppState, function: &str, args: &[String]) -> Response {
    match state.invoke(function, args).await {
        Ok(outcome) => outcome_response(function, outcome),
        Err(err) => gateway_error_response(err),
    }
}

fn outcome_response(function: &str, outcome: Outcome) -> Response {
    match outcome {
        Outcome::Success { payload: Some(payload) } => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
            payload,
        )
            .into_response(),
        Outcome::Success { payload: None } => (
            StatusCode::OK,
            Json(json!({ "message": format!("{function} committed") })),
        )
            .into_response(),
        Outcome::Failure { kind, message } => (
            status_for(kind),
            Json(ErrorBody {
                kind: kind.to_string(),
                message,
            }),
        )
            .into_response(),
    }
}

fn gateway_error_response(err: GatewayError) -> Response {
    error!(error = %err, "invocation could not be committed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody {
            kind: ErrorKind::Ledger.to_string(),
            message: err.to_string(),
        }),
    )
        .into_response()
}

/// HTTP status for each failure kind.
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::ArgumentCount | ErrorKind::EmptyArgument => StatusCode::BAD_REQUEST,
        ErrorKind::NotFound | ErrorKind::UnknownOperation => StatusCode::NOT_FOUND,
        ErrorKind::DuplicateKey => StatusCode::CONFLICT,
        ErrorKind::Serialization | ErrorKind::Ledger => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
