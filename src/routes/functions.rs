use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::Value;

use crate::handlers;
use crate::state::AppState;

/// The generic function-run entry point. Logical operations are addressed by
/// the routing ids in the config; an unknown id is a 404 before any handler
/// runs.
async fn dispatch(state: &AppState, id: &str, body: Value) -> Response {
    let functions = &state.config.functions;

    if id == functions.list_messages {
        handlers::list_messages(&state.db, parse(body)).await.into_response()
    } else if id == functions.get_message {
        handlers::get_message(&state.db, parse(body)).await.into_response()
    } else if id == functions.send_message {
        handlers::create_message(&state.db, parse(body)).await.into_response()
    } else {
        (StatusCode::NOT_FOUND, "Unknown function").into_response()
    }
}

// A body that doesn't match the handler's shape degrades to an empty request,
// which the handler rejects with its own field-specific 400.
fn parse<T: serde::de::DeserializeOwned + Default>(body: Value) -> T {
    serde_json::from_value(body).unwrap_or_default()
}

async fn run_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    dispatch(&state, &id, body).await
}

async fn run_get(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    dispatch(&state, &id, Value::Null).await
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/functions/run/{id}", get(run_get).post(run_post))
}
