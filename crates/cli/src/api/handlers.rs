//! Endpoint handlers
//!
//! Each handler forwards its body to one proxy operation. Only an error
//! that escaped the proxy (a configuration problem) becomes a 500.

use axum::{Json, extract::State, http::StatusCode};
use kv_core::{ListQuery, ObjectSummary};

use super::dto::{ErrorResponseDto, SetItemDto};
use super::router::AppState;

type ApiResult<T> = Result<Json<Option<T>>, (StatusCode, Json<ErrorResponseDto>)>;

fn respond<T>(outcome: kv_core::Result<Option<T>>) -> ApiResult<T> {
    outcome.map(Json).map_err(|e| {
        tracing::error!(error = %e, "Storage request failed outside the proxy");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponseDto::new(e.to_string())),
        )
    })
}

/// Store `value` under `key`
pub async fn set_item(State(state): State<AppState>, Json(item): Json<SetItemDto>) -> ApiResult<String> {
    let key = item.key.unwrap_or_default();
    respond(state.proxy.put(&key, &item.value).await)
}

/// Read the value stored under the given key
pub async fn get_item(State(state): State<AppState>, Json(key): Json<String>) -> ApiResult<String> {
    respond(state.proxy.get(&key).await)
}

/// Remove the given key
pub async fn remove_item(
    State(state): State<AppState>,
    Json(key): Json<String>,
) -> ApiResult<String> {
    respond(state.proxy.delete_one(&key).await)
}

/// List items under a prefix
pub async fn list(
    State(state): State<AppState>,
    Json(query): Json<ListQuery>,
) -> ApiResult<Vec<ObjectSummary>> {
    respond(state.proxy.list(&query.prefix, query.limit).await)
}

/// Remove every item under the given prefix
pub async fn clear(State(state): State<AppState>, Json(prefix): Json<String>) -> ApiResult<String> {
    respond(state.proxy.clear(&prefix).await)
}

/// Liveness check
pub async fn health() -> &'static str {
    "ok"
}
