use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use kv_core::StorageProxy;
use tower_http::trace::TraceLayer;

use super::handlers::{clear, get_item, health, list, remove_item, set_item};

/// Application state shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub proxy: Arc<StorageProxy>,
}

impl AppState {
    pub fn new(proxy: StorageProxy) -> Self {
        Self {
            proxy: Arc::new(proxy),
        }
    }
}

/// Create the router with every storage endpoint
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/storage/SetItem", post(set_item))
        .route("/api/storage/GetItem", post(get_item))
        .route("/api/storage/RemoveItem", post(remove_item))
        .route("/api/storage/List", post(list))
        .route("/api/storage/Clear", post(clear))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
