pub mod search;
pub mod server;

use axum::{routing::get, Router};
use std::sync::Arc;

use crate::state::AppState;

/// Build the HTTP router / 构建路由
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(server::health_check))
        .route(
            "/api/search/query",
            get(search::query_get).post(search::query_post),
        )
        .with_state(state)
}
