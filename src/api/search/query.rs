use axum::{
    extract::{RawQuery, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tracing::Instrument;

use search_backend::auth::token_from_headers;
use search_backend::models::SearchQuery;

use super::types::parse_query_string;
use crate::state::AppState;

/// GET /api/search/query
pub async fn query_get(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    RawQuery(raw): RawQuery,
) -> Response {
    let query = parse_query_string(raw.as_deref().unwrap_or(""));
    run_query(&state, &headers, query).await
}

/// POST /api/search/query - JSON body
pub async fn query_post(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(query): Json<SearchQuery>,
) -> Response {
    run_query(&state, &headers, query).await
}

async fn run_query(state: &AppState, headers: &HeaderMap, query: SearchQuery) -> Response {
    let request_id = uuid::Uuid::new_v4();
    let span = tracing::info_span!("search_query", %request_id);

    async move {
        tracing::info!(
            "Search request received: term=\"{}\", filters={}, types={}, pageCursor={}",
            query.term,
            serde_json::to_string(&query.filters).unwrap_or_default(),
            query.types.as_ref().map(|t| t.join(",")).unwrap_or_default(),
            query.page_cursor.as_deref().unwrap_or("")
        );

        // read once per request / 每个请求只读取一次
        let token = token_from_headers(headers);
        let filtering_enabled = state.filtering_enabled();

        match state
            .dispatcher
            .execute(&query, token.as_ref(), filtering_enabled)
            .await
        {
            Ok(result_set) => {
                tracing::debug!("Search returned {} results", result_set.results.len());
                Json(result_set).into_response()
            }
            Err(e) => {
                tracing::warn!("Search request rejected: {}", e.public_message());
                (e.status_code(), e.public_message()).into_response()
            }
        }
    }
    .instrument(span)
    .await
}
