// region:    --- Imports
use crate::search::{self, SearchParams};
use crate::store::{ItemStore, PgItemStore};
use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use std::sync::Arc;
use tracing::info;

// endregion: --- Imports

// region:    --- Search Handlers

/// 아이템 검색 요청 처리
pub async fn handle_search(
    State(store): State<Arc<PgItemStore>>,
    Query(params): Query<SearchParams>,
) -> impl IntoResponse {
    info!("{:<12} --> 검색 요청 처리 시작: {:?}", "Handler", params);

    match search::search_items(&*store, &params).await {
        Ok(results) => Json(results).into_response(),
        Err(e) => (
            axum::http::StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({
                "error": e.to_string()
            })),
        )
            .into_response(),
    }
}

/// 아이템 단건 조회
pub async fn handle_get_item(
    State(store): State<Arc<PgItemStore>>,
    Path(item_id): Path<String>,
) -> impl IntoResponse {
    info!("{:<12} --> 아이템 조회 id: {}", "Handler", item_id);

    match store.get(&item_id).await {
        Ok(Some(item)) => Json(item).into_response(),
        Ok(None) => axum::http::StatusCode::NOT_FOUND.into_response(),
        Err(e) => (axum::http::StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

// endregion: --- Search Handlers
