// region:    --- Imports
use crate::store::{FilterBy, Item, ItemQuery, ItemStore, OrderBy, StoreError};
use serde::{Deserialize, Serialize};
use tracing::info;
// endregion: --- Imports

/// 페이지 크기 기본값
pub const DEFAULT_PAGE_SIZE: i64 = 10;
/// 페이지 크기 상한
pub const MAX_PAGE_SIZE: i64 = 100;

// region:    --- Search Params
/// 검색 요청 파라미터 (값 검증 전, 바인딩 계층이 채운 그대로)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchParams {
    pub search_term: Option<String>,
    pub order_by: Option<String>,
    pub filter_by: Option<String>,
    pub seller: Option<String>,
    pub winner: Option<String>,
    pub page_number: i64,
    pub page_size: i64,
}

/// 검색 결과 페이지
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResults {
    pub results: Vec<Item>,
    pub page_count: i64,
    pub total_count: i64,
}
// endregion: --- Search Params

// region:    --- Search Engine
/// 요청 파라미터를 질의 계획으로 정규화
///
/// 빈 문자열 조건은 없는 것으로 보고, 페이지 번호/크기는 유효 범위로 보정한다.
pub fn build_query(params: &SearchParams) -> ItemQuery {
    let term = params
        .search_term
        .as_deref()
        .map(str::trim)
        .filter(|term| !term.is_empty())
        .map(str::to_string);
    let page_number = params.page_number.max(1);
    let page_size = if params.page_size < 1 {
        DEFAULT_PAGE_SIZE
    } else {
        params.page_size.min(MAX_PAGE_SIZE)
    };

    ItemQuery {
        term,
        order_by: OrderBy::parse(params.order_by.as_deref()),
        filter_by: FilterBy::parse(params.filter_by.as_deref()),
        seller: params.seller.clone().filter(|seller| !seller.is_empty()),
        winner: params.winner.clone().filter(|winner| !winner.is_empty()),
        page_number,
        page_size,
    }
}

/// 아이템 검색 실행
pub async fn search_items<S: ItemStore>(
    store: &S,
    params: &SearchParams,
) -> Result<SearchResults, StoreError> {
    let query = build_query(params);
    info!("{:<12} --> 아이템 검색: {:?}", "Search", query);

    let page = store.query(&query).await?;
    // 올림 나눗셈 (page_size는 보정을 거쳐 1 이상)
    let page_count = (page.total_count + query.page_size - 1) / query.page_size;

    Ok(SearchResults {
        results: page.items,
        page_count,
        total_count: page.total_count,
    })
}
// endregion: --- Search Engine
