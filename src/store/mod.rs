// region:    --- Modules
pub mod memory;
pub mod model;
pub mod pg;
mod queries;

pub use memory::MemoryItemStore;
pub use model::{FilterBy, Item, ItemQuery, OrderBy, QueryPage, ENDING_SOON_WINDOW_HOURS};
pub use pg::PgItemStore;
// endregion: --- Modules

// region:    --- Imports
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
// endregion: --- Imports

pub type StoreResult<T> = Result<T, StoreError>;

// region:    --- Store Error
/// 저장 계층 오류
#[derive(Debug, Error)]
pub enum StoreError {
    /// 데이터베이스 접근 실패
    #[error("저장소 오류: {0}")]
    Database(#[from] sqlx::Error),
    /// 잘못 구성된 질의 계획
    #[error("질의 구성 오류: {0}")]
    Query(String),
}
// endregion: --- Store Error

// region:    --- Item Store Trait
/// 아이템 레플리카 저장소 트레이트
#[async_trait]
pub trait ItemStore: Send + Sync {
    /// 아이템 저장 (동일 id가 있으면 모든 필드 교체)
    async fn upsert(&self, item: &Item) -> StoreResult<()>;

    /// id로 아이템 단건 조회
    async fn get(&self, id: &str) -> StoreResult<Option<Item>>;

    /// 저장된 아이템 중 가장 늦은 updated_at (비어 있으면 None)
    async fn max_updated_at(&self) -> StoreResult<Option<DateTime<Utc>>>;

    /// 질의 계획 실행: 필터 전체 건수와 요청 페이지 반환
    async fn query(&self, query: &ItemQuery) -> StoreResult<QueryPage>;
}
// endregion: --- Item Store Trait

/// 질의 계획 구성 검사
pub(crate) fn validate_query(query: &ItemQuery) -> StoreResult<()> {
    if query.page_number < 1 || query.page_size < 1 {
        return Err(StoreError::Query(format!(
            "잘못된 페이지 구성: page_number={}, page_size={}",
            query.page_number, query.page_size
        )));
    }
    Ok(())
}
