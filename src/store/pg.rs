// region:    --- Imports
use crate::store::model::{FilterBy, Item, ItemQuery, OrderBy, QueryPage, ENDING_SOON_WINDOW_HOURS};
use crate::store::{queries, validate_query, ItemStore, StoreResult};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use std::sync::Arc;
// endregion: --- Imports

// region:    --- Postgres Item Store
/// Postgres 기반 레플리카 저장소
pub struct PgItemStore {
    pool: Arc<PgPool>,
}

impl PgItemStore {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ItemStore for PgItemStore {
    async fn upsert(&self, item: &Item) -> StoreResult<()> {
        sqlx::query(queries::UPSERT_ITEM)
            .bind(&item.id)
            .bind(&item.make)
            .bind(&item.model)
            .bind(&item.color)
            .bind(&item.seller)
            .bind(&item.winner)
            .bind(item.created_at)
            .bind(item.updated_at)
            .bind(item.auction_end)
            .execute(&*self.pool)
            .await?;
        Ok(())
    }

    async fn get(&self, id: &str) -> StoreResult<Option<Item>> {
        let item = sqlx::query_as::<_, Item>(queries::GET_ITEM)
            .bind(id)
            .fetch_optional(&*self.pool)
            .await?;
        Ok(item)
    }

    async fn max_updated_at(&self) -> StoreResult<Option<DateTime<Utc>>> {
        let max = sqlx::query_scalar::<_, Option<DateTime<Utc>>>(queries::GET_MAX_UPDATED_AT)
            .fetch_one(&*self.pool)
            .await?;
        Ok(max)
    }

    async fn query(&self, query: &ItemQuery) -> StoreResult<QueryPage> {
        validate_query(query)?;

        // 건수와 페이지 질의가 같은 기준 시각을 공유해야 한다
        let now = Utc::now();

        // 필터 전체 일치 건수 (페이지 범위를 벗어난 요청에도 유효해야 함)
        let mut count_builder: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM items WHERE ");
        push_predicate(&mut count_builder, query, now);
        let total_count: i64 = count_builder
            .build_query_scalar()
            .fetch_one(&*self.pool)
            .await?;

        // 요청 페이지
        let mut page_builder: QueryBuilder<Postgres> = QueryBuilder::new(
            "SELECT id, make, model, color, seller, winner, created_at, updated_at, auction_end FROM items WHERE ",
        );
        push_predicate(&mut page_builder, query, now);

        page_builder.push(" ORDER BY ");
        if let Some(term) = &query.term {
            // 검색어가 있으면 연관도 순위가 정렬 기준보다 우선한다
            page_builder
                .push("ts_rank(textsearch, plainto_tsquery('simple', ")
                .push_bind(term.as_str())
                .push(")) DESC, ");
        }
        page_builder.push(match query.order_by {
            OrderBy::Make => "make ASC, id ASC",
            OrderBy::New => "created_at DESC, id ASC",
            OrderBy::AuctionEnd => "auction_end ASC, id ASC",
        });
        page_builder.push(" LIMIT ").push_bind(query.page_size);
        page_builder.push(" OFFSET ").push_bind(query.offset());

        let items = page_builder
            .build_query_as::<Item>()
            .fetch_all(&*self.pool)
            .await?;

        Ok(QueryPage { items, total_count })
    }
}
// endregion: --- Postgres Item Store

/// 상태 필터, 검색어, 판매자/낙찰자 조건을 WHERE 절에 구성
fn push_predicate<'a>(
    builder: &mut QueryBuilder<'a, Postgres>,
    query: &'a ItemQuery,
    now: DateTime<Utc>,
) {
    match query.filter_by {
        FilterBy::Finished => {
            builder.push("auction_end < ").push_bind(now);
        }
        FilterBy::EndingSoon => {
            builder
                .push("auction_end > ")
                .push_bind(now)
                .push(" AND auction_end < ")
                .push_bind(now + Duration::hours(ENDING_SOON_WINDOW_HOURS));
        }
        FilterBy::Live => {
            builder.push("auction_end > ").push_bind(now);
        }
    }
    if let Some(term) = &query.term {
        builder
            .push(" AND textsearch @@ plainto_tsquery('simple', ")
            .push_bind(term.as_str())
            .push(")");
    }
    if let Some(seller) = &query.seller {
        builder.push(" AND seller = ").push_bind(seller.as_str());
    }
    if let Some(winner) = &query.winner {
        builder.push(" AND winner = ").push_bind(winner.as_str());
    }
}
