// region:    --- Imports
use crate::store::model::{FilterBy, Item, ItemQuery, OrderBy, QueryPage, ENDING_SOON_WINDOW_HOURS};
use crate::store::{validate_query, ItemStore, StoreResult};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use std::cmp::Ordering;
// endregion: --- Imports

// region:    --- Memory Item Store
/// 인메모리 레플리카 저장소 (테스트와 로컬 실행용)
///
/// 키 단위 동시 쓰기를 허용해야 하므로 전역 잠금 없이 DashMap을 사용한다.
pub struct MemoryItemStore {
    items: DashMap<String, Item>,
}

impl MemoryItemStore {
    pub fn new() -> Self {
        Self {
            items: DashMap::new(),
        }
    }

    /// 저장된 아이템 수
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Default for MemoryItemStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ItemStore for MemoryItemStore {
    async fn upsert(&self, item: &Item) -> StoreResult<()> {
        self.items.insert(item.id.clone(), item.clone());
        Ok(())
    }

    async fn get(&self, id: &str) -> StoreResult<Option<Item>> {
        Ok(self.items.get(id).map(|entry| entry.value().clone()))
    }

    async fn max_updated_at(&self) -> StoreResult<Option<DateTime<Utc>>> {
        Ok(self.items.iter().map(|entry| entry.value().updated_at).max())
    }

    async fn query(&self, query: &ItemQuery) -> StoreResult<QueryPage> {
        validate_query(query)?;

        let now = Utc::now();
        let tokens = query.term.as_deref().map(tokenize);

        // 필터/조건 일치 아이템과 연관도 점수 수집
        let mut hits: Vec<(Item, usize)> = Vec::new();
        for entry in self.items.iter() {
            let item = entry.value();
            if !matches_filter(item, query.filter_by, now) {
                continue;
            }
            if let Some(seller) = &query.seller {
                if &item.seller != seller {
                    continue;
                }
            }
            if let Some(winner) = &query.winner {
                if item.winner.as_deref() != Some(winner.as_str()) {
                    continue;
                }
            }
            let score = match &tokens {
                Some(tokens) => {
                    let score = relevance(item, tokens);
                    if score == 0 {
                        continue;
                    }
                    score
                }
                None => 0,
            };
            hits.push((item.clone(), score));
        }

        // 연관도 내림차순이 정렬 기준보다 우선, 동률은 id로 안정화
        hits.sort_by(|a, b| {
            b.1.cmp(&a.1)
                .then_with(|| compare_by_order(&a.0, &b.0, query.order_by))
                .then_with(|| a.0.id.cmp(&b.0.id))
        });

        let total_count = hits.len() as i64;
        let items = hits
            .into_iter()
            .skip(query.offset() as usize)
            .take(query.page_size as usize)
            .map(|(item, _)| item)
            .collect();

        Ok(QueryPage { items, total_count })
    }
}
// endregion: --- Memory Item Store

// region:    --- Query Helpers
fn matches_filter(item: &Item, filter: FilterBy, now: DateTime<Utc>) -> bool {
    match filter {
        FilterBy::Finished => item.auction_end < now,
        FilterBy::EndingSoon => {
            item.auction_end > now
                && item.auction_end < now + Duration::hours(ENDING_SOON_WINDOW_HOURS)
        }
        FilterBy::Live => item.auction_end > now,
    }
}

fn compare_by_order(a: &Item, b: &Item, order_by: OrderBy) -> Ordering {
    match order_by {
        OrderBy::Make => a.make.cmp(&b.make),
        OrderBy::New => b.created_at.cmp(&a.created_at),
        OrderBy::AuctionEnd => a.auction_end.cmp(&b.auction_end),
    }
}

/// 검색어 토큰 중 make/model/color에 나타나는 토큰 수
fn relevance(item: &Item, tokens: &[String]) -> usize {
    let haystack = format!("{} {} {}", item.make, item.model, item.color).to_lowercase();
    tokens
        .iter()
        .filter(|token| haystack.contains(token.as_str()))
        .count()
}

fn tokenize(term: &str) -> Vec<String> {
    term.to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}
// endregion: --- Query Helpers
