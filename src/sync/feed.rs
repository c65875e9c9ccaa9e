// region:    --- Imports
use crate::store::Item;
use crate::sync::SyncError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
// endregion: --- Imports

// region:    --- Auction Feed Trait
/// 업스트림 경매 서비스 피드 트레이트
#[async_trait]
pub trait AuctionFeed: Send + Sync {
    /// since 이후(초과)로 갱신된 아이템 일괄 조회
    async fn fetch_changed_since(&self, since: DateTime<Utc>) -> Result<Vec<Item>, SyncError>;
}
// endregion: --- Auction Feed Trait

// region:    --- Http Auction Feed
/// 경매 서비스 HTTP 피드 구현체
pub struct HttpAuctionFeed {
    client: reqwest::Client,
    base_url: String,
}

impl HttpAuctionFeed {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl AuctionFeed for HttpAuctionFeed {
    async fn fetch_changed_since(&self, since: DateTime<Utc>) -> Result<Vec<Item>, SyncError> {
        let url = format!("{}/api/auctions", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("date", since.to_rfc3339())])
            .send()
            .await
            .map_err(|e| SyncError::Upstream(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::Upstream(format!("업스트림 응답 상태 {}", status)));
        }

        response
            .json::<Vec<Item>>()
            .await
            .map_err(|e| SyncError::Malformed(e.to_string()))
    }
}
// endregion: --- Http Auction Feed

// region:    --- Mock Feed
/// 테스트용 가짜 업스트림 피드
///
/// 보유한 데이터셋에 since 초과 조건을 적용해 응답하고,
/// 주입된 오류가 있으면 데이터셋보다 먼저 소비한다.
pub struct MockFeed {
    dataset: Mutex<Vec<Item>>,
    failures: Mutex<VecDeque<SyncError>>,
    calls: AtomicUsize,
    last_since: Mutex<Option<DateTime<Utc>>>,
}

impl MockFeed {
    pub fn new() -> Self {
        Self {
            dataset: Mutex::new(Vec::new()),
            failures: Mutex::new(VecDeque::new()),
            calls: AtomicUsize::new(0),
            last_since: Mutex::new(None),
        }
    }

    /// 업스트림 데이터셋에 아이템 추가 (동일 id는 교체)
    pub fn put_item(&self, item: Item) {
        let mut dataset = self.dataset.lock().expect("lock poisoned");
        dataset.retain(|existing| existing.id != item.id);
        dataset.push(item);
    }

    /// 다음 호출에서 반환할 오류 주입
    pub fn push_failure(&self, error: SyncError) {
        self.failures
            .lock()
            .expect("lock poisoned")
            .push_back(error);
    }

    /// 지금까지의 피드 호출 횟수
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// 마지막 호출에 전달된 since 값
    pub fn last_since(&self) -> Option<DateTime<Utc>> {
        *self.last_since.lock().expect("lock poisoned")
    }
}

impl Default for MockFeed {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuctionFeed for MockFeed {
    async fn fetch_changed_since(&self, since: DateTime<Utc>) -> Result<Vec<Item>, SyncError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_since.lock().expect("lock poisoned") = Some(since);

        if let Some(error) = self.failures.lock().expect("lock poisoned").pop_front() {
            return Err(error);
        }

        let mut batch: Vec<Item> = self
            .dataset
            .lock()
            .expect("lock poisoned")
            .iter()
            .filter(|item| item.updated_at > since)
            .cloned()
            .collect();
        batch.sort_by(|a, b| a.updated_at.cmp(&b.updated_at));
        Ok(batch)
    }
}
// endregion: --- Mock Feed
