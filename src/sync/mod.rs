// 업스트림 경매 서비스의 변경분을 내려받아 레플리카 저장소에 반영하는 동기화 워커.
// 커서(워터마크)는 저장소의 MAX(updated_at)에서 매 사이클 파생하므로 별도 체크포인트가 없고,
// 부분 반영 후 중단되어도 다음 사이클이 남은 구간을 다시 받아 수렴한다.

// region:    --- Modules
pub mod feed;

pub use feed::{AuctionFeed, HttpAuctionFeed, MockFeed};
// endregion: --- Modules

// region:    --- Imports
use crate::store::{ItemStore, StoreError};
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{interval, sleep};
use tracing::{debug, error, info, warn};
// endregion: --- Imports

// region:    --- Sync Error
/// 동기화 사이클 오류
#[derive(Debug, Error)]
pub enum SyncError {
    /// 업스트림 요청 실패 (네트워크, 타임아웃, 오류 응답)
    #[error("업스트림 요청 실패: {0}")]
    Upstream(String),
    /// 해석할 수 없는 업스트림 응답 (배치 전체 폐기)
    #[error("업스트림 응답 해석 실패: {0}")]
    Malformed(String),
    /// 배치 반영 중 저장소 오류 (이미 반영된 접두 구간은 유지)
    #[error("저장소 반영 실패: {0}")]
    Store(#[from] StoreError),
}

impl SyncError {
    /// 백오프 후 재시도할 일시 오류인지 여부
    pub fn is_transient(&self) -> bool {
        matches!(self, SyncError::Upstream(_) | SyncError::Malformed(_))
    }
}
// endregion: --- Sync Error

// region:    --- Sync State
/// 동기화 워커 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Idle,
    Fetching,
    Applying,
    Backoff,
}

/// 한 사이클의 결과 요약
#[derive(Debug, Clone)]
pub struct SyncReport {
    /// 이번 사이클이 사용한 워터마크
    pub watermark: DateTime<Utc>,
    /// 업스트림에서 수신한 아이템 수
    pub fetched: usize,
    /// 저장소에 반영된 아이템 수
    pub applied: usize,
}

/// 누적 동기화 통계
#[derive(Debug, Default)]
pub struct SyncStats {
    cycles: AtomicU64,
    items_applied: AtomicU64,
    transient_failures: AtomicU64,
}

impl SyncStats {
    pub fn cycles_completed(&self) -> u64 {
        self.cycles.load(Ordering::Relaxed)
    }

    pub fn items_applied(&self) -> u64 {
        self.items_applied.load(Ordering::Relaxed)
    }

    pub fn transient_failures(&self) -> u64 {
        self.transient_failures.load(Ordering::Relaxed)
    }

    fn record_cycle(&self, applied: usize) {
        self.cycles.fetch_add(1, Ordering::Relaxed);
        self.record_applied(applied);
    }

    /// 부분 반영으로 끝난 사이클도 반영된 건수는 누적한다
    fn record_applied(&self, applied: usize) {
        self.items_applied.fetch_add(applied as u64, Ordering::Relaxed);
    }

    fn record_transient_failure(&self) {
        self.transient_failures.fetch_add(1, Ordering::Relaxed);
    }
}
// endregion: --- Sync State

// region:    --- Sync Config
/// 동기화 워커 설정
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// 사이클 간격
    pub interval: Duration,
    /// 일시 오류 후 추가 대기 시간
    pub backoff: Duration,
    /// 업스트림 요청 타임아웃
    pub request_timeout: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(10),
            backoff: Duration::from_secs(5),
            request_timeout: Duration::from_secs(10),
        }
    }
}

impl SyncConfig {
    /// 환경 변수에서 설정 읽기 (없거나 해석 불가면 기본값)
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(secs) = env_secs("SYNC_INTERVAL_SECS") {
            config.interval = secs;
        }
        if let Some(secs) = env_secs("SYNC_BACKOFF_SECS") {
            config.backoff = secs;
        }
        if let Some(secs) = env_secs("SYNC_REQUEST_TIMEOUT_SECS") {
            config.request_timeout = secs;
        }
        config
    }
}

fn env_secs(key: &str) -> Option<Duration> {
    std::env::var(key)
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .map(Duration::from_secs)
}
// endregion: --- Sync Config

// region:    --- Sync Worker
/// 변경분 동기화 워커
pub struct SyncWorker<S, F> {
    store: Arc<S>,
    feed: Arc<F>,
    config: SyncConfig,
    state_tx: watch::Sender<SyncState>,
    busy: Mutex<()>,
    stats: SyncStats,
}

impl<S: ItemStore + 'static, F: AuctionFeed + 'static> SyncWorker<S, F> {
    pub fn new(store: Arc<S>, feed: Arc<F>, config: SyncConfig) -> Self {
        let (state_tx, _) = watch::channel(SyncState::Idle);
        Self {
            store,
            feed,
            config,
            state_tx,
            busy: Mutex::new(()),
            stats: SyncStats::default(),
        }
    }

    /// 현재 워커 상태
    pub fn state(&self) -> SyncState {
        *self.state_tx.borrow()
    }

    /// 상태 변화 구독
    pub fn subscribe_state(&self) -> watch::Receiver<SyncState> {
        self.state_tx.subscribe()
    }

    pub fn stats(&self) -> &SyncStats {
        &self.stats
    }

    fn set_state(&self, state: SyncState) {
        self.state_tx.send_replace(state);
    }

    /// 동기화 한 사이클 실행
    ///
    /// 이전 사이클이 아직 진행 중이면 아무 것도 하지 않고 Ok(None)을 반환한다.
    /// 일시 오류는 상태를 Backoff로 남기고, 저장소 오류는 Idle로 복귀해
    /// 다음 틱이 낮아진 워터마크에서 다시 시도하게 한다.
    pub async fn tick(&self) -> Result<Option<SyncReport>, SyncError> {
        let Ok(_guard) = self.busy.try_lock() else {
            warn!("{:<12} --> 이전 동기화 틱이 아직 진행 중이므로 건너뜀", "Sync");
            return Ok(None);
        };

        match self.run_cycle().await {
            Ok(report) => {
                self.stats.record_cycle(report.applied);
                self.set_state(SyncState::Idle);
                Ok(Some(report))
            }
            Err(e) if e.is_transient() => {
                self.stats.record_transient_failure();
                self.set_state(SyncState::Backoff);
                Err(e)
            }
            Err(e) => {
                self.set_state(SyncState::Idle);
                Err(e)
            }
        }
    }

    async fn run_cycle(&self) -> Result<SyncReport, SyncError> {
        self.set_state(SyncState::Fetching);
        let watermark = self.watermark().await?;
        debug!("{:<12} --> 워터마크 {} 이후 변경분 조회", "Sync", watermark);
        let mut batch = self.feed.fetch_changed_since(watermark).await?;
        let fetched = batch.len();

        // 도착 순서와 무관하게 오름차순으로 반영한다.
        // 부분 반영으로 끊겨도 남은 항목의 updated_at이 파생 워터마크보다 뒤에 있어야
        // 다음 사이클이 그 구간을 다시 받는다.
        batch.sort_by_key(|item| item.updated_at);

        self.set_state(SyncState::Applying);
        let mut applied = 0usize;
        for item in &batch {
            if let Err(e) = self.store.upsert(item).await {
                error!(
                    "{:<12} --> 업서트 실패 (id {}, 반영 {}건): {}",
                    "Sync", item.id, applied, e
                );
                self.stats.record_applied(applied);
                return Err(SyncError::Store(e));
            }
            applied += 1;
        }

        Ok(SyncReport {
            watermark,
            fetched,
            applied,
        })
    }

    /// 저장소에서 워터마크 파생 (비어 있으면 Unix epoch)
    async fn watermark(&self) -> Result<DateTime<Utc>, SyncError> {
        Ok(self
            .store
            .max_updated_at()
            .await?
            .unwrap_or(DateTime::UNIX_EPOCH))
    }

    /// 주기적 동기화 루프 시작
    pub fn start(self: Arc<Self>) -> SyncHandle {
        let worker = self;
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(async move {
            let mut ticker = interval(worker.config.interval);
            info!(
                "{:<12} --> 동기화 루프 시작 (주기 {:?})",
                "Sync", worker.config.interval
            );
            loop {
                tokio::select! {
                    _ = ticker.tick() => {}
                    _ = shutdown_rx.changed() => break,
                }
                match worker.tick().await {
                    Ok(Some(report)) => {
                        if report.fetched == 0 {
                            debug!(
                                "{:<12} --> 변경분 없음 (워터마크 {})",
                                "Sync", report.watermark
                            );
                        } else {
                            info!(
                                "{:<12} --> 동기화 완료: 수신 {}건, 반영 {}건 (워터마크 {})",
                                "Sync", report.fetched, report.applied, report.watermark
                            );
                        }
                    }
                    Ok(None) => {}
                    Err(e) if e.is_transient() => {
                        warn!(
                            "{:<12} --> 업스트림 오류, {:?} 후 재시도: {}",
                            "Sync", worker.config.backoff, e
                        );
                        sleep(worker.config.backoff).await;
                        worker.set_state(SyncState::Idle);
                    }
                    Err(e) => {
                        error!("{:<12} --> 동기화 실패, 다음 틱에서 재시도: {}", "Sync", e);
                    }
                }
            }
            info!("{:<12} --> 동기화 루프 종료", "Sync");
        });
        SyncHandle { shutdown_tx, task }
    }
}
// endregion: --- Sync Worker

// region:    --- Sync Handle
/// 동기화 루프 제어 핸들 (핸들이 버려지면 루프도 함께 종료된다)
pub struct SyncHandle {
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SyncHandle {
    /// 다음 Idle 경계에서 루프를 멈추고 종료를 기다림
    ///
    /// 반영 중인 배치는 끝까지 적용한 뒤에 멈춘다.
    pub async fn stop(self) {
        let _ = self.shutdown_tx.send(true);
        let _ = self.task.await;
    }
}
// endregion: --- Sync Handle
