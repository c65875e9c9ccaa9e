use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// endingSoon 필터 기준 구간 (시간)
pub const ENDING_SOON_WINDOW_HOURS: i64 = 6;

// 검색 레플리카 아이템 모델
// 진행/종료 상태는 저장하지 않고 auction_end와 현재 시각으로 파생한다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: String,
    pub make: String,
    pub model: String,
    pub color: String,
    pub seller: String,
    pub winner: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub auction_end: DateTime<Utc>,
}

// 정렬 선택자
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderBy {
    /// 제조사 오름차순
    Make,
    /// 최신 등록 순 (created_at 내림차순)
    New,
    /// 경매 종료 임박 순 (auction_end 오름차순)
    #[default]
    AuctionEnd,
}

impl OrderBy {
    /// 선택자 문자열 해석 (인식 불가 값은 기본 정렬로)
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("make") => OrderBy::Make,
            Some("new") => OrderBy::New,
            _ => OrderBy::AuctionEnd,
        }
    }
}

// 상태 필터 선택자
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterBy {
    /// 종료된 경매 (auction_end < now)
    Finished,
    /// 곧 종료되는 경매 (now < auction_end < now + 6h)
    EndingSoon,
    /// 진행 중인 경매 (auction_end > now)
    #[default]
    Live,
}

impl FilterBy {
    /// 선택자 문자열 해석 (인식 불가 값은 기본 필터로)
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("finished") => FilterBy::Finished,
            Some("endingSoon") => FilterBy::EndingSoon,
            _ => FilterBy::Live,
        }
    }
}

/// 저장소에 내리는 질의 계획 (범위 보정은 검색 엔진에서 끝난 상태)
#[derive(Debug, Clone)]
pub struct ItemQuery {
    pub term: Option<String>,
    pub order_by: OrderBy,
    pub filter_by: FilterBy,
    pub seller: Option<String>,
    pub winner: Option<String>,
    /// 1부터 시작하는 페이지 번호
    pub page_number: i64,
    pub page_size: i64,
}

impl ItemQuery {
    /// 페이지 시작 오프셋 (범위를 넘는 페이지 번호는 포화 연산으로 빈 페이지가 된다)
    pub fn offset(&self) -> i64 {
        self.page_number
            .saturating_sub(1)
            .saturating_mul(self.page_size)
    }
}

/// 질의 결과 한 페이지와 필터 전체 일치 건수
#[derive(Debug, Clone)]
pub struct QueryPage {
    pub items: Vec<Item>,
    pub total_count: i64,
}
