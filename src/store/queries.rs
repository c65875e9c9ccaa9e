/// 아이템 업서트 (동일 id는 모든 필드 교체)
pub const UPSERT_ITEM: &str = r#"
    INSERT INTO items (id, make, model, color, seller, winner, created_at, updated_at, auction_end)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
    ON CONFLICT (id) DO UPDATE SET
        make = EXCLUDED.make,
        model = EXCLUDED.model,
        color = EXCLUDED.color,
        seller = EXCLUDED.seller,
        winner = EXCLUDED.winner,
        created_at = EXCLUDED.created_at,
        updated_at = EXCLUDED.updated_at,
        auction_end = EXCLUDED.auction_end
"#;

/// 아이템 단건 조회
pub const GET_ITEM: &str =
    "SELECT id, make, model, color, seller, winner, created_at, updated_at, auction_end FROM items WHERE id = $1";

/// 동기화 워터마크 파생용 최종 갱신 시각 조회
pub const GET_MAX_UPDATED_AT: &str = "SELECT MAX(updated_at) as max_updated_at FROM items";
