// region:    --- Imports
use axum::{routing::get, Router};
use search_service::database::DatabaseManager;
use search_service::handlers;
use search_service::store::PgItemStore;
use search_service::sync::{HttpAuctionFeed, SyncConfig, SyncWorker};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};
// endregion: --- Imports

// region:    --- Main
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // logging 초기화
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .without_time()
        .with_target(false)
        .init();

    // DatabaseManager 생성
    let db_manager = Arc::new(DatabaseManager::new().await);

    // 데이터베이스 초기화
    if let Err(e) = db_manager.initialize_database().await {
        error!("{:<12} --> 데이터베이스 초기화 실패: {:?}", "Main", e);
        return Err(e.into());
    }
    info!("{:<12} --> 데이터베이스 초기화 성공", "Main");

    // 레플리카 저장소 생성
    let store = Arc::new(PgItemStore::new(db_manager.get_pool()));

    // 동기화 워커 시작
    let config = SyncConfig::from_env();
    let auction_url = std::env::var("AUCTION_SERVICE_URL")
        .unwrap_or_else(|_| "http://localhost:7003".to_string());
    let feed = Arc::new(HttpAuctionFeed::new(auction_url, config.request_timeout));
    let worker = Arc::new(SyncWorker::new(Arc::clone(&store), feed, config));
    let sync_handle = worker.start();
    info!("{:<12} --> 동기화 워커 시작", "Main");

    // 테스트 페이지를 위한 cors 설정
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // 라우터 설정
    let routes_all = Router::new()
        .route("/api/search", get(handlers::handle_search))
        .route("/api/search/:id", get(handlers::handle_get_item))
        .layer(cors)
        .with_state(store);

    // 리스너 생성(로컬 호스트의 3000번 포트를 사용)
    let listener = TcpListener::bind("0.0.0.0:3000").await.unwrap();
    info!(
        "{:<12} --> Web Server: Listening on {}",
        "Main",
        listener.local_addr().unwrap()
    );

    // 서버 실행
    let serve = axum::serve(listener, routes_all.into_make_service())
        .with_graceful_shutdown(shutdown_signal());
    if let Err(err) = serve.await {
        error!("{:<12} --> Server error: {}", "Main", err);
    }

    // 반영 중인 배치를 마친 뒤 동기화 루프 정지
    sync_handle.stop().await;
    info!("{:<12} --> 동기화 워커 정지", "Main");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("{:<12} --> 종료 시그널 수신 실패: {}", "Main", e);
    }
}
// endregion: --- Main
