//! # goyo 웹 서버 진입점
//!
//! 명상 타이머 웹 페이지와 에셋을 서빙하는 정적 파일 서버입니다.
//!
//! 이 파일이 수행하는 작업:
//! 1. 환경변수(.env) 로딩
//! 2. 로깅(tracing) 초기화
//! 3. 설정 로딩
//! 4. 라우터 구성
//! 5. HTTP 서버 시작, Ctrl+C로 정상 종료

use anyhow::Result;
use goyo::{
    config::Config,
    routes::{self, AppState},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // ── 1단계: 환경변수 로딩 ──
    // .ok(): .env 파일이 없어도 에러 없이 넘어갑니다.
    dotenvy::dotenv().ok();

    // ── 2단계: 로깅(tracing) 초기화 ──
    // RUST_LOG가 없으면 goyo, tower_http, axum 모듈을 debug 레벨로 설정
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "goyo=debug,tower_http=debug,axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // ── 3단계: 설정 로딩 ──
    let config = Config::from_env()?;
    tracing::info!("Starting goyo server on {}:{}", config.host, config.port);

    // 정적 루트가 없어도 서버는 뜹니다. 모든 요청이 404가 될 뿐입니다.
    if !tokio::fs::try_exists(&config.static_dir).await.unwrap_or(false) {
        tracing::warn!(
            "Static directory {} not found, every request will be 404",
            config.static_dir.display()
        );
    } else {
        tracing::info!("Serving static files from {}", config.static_dir.display());
    }

    // ── 4단계: 라우터 구성 ──
    let app = routes::router(AppState::from_config(&config));

    // ── 5단계: 서버 시작 ──
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}/", addr);

    // with_graceful_shutdown: Ctrl+C를 받으면 진행 중인 요청을 마치고 종료합니다.
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", err);
        // 시그널을 받을 수 없으면 종료 없이 계속 서빙합니다.
        std::future::pending::<()>().await;
    }
}
