//! # 라우트 핸들러 모듈
//!
//! HTTP 요청을 처리하는 핸들러 함수와 라우터 구성을 모아둔 모듈입니다.
//! 서버는 정적 파일만 서빙하며, 세션 상태는 서버에 두지 않습니다.
//! (타이머는 페이지나 `sit` 같은 클라이언트 쪽에서 돕니다.)
//!
//! 각 하위 모듈:
//! - `health`: 서버 상태 확인 (헬스체크)
//! - `static_files`: 웹 페이지와 에셋 서빙, SPA 폴백 (tower-http `ServeDir`/`ServeFile` 위에서)

pub mod health;
pub mod static_files;

pub use health::*;

use std::path::PathBuf;

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::config::Config;

/// 애플리케이션 공유 상태
///
/// 모든 요청 핸들러가 `State(state): State<AppState>`로 접근합니다.
/// Axum의 State Extractor가 내부적으로 clone하므로 `Clone`이 필요합니다.
#[derive(Debug, Clone)]
pub struct AppState {
    /// 정적 파일 루트 디렉토리
    pub static_root: PathBuf,
    /// `/`와 SPA 폴백에 쓰는 문서 (루트 기준 상대 경로)
    pub index_document: String,
    /// `/about`에 쓰는 문서
    pub about_document: String,
}

impl AppState {
    pub fn from_config(config: &Config) -> Self {
        Self {
            static_root: config.static_dir.clone(),
            index_document: config.index_document.clone(),
            about_document: config.about_document.clone(),
        }
    }
}

/// 전체 라우터를 구성합니다.
///
/// - `/api/v1/health`: 헬스체크
/// - `/`, `/about`: 문서
/// - 그 외: `.fallback()`으로 정적 에셋 (없으면 인덱스 문서)
///
/// API 라우트가 폴백보다 먼저 매칭되므로 `/api/v1/health`는 정적 파일로 새지 않습니다.
pub fn router(state: AppState) -> Router {
    let api_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .route("/", get(static_files::index))
        .route("/about", get(static_files::about))
        // .nest(): API 라우트를 /api/v1 경로 아래에 중첩시킵니다.
        .nest("/api/v1", api_routes)
        .fallback(static_files::asset)
        .with_state(state)
        .layer(TraceLayer::new_for_http()) // HTTP 요청/응답 자동 로깅
}
