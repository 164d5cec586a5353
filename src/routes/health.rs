//! # 헬스체크(Health Check) 핸들러
//!
//! goyo 서버가 요청을 받고 있는지만 알려줍니다.
//! 세션 상태는 서버에 없으므로 타이머에 관한 정보는 담지 않습니다.
//!
//! ## 엔드포인트
//! - `GET /api/v1/health` → `{ "status": "ok" }`
//!
//! 정적 파일 폴백보다 먼저 매칭되므로, 정적 루트가 비어 있어도 200을 반환합니다.

use axum::Json;                // JSON 응답 래퍼 (Content-Type: application/json)
use serde_json::{json, Value}; // 고정 응답 본문

/// `GET /api/v1/health`: 프로세스가 살아 있고 라우터가 응답하는지 확인합니다.
///
/// 파일 시스템이나 설정을 건드리지 않으므로 실패하지 않습니다.
pub async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn health_reports_ok() {
        let Json(body) = health_check().await;
        assert_eq!(body, json!({ "status": "ok" }));
    }
}
