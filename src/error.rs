//! # 에러 처리 모듈
//!
//! 애플리케이션에서 발생할 수 있는 에러 타입을 정의합니다.
//!
//! - `SessionError`: 세션 코어(타이머/컨트롤러)의 에러. 잘못된 인자와
//!   호출 순서 위반(precondition) 두 가지뿐입니다.
//! - `ConfigError`: 환경변수 설정값이 잘못된 경우
//! - `AppError`: HTTP 계층 에러. `IntoResponse`로 JSON 에러 응답이 됩니다.
//!
//! 부수효과(차임 재생, 화면 꺼짐 방지) 실패는 여기에 없습니다.
//! 그런 실패는 로그로만 남기고 세션은 계속 진행합니다.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// 세션 코어에서 발생하는 에러
///
/// 둘 다 호출자 버그를 뜻하며, 발생해도 세션 상태는 바뀌지 않습니다.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// 잘못된 인자 (예: 0 이하의 세션 길이)
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// 현재 상태에서 허용되지 않는 동작 (예: Running 중에 start)
    /// `operation`은 호출된 동작 이름, `state`는 당시 상태 이름입니다.
    #[error("`{operation}` is not allowed while {state}")]
    PreconditionViolation {
        operation: &'static str,
        state: &'static str,
    },
}

/// 설정 로딩 에러
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 숫자여야 하는 환경변수를 파싱하지 못함
    #[error("{key} must be a number, got {value:?}")]
    NotANumber { key: &'static str, value: String },

    /// 값의 범위가 잘못됨
    #[error("{key} is out of range: {reason}")]
    OutOfRange { key: &'static str, reason: String },
}

/// HTTP 계층에서 발생할 수 있는 에러
///
/// 핸들러가 `Result<T, AppError>`를 반환하면,
/// Axum이 `IntoResponse`를 호출하여 HTTP 응답으로 변환합니다.
#[derive(Debug, Error)]
pub enum AppError {
    /// 요청한 리소스를 찾을 수 없음 (HTTP 404)
    #[error("Resource not found")]
    NotFound,

    /// 파일 입출력 오류 (HTTP 500)
    /// #[from]: std::io::Error → AppError::Io 자동 변환
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl IntoResponse for AppError {
    /// AppError를 HTTP 응답으로 변환합니다.
    ///
    /// 내부 에러(IO)는 실제 내용을 로그에만 기록하고,
    /// 클라이언트에는 일반적인 메시지만 반환합니다.
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::NotFound => (StatusCode::NOT_FOUND, "not_found", self.to_string()),
            AppError::Io(ref e) => {
                tracing::error!("IO error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "io_error",
                    "An IO error occurred".to_string(),
                )
            }
        };

        // 결과: { "error": { "code": "not_found", "message": "Resource not found" } }
        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
