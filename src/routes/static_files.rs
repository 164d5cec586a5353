//! # 정적 파일 핸들러
//!
//! 명상 타이머 웹 페이지와 에셋(스크립트, 스타일, 소리)을 서빙합니다.
//!
//! ## 라우팅 규칙
//! - `GET /`      → 인덱스 문서 (`INDEX_DOCUMENT`)
//! - `GET /about` → 소개 문서 (`ABOUT_DOCUMENT`)
//! - 그 외 경로   → 정적 루트 아래의 같은 이름 파일
//!
//! 파일을 찾지 못하면 인덱스 문서로 응답합니다 (SPA 폴백, 200 OK).
//! 인덱스 문서마저 없으면 JSON 404입니다.
//!
//! 파일을 실제로 여는 일은 tower-http의 `ServeDir`/`ServeFile`이 맡습니다.
//! 경로의 `%XX` 해제, `..`로 루트 밖을 가리키는 요청 차단, Range/조건부 요청이 모두 여기서 처리됩니다.
//! 이 모듈은 어떤 파일을 보낼지와 Content-Type만 정합니다.

use std::path::Path;

use axum::{
    body::Body,                                      // 폴백 요청의 빈 본문
    extract::{Request, State},                       // 요청 전체를 ServeDir에 넘깁니다
    http::{self, header, HeaderValue, StatusCode},
    response::Response,
};
use percent_encoding::percent_decode_str; // URL 경로의 %XX 해제
use tower_http::services::{fs::ServeFileSystemResponseBody, ServeDir, ServeFile};

use crate::{error::AppError, routes::AppState};

/// 확장자별 Content-Type 표. 표에 없는 확장자는 `application/octet-stream`
///
/// `ServeDir`이 추측한 MIME 타입은 쓰지 않고 항상 이 표로 덮어씁니다.
const CONTENT_TYPES: &[(&str, &str)] = &[
    ("html", "text/html"),
    ("js", "text/javascript"),
    ("css", "text/css"),
    ("svg", "image/svg+xml"),
    ("json", "application/json"),
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("mp3", "audio/mpeg"),
    ("ico", "image/x-icon"),
];

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// `GET /`: 인덱스 문서
pub async fn index(State(state): State<AppState>, request: Request) -> Result<Response, AppError> {
    serve_document(&state, &state.index_document, request)
        .await?
        .ok_or(AppError::NotFound)
}

/// `GET /about`: 소개 문서. 없으면 인덱스 문서로 폴백합니다.
pub async fn about(State(state): State<AppState>, request: Request) -> Result<Response, AppError> {
    // 요청은 ServeFile이 가져가므로 폴백용 사본을 먼저 만들어 둡니다.
    let fallback = fallback_request(&request);
    match serve_document(&state, &state.about_document, request).await? {
        Some(response) => Ok(response),
        None => index(State(state), fallback).await,
    }
}

/// 나머지 모든 경로: 에셋 파일, 없으면 인덱스 문서
pub async fn asset(State(state): State<AppState>, request: Request) -> Result<Response, AppError> {
    let fallback = fallback_request(&request);
    // ServeDir과 같은 방식으로 해제해야 실제로 열리는 파일과 확장자가 일치합니다.
    let path = percent_decode_str(request.uri().path())
        .decode_utf8_lossy()
        .into_owned();

    // 디렉토리는 index.html을 붙이거나 리다이렉트하지 않고 "없음"으로 취급
    let response = ServeDir::new(&state.static_root)
        .append_index_html_on_directories(false)
        .try_call(request)
        .await?;

    match with_content_type(response, Path::new(&path)) {
        Some(response) => Ok(response),
        None => {
            tracing::debug!(path = %path, "Static file not found, serving index document");
            index(State(state), fallback).await
        }
    }
}

/// 확장자로 Content-Type을 고릅니다. 대소문자는 구분하지 않습니다.
pub fn content_type_for(path: &Path) -> &'static str {
    let Some(extension) = path.extension().and_then(|ext| ext.to_str()) else {
        return FALLBACK_CONTENT_TYPE;
    };
    let extension = extension.to_ascii_lowercase();

    CONTENT_TYPES
        .iter()
        .find(|(ext, _)| *ext == extension)
        .map(|(_, content_type)| *content_type)
        .unwrap_or(FALLBACK_CONTENT_TYPE)
}

/// 정적 루트 아래의 문서 하나를 보냅니다. 없으면 `Ok(None)`
async fn serve_document(
    state: &AppState,
    document: &str,
    request: Request,
) -> Result<Option<Response>, AppError> {
    // try_call: NotFound 외의 IO 에러를 응답으로 삼키지 않고 그대로 돌려줍니다 → AppError::Io
    let response = ServeFile::new(state.static_root.join(document))
        .try_call(request)
        .await?;
    Ok(with_content_type(response, Path::new(document)))
}

/// 404면 None. 성공 응답(200, 206)에는 확장자 표의 Content-Type을 붙입니다.
///
/// 304, 405 같은 나머지 응답은 그대로 돌려줍니다.
fn with_content_type(
    response: http::Response<ServeFileSystemResponseBody>,
    served: &Path,
) -> Option<Response> {
    if response.status() == StatusCode::NOT_FOUND {
        return None;
    }

    let mut response = response.map(Body::new);
    if response.status().is_success() {
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static(content_type_for(served)),
        );
    }
    Some(response)
}

/// 폴백용 요청 사본. 본문은 버리고 메서드, URI, 헤더만 옮깁니다.
fn fallback_request(request: &Request) -> Request {
    let mut fallback = Request::new(Body::empty());
    *fallback.method_mut() = request.method().clone();
    *fallback.uri_mut() = request.uri().clone();
    *fallback.headers_mut() = request.headers().clone();
    fallback
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Method;

    #[test]
    fn content_types_follow_the_table() {
        assert_eq!(content_type_for(Path::new("index.html")), "text/html");
        assert_eq!(content_type_for(Path::new("app.js")), "text/javascript");
        assert_eq!(content_type_for(Path::new("styles.CSS")), "text/css");
        assert_eq!(content_type_for(Path::new("gong.mp3")), "audio/mpeg");
        assert_eq!(content_type_for(Path::new("photo.jpg")), "image/jpeg");
        assert_eq!(content_type_for(Path::new("archive.tar.gz")), FALLBACK_CONTENT_TYPE);
        assert_eq!(content_type_for(Path::new("LICENSE")), FALLBACK_CONTENT_TYPE);
    }

    #[test]
    fn fallback_request_keeps_method_and_headers() {
        let request = http::Request::builder()
            .method(Method::HEAD)
            .uri("/missing.png")
            .header(header::IF_NONE_MATCH, "\"abc\"")
            .body(Body::from("ignored"))
            .unwrap();

        let fallback = fallback_request(&request);
        assert_eq!(fallback.method(), Method::HEAD);
        assert_eq!(fallback.uri().path(), "/missing.png");
        assert_eq!(fallback.headers()[header::IF_NONE_MATCH], "\"abc\"");
    }
}
