//! # goyo: 명상 타이머
//!
//! 사용자가 세션 길이를 고르고 시작하면, 경과 시간을 조용히 보여주다가
//! 시간이 다 되면 차임을 울리고, 사용자가 끝낼 때까지 매 분 다시 울립니다.
//!
//! 모듈 구성:
//! - `config`: 환경변수 기반 설정
//! - `error`: 에러 타입 (세션, 설정, HTTP)
//! - `session`: 타이머/차임/상태 기계 코어와 tokio 러너
//! - `routes`: 웹 페이지를 서빙하는 HTTP 라우터

pub mod config;
pub mod error;
pub mod routes;
pub mod session;
