//! # 명상 세션 코어
//!
//! 세션 길이 설정, 경과/남은 시간 계산, 완료 감지, 완료 후 분 단위 차임 스케줄링을 담당합니다.
//! 화면 렌더링과 실제 소리 재생은 이 모듈 바깥의 일이며,
//! 여기서는 `ChimePlayer`와 `WakeLock` 트레이트로 명령만 내립니다.
//!
//! 하위 모듈 (의존 순서대로):
//! - `clock`: 현재 시각(epoch 초) 제공
//! - `timer`: 세션 타이머 상태와 계산
//! - `chime`: 완료 후 분 단위 차임 판정
//! - `effects`: 부수효과 인터페이스와 기본 구현체
//! - `controller`: Idle/Running/Completed 상태 기계와 이벤트 발행
//! - `runner`: tokio 틱 태스크로 컨트롤러 구동
//! - `presence`: 경과 시간 표시 문구

pub mod chime;
pub mod clock;
pub mod controller;
pub mod effects;
pub mod presence;
pub mod runner;
pub mod timer;

pub use chime::ChimeScheduler;
pub use clock::{Clock, ManualClock, MonotonicClock, SystemClock};
pub use controller::{ChimeReason, SessionController, SessionEvent, SessionSnapshot, SessionState};
pub use effects::{ChimePlayer, Silent, TerminalBell, UnsupportedWakeLock, WakeLock};
pub use presence::presence_message;
pub use runner::SessionRunner;
pub use timer::{SessionTimer, DEFAULT_DURATION_SECONDS};
