//! # 세션 컨트롤러 (상태 기계)
//!
//! `Idle → Running → Completed → Idle` 순환 상태 기계입니다.
//! 타이머 계산은 `SessionTimer`에, 분 단위 차임 판정은 `ChimeScheduler`에 맡기고,
//! 상태 전이 시점에 부수효과(차임, 화면 꺼짐 방지)를 명령하고 이벤트를 발행합니다.
//!
//! ## 전이 표
//! | 현재 | 이벤트 | 다음 | 부수효과 |
//! |------|--------|------|----------|
//! | Idle | `configure` | Idle | 세션 길이 변경 |
//! | Idle | `start` | Running | 타이머 시작, 화면 꺼짐 방지 켜기, 차임 예열 |
//! | Running | `tick` | Running | 완료 순간 차임, 이후 매 분 차임 |
//! | Running | `finish_early` | Completed | 타이머 정지, 화면 꺼짐 방지 끄기 (시간이 다 됐으면 `finish`) |
//! | Running | `finish` | Completed | 타이머 정지, 화면 꺼짐 방지 끄기 |
//! | Completed | `finish` | Completed | 없음 |
//! | Completed | `restart` | Idle | 타이머 초기화 |
//!
//! 남은 시간이 0이 되어도 `Running`을 벗어나지 않습니다.
//! `TimeUp` 이벤트만 발행하고, 사용자가 `finish`할 때까지 매 분 차임을 울립니다.
//!
//! 조기 종료(`finish_early`) 시 경과/남은 시간과 차임 기록은 그대로 보존되고,
//! `restart`에서만 초기화됩니다.

use std::sync::Arc;

use serde::{Deserialize, Serialize}; // 스냅샷/이벤트를 JSON으로 내보낼 때
use tokio::sync::broadcast;          // 구독자 여럿에게 같은 이벤트를 전달하는 채널
use uuid::Uuid;                      // 세션 ID (v7: 시간순 정렬 가능)

use super::{
    chime::ChimeScheduler,
    clock::Clock,
    effects::{ChimePlayer, WakeLock},
    timer::SessionTimer,
};
use crate::{config::Config, error::SessionError};

/// 이벤트 채널 버퍼 크기. 느린 구독자는 오래된 이벤트를 놓칠 수 있습니다.
const EVENT_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum SessionState {
    #[default]
    Idle,
    Running,
    Completed,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Running => "running",
            SessionState::Completed => "completed",
        }
    }
}

/// 차임이 울린 이유
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ChimeReason {
    /// 남은 시간이 처음 0이 된 순간
    Completion,
    /// 완료 후 `minute`분째
    MinuteMark { minute: i64 },
}

/// 컨트롤러가 구독자(UI)에게 알리는 이벤트
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SessionEvent {
    StateChanged { state: SessionState },
    /// 남은 시간이 0이 됨. UI는 "일찍 끝내기"를 "끝내기"로 바꿉니다.
    TimeUp,
    Chime { reason: ChimeReason },
}

/// UI 표시용 세션 상태 사본
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub session_id: Option<Uuid>,
    pub state: SessionState,
    pub duration_seconds: i64,
    pub elapsed_seconds: i64,
    pub remaining_seconds: i64,
    pub completed_at: Option<i64>,
    pub is_active: bool,
    pub is_completed: bool,
}

pub struct SessionController {
    timer: SessionTimer,
    state: SessionState,
    scheduler: ChimeScheduler,
    session_id: Option<Uuid>,
    /// 완료 차임을 이미 울렸는지. 같은 시각으로 틱이 반복돼도 한 번만 울립니다.
    completion_chimed: bool,
    clock: Arc<dyn Clock>,
    chime: Arc<dyn ChimePlayer>,
    wake_lock: Arc<dyn WakeLock>,
    events: broadcast::Sender<SessionEvent>,
}

impl SessionController {
    pub fn new(
        clock: Arc<dyn Clock>,
        chime: Arc<dyn ChimePlayer>,
        wake_lock: Arc<dyn WakeLock>,
    ) -> Self {
        // 수신자(_)는 바로 버립니다. 구독자는 subscribe()로 따로 받습니다.
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            timer: SessionTimer::default(),
            state: SessionState::Idle,
            scheduler: ChimeScheduler::default(),
            session_id: None,
            completion_chimed: false,
            clock,
            chime,
            wake_lock,
            events,
        }
    }

    /// 설정의 기본 세션 길이와 차임 간격으로 컨트롤러를 만듭니다.
    pub fn from_config(
        config: &Config,
        clock: Arc<dyn Clock>,
        chime: Arc<dyn ChimePlayer>,
        wake_lock: Arc<dyn WakeLock>,
    ) -> Result<Self, SessionError> {
        let mut controller = Self::new(clock, chime, wake_lock).with_scheduler(ChimeScheduler::new(
            config.chime_interval_seconds,
            config.chime_window_seconds,
        ));
        controller.configure(config.default_duration_seconds)?;
        Ok(controller)
    }

    pub fn with_scheduler(mut self, scheduler: ChimeScheduler) -> Self {
        self.scheduler = scheduler;
        self
    }

    /// 이벤트 구독. 구독 이후에 발행된 이벤트만 받습니다.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// 세션 길이를 바꿉니다. Idle에서만 허용됩니다.
    pub fn configure(&mut self, duration_seconds: i64) -> Result<(), SessionError> {
        self.require(SessionState::Idle, "configure")?;
        self.timer.set_duration(duration_seconds)?;
        tracing::debug!("Session duration set to {}s", duration_seconds);
        Ok(())
    }

    pub fn start(&mut self) -> Result<(), SessionError> {
        self.require(SessionState::Idle, "start")?;

        let now = self.clock.now();
        self.timer.start(now)?;
        let session_id = Uuid::now_v7();
        self.session_id = Some(session_id);
        self.completion_chimed = false;

        tracing::info!(
            %session_id,
            duration_seconds = self.timer.duration_seconds(),
            "Session started"
        );

        self.set_wake_lock(true);
        if let Err(err) = self.chime.arm() {
            tracing::warn!("Failed to arm chime, continuing without it: {err:#}");
        }
        self.transition(SessionState::Running);
        Ok(())
    }

    /// 한 틱을 처리합니다. Running이 아니면 아무것도 하지 않습니다.
    ///
    /// 이번 틱에서 차임이 울렸다면 그 이유를 반환합니다.
    pub fn tick(&mut self, now: i64) -> Option<ChimeReason> {
        if self.state != SessionState::Running {
            return None;
        }

        self.timer.tick(now);

        // 완료 순간: TimeUp 이벤트와 완료 차임. 이 틱에서는 분 차임을 따지지 않습니다.
        if self.timer.is_just_completed() && !self.completion_chimed {
            self.completion_chimed = true;
            tracing::info!(session_id = ?self.session_id, "Time is up");
            self.emit(SessionEvent::TimeUp);
            return Some(self.ring(ChimeReason::Completion));
        }

        // 완료 이후의 매 분 차임. 울릴 때가 아니면 여기서 None을 반환합니다.
        let minute = self.scheduler.poll(&mut self.timer, now)?;
        tracing::info!(session_id = ?self.session_id, minute, "Minute mark after completion");
        Some(self.ring(ChimeReason::MinuteMark { minute }))
    }

    /// 시간이 남아 있을 때 세션을 끝냅니다. 차임은 울리지 않습니다.
    ///
    /// 그 사이 시간이 다 됐다면 `finish`와 똑같이 처리합니다.
    pub fn finish_early(&mut self) -> Result<(), SessionError> {
        self.require(SessionState::Running, "finish_early")?;
        if self.timer.is_completed() {
            tracing::debug!("Time is already up, finish_early acts as finish");
            return self.finish();
        }

        self.timer.pause();
        tracing::info!(
            session_id = ?self.session_id,
            remaining_seconds = self.timer.remaining_seconds(),
            "Session finished early"
        );
        self.set_wake_lock(false);
        self.transition(SessionState::Completed);
        Ok(())
    }

    /// 세션을 끝냅니다. 이미 Completed면 아무것도 하지 않습니다.
    pub fn finish(&mut self) -> Result<(), SessionError> {
        match self.state {
            SessionState::Running => {
                self.timer.stop();
                tracing::info!(
                    session_id = ?self.session_id,
                    elapsed_seconds = self.timer.elapsed_seconds(),
                    "Session finished"
                );
                self.set_wake_lock(false);
                self.transition(SessionState::Completed);
                Ok(())
            }
            SessionState::Completed => {
                tracing::debug!("finish called on a completed session, ignoring");
                Ok(())
            }
            SessionState::Idle => Err(SessionError::PreconditionViolation {
                operation: "finish",
                state: SessionState::Idle.as_str(),
            }),
        }
    }

    /// Completed에서 Idle로 돌아갑니다. 화면 꺼짐 방지는 이미 꺼져 있습니다.
    pub fn restart(&mut self) -> Result<(), SessionError> {
        self.require(SessionState::Completed, "restart")?;
        self.timer.reset();
        self.session_id = None;
        self.completion_chimed = false;
        self.transition(SessionState::Idle);
        Ok(())
    }

    pub fn now(&self) -> i64 {
        self.clock.now()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn session_id(&self) -> Option<Uuid> {
        self.session_id
    }

    pub fn timer(&self) -> &SessionTimer {
        &self.timer
    }

    pub fn elapsed_seconds(&self) -> i64 {
        self.timer.elapsed_seconds()
    }

    pub fn remaining_seconds(&self) -> i64 {
        self.timer.remaining_seconds()
    }

    pub fn duration_seconds(&self) -> i64 {
        self.timer.duration_seconds()
    }

    pub fn is_active(&self) -> bool {
        self.timer.is_active()
    }

    /// 남은 시간이 0에 도달했는지 (상태 기계의 Completed와는 별개)
    pub fn is_completed(&self) -> bool {
        self.timer.is_completed()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.session_id,
            state: self.state,
            duration_seconds: self.timer.duration_seconds(),
            elapsed_seconds: self.timer.elapsed_seconds(),
            remaining_seconds: self.timer.remaining_seconds(),
            completed_at: self.timer.completed_at(),
            is_active: self.timer.is_active(),
            is_completed: self.timer.is_completed(),
        }
    }

    fn require(&self, expected: SessionState, operation: &'static str) -> Result<(), SessionError> {
        if self.state != expected {
            return Err(SessionError::PreconditionViolation {
                operation,
                state: self.state.as_str(),
            });
        }
        Ok(())
    }

    fn transition(&mut self, next: SessionState) {
        tracing::debug!("Session state {} -> {}", self.state.as_str(), next.as_str());
        self.state = next;
        self.emit(SessionEvent::StateChanged { state: next });
    }

    fn ring(&self, reason: ChimeReason) -> ChimeReason {
        if let Err(err) = self.chime.play() {
            tracing::warn!("Failed to play chime: {err:#}");
        }
        self.emit(SessionEvent::Chime { reason });
        reason
    }

    fn set_wake_lock(&self, enabled: bool) {
        if let Err(err) = self.wake_lock.set(enabled) {
            tracing::warn!(enabled, "Failed to set wake lock: {err:#}");
        }
    }

    fn emit(&self, event: SessionEvent) {
        // 구독자가 없으면 send가 실패하지만, 그 자체로는 문제가 아닙니다.
        let _ = self.events.send(event);
    }
}
