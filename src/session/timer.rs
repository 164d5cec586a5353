//! # 세션 타이머
//!
//! 설정된 세션 길이, 시작 시각, 경과/남은 시간, 완료 시각을 관리합니다.
//! 시각은 모두 epoch 초 단위이며, 현재 시각은 항상 호출자가 넘겨줍니다.
//! 그래서 이 타입은 시계나 런타임에 의존하지 않고 순수하게 계산만 합니다.
//!
//! ## 불변식
//! - `remaining = max(0, duration - elapsed)`
//! - `completed_at`은 세션마다 정확히 한 번, 남은 시간이 처음 0이 되는 틱에서 설정됩니다.
//!   새 `start()` 또는 `reset()` 전까지는 다시 바뀌지 않습니다.
//! - 같은 `now`로 `tick`을 두 번 호출해도 상태는 같습니다.

use std::collections::BTreeSet; // 정렬된 집합: 차임 기록을 분 순서대로 보여줄 수 있습니다

use crate::error::SessionError; // InvalidArgument, PreconditionViolation

/// 프로세스 시작 시의 기본 세션 길이(초)
pub const DEFAULT_DURATION_SECONDS: i64 = 60;

/// 세션 타이머 상태
///
/// 원래 설계의 "0이면 미설정" 필드들은 `Option`으로 표현합니다.
/// (`started_at`, `completed_at`, 마지막 틱 시각)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionTimer {
    /// 설정된 세션 길이(초). 항상 0보다 큽니다.
    duration_seconds: i64,
    /// 세션 시작 시각. 대기 중이면 None
    started_at: Option<i64>,
    /// 일시정지/재개용 보정값. 현재 세션은 재개할 수 없으므로 항상 0입니다.
    time_left_offset: i64,
    elapsed_seconds: i64,
    remaining_seconds: i64,
    /// 남은 시간이 처음 0이 된 시각
    completed_at: Option<i64>,
    /// 이미 차임이 울린 "완료 후 분" 목록. 새 세션마다 비워집니다.
    chimed_minutes: BTreeSet<i64>,
    /// 틱이 의미 있는 상태인지 여부
    active: bool,
    /// 마지막으로 처리한 틱의 시각 (`is_just_completed` 판정용)
    last_tick_at: Option<i64>,
}

impl Default for SessionTimer {
    fn default() -> Self {
        Self::idle(DEFAULT_DURATION_SECONDS)
    }
}

impl SessionTimer {
    /// 주어진 길이로 대기 상태의 타이머를 만듭니다.
    ///
    /// # 에러
    /// `duration_seconds <= 0`이면 `SessionError::InvalidArgument`
    pub fn new(duration_seconds: i64) -> Result<Self, SessionError> {
        validate_duration(duration_seconds)?;
        Ok(Self::idle(duration_seconds))
    }

    fn idle(duration_seconds: i64) -> Self {
        Self {
            duration_seconds,
            started_at: None,
            time_left_offset: 0,
            elapsed_seconds: 0,
            remaining_seconds: duration_seconds,
            completed_at: None,
            chimed_minutes: BTreeSet::new(),
            active: false,
            last_tick_at: None,
        }
    }

    /// 세션 길이를 바꿉니다.
    ///
    /// 대기 중이면 남은 시간도 새 길이로 맞춰서, 설정 화면이 바로 반영되게 합니다.
    /// 실행 중이면 다음 틱에서 새 길이로 계산됩니다.
    /// (실행 중 변경은 컨트롤러가 막습니다.)
    ///
    /// # 에러
    /// `seconds <= 0`이면 `InvalidArgument`이며, 상태는 바뀌지 않습니다.
    pub fn set_duration(&mut self, seconds: i64) -> Result<(), SessionError> {
        // 검증을 먼저 해야 실패했을 때 상태가 그대로 남습니다.
        validate_duration(seconds)?;
        self.duration_seconds = seconds;
        if !self.active {
            self.remaining_seconds = seconds;
        }
        Ok(())
    }

    /// 세션을 시작합니다.
    ///
    /// 경과 시간, 완료 시각, 차임 기록을 모두 초기화하고 `active`를 켭니다.
    ///
    /// # 에러
    /// 이미 실행 중이면 `PreconditionViolation`
    pub fn start(&mut self, now: i64) -> Result<(), SessionError> {
        if self.active {
            return Err(SessionError::PreconditionViolation {
                operation: "start",
                state: "the timer is active",
            });
        }

        // 이전 세션의 흔적을 모두 지웁니다. 길이(duration)만 그대로 둡니다.
        self.started_at = Some(now);
        self.time_left_offset = 0;
        self.elapsed_seconds = 0;
        self.remaining_seconds = self.duration_seconds;
        self.completed_at = None;
        self.chimed_minutes.clear();
        self.last_tick_at = None;
        self.active = true;
        Ok(())
    }

    /// 틱을 멈춥니다. 경과/남은 시간은 화면 표시를 위해 그대로 둡니다.
    pub fn pause(&mut self) {
        self.active = false;
    }

    /// 세션을 끝냅니다. `pause`와 같으며, 값은 `reset` 전까지 유지됩니다.
    pub fn stop(&mut self) {
        self.pause();
    }

    /// 틱을 멈추고 세션 길이만 남긴 채 모든 값을 초기화합니다.
    pub fn reset(&mut self) {
        // 새 값으로 통째로 덮어써서, 필드를 하나 빠뜨리고 초기화하는 일이 없게 합니다.
        *self = Self::idle(self.duration_seconds);
    }

    /// 현재 시각 기준으로 경과/남은 시간을 다시 계산합니다.
    ///
    /// 비활성 상태면 아무것도 하지 않습니다.
    /// 남은 시간이 처음 0이 되면 `completed_at = now`로 기록합니다 (단 한 번).
    pub fn tick(&mut self, now: i64) {
        if !self.active {
            return;
        }
        // let-else: 시작 시각이 없으면(이론상 active와 함께 설정됨) 조용히 끝냅니다.
        let Some(started_at) = self.started_at else {
            return;
        };

        // 벽시계가 뒤로 가더라도 경과 시간은 음수가 되지 않습니다.
        self.elapsed_seconds = now
            .saturating_sub(started_at)
            .saturating_add(self.time_left_offset)
            .max(0);
        self.remaining_seconds = self
            .duration_seconds
            .saturating_sub(self.elapsed_seconds)
            .max(0);

        // 완료 시각은 처음 0이 된 틱에서 한 번만 기록합니다.
        if self.remaining_seconds == 0 && self.completed_at.is_none() {
            self.completed_at = Some(now);
        }
        // 같은 now로 다시 틱해도 아래 값은 같으므로 상태가 바뀌지 않습니다.
        self.last_tick_at = Some(now);
    }

    /// 가장 최근 틱에서 완료 시각이 처음 기록되었으면 true
    pub fn is_just_completed(&self) -> bool {
        self.completed_at.is_some() && self.completed_at == self.last_tick_at
    }

    /// `minute`에 대한 차임을 기록합니다. 처음 기록이면 true
    pub(crate) fn mark_chimed(&mut self, minute: i64) -> bool {
        // BTreeSet::insert는 이미 있던 값이면 false를 반환합니다.
        self.chimed_minutes.insert(minute)
    }

    pub fn duration_seconds(&self) -> i64 {
        self.duration_seconds
    }

    /// 분 단위 세션 길이 (내림)
    pub fn duration_minutes(&self) -> i64 {
        self.duration_seconds / 60
    }

    pub fn started_at(&self) -> Option<i64> {
        self.started_at
    }

    pub fn elapsed_seconds(&self) -> i64 {
        self.elapsed_seconds
    }

    pub fn remaining_seconds(&self) -> i64 {
        self.remaining_seconds
    }

    pub fn completed_at(&self) -> Option<i64> {
        self.completed_at
    }

    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn chimed_minutes(&self) -> &BTreeSet<i64> {
        &self.chimed_minutes
    }
}

fn validate_duration(seconds: i64) -> Result<(), SessionError> {
    if seconds <= 0 {
        return Err(SessionError::InvalidArgument(format!(
            "duration must be greater than zero seconds, got {seconds}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn running(duration: i64, started_at: i64) -> SessionTimer {
        let mut timer = SessionTimer::new(duration).unwrap();
        timer.start(started_at).unwrap();
        timer
    }

    #[test]
    fn default_timer_is_idle_for_one_minute() {
        let timer = SessionTimer::default();
        assert_eq!(timer.duration_seconds(), 60);
        assert_eq!(timer.remaining_seconds(), 60);
        assert_eq!(timer.elapsed_seconds(), 0);
        assert!(!timer.is_active());
        assert!(!timer.is_completed());
    }

    #[test]
    fn remaining_is_duration_minus_elapsed_clamped_at_zero() {
        for duration in [1, 7, 60, 600] {
            for elapsed in [0, 1, duration - 1, duration, duration + 1, duration * 3] {
                let mut timer = running(duration, 1_000);
                timer.tick(1_000 + elapsed);
                assert_eq!(timer.elapsed_seconds(), elapsed);
                assert_eq!(timer.remaining_seconds(), (duration - elapsed).max(0));
            }
        }
    }

    #[test]
    fn one_minute_session_completes_at_sixty() {
        let mut timer = running(60, 0);

        timer.tick(59);
        assert_eq!(timer.remaining_seconds(), 1);
        assert!(!timer.is_completed());
        assert!(!timer.is_just_completed());

        timer.tick(60);
        assert_eq!(timer.remaining_seconds(), 0);
        assert_eq!(timer.completed_at(), Some(60));
        assert!(timer.is_just_completed());
    }

    #[test]
    fn completion_is_recorded_once() {
        let mut timer = running(10, 100);
        timer.tick(112);
        assert_eq!(timer.completed_at(), Some(112));

        for now in 113..400 {
            timer.tick(now);
            assert_eq!(timer.completed_at(), Some(112));
            assert!(!timer.is_just_completed());
        }
    }

    #[test]
    fn ticking_twice_with_same_time_is_idempotent() {
        let mut timer = running(30, 0);
        timer.tick(30);
        let first = timer.clone();
        timer.tick(30);
        assert_eq!(timer, first);

        timer.tick(45);
        let later = timer.clone();
        timer.tick(45);
        assert_eq!(timer, later);
    }

    #[test]
    fn tick_is_ignored_while_inactive() {
        let mut timer = SessionTimer::new(30).unwrap();
        timer.tick(1_000);
        assert_eq!(timer, SessionTimer::new(30).unwrap());
    }

    #[test]
    fn clock_going_backwards_does_not_go_negative() {
        let mut timer = running(30, 500);
        timer.tick(490);
        assert_eq!(timer.elapsed_seconds(), 0);
        assert_eq!(timer.remaining_seconds(), 30);
    }

    #[test]
    fn invalid_duration_is_rejected_and_state_is_unchanged() {
        let mut timer = SessionTimer::new(120).unwrap();
        let before = timer.clone();

        assert_matches!(timer.set_duration(-5), Err(SessionError::InvalidArgument(_)));
        assert_matches!(timer.set_duration(0), Err(SessionError::InvalidArgument(_)));
        assert_eq!(timer, before);
        assert_matches!(SessionTimer::new(0), Err(SessionError::InvalidArgument(_)));
    }

    #[test]
    fn set_duration_while_idle_updates_remaining() {
        let mut timer = SessionTimer::default();
        timer.set_duration(300).unwrap();
        assert_eq!(timer.duration_seconds(), 300);
        assert_eq!(timer.remaining_seconds(), 300);
        assert_eq!(timer.duration_minutes(), 5);
    }

    #[test]
    fn set_duration_while_active_keeps_remaining_until_next_tick() {
        let mut timer = running(60, 0);
        timer.tick(10);
        timer.set_duration(120).unwrap();
        assert_eq!(timer.remaining_seconds(), 50);
        timer.tick(10);
        assert_eq!(timer.remaining_seconds(), 110);
    }

    #[test]
    fn start_while_active_is_a_precondition_violation() {
        let mut timer = running(60, 0);
        assert_matches!(
            timer.start(5),
            Err(SessionError::PreconditionViolation { operation: "start", .. })
        );
        assert_eq!(timer.started_at(), Some(0));
    }

    #[test]
    fn pause_preserves_values_for_display() {
        let mut timer = running(60, 0);
        timer.tick(30);
        timer.pause();

        assert!(!timer.is_active());
        assert_eq!(timer.elapsed_seconds(), 30);
        assert_eq!(timer.remaining_seconds(), 30);

        timer.tick(45);
        assert_eq!(timer.elapsed_seconds(), 30);
    }

    #[test]
    fn reset_restores_full_duration_and_clears_completion() {
        let mut timer = running(60, 0);
        timer.tick(61);
        timer.mark_chimed(1);
        timer.stop();
        timer.reset();

        assert!(!timer.is_active());
        assert_eq!(timer.elapsed_seconds(), 0);
        assert_eq!(timer.remaining_seconds(), 60);
        assert_eq!(timer.completed_at(), None);
        assert_eq!(timer.started_at(), None);
        assert!(timer.chimed_minutes().is_empty());
    }

    #[test]
    fn restart_produces_a_fresh_completion_cycle() {
        let mut timer = running(10, 0);
        timer.tick(10);
        timer.mark_chimed(1);
        timer.stop();
        timer.reset();

        timer.start(1_000).unwrap();
        assert!(timer.chimed_minutes().is_empty());
        timer.tick(1_009);
        assert!(!timer.is_completed());
        timer.tick(1_010);
        assert_eq!(timer.completed_at(), Some(1_010));
        assert!(timer.is_just_completed());
    }
}
