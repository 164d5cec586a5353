//! # 차임 스케줄러
//!
//! 세션이 완료된 뒤 매 분마다 차임을 한 번씩 울릴지 결정합니다.
//! 완료 순간의 차임은 컨트롤러가 따로 처리하며, 여기서는 1분째부터 다룹니다.
//!
//! 틱이 1초 늦게 도착해도 놓치지 않도록 정각 이후 `window_seconds`까지 허용합니다.
//! 같은 분에 대해 여러 틱이 들어와도 `chimed_minutes`로 중복을 막습니다.

use super::timer::SessionTimer; // completed_at, chimed_minutes를 읽고 기록합니다

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChimeScheduler {
    /// 차임 간격(초)
    interval_seconds: i64,
    /// 정각 이후 허용 지연(초)
    window_seconds: i64,
}

impl Default for ChimeScheduler {
    fn default() -> Self {
        Self {
            interval_seconds: 60,
            window_seconds: 1,
        }
    }
}

impl ChimeScheduler {
    /// 간격과 허용 지연을 지정합니다.
    /// 값 검증은 `Config`가 담당합니다. 간격은 최소 1초로 보정합니다.
    pub fn new(interval_seconds: i64, window_seconds: i64) -> Self {
        Self {
            interval_seconds: interval_seconds.max(1),
            window_seconds: window_seconds.max(0),
        }
    }

    /// 지금 울려야 할 분(minute mark)을 계산합니다. 상태는 바꾸지 않습니다.
    pub fn due(&self, timer: &SessionTimer, now: i64) -> Option<i64> {
        // ?: 아직 완료 전이면 None으로 바로 끝납니다.
        let completed_at = timer.completed_at()?;
        let since = now.checked_sub(completed_at)?;
        if since < 0 {
            return None;
        }

        // 완료 후 몇 번째 간격인지, 그리고 그 간격의 정각에서 몇 초 지났는지
        let minute = since / self.interval_seconds;
        let offset = since % self.interval_seconds;

        (minute > 0 && offset <= self.window_seconds && !timer.chimed_minutes().contains(&minute))
            .then_some(minute)
    }

    /// `due`와 같지만, 울릴 분을 타이머에 기록까지 합니다.
    pub fn poll(&self, timer: &mut SessionTimer, now: i64) -> Option<i64> {
        let minute = self.due(timer, now)?;
        // 기록에 성공했을 때만 울립니다. bool::then_some: true면 Some(minute)
        timer.mark_chimed(minute).then_some(minute)
    }
}
