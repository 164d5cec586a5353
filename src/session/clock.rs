//! # 시계(Clock) 모듈
//!
//! 세션 코어가 "지금 몇 시인가"를 묻는 유일한 통로입니다.
//! 모든 시각은 epoch 기준 초(second) 단위 정수(`i64`)입니다.
//!
//! - `SystemClock`: 벽시계(chrono `Utc::now()`)를 그대로 사용
//! - `MonotonicClock`: 시작 시 벽시계에 맞춘 뒤 단조 시계로 전진.
//!   NTP 보정 등으로 벽시계가 뒤로 가도 경과 시간이 줄지 않습니다.
//! - `ManualClock`: 호출자가 직접 시각을 정하는 시계 (결정적 구동/테스트용)

use std::sync::atomic::{AtomicI64, Ordering}; // ManualClock: 락 없이 여러 스레드에서 읽고 쓰기

use chrono::Utc;           // 벽시계 (UTC epoch)
use tokio::time::Instant;  // 단조 시계. 테스트의 가상 시간을 따릅니다

/// 현재 시각(epoch 초)을 제공하는 트레이트
///
/// 틱 태스크와 컨트롤러가 스레드 경계를 넘어 공유하므로 `Send + Sync`가 필요합니다.
pub trait Clock: Send + Sync {
    fn now(&self) -> i64;
}

/// 시스템 벽시계
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> i64 {
        Utc::now().timestamp()
    }
}

/// 벽시계에 한 번 맞춘 뒤 단조 시계로 전진하는 시계
///
/// `tokio::time::Instant`를 사용하므로, 테스트에서
/// `#[tokio::test(start_paused = true)]`로 멈춘 가상 시간을 그대로 따릅니다.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    anchor_epoch: i64,
    anchor: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self::anchored_at(Utc::now().timestamp())
    }

    /// 지금 이 순간을 `epoch_seconds`로 간주하는 시계를 만듭니다.
    pub fn anchored_at(epoch_seconds: i64) -> Self {
        Self {
            anchor_epoch: epoch_seconds,
            anchor: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> i64 {
        // as_secs(): 1초 미만은 버립니다. 틱은 1초 단위로만 의미가 있습니다.
        let elapsed = self.anchor.elapsed().as_secs();
        self.anchor_epoch
            .saturating_add(i64::try_from(elapsed).unwrap_or(i64::MAX))
    }
}

/// 직접 설정하는 시계
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    pub fn new(epoch_seconds: i64) -> Self {
        Self {
            now: AtomicI64::new(epoch_seconds),
        }
    }

    pub fn set(&self, epoch_seconds: i64) {
        self.now.store(epoch_seconds, Ordering::SeqCst);
    }

    pub fn advance(&self, seconds: i64) {
        self.now.fetch_add(seconds, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}
