//! # 세션 러너
//!
//! 컨트롤러를 `Arc<Mutex<_>>`로 감싸고, Running 동안 1초마다 틱을 넣어주는
//! 백그라운드 태스크(ticker)를 관리합니다.
//!
//! 틱 태스크는 매번 락을 잡은 뒤 "아직 같은 세션이 Running인가"를 확인하고 나서야
//! 틱을 처리합니다. 시작과 종료 동작(`finish_early`, `finish`, `restart`)은
//! ticker 락과 controller 락을 함께 쥔 채로 상태를 바꾸고 태스크를 띄우거나 abort합니다.
//! 따라서 종료 이후에는 어떤 틱도 상태를 바꾸거나 차임을 울리지 못하고,
//! Running인 세션에는 언제나 그 세션의 틱 태스크가 붙어 있습니다.

use std::{sync::Arc, time::Duration};

use tokio::{
    sync::{broadcast, Mutex},          // await 지점을 넘어 쥘 수 있는 비동기 Mutex
    task::JoinHandle,                  // 틱 태스크 핸들 (abort용)
    time::{self, MissedTickBehavior},
};
use uuid::Uuid;

use super::controller::{SessionController, SessionEvent, SessionSnapshot, SessionState};
use crate::error::SessionError;

pub struct SessionRunner {
    controller: Arc<Mutex<SessionController>>,
    ticker: Mutex<Option<JoinHandle<()>>>,
    tick_interval: Duration,
}

impl SessionRunner {
    pub fn new(controller: SessionController, tick_interval: Duration) -> Self {
        Self {
            controller: Arc::new(Mutex::new(controller)),
            ticker: Mutex::new(None),
            tick_interval,
        }
    }

    pub async fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.controller.lock().await.subscribe()
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        self.controller.lock().await.snapshot()
    }

    pub async fn configure(&self, duration_seconds: i64) -> Result<SessionSnapshot, SessionError> {
        let mut controller = self.controller.lock().await;
        controller.configure(duration_seconds)?;
        Ok(controller.snapshot())
    }

    pub async fn start(&self) -> Result<SessionSnapshot, SessionError> {
        // 락 순서는 항상 ticker → controller (틱 태스크는 controller 락만 잡습니다).
        // 전이와 태스크 생성은 두 락을 쥔 채로 한 번에 끝냅니다.
        let mut ticker = self.ticker.lock().await;
        let mut controller = self.controller.lock().await;
        controller.start()?;
        let snapshot = controller.snapshot();

        if let Some(session_id) = snapshot.session_id {
            self.spawn_ticker(&mut ticker, session_id);
        }
        Ok(snapshot)
    }

    pub async fn finish_early(&self) -> Result<SessionSnapshot, SessionError> {
        self.leave_running(|controller| controller.finish_early())
            .await
    }

    pub async fn finish(&self) -> Result<SessionSnapshot, SessionError> {
        self.leave_running(|controller| controller.finish()).await
    }

    pub async fn restart(&self) -> Result<SessionSnapshot, SessionError> {
        self.leave_running(|controller| controller.restart()).await
    }

    /// 틱 태스크가 살아 있는지
    pub async fn is_ticking(&self) -> bool {
        self.ticker
            .lock()
            .await
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    async fn leave_running<F>(&self, transition: F) -> Result<SessionSnapshot, SessionError>
    where
        F: FnOnce(&mut SessionController) -> Result<(), SessionError>,
    {
        let mut ticker = self.ticker.lock().await;
        let mut controller = self.controller.lock().await;
        transition(&mut *controller)?;
        if let Some(handle) = ticker.take() {
            handle.abort();
        }
        Ok(controller.snapshot())
    }

    /// 틱 태스크를 새로 띄웁니다. 호출자는 ticker 락을 쥐고 있어야 합니다.
    fn spawn_ticker(&self, ticker: &mut Option<JoinHandle<()>>, session_id: Uuid) {
        if let Some(handle) = ticker.take() {
            handle.abort();
        }

        let controller = self.controller.clone();
        let tick_interval = self.tick_interval;

        let handle = tokio::spawn(async move {
            let mut interval = time::interval(tick_interval);
            // 밀린 틱을 몰아서 처리하지 않고, 늦어진 시점부터 다시 1초 간격으로
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;

                let mut guard = controller.lock().await;
                // 종료나 재시작이 먼저 락을 잡았다면 이 세션의 틱은 끝입니다.
                if guard.state() != SessionState::Running || guard.session_id() != Some(session_id)
                {
                    tracing::debug!(%session_id, "Session left running, ticker exits");
                    break;
                }
                let now = guard.now();
                guard.tick(now);
            }
        });

        *ticker = Some(handle);
    }
}

impl Drop for SessionRunner {
    fn drop(&mut self) {
        if let Some(handle) = self.ticker.get_mut().take() {
            handle.abort();
        }
    }
}
