//! # 부수효과(capability) 인터페이스
//!
//! 세션 코어가 바깥 세계에 내리는 명령은 두 가지뿐입니다.
//! - 차임 재생 (`ChimePlayer`)
//! - 화면 꺼짐 방지 (`WakeLock`)
//!
//! 둘 다 "쏘고 잊는(fire-and-forget)" 명령입니다. 컨트롤러는 결과를 기다리지 않고,
//! 실패하면 `tracing::warn!`으로 남긴 뒤 세션을 그대로 진행합니다.
//! 비동기 작업이 필요한 구현체는 내부에서 직접 태스크를 띄우면 됩니다.

use std::{
    io::Write,                 // write_all, flush
    sync::Mutex,               // 마지막 재생 시각 보호
    time::{Duration, Instant},
};

use anyhow::{anyhow, Result}; // 구현체마다 실패 원인이 달라서 anyhow로 받습니다

/// 차임을 재생하는 기능
pub trait ChimePlayer: Send + Sync {
    /// 세션 시작 시 한 번 호출됩니다. 재생 장치를 미리 준비(예열)합니다.
    fn arm(&self) -> Result<()> {
        Ok(())
    }

    /// 차임을 한 번 재생합니다.
    fn play(&self) -> Result<()>;
}

/// 화면 꺼짐 방지 기능
pub trait WakeLock: Send + Sync {
    fn set(&self, enabled: bool) -> Result<()>;
}

/// 아무것도 하지 않는 구현체. 소리도, 화면 제어도 필요 없을 때 사용합니다.
#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl ChimePlayer for Silent {
    fn play(&self) -> Result<()> {
        Ok(())
    }
}

impl WakeLock for Silent {
    fn set(&self, _enabled: bool) -> Result<()> {
        Ok(())
    }
}

/// 짧은 시간 안에 연달아 울리는 것을 막는 간격
const BELL_DEBOUNCE: Duration = Duration::from_millis(500);

/// 터미널 벨(BEL, `\x07`)로 차임을 울립니다.
///
/// 직전 재생 후 500ms 안에 들어온 요청은 조용히 무시합니다.
#[derive(Debug, Default)]
pub struct TerminalBell {
    last_played: Mutex<Option<Instant>>,
}

impl TerminalBell {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ChimePlayer for TerminalBell {
    fn play(&self) -> Result<()> {
        let mut last_played = self
            .last_played
            .lock()
            .map_err(|_| anyhow!("terminal bell state poisoned"))?;

        if let Some(at) = *last_played {
            if at.elapsed() < BELL_DEBOUNCE {
                tracing::debug!("Skipping chime, last one played {:?} ago", at.elapsed());
                return Ok(());
            }
        }
        *last_played = Some(Instant::now());

        // 버퍼에 남지 않도록 바로 flush해야 벨이 즉시 울립니다.
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(b"\x07")?;
        stdout.flush()?;
        Ok(())
    }
}

/// 화면 꺼짐 방지를 지원하지 않는 환경용 구현체
///
/// 켜기 요청은 실패로 보고되어 로그에 남고, 끄기 요청은 항상 성공합니다.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnsupportedWakeLock;

impl WakeLock for UnsupportedWakeLock {
    fn set(&self, enabled: bool) -> Result<()> {
        if enabled {
            return Err(anyhow!("wake lock is not supported here"));
        }
        Ok(())
    }
}
