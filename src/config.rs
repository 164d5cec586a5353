//! # 애플리케이션 설정(Configuration) 모듈
//!
//! 환경변수에서 서버와 세션 설정값을 읽어오는 모듈입니다.
//! `.env` 파일이나 시스템 환경변수에서 값을 가져오며, 모든 항목에 기본값이 있습니다.
//!
//! 설정 항목:
//! - `HOST`: 서버 바인딩 주소 (기본값: "0.0.0.0")
//! - `PORT`: 서버 포트 번호 (기본값: 8000)
//! - `STATIC_DIR`: 웹 페이지와 에셋이 있는 디렉토리 (기본값: "public")
//! - `INDEX_DOCUMENT`: `/`와 SPA 폴백에 쓰이는 문서 (기본값: "index.html")
//! - `ABOUT_DOCUMENT`: `/about`에 쓰이는 문서 (기본값: "about.html")
//! - `DEFAULT_DURATION_SECONDS`: 처음 설정되는 세션 길이 (기본값: 60)
//! - `TICK_INTERVAL_MS`: 세션 틱 주기 (기본값: 1000)
//! - `CHIME_INTERVAL_SECONDS`: 완료 후 차임 간격 (기본값: 60)
//! - `CHIME_WINDOW_SECONDS`: 차임 허용 지연 (기본값: 1)

use std::{env, path::PathBuf, str::FromStr, time::Duration};

use crate::error::ConfigError;

/// 애플리케이션 전체 설정을 담는 구조체
///
/// 프로세스 시작 시 환경변수에서 한 번 읽어온 후 공유됩니다.
/// `goyo` 서버는 서버 항목을, `sit`은 세션 항목을 사용합니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// 서버가 바인딩할 호스트 주소
    pub host: String,
    /// 서버 포트 번호
    pub port: u16,
    /// 정적 파일 루트 디렉토리
    pub static_dir: PathBuf,
    /// `/` 요청과 찾지 못한 경로에 응답할 문서 (static_dir 기준 상대 경로)
    pub index_document: String,
    /// `/about` 요청에 응답할 문서
    pub about_document: String,
    /// 새 세션의 기본 길이(초). 항상 0보다 큽니다.
    pub default_duration_seconds: i64,
    /// 세션 틱 주기
    pub tick_interval: Duration,
    /// 완료 후 차임 간격(초)
    pub chime_interval_seconds: i64,
    /// 차임 허용 지연(초). 틱이 늦게 도착해도 이 범위 안이면 차임이 울립니다.
    pub chime_window_seconds: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            static_dir: PathBuf::from("public"),
            index_document: "index.html".to_string(),
            about_document: "about.html".to_string(),
            default_duration_seconds: 60,
            tick_interval: Duration::from_millis(1000),
            chime_interval_seconds: 60,
            chime_window_seconds: 1,
        }
    }
}

impl Config {
    /// 환경변수에서 설정값을 읽어 Config 인스턴스를 생성합니다.
    ///
    /// # 에러
    /// 숫자 항목을 파싱할 수 없거나 범위를 벗어나면 `ConfigError`를 반환합니다.
    /// 값이 없는 항목은 기본값을 사용합니다.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 임의의 조회 함수로 설정을 만듭니다. 테스트에서 환경변수 대신 사용합니다.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let tick_interval_ms: u64 = parse_or(&lookup, "TICK_INTERVAL_MS", 1000)?;
        if tick_interval_ms == 0 {
            return Err(ConfigError::OutOfRange {
                key: "TICK_INTERVAL_MS",
                reason: "must be greater than zero".to_string(),
            });
        }

        let config = Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: parse_or(&lookup, "PORT", defaults.port)?,
            static_dir: lookup("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.static_dir),
            index_document: lookup("INDEX_DOCUMENT").unwrap_or(defaults.index_document),
            about_document: lookup("ABOUT_DOCUMENT").unwrap_or(defaults.about_document),
            default_duration_seconds: parse_or(
                &lookup,
                "DEFAULT_DURATION_SECONDS",
                defaults.default_duration_seconds,
            )?,
            tick_interval: Duration::from_millis(tick_interval_ms),
            chime_interval_seconds: parse_or(
                &lookup,
                "CHIME_INTERVAL_SECONDS",
                defaults.chime_interval_seconds,
            )?,
            chime_window_seconds: parse_or(
                &lookup,
                "CHIME_WINDOW_SECONDS",
                defaults.chime_window_seconds,
            )?,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.default_duration_seconds <= 0 {
            return Err(ConfigError::OutOfRange {
                key: "DEFAULT_DURATION_SECONDS",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.chime_interval_seconds <= 0 {
            return Err(ConfigError::OutOfRange {
                key: "CHIME_INTERVAL_SECONDS",
                reason: "must be greater than zero".to_string(),
            });
        }
        // 윈도우가 간격 이상이면 매 틱마다 다음 분이 "정각"으로 보입니다.
        if self.chime_window_seconds < 0
            || self.chime_window_seconds >= self.chime_interval_seconds
        {
            return Err(ConfigError::OutOfRange {
                key: "CHIME_WINDOW_SECONDS",
                reason: format!(
                    "must be between 0 and {}",
                    self.chime_interval_seconds - 1
                ),
            });
        }
        Ok(())
    }
}

/// 환경변수 하나를 숫자로 파싱합니다. 값이 없으면 기본값을 사용합니다.
fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        // 앞뒤 공백은 .env 파일에서 흔히 섞여 들어오므로 허용합니다.
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::NotANumber { key, value: raw }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_yields_defaults() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.port, 8000);
        assert_eq!(config.default_duration_seconds, 60);
    }

    #[test]
    fn overrides_are_applied() {
        let config = Config::from_lookup(lookup_from(&[
            ("HOST", "127.0.0.1"),
            ("PORT", " 3000 "),
            ("STATIC_DIR", "site"),
            ("DEFAULT_DURATION_SECONDS", "600"),
            ("TICK_INTERVAL_MS", "250"),
        ]))
        .unwrap();

        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 3000);
        assert_eq!(config.static_dir, PathBuf::from("site"));
        assert_eq!(config.default_duration_seconds, 600);
        assert_eq!(config.tick_interval, Duration::from_millis(250));
    }

    #[test]
    fn garbage_port_is_rejected() {
        let err = Config::from_lookup(lookup_from(&[("PORT", "eighty")])).unwrap_err();
        assert_matches!(err, ConfigError::NotANumber { key: "PORT", .. });
    }

    #[test]
    fn non_positive_duration_is_rejected() {
        let err =
            Config::from_lookup(lookup_from(&[("DEFAULT_DURATION_SECONDS", "0")])).unwrap_err();
        assert_matches!(
            err,
            ConfigError::OutOfRange {
                key: "DEFAULT_DURATION_SECONDS",
                ..
            }
        );
    }

    #[test]
    fn zero_tick_interval_is_rejected() {
        let err = Config::from_lookup(lookup_from(&[("TICK_INTERVAL_MS", "0")])).unwrap_err();
        assert_matches!(err, ConfigError::OutOfRange { key: "TICK_INTERVAL_MS", .. });
    }

    #[test]
    fn chime_window_must_fit_inside_interval() {
        let err = Config::from_lookup(lookup_from(&[
            ("CHIME_INTERVAL_SECONDS", "10"),
            ("CHIME_WINDOW_SECONDS", "10"),
        ]))
        .unwrap_err();
        assert_matches!(err, ConfigError::OutOfRange { key: "CHIME_WINDOW_SECONDS", .. });
    }
}
