//! 설정 관리 -- logdrop.toml 파싱 및 런타임 설정
//!
//! [`LogdropConfig`]는 모든 모듈의 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`LOGDROP_SOURCE_FOLLOW=true` 형식)
//! 3. 설정 파일 (`logdrop.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), logdrop_core::error::LogdropError> {
//! use logdrop_core::config::LogdropConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = LogdropConfig::load("logdrop.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = LogdropConfig::parse("[source]\nlines = 20")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, LogdropError};

/// 알려진 차단 방식 이름
pub const VALID_METHODS: &[&str] = &["iptables", "route"];

/// 기본 차단 방식
pub const DEFAULT_METHOD: &str = "iptables";

const MAX_TAIL_LINES: usize = 1_000_000;
const MAX_POLL_INTERVAL_MS: u64 = 60_000;
const MAX_COMMAND_TIMEOUT_SECS: u64 = 3600;

/// logdrop 통합 설정
///
/// `logdrop.toml` 파일의 최상위 구조를 나타냅니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogdropConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 로그 소스 설정
    #[serde(default)]
    pub source: SourceConfig,
    /// 차단 백엔드 설정
    #[serde(default)]
    pub enforcement: EnforcementConfig,
}

impl LogdropConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, LogdropError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    ///
    /// 파싱만 수행합니다. 이후 오버라이드가 잘못된 값을 고칠 수 있으므로
    /// 검증은 호출자가 모든 오버라이드를 적용한 뒤 [`validate`](Self::validate)로 합니다.
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, LogdropError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                LogdropError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                LogdropError::Io(e)
            }
        })?;
        Self::parse(&content)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, LogdropError> {
        toml::from_str(toml_str).map_err(|e| {
            LogdropError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `LOGDROP_{SECTION}_{FIELD}`
    /// 예: `LOGDROP_ENFORCEMENT_METHOD=route`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "LOGDROP_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "LOGDROP_GENERAL_LOG_FORMAT");

        // Source
        override_string(&mut self.source.path, "LOGDROP_SOURCE_PATH");
        override_usize(&mut self.source.lines, "LOGDROP_SOURCE_LINES");
        override_bool(&mut self.source.follow, "LOGDROP_SOURCE_FOLLOW");
        override_u64(
            &mut self.source.poll_interval_ms,
            "LOGDROP_SOURCE_POLL_INTERVAL_MS",
        );
        override_u64(
            &mut self.source.avg_line_bytes,
            "LOGDROP_SOURCE_AVG_LINE_BYTES",
        );
        override_f64(&mut self.source.seek_growth, "LOGDROP_SOURCE_SEEK_GROWTH");

        // Enforcement
        override_string(&mut self.enforcement.method, "LOGDROP_ENFORCEMENT_METHOD");
        override_string(
            &mut self.enforcement.iptables_path,
            "LOGDROP_ENFORCEMENT_IPTABLES_PATH",
        );
        override_string(
            &mut self.enforcement.route_path,
            "LOGDROP_ENFORCEMENT_ROUTE_PATH",
        );
        override_u64(
            &mut self.enforcement.command_timeout_secs,
            "LOGDROP_ENFORCEMENT_COMMAND_TIMEOUT_SECS",
        );
        override_bool(&mut self.enforcement.dry_run, "LOGDROP_ENFORCEMENT_DRY_RUN");
    }

    /// 설정값의 유효성을 검증합니다.
    ///
    /// `source.path`는 CLI 위치 인자로 채워질 수 있으므로 여기서 검사하지 않습니다.
    pub fn validate(&self) -> Result<(), LogdropError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(invalid(
                "general.log_level",
                format!("must be one of: {}", valid_levels.join(", ")),
            ));
        }

        let valid_formats = ["json", "pretty", "compact"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(invalid(
                "general.log_format",
                format!("must be one of: {}", valid_formats.join(", ")),
            ));
        }

        if self.source.lines > MAX_TAIL_LINES {
            return Err(invalid(
                "source.lines",
                format!("must be at most {}", MAX_TAIL_LINES),
            ));
        }

        if self.source.poll_interval_ms == 0 || self.source.poll_interval_ms > MAX_POLL_INTERVAL_MS
        {
            return Err(invalid(
                "source.poll_interval_ms",
                format!("must be 1-{}", MAX_POLL_INTERVAL_MS),
            ));
        }

        if self.source.avg_line_bytes == 0 {
            return Err(invalid("source.avg_line_bytes", "must be greater than 0"));
        }

        let growth = self.source.seek_growth;
        if !growth.is_finite() || growth <= 1.0 {
            return Err(invalid("source.seek_growth", "must be a finite number > 1.0"));
        }

        if !VALID_METHODS.contains(&self.enforcement.method.as_str()) {
            return Err(invalid(
                "enforcement.method",
                format!("must be one of: {}", VALID_METHODS.join(", ")),
            ));
        }

        if self.enforcement.command_timeout_secs == 0
            || self.enforcement.command_timeout_secs > MAX_COMMAND_TIMEOUT_SECS
        {
            return Err(invalid(
                "enforcement.command_timeout_secs",
                format!("must be 1-{}", MAX_COMMAND_TIMEOUT_SECS),
            ));
        }

        Ok(())
    }
}

fn invalid(field: &str, reason: impl Into<String>) -> LogdropError {
    ConfigError::InvalidValue {
        field: field.to_owned(),
        reason: reason.into(),
    }
    .into()
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty, compact)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "compact".to_owned(),
        }
    }
}

/// 로그 소스 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// 감시할 로그 파일 경로
    pub path: String,
    /// 처음에 출력할 마지막 라인 수
    pub lines: usize,
    /// tail 이후 계속 팔로우할지 여부
    pub follow: bool,
    /// 새 데이터가 없을 때 대기 간격 (밀리초)
    pub poll_interval_ms: u64,
    /// 역방향 탐색 시 라인당 평균 바이트 추정치
    pub avg_line_bytes: u64,
    /// 탐색 재시도마다 추정치에 곱하는 배수
    pub seek_growth: f64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            path: String::new(),
            lines: 10,
            follow: false,
            poll_interval_ms: 1000,
            avg_line_bytes: 75,
            seek_growth: 1.3,
        }
    }
}

/// 차단 백엔드 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnforcementConfig {
    /// 차단 방식 (iptables, route)
    pub method: String,
    /// iptables 실행 파일 경로
    pub iptables_path: String,
    /// route 실행 파일 경로
    pub route_path: String,
    /// 명령 하나당 최대 실행 시간 (초)
    pub command_timeout_secs: u64,
    /// 명령을 실행하지 않고 기록만 함
    pub dry_run: bool,
}

impl Default for EnforcementConfig {
    fn default() -> Self {
        Self {
            method: DEFAULT_METHOD.to_owned(),
            iptables_path: "iptables".to_owned(),
            route_path: "route".to_owned(),
            command_timeout_secs: 30,
            dry_run: false,
        }
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_bool(target: &mut bool, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<bool>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse bool from env var, ignoring"
            ),
        }
    }
}

fn override_usize(target: &mut usize, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<usize>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse usize from env var, ignoring"
            ),
        }
    }
}

fn override_u64(target: &mut u64, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u64>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u64 from env var, ignoring"
            ),
        }
    }
}

fn override_f64(target: &mut f64, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<f64>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse f64 from env var, ignoring"
            ),
        }
    }
}
