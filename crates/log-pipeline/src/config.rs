//! 로그 팔로워 설정
//!
//! [`FollowerConfig`]는 core의 [`SourceConfig`](logdrop_core::config::SourceConfig)를
//! 기반으로 팔로워 전용 설정을 제공합니다.
//!
//! # 사용 예시
//! ```ignore
//! use logdrop_core::config::LogdropConfig;
//! use logdrop_log_pipeline::config::FollowerConfig;
//!
//! let core_config = LogdropConfig::default();
//! let config = FollowerConfig::from_core(&core_config.source);
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::LogPipelineError;

/// 기본 tail 라인 수
pub const DEFAULT_TAIL_LINES: usize = 10;
/// 기본 폴링 간격 (밀리초)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;
/// 역방향 탐색 시 라인당 평균 바이트 초기 추정치
pub const DEFAULT_AVG_LINE_BYTES: u64 = 75;
/// 탐색 재시도마다 추정치에 곱하는 배수
pub const DEFAULT_SEEK_GROWTH: f64 = 1.3;

/// 로그 팔로워 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowerConfig {
    /// 팔로우할 파일 경로
    pub path: PathBuf,
    /// 처음에 출력할 마지막 라인 수
    pub lines: usize,
    /// tail 이후 계속 팔로우할지 여부
    pub follow: bool,
    /// 새 데이터가 없을 때 대기 간격 (밀리초)
    pub poll_interval_ms: u64,
    /// 라인당 평균 바이트 초기 추정치
    pub avg_line_bytes: u64,
    /// 탐색 재시도 배수
    pub seek_growth: f64,
}

impl Default for FollowerConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::new(),
            lines: DEFAULT_TAIL_LINES,
            follow: false,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            avg_line_bytes: DEFAULT_AVG_LINE_BYTES,
            seek_growth: DEFAULT_SEEK_GROWTH,
        }
    }
}

impl FollowerConfig {
    /// core의 `SourceConfig`에서 팔로워 설정을 생성합니다.
    pub fn from_core(core: &logdrop_core::config::SourceConfig) -> Self {
        Self {
            path: PathBuf::from(&core.path),
            lines: core.lines,
            follow: core.follow,
            poll_interval_ms: core.poll_interval_ms,
            avg_line_bytes: core.avg_line_bytes,
            seek_growth: core.seek_growth,
        }
    }

    /// 폴링 간격
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), LogPipelineError> {
        if self.path.as_os_str().is_empty() {
            return Err(LogPipelineError::Config {
                field: "path".to_owned(),
                reason: "log path must not be empty".to_owned(),
            });
        }

        if self.poll_interval_ms == 0 {
            return Err(LogPipelineError::Config {
                field: "poll_interval_ms".to_owned(),
                reason: "must be greater than 0".to_owned(),
            });
        }

        if self.avg_line_bytes == 0 {
            return Err(LogPipelineError::Config {
                field: "avg_line_bytes".to_owned(),
                reason: "must be greater than 0".to_owned(),
            });
        }

        if !self.seek_growth.is_finite() || self.seek_growth <= 1.0 {
            return Err(LogPipelineError::Config {
                field: "seek_growth".to_owned(),
                reason: "must be a finite number > 1.0".to_owned(),
            });
        }

        Ok(())
    }
}

/// 팔로워 설정 빌더
#[derive(Default)]
pub struct FollowerConfigBuilder {
    config: FollowerConfig,
}

impl FollowerConfigBuilder {
    /// 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 파일 경로를 설정합니다.
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.path = path.into();
        self
    }

    /// tail 라인 수를 설정합니다.
    pub fn lines(mut self, lines: usize) -> Self {
        self.config.lines = lines;
        self
    }

    /// 팔로우 여부를 설정합니다.
    pub fn follow(mut self, follow: bool) -> Self {
        self.config.follow = follow;
        self
    }

    /// 폴링 간격(밀리초)을 설정합니다.
    pub fn poll_interval_ms(mut self, ms: u64) -> Self {
        self.config.poll_interval_ms = ms;
        self
    }

    /// 라인당 평균 바이트 추정치를 설정합니다.
    pub fn avg_line_bytes(mut self, bytes: u64) -> Self {
        self.config.avg_line_bytes = bytes;
        self
    }

    /// 탐색 재시도 배수를 설정합니다.
    pub fn seek_growth(mut self, growth: f64) -> Self {
        self.config.seek_growth = growth;
        self
    }

    /// 설정을 검증하고 `FollowerConfig`를 생성합니다.
    pub fn build(self) -> Result<FollowerConfig, LogPipelineError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
