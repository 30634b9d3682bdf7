//! 차단 백엔드 설정
//!
//! [`EnforcerConfig`]는 core의 [`EnforcementConfig`](logdrop_core::config::EnforcementConfig)를
//! 기반으로 백엔드 전용 설정을 제공합니다.
//!
//! # 사용 예시
//! ```ignore
//! use logdrop_core::config::LogdropConfig;
//! use logdrop_enforcer::config::EnforcerConfig;
//!
//! let core_config = LogdropConfig::default();
//! let config = EnforcerConfig::from_core(&core_config.enforcement)?;
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::backend::EnforcementBackend;
use crate::error::EnforcerError;

/// 명령 제한 시간 상한 (초)
const MAX_COMMAND_TIMEOUT_SECS: u64 = 3600;

/// 차단 백엔드 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnforcerConfig {
    /// 선택된 백엔드
    pub backend: EnforcementBackend,
    /// iptables 실행 파일 경로
    pub iptables_path: String,
    /// route 실행 파일 경로
    pub route_path: String,
    /// 명령 하나당 최대 실행 시간 (초)
    pub command_timeout_secs: u64,
    /// 명령을 실행하지 않고 기록만 함
    pub dry_run: bool,
}

impl Default for EnforcerConfig {
    fn default() -> Self {
        Self {
            backend: EnforcementBackend::PacketFilter,
            iptables_path: "iptables".to_owned(),
            route_path: "route".to_owned(),
            command_timeout_secs: 30,
            dry_run: false,
        }
    }
}

impl EnforcerConfig {
    /// core의 `EnforcementConfig`에서 백엔드 설정을 생성합니다.
    ///
    /// 백엔드 이름을 알 수 없으면 `UnknownMethod`를 반환합니다.
    pub fn from_core(
        core: &logdrop_core::config::EnforcementConfig,
    ) -> Result<Self, EnforcerError> {
        Ok(Self {
            backend: core.method.parse()?,
            iptables_path: core.iptables_path.clone(),
            route_path: core.route_path.clone(),
            command_timeout_secs: core.command_timeout_secs,
            dry_run: core.dry_run,
        })
    }

    /// 명령 제한 시간
    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), EnforcerError> {
        let program = self.backend.program(self);
        if program.trim().is_empty() {
            return Err(EnforcerError::Config {
                field: format!("{}_path", self.backend),
                reason: "must not be empty".to_owned(),
            });
        }

        if self.command_timeout_secs == 0 || self.command_timeout_secs > MAX_COMMAND_TIMEOUT_SECS {
            return Err(EnforcerError::Config {
                field: "command_timeout_secs".to_owned(),
                reason: format!("must be between 1 and {MAX_COMMAND_TIMEOUT_SECS}"),
            });
        }

        Ok(())
    }
}

/// 차단 백엔드 설정 빌더
#[derive(Default)]
pub struct EnforcerConfigBuilder {
    config: EnforcerConfig,
}

impl EnforcerConfigBuilder {
    /// 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 백엔드를 설정합니다.
    pub fn backend(mut self, backend: EnforcementBackend) -> Self {
        self.config.backend = backend;
        self
    }

    /// iptables 실행 파일 경로를 설정합니다.
    pub fn iptables_path(mut self, path: impl Into<String>) -> Self {
        self.config.iptables_path = path.into();
        self
    }

    /// route 실행 파일 경로를 설정합니다.
    pub fn route_path(mut self, path: impl Into<String>) -> Self {
        self.config.route_path = path.into();
        self
    }

    /// 명령 제한 시간(초)을 설정합니다.
    pub fn command_timeout_secs(mut self, secs: u64) -> Self {
        self.config.command_timeout_secs = secs;
        self
    }

    /// dry-run 여부를 설정합니다.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.config.dry_run = dry_run;
        self
    }

    /// 설정을 검증하고 `EnforcerConfig`를 생성합니다.
    pub fn build(self) -> Result<EnforcerConfig, EnforcerError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_packet_filter() {
        let config = EnforcerConfig::default();
        assert_eq!(config.backend, EnforcementBackend::PacketFilter);
        assert_eq!(config.command_timeout(), Duration::from_secs(30));
        config.validate().unwrap();
    }

    #[test]
    fn from_core_parses_method() {
        let core = logdrop_core::config::EnforcementConfig {
            method: "route".to_owned(),
            route_path: "/sbin/route".to_owned(),
            dry_run: true,
            ..Default::default()
        };
        let config = EnforcerConfig::from_core(&core).unwrap();
        assert_eq!(config.backend, EnforcementBackend::Route);
        assert_eq!(config.route_path, "/sbin/route");
        assert!(config.dry_run);
    }

    #[test]
    fn from_core_rejects_unknown_method() {
        let core = logdrop_core::config::EnforcementConfig {
            method: "pf".to_owned(),
            ..Default::default()
        };
        let err = EnforcerConfig::from_core(&core).unwrap_err();
        assert!(matches!(err, EnforcerError::UnknownMethod(ref m) if m == "pf"));
    }

    #[test]
    fn validate_rejects_empty_program_for_selected_backend() {
        let err = EnforcerConfigBuilder::new()
            .backend(EnforcementBackend::Route)
            .route_path("  ")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("route_path"));

        // 선택되지 않은 백엔드의 경로는 검사하지 않음
        EnforcerConfigBuilder::new()
            .backend(EnforcementBackend::Route)
            .iptables_path("")
            .build()
            .unwrap();
    }

    #[test]
    fn validate_rejects_timeout_out_of_range() {
        assert!(EnforcerConfigBuilder::new().command_timeout_secs(0).build().is_err());
        assert!(
            EnforcerConfigBuilder::new()
                .command_timeout_secs(MAX_COMMAND_TIMEOUT_SECS + 1)
                .build()
                .is_err()
        );
    }
}
