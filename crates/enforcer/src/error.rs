//! 차단 백엔드 에러 타입
//!
//! [`EnforcerError`]는 백엔드 선택, 설정 검증, 프로세스 시작 실패를 표현합니다.
//! 명령이 0이 아닌 코드로 끝난 경우는 에러가 아니라
//! [`EnforcementOutcome`](logdrop_core::event::EnforcementOutcome)으로 전달됩니다.

use logdrop_core::error::{ConfigError, EnforcementError, LogdropError};

/// 차단 백엔드 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum EnforcerError {
    /// 알 수 없는 백엔드 이름
    #[error("unknown enforcement method: {0}")]
    UnknownMethod(String),

    /// 프로세스 시작 실패
    #[error("failed to spawn '{program}': {reason}")]
    Spawn {
        /// 실행 파일
        program: String,
        /// 실패 사유
        reason: String,
    },

    /// 설정 에러
    #[error("config error: {field}: {reason}")]
    Config {
        /// 설정 필드명
        field: String,
        /// 에러 사유
        reason: String,
    },
}

impl From<EnforcerError> for LogdropError {
    fn from(err: EnforcerError) -> Self {
        match err {
            EnforcerError::UnknownMethod(name) => {
                LogdropError::Enforcement(EnforcementError::UnknownMethod(name))
            }
            EnforcerError::Spawn { .. } => {
                LogdropError::Enforcement(EnforcementError::InitFailed(err.to_string()))
            }
            EnforcerError::Config { field, reason } => {
                LogdropError::Config(ConfigError::InvalidValue { field, reason })
            }
        }
    }
}
