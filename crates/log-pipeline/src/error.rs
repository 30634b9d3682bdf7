//! 로그 파이프라인 에러 타입
//!
//! [`LogPipelineError`]는 팔로우/파싱/디스패치 루프 내부에서 발생하는 에러를 표현합니다.
//! `From<LogPipelineError> for LogdropError` 변환이 구현되어 있어
//! 상위 레이어에서 `?` 연산자로 자연스럽게 전파할 수 있습니다.
//!
//! 문법에 맞지 않는 라인과 차단 명령 실패는 에러가 아닙니다.

use logdrop_core::error::{ConfigError, LogdropError, SourceError};

/// 로그 파이프라인 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum LogPipelineError {
    /// 시작 시 로그 파일을 열 수 없음 (치명적)
    #[error("log source unavailable: {path}: {reason}")]
    SourceUnavailable {
        /// 로그 파일 경로
        path: String,
        /// 실패 사유
        reason: String,
    },

    /// 팔로우 중 읽기 실패
    #[error("failed to read {path}: {reason}")]
    Read {
        /// 로그 파일 경로
        path: String,
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

    /// 정규식 컴파일 에러
    #[error("regex error: {0}")]
    Regex(#[from] regex::Error),
}

impl From<LogPipelineError> for LogdropError {
    fn from(err: LogPipelineError) -> Self {
        match err {
            LogPipelineError::SourceUnavailable { path, reason } => {
                LogdropError::Source(SourceError::Unavailable { path, reason })
            }
            LogPipelineError::Read { path, reason } => {
                LogdropError::Source(SourceError::Read { path, reason })
            }
            LogPipelineError::Config { field, reason } => {
                LogdropError::Config(ConfigError::InvalidValue { field, reason })
            }
            LogPipelineError::Regex(e) => LogdropError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            }),
        }
    }
}
