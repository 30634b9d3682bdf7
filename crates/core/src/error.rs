//! 에러 타입 -- 도메인별 에러 정의

/// logdrop 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum LogdropError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 로그 소스 에러
    #[error("source error: {0}")]
    Source(#[from] SourceError),

    /// 차단 백엔드 에러
    #[error("enforcement error: {0}")]
    Enforcement(#[from] EnforcementError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 로그 소스 에러
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// 로그 파일을 열 수 없음 (시작 시 치명적)
    #[error("log source unavailable: {path}: {reason}")]
    Unavailable { path: String, reason: String },

    /// 팔로우 중 읽기 실패
    #[error("failed to read {path}: {reason}")]
    Read { path: String, reason: String },
}

/// 차단 백엔드 에러
///
/// 명령 실패(비정상 종료 코드)는 여기에 속하지 않습니다.
/// 그것은 [`EnforcementOutcome`](crate::event::EnforcementOutcome)으로 표현됩니다.
#[derive(Debug, thiserror::Error)]
pub enum EnforcementError {
    /// 알 수 없는 백엔드 이름
    #[error("unknown enforcement method: {0}")]
    UnknownMethod(String),

    /// 백엔드 초기화 실패
    #[error("enforcer init failed: {0}")]
    InitFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_unavailable_display_includes_path() {
        let err = LogdropError::from(SourceError::Unavailable {
            path: "/var/log/thrashd.log".to_owned(),
            reason: "No such file or directory".to_owned(),
        });
        let msg = err.to_string();
        assert!(msg.contains("/var/log/thrashd.log"));
        assert!(msg.contains("No such file"));
    }

    #[test]
    fn config_invalid_value_display() {
        let err = ConfigError::InvalidValue {
            field: "source.lines".to_owned(),
            reason: "too large".to_owned(),
        };
        assert_eq!(
            err.to_string(),
            "invalid config value for 'source.lines': too large"
        );
    }

    #[test]
    fn io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: LogdropError = io.into();
        assert!(matches!(err, LogdropError::Io(_)));
    }
}
