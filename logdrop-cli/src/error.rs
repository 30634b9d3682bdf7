//! CLI-specific error types and exit code mapping

use logdrop_core::error::LogdropError;
use logdrop_enforcer::EnforcerError;
use logdrop_log_pipeline::LogPipelineError;

/// CLI-specific error type.
///
/// Each variant carries enough context for a user-friendly message.
/// The `exit_code()` method maps errors to standard Unix exit codes.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration loading or validation failure.
    #[error("configuration error: {0}")]
    Config(String),

    /// The reaction loop or another runtime step failed.
    #[error("{0}")]
    Command(String),

    /// The log file could not be opened at startup.
    #[error("{0}")]
    SourceUnavailable(String),

    /// JSON serialisation failed during output rendering.
    #[error("json output error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    /// IO error (stdout write, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map the error to a process exit code.
    ///
    /// | Code | Meaning                              |
    /// |------|--------------------------------------|
    /// | 0    | Success or operator interrupt        |
    /// | 1    | General / command error              |
    /// | 2    | Configuration error                  |
    /// | 3    | Log file unavailable                 |
    /// | 10   | IO error                             |
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 2,
            Self::SourceUnavailable(_) => 3,
            Self::Io(_) => 10,
            Self::JsonSerialize(_) | Self::Command(_) => 1,
        }
    }
}

impl From<LogdropError> for CliError {
    fn from(e: LogdropError) -> Self {
        match e {
            LogdropError::Config(inner) => Self::Config(inner.to_string()),
            LogdropError::Enforcement(inner) => Self::Config(inner.to_string()),
            LogdropError::Source(_) => Self::SourceUnavailable(e.to_string()),
            LogdropError::Io(io) => Self::Io(io),
        }
    }
}

impl From<LogPipelineError> for CliError {
    fn from(e: LogPipelineError) -> Self {
        match e {
            LogPipelineError::SourceUnavailable { .. } => Self::SourceUnavailable(e.to_string()),
            LogPipelineError::Config { field, reason } => Self::Config(format!("{field}: {reason}")),
            LogPipelineError::Read { .. } | LogPipelineError::Regex(_) => {
                Self::Command(e.to_string())
            }
        }
    }
}

impl From<EnforcerError> for CliError {
    fn from(e: EnforcerError) -> Self {
        match e {
            EnforcerError::UnknownMethod(_) => Self::Config(e.to_string()),
            EnforcerError::Config { field, reason } => Self::Config(format!("{field}: {reason}")),
            EnforcerError::Spawn { .. } => Self::Command(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use logdrop_core::error::{ConfigError, SourceError};

    #[test]
    fn test_exit_code_config_error() {
        let err = CliError::Config("test error".to_owned());
        assert_eq!(err.exit_code(), 2, "config error should return exit code 2");
    }

    #[test]
    fn test_exit_code_source_unavailable() {
        let err: CliError = LogPipelineError::SourceUnavailable {
            path: "/var/log/thrashd.log".to_owned(),
            reason: "No such file or directory".to_owned(),
        }
        .into();
        assert_eq!(err.exit_code(), 3, "missing log should return exit code 3");
        assert!(err.to_string().contains("/var/log/thrashd.log"));
    }

    #[test]
    fn test_exit_code_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "stdout closed");
        let err = CliError::Io(io_err);
        assert_eq!(err.exit_code(), 10, "io error should return exit code 10");
    }

    #[test]
    fn test_exit_code_read_error() {
        let err: CliError = LogPipelineError::Read {
            path: "/var/log/thrashd.log".to_owned(),
            reason: "Input/output error".to_owned(),
        }
        .into();
        assert_eq!(err.exit_code(), 1, "read error should return exit code 1");
    }

    #[test]
    fn test_core_errors_map_by_domain() {
        let config: CliError = LogdropError::Config(ConfigError::FileNotFound {
            path: "logdrop.toml".to_owned(),
        })
        .into();
        assert_eq!(config.exit_code(), 2);

        let source: CliError = LogdropError::Source(SourceError::Unavailable {
            path: "x".to_owned(),
            reason: "y".to_owned(),
        })
        .into();
        assert_eq!(source.exit_code(), 3);
    }

    #[test]
    fn test_config_message_has_single_prefix() {
        let err: CliError = LogdropError::Config(ConfigError::InvalidValue {
            field: "enforcement.method".to_owned(),
            reason: "must be one of: iptables, route".to_owned(),
        })
        .into();
        assert_eq!(
            err.to_string(),
            "configuration error: invalid config value for 'enforcement.method': must be one of: iptables, route"
        );

        let err: CliError = LogPipelineError::Config {
            field: "poll_interval_ms".to_owned(),
            reason: "must be greater than 0".to_owned(),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "configuration error: poll_interval_ms: must be greater than 0"
        );

        let err: CliError = EnforcerError::Config {
            field: "command_timeout_secs".to_owned(),
            reason: "out of range".to_owned(),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "configuration error: command_timeout_secs: out of range"
        );
    }

    #[test]
    fn test_unknown_method_is_config_error() {
        let err: CliError = EnforcerError::UnknownMethod("pf".to_owned()).into();
        assert_eq!(err.exit_code(), 2);
    }
}
