//! 차단 명령 실행 -- 이벤트를 명령으로 변환해 실행하고 결과를 반환합니다.
//!
//! [`CommandEnforcer`]는 core의 [`Enforcer`] trait을 구현합니다.
//! 실행 실패는 `Err`가 아니라 [`EnforcementOutcome`]의 상태로 전달되며,
//! 재시도는 하지 않습니다.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{error, info, warn};

use logdrop_core::event::{BlockEvent, EnforcementOutcome, ExecutionStatus};
use logdrop_core::metrics as m;
use logdrop_core::pipeline::Enforcer;

use crate::backend::{EnforcementBackend, render_command};
use crate::config::EnforcerConfig;
use crate::error::EnforcerError;
use crate::runner::{CommandRunner, SystemCommandRunner};

/// 외부 명령 기반 차단 백엔드
pub struct CommandEnforcer<R: CommandRunner> {
    /// 선택된 백엔드
    backend: EnforcementBackend,
    /// 실행 파일 경로
    program: String,
    /// 명령 실행기
    runner: Arc<R>,
    /// 명령 제한 시간
    timeout: Duration,
    /// 명령을 실행하지 않고 기록만 함
    dry_run: bool,
}

impl CommandEnforcer<SystemCommandRunner> {
    /// 시스템 실행기로 차단 백엔드를 생성합니다.
    pub fn from_config(config: &EnforcerConfig) -> Result<Self, EnforcerError> {
        Self::new(config, Arc::new(SystemCommandRunner))
    }
}

impl<R: CommandRunner> CommandEnforcer<R> {
    /// 주어진 실행기로 차단 백엔드를 생성합니다.
    pub fn new(config: &EnforcerConfig, runner: Arc<R>) -> Result<Self, EnforcerError> {
        config.validate()?;

        Ok(Self {
            backend: config.backend,
            program: config.backend.program(config).to_owned(),
            runner,
            timeout: config.command_timeout(),
            dry_run: config.dry_run,
        })
    }

    /// 선택된 백엔드
    pub fn backend(&self) -> EnforcementBackend {
        self.backend
    }

    /// dry-run 여부
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    fn finish(&self, command: String, status: ExecutionStatus, detail: String) -> EnforcementOutcome {
        metrics::counter!(
            m::ENFORCER_COMMANDS_TOTAL,
            m::LABEL_BACKEND => self.backend.name(),
            m::LABEL_RESULT => result_label(&status)
        )
        .increment(1);
        EnforcementOutcome::new(command, status, detail)
    }
}

impl<R: CommandRunner> Enforcer for CommandEnforcer<R> {
    fn name(&self) -> &str {
        self.backend.name()
    }

    async fn apply(&self, event: &BlockEvent) -> EnforcementOutcome {
        let args = self.backend.args(event.action, &event.attacker);
        let command = render_command(&self.program, &args);

        if !is_dotted_quad(&event.attacker) {
            warn!(
                attacker = %event.attacker,
                backend = self.backend.name(),
                "refusing to run command for malformed address"
            );
            return self.finish(
                command,
                ExecutionStatus::Rejected,
                format!("attacker '{}' is not a dotted-quad address", event.attacker),
            );
        }

        if self.dry_run {
            info!(command = %command, "dry run, command not executed");
            return self.finish(command, ExecutionStatus::DryRun, String::new());
        }

        info!(
            command = %command,
            attacker = %event.attacker,
            action = %event.action,
            "executing enforcement command"
        );

        let started = Instant::now();
        let result = tokio::time::timeout(self.timeout, self.runner.run(&self.program, &args)).await;
        metrics::histogram!(
            m::ENFORCER_COMMAND_DURATION_SECONDS,
            m::LABEL_BACKEND => self.backend.name()
        )
        .record(started.elapsed().as_secs_f64());

        let (status, detail) = match result {
            Ok(Ok(output)) if output.success() => (ExecutionStatus::Succeeded, output.output),
            Ok(Ok(output)) => {
                warn!(
                    command = %command,
                    code = output.code,
                    output = output.output.trim_end(),
                    "enforcement command exited with failure"
                );
                (ExecutionStatus::Exited { code: output.code }, output.output)
            }
            Ok(Err(e)) => {
                error!(command = %command, error = %e, "failed to start enforcement command");
                (ExecutionStatus::SpawnFailed, e.to_string())
            }
            Err(_elapsed) => {
                error!(
                    command = %command,
                    timeout_secs = self.timeout.as_secs(),
                    "enforcement command timed out"
                );
                (
                    ExecutionStatus::TimedOut,
                    format!("command timed out after {}s", self.timeout.as_secs()),
                )
            }
        };

        self.finish(command, status, detail)
    }
}

/// 점으로 구분된 네 개의 숫자 그룹인지 확인합니다. 옥텟 범위는 검사하지 않습니다.
fn is_dotted_quad(address: &str) -> bool {
    let mut groups = 0;
    for group in address.split('.') {
        if group.is_empty() || !group.bytes().all(|b| b.is_ascii_digit()) {
            return false;
        }
        groups += 1;
    }
    groups == 4
}

/// 메트릭 레이블용 고정 결과명
fn result_label(status: &ExecutionStatus) -> &'static str {
    match status {
        ExecutionStatus::Succeeded => "succeeded",
        ExecutionStatus::Exited { .. } => "exited",
        ExecutionStatus::SpawnFailed => "spawn_failed",
        ExecutionStatus::TimedOut => "timed_out",
        ExecutionStatus::Rejected => "rejected",
        ExecutionStatus::DryRun => "dry_run",
    }
}
