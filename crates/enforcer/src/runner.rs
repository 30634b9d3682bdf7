//! 외부 명령 실행 추상화
//!
//! [`CommandRunner`] trait으로 프로세스 실행을 추상화하여
//! 테스트에서는 실제 iptables/route 없이 mock을 주입할 수 있습니다.
//! 명령은 셸을 거치지 않고 인자 벡터로 실행됩니다.

use std::future::Future;
use std::process::Stdio;

use tokio::process::Command;

use crate::error::EnforcerError;

/// 끝난 명령의 종료 코드와 출력
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// 종료 코드 (시그널로 종료된 경우 `None`)
    pub code: Option<i32>,
    /// stdout 뒤에 stderr를 이어 붙인 출력
    pub output: String,
}

impl CommandOutput {
    /// 종료 코드가 0인지 여부
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// 외부 명령 실행기
///
/// 명령이 0이 아닌 코드로 끝나도 `Ok`입니다.
/// `Err`는 프로세스를 시작하지 못한 경우에만 반환합니다.
pub trait CommandRunner: Send + Sync + 'static {
    /// 명령을 실행하고 끝날 때까지 기다립니다.
    ///
    /// 반환된 future가 drop되면 자식 프로세스도 종료되어야 합니다.
    fn run(
        &self,
        program: &str,
        args: &[String],
    ) -> impl Future<Output = Result<CommandOutput, EnforcerError>> + Send;
}

/// `tokio::process` 기반 실행기
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemCommandRunner;

impl CommandRunner for SystemCommandRunner {
    async fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput, EnforcerError> {
        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| EnforcerError::Spawn {
                program: program.to_owned(),
                reason: e.to_string(),
            })?;

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        Ok(CommandOutput {
            code: output.status.code(),
            output: combined,
        })
    }
}

/// 테스트용 Mock 실행기
///
/// 설정 가능한 결과를 반환하고 호출 기록을 남깁니다.
#[cfg(test)]
#[derive(Default)]
pub struct MockCommandRunner {
    /// 실행된 명령 (실행 파일, 인자)
    pub calls: std::sync::Mutex<Vec<(String, Vec<String>)>>,
    /// 반환할 종료 코드 (`None`이면 0)
    pub exit_code: Option<Option<i32>>,
    /// 반환할 출력
    pub output: String,
    /// 프로세스 시작 실패를 시뮬레이션할지 여부
    pub fail_spawn: bool,
    /// 응답 전 지연
    pub delay: Option<std::time::Duration>,
}

#[cfg(test)]
impl MockCommandRunner {
    /// 항상 성공하는 mock 실행기를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 종료 코드와 출력을 설정합니다.
    pub fn with_exit(mut self, code: Option<i32>, output: &str) -> Self {
        self.exit_code = Some(code);
        self.output = output.to_owned();
        self
    }

    /// 프로세스 시작에 실패하도록 설정합니다.
    pub fn with_spawn_failure(mut self) -> Self {
        self.fail_spawn = true;
        self
    }

    /// 응답을 지연시킵니다.
    pub fn with_delay(mut self, delay: std::time::Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// 기록된 호출 목록
    pub fn calls(&self) -> Vec<(String, Vec<String>)> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[cfg(test)]
impl CommandRunner for MockCommandRunner {
    async fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput, EnforcerError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((program.to_owned(), args.to_vec()));
        }

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if self.fail_spawn {
            return Err(EnforcerError::Spawn {
                program: program.to_owned(),
                reason: "No such file or directory (os error 2)".to_owned(),
            });
        }

        Ok(CommandOutput {
            code: self.exit_code.unwrap_or(Some(0)),
            output: self.output.clone(),
        })
    }
}
