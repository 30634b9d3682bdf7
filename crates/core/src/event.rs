//! 도메인 이벤트 -- 파싱된 차단 이벤트와 차단 실행 결과
//!
//! [`BlockEvent`]는 탐지 로그 한 줄에서 만들어지는 불변 레코드이고,
//! [`EnforcementOutcome`]은 그 이벤트를 백엔드에 적용한 결과입니다.
//! 둘 다 즉시 소비되며 저장되지 않습니다.

use std::fmt;

use serde::{Deserialize, Serialize};

/// 로그 문구 "holding down"
pub const PHRASE_HOLDING_DOWN: &str = "holding down";
/// 로그 문구 "expired"
pub const PHRASE_EXPIRED: &str = "expired";

/// 차단 상태 전이
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockAction {
    /// 공격자 IP 차단 시작 ("holding down")
    EnteringBlock,
    /// 공격자 IP 차단 해제 ("expired")
    LeavingBlock,
}

impl BlockAction {
    /// 로그 문구를 액션으로 변환합니다. 두 문구 외에는 `None`.
    pub fn from_phrase(phrase: &str) -> Option<Self> {
        match phrase {
            PHRASE_HOLDING_DOWN => Some(Self::EnteringBlock),
            PHRASE_EXPIRED => Some(Self::LeavingBlock),
            _ => None,
        }
    }

    /// 원본 로그 문구를 반환합니다.
    pub fn phrase(&self) -> &'static str {
        match self {
            Self::EnteringBlock => PHRASE_HOLDING_DOWN,
            Self::LeavingBlock => PHRASE_EXPIRED,
        }
    }

    /// 메트릭 레이블용 고정 이름
    pub fn label(&self) -> &'static str {
        match self {
            Self::EnteringBlock => "entering_block",
            Self::LeavingBlock => "leaving_block",
        }
    }
}

impl fmt::Display for BlockAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.phrase())
    }
}

/// 탐지 로그 한 줄에서 추출한 차단 이벤트
///
/// `attacker`는 항상 점으로 구분된 네 개의 숫자 그룹입니다.
/// 옥텟 범위(0-255)는 검증하지 않으므로 `Ipv4Addr`가 아닌 문자열로 보관합니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockEvent {
    /// 로그 원본 타임스탬프 (재해석하지 않음)
    pub timestamp: String,
    /// 로그를 기록한 호스트
    pub loghost: String,
    /// 탐지기 인스턴스 이름
    pub instance: String,
    /// 상태 전이
    pub action: BlockAction,
    /// 공격자 주소
    pub attacker: String,
    /// 차단을 유발한 주소 (있을 경우)
    pub trigger: Option<String>,
}

/// 외부 명령 실행 상태
///
/// 프로세스를 시작조차 못한 경우와 비정상 종료 코드를 구분합니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExecutionStatus {
    /// 종료 코드 0
    Succeeded,
    /// 0이 아닌 종료 코드 (시그널로 종료된 경우 `None`)
    Exited { code: Option<i32> },
    /// 프로세스 시작 실패
    SpawnFailed,
    /// 제한 시간 초과로 종료됨
    TimedOut,
    /// 실행 전 입력 검증에서 거부됨
    Rejected,
    /// dry-run 모드: 명령을 만들기만 하고 실행하지 않음
    DryRun,
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Succeeded => write!(f, "exit 0"),
            Self::Exited { code: Some(code) } => write!(f, "exit {code}"),
            Self::Exited { code: None } => write!(f, "killed by signal"),
            Self::SpawnFailed => write!(f, "spawn failed"),
            Self::TimedOut => write!(f, "timed out"),
            Self::Rejected => write!(f, "rejected"),
            Self::DryRun => write!(f, "dry run"),
        }
    }
}

/// 이벤트 하나를 백엔드에 적용한 결과
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnforcementOutcome {
    /// 감사 로그용 명령 문자열
    pub command: String,
    /// 실행 상태
    pub status: ExecutionStatus,
    /// stdout/stderr 합친 출력 또는 실패 사유
    pub detail: String,
}

impl EnforcementOutcome {
    /// 새 결과를 생성합니다.
    pub fn new(command: impl Into<String>, status: ExecutionStatus, detail: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            status,
            detail: detail.into(),
        }
    }

    /// 차단 명령이 성공했는지 여부
    pub fn succeeded(&self) -> bool {
        matches!(self.status, ExecutionStatus::Succeeded | ExecutionStatus::DryRun)
    }
}
