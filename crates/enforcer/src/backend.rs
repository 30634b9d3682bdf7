//! 차단 백엔드 -- 이벤트를 구체적인 명령 인자로 변환합니다.
//!
//! 백엔드마다 액션별 토큰 `{EnteringBlock: X, LeavingBlock: Y}`과
//! 토큰/주소 두 자리를 채우는 명령 형태를 가집니다.
//!
//! | 백엔드 | 차단 | 해제 | 명령 |
//! |--------|------|------|------|
//! | `iptables` | `I` | `D` | `iptables -<token> INPUT -s <ip> -j DROP` |
//! | `route` | `add` | `del` | `route <token> -host <ip> reject` |

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use logdrop_core::event::BlockAction;

use crate::config::EnforcerConfig;
use crate::error::EnforcerError;

/// 차단 백엔드
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnforcementBackend {
    /// iptables INPUT 체인 DROP 규칙
    PacketFilter,
    /// reject 호스트 라우트
    Route,
}

impl EnforcementBackend {
    /// 지원하는 모든 백엔드
    pub const ALL: [Self; 2] = [Self::PacketFilter, Self::Route];

    /// 설정/CLI에서 쓰는 이름
    pub fn name(&self) -> &'static str {
        match self {
            Self::PacketFilter => "iptables",
            Self::Route => "route",
        }
    }

    /// 액션에 대응하는 백엔드 토큰
    pub fn token(&self, action: BlockAction) -> &'static str {
        match (self, action) {
            (Self::PacketFilter, BlockAction::EnteringBlock) => "I",
            (Self::PacketFilter, BlockAction::LeavingBlock) => "D",
            (Self::Route, BlockAction::EnteringBlock) => "add",
            (Self::Route, BlockAction::LeavingBlock) => "del",
        }
    }

    /// 설정에서 이 백엔드의 실행 파일 경로를 고릅니다.
    pub fn program<'a>(&self, config: &'a EnforcerConfig) -> &'a str {
        match self {
            Self::PacketFilter => &config.iptables_path,
            Self::Route => &config.route_path,
        }
    }

    /// 실행 파일 뒤에 붙는 인자 목록
    pub fn args(&self, action: BlockAction, attacker: &str) -> Vec<String> {
        let token = self.token(action);
        match self {
            Self::PacketFilter => vec![
                format!("-{token}"),
                "INPUT".to_owned(),
                "-s".to_owned(),
                attacker.to_owned(),
                "-j".to_owned(),
                "DROP".to_owned(),
            ],
            Self::Route => vec![
                token.to_owned(),
                "-host".to_owned(),
                attacker.to_owned(),
                "reject".to_owned(),
            ],
        }
    }

    /// 로그/출력용 명령 문자열
    pub fn render(&self, program: &str, action: BlockAction, attacker: &str) -> String {
        render_command(program, &self.args(action, attacker))
    }
}

/// 실행 파일과 인자를 공백으로 이어 붙입니다.
pub fn render_command(program: &str, args: &[String]) -> String {
    let mut command = program.to_owned();
    for arg in args {
        command.push(' ');
        command.push_str(arg);
    }
    command
}

impl fmt::Display for EnforcementBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EnforcementBackend {
    type Err = EnforcerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|backend| backend.name() == s)
            .ok_or_else(|| EnforcerError::UnknownMethod(s.to_owned()))
    }
}
