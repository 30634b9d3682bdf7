//! thrashd 차단 라인 파서
//!
//! thrashd 인스턴스는 공격 주소를 차단/해제할 때 syslog로 다음과 같은 라인을 남깁니다.
//!
//! ```text
//! Jan 01 00:00:00 10.0.0.1 thrashd[1]: holding down address 1.2.3.4 triggered by 5.6.7.8
//! Jan 01 00:05:00 10.0.0.1 thrashd[1]: expired address 1.2.3.4
//! ```
//!
//! 패턴은 라인 시작에 고정되며 끝에는 고정되지 않습니다.
//! 뒤에 붙은 개행이나 추가 텍스트는 무시됩니다.

use regex::Regex;

use logdrop_core::event::{BlockAction, BlockEvent};

use crate::error::LogPipelineError;

/// thrashd 차단 라인 정규식
///
/// - timestamp: `Mon DD HH:MM:SS` (공백으로 채워진 일자 허용)
/// - loghost: 공백 없는 토큰
/// - instance: 콜론 앞의 공백 없는 토큰
/// - attacker: 점으로 구분된 네 개의 숫자 그룹
/// - trigger: 점으로 구분된 숫자 그룹 (선택)
pub const BLOCK_LINE_PATTERN: &str = concat!(
    r"^(?P<timestamp>\w{3} +\d{1,2} \d\d:\d\d:\d\d) ",
    r"(?P<loghost>\S+) ",
    r"(?P<instance>\S+): ",
    r"(?P<action>holding down|expired) address ",
    r"(?P<attacker>\d+\.\d+\.\d+\.\d+)",
    r"(?:\s+triggered by (?P<trigger>\d+(?:\.\d+)*))?",
);

/// thrashd 차단 라인 파서
///
/// 정규식은 생성 시 한 번만 컴파일됩니다.
#[derive(Debug, Clone)]
pub struct BlockLineParser {
    pattern: Regex,
}

impl BlockLineParser {
    /// 새 파서를 생성합니다.
    pub fn new() -> Result<Self, LogPipelineError> {
        let pattern = Regex::new(BLOCK_LINE_PATTERN)?;
        Ok(Self { pattern })
    }

    /// 라인을 파싱합니다. 문법에 맞지 않으면 `None`을 반환합니다.
    pub fn parse(&self, line: &str) -> Option<BlockEvent> {
        let caps = self.pattern.captures(line)?;

        let action = BlockAction::from_phrase(caps.name("action")?.as_str())?;

        Some(BlockEvent {
            timestamp: caps.name("timestamp")?.as_str().to_owned(),
            loghost: caps.name("loghost")?.as_str().to_owned(),
            instance: caps.name("instance")?.as_str().to_owned(),
            action,
            attacker: caps.name("attacker")?.as_str().to_owned(),
            trigger: caps.name("trigger").map(|m| m.as_str().to_owned()),
        })
    }

    /// 라인이 차단 문법에 맞는지 확인합니다.
    pub fn matches(&self, line: &str) -> bool {
        self.pattern.is_match(line)
    }
}
