//! logdrop 로그 파이프라인
//!
//! thrashd 로그 파일을 tail/follow하며 차단 라인을 인식하고,
//! 설정된 차단 백엔드로 명령을 내보낸 뒤 주소별 결과를 기록합니다.
//!
//! # 모듈 구성
//!
//! - [`collector`]: 로그 파일 tail/follow (로테이션, truncation 감지)
//! - [`parser`]: thrashd "holding down" / "expired" 라인 파서
//! - [`ledger`]: 주소별 마지막 액션 기록
//! - [`pipeline`]: 반응 루프 (팔로우 -> 파싱 -> 차단 -> 기록)
//! - [`config`]: 팔로워 설정 (core 설정 확장)
//! - [`error`]: 도메인 에러 타입
//!
//! # 아키텍처
//!
//! ```text
//! LogFollower -> BlockLineParser -> Enforcer::apply -> ActionLedger
//!      |               |                  |                 |
//!  tail + poll    regex match      iptables/route     last action per IP
//! ```

pub mod config;
pub mod error;
pub mod ledger;
pub mod pipeline;

pub mod collector;
pub mod parser;

// --- 주요 타입 re-export ---

// 반응 루프
pub use pipeline::{LineObserver, NoopObserver, ReactionLoop, StopReason};

// 설정
pub use config::{FollowerConfig, FollowerConfigBuilder};

// 에러
pub use error::LogPipelineError;

// 파서
pub use parser::BlockLineParser;

// 수집기
pub use collector::{FileIdentity, FollowerState, LogFollower, tail_lines};

// 기록
pub use ledger::{ActionLedger, LedgerEntry};
