//! logdrop 차단 백엔드
//!
//! 차단 이벤트를 iptables 또는 route 명령으로 변환해 실행합니다.
//!
//! # 모듈 구성
//!
//! - [`backend`]: 백엔드 열거형과 명령 인자 생성
//! - [`executor`]: core `Enforcer` trait 구현 (제한 시간, dry-run, 주소 검증)
//! - [`runner`]: 외부 프로세스 실행 추상화
//! - [`config`]: 백엔드 설정 (core 설정 확장)
//! - [`error`]: 도메인 에러 타입

pub mod backend;
pub mod config;
pub mod error;
pub mod executor;
pub mod runner;

// --- 주요 타입 re-export ---

pub use backend::EnforcementBackend;
pub use config::{EnforcerConfig, EnforcerConfigBuilder};
pub use error::EnforcerError;
pub use executor::CommandEnforcer;
pub use runner::{CommandOutput, CommandRunner, SystemCommandRunner};
