//! logdrop 공통 크레이트
//!
//! 침입 탐지 로그를 팔로우하며 차단 명령을 실행하는 logdrop의
//! 모든 크레이트가 공유하는 타입, trait, 에러, 설정을 제공합니다.
//!
//! - [`config`]: `logdrop.toml` 파싱 및 환경변수 오버라이드
//! - [`error`]: 도메인별 에러 타입
//! - [`event`]: 차단 이벤트와 실행 결과
//! - [`pipeline`]: 차단 백엔드 capability trait
//! - [`metrics`]: 메트릭 이름 상수

pub mod config;
pub mod error;
pub mod event;
pub mod metrics;
pub mod pipeline;

// --- 주요 타입 re-export ---

// 에러
pub use error::{ConfigError, EnforcementError, LogdropError, SourceError};

// 설정
pub use config::{EnforcementConfig, GeneralConfig, LogdropConfig, SourceConfig};

// 이벤트
pub use event::{BlockAction, BlockEvent, EnforcementOutcome, ExecutionStatus};

// 파이프라인 trait
pub use pipeline::Enforcer;
