//! 로그 파싱 모듈 -- thrashd 차단 라인 인식
//!
//! [`BlockLineParser`]는 원시 라인에서 "holding down" / "expired" 문법을
//! 찾아 [`BlockEvent`](logdrop_core::event::BlockEvent)로 변환합니다.
//! 문법에 맞지 않는 라인은 에러가 아니라 `None`입니다.
//!
//! # 사용 예시
//! ```ignore
//! use logdrop_log_pipeline::parser::BlockLineParser;
//!
//! let parser = BlockLineParser::new()?;
//! let event = parser.parse(
//!     "Jan 01 00:00:00 10.0.0.1 thrashd[1]: holding down address 1.2.3.4 triggered by 5.6.7.8",
//! );
//! ```

pub mod thrashd;

pub use thrashd::{BLOCK_LINE_PATTERN, BlockLineParser};
