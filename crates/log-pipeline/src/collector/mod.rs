//! 로그 수집 모듈 -- 단일 로그 파일 tail/follow
//!
//! # 구성
//! - [`LogFollower`]: 마지막 N줄 출력 후 파일을 계속 팔로우 (tail -f 방식)
//! - [`tail_lines`]: 역방향 탐색으로 마지막 N줄을 찾는 헬퍼
//! - [`FileIdentity`]: 로테이션 감지용 파일 식별자 (장치 + inode)

pub mod file;

pub use file::{LogFollower, tail_lines};

use std::fmt;
use std::fs::Metadata;

/// 팔로워 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowerState {
    /// 마지막 N줄 위치를 찾는 중
    Seeking,
    /// 찾은 마지막 N줄을 내보내는 중
    Tailing,
    /// 새 라인을 기다리며 팔로우 중
    Following,
    /// 로테이션을 감지하고 새 파일을 다시 열었음
    Rotated,
    /// 입력 끝 (팔로우 모드가 아닐 때만 도달)
    Finished,
}

impl fmt::Display for FollowerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Seeking => "seeking",
            Self::Tailing => "tailing",
            Self::Following => "following",
            Self::Rotated => "rotated",
            Self::Finished => "finished",
        };
        f.write_str(name)
    }
}

/// 파일 식별자
///
/// 같은 경로라도 장치 번호나 inode가 달라지면 다른 파일로 봅니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileIdentity {
    /// 장치 번호
    pub dev: u64,
    /// inode 번호
    pub ino: u64,
}

impl FileIdentity {
    /// 메타데이터에서 식별자를 추출합니다. Unix 외 플랫폼에서는 `None`.
    #[cfg(unix)]
    pub fn from_metadata(metadata: &Metadata) -> Option<Self> {
        use std::os::unix::fs::MetadataExt;
        Some(Self {
            dev: metadata.dev(),
            ino: metadata.ino(),
        })
    }

    /// 메타데이터에서 식별자를 추출합니다. Unix 외 플랫폼에서는 `None`.
    #[cfg(not(unix))]
    pub fn from_metadata(_metadata: &Metadata) -> Option<Self> {
        None
    }
}

impl fmt::Display for FileIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.ino)
    }
}
