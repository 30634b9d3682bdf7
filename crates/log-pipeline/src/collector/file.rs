//! 파일 기반 로그 팔로워
//!
//! 로그 파일의 마지막 N줄을 내보낸 뒤, 설정에 따라 새로 추가되는 라인을 계속 읽습니다.
//! `tail -f`와 유사한 동작을 비동기 방식으로 구현합니다.
//!
//! # 로테이션 감지
//! - 장치/inode 변경 감지 (logrotate 등): 경로를 다시 열고 처음부터 읽음
//! - 파일 크기 축소 감지 (truncation): 같은 핸들을 처음으로 되감음
//! - 경로 stat 실패: 기존 핸들을 유지하고 다음 폴링에서 재확인
//!
//! 개행으로 끝나지 않은 조각은 라인이 완성될 때까지 버퍼에 보관합니다.
//! 로테이션/truncation 시점에 남은 조각은 개행을 붙여 한 라인으로 내보냅니다.

use std::collections::VecDeque;
use std::io::{self, SeekFrom};
use std::path::Path;

use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncSeek, AsyncSeekExt, BufReader};
use tracing::{debug, info, warn};

use logdrop_core::metrics as m;

use super::{FileIdentity, FollowerState};
use crate::config::{DEFAULT_AVG_LINE_BYTES, DEFAULT_SEEK_GROWTH, FollowerConfig};
use crate::error::LogPipelineError;

/// 마지막 `lines`줄과 팔로우를 재개할 바이트 오프셋을 찾습니다.
///
/// 파일 끝에서 `avg_line_bytes * lines` 바이트만큼 뒤로 이동해 읽고,
/// 개행으로 나눈 조각이 `lines + 1`개를 넘거나 파일 처음에 도달할 때까지
/// 추정치에 `growth`를 곱해 재시도합니다.
///
/// 반환되는 라인은 모두 개행으로 끝납니다. 마지막 개행 뒤의 미완성 조각은 포함되지 않으며,
/// 재개 오프셋은 마지막 완성 라인의 끝을 가리킵니다.
pub async fn tail_lines<R>(
    reader: &mut R,
    lines: usize,
    avg_line_bytes: u64,
    growth: f64,
) -> io::Result<(Vec<String>, u64)>
where
    R: AsyncRead + AsyncSeek + Unpin,
{
    let avg_line_bytes = if avg_line_bytes == 0 {
        DEFAULT_AVG_LINE_BYTES
    } else {
        avg_line_bytes
    };
    let growth = if growth.is_finite() && growth > 1.0 {
        growth
    } else {
        DEFAULT_SEEK_GROWTH
    };

    let len = reader.seek(SeekFrom::End(0)).await?;
    let mut estimate = avg_line_bytes as f64;
    let mut buf = Vec::new();

    let start = loop {
        let want = (estimate * lines.max(1) as f64).ceil() as u64;
        let start = len.saturating_sub(want);
        reader.seek(SeekFrom::Start(start)).await?;
        buf.clear();
        reader.read_to_end(&mut buf).await?;

        let segments = buf.iter().filter(|&&b| b == b'\n').count() + 1;
        if segments > lines + 1 || start == 0 {
            break start;
        }
        estimate *= growth;
    };

    let segments: Vec<&[u8]> = buf.split(|&b| b == b'\n').collect();
    let count = segments.len();
    let first = if count > lines { count - lines - 1 } else { 0 };

    let tail = segments[first..count - 1]
        .iter()
        .map(|segment| {
            let mut line = String::from_utf8_lossy(segment).into_owned();
            line.push('\n');
            line
        })
        .collect();

    let fragment_len = segments[count - 1].len() as u64;
    let resume_offset = start + buf.len() as u64 - fragment_len;

    Ok((tail, resume_offset))
}

/// 로그 파일 팔로워
///
/// [`open`](Self::open)으로 생성하고 [`next_line`](Self::next_line)을 반복 호출합니다.
/// 팔로우 모드에서는 `next_line`이 새 라인이 생길 때까지 반환하지 않으므로
/// 호출자가 `tokio::select!`로 취소를 처리해야 합니다.
pub struct LogFollower {
    /// 팔로워 설정
    config: FollowerConfig,
    /// 현재 열린 파일
    reader: BufReader<File>,
    /// 현재 핸들의 파일 식별자
    identity: Option<FileIdentity>,
    /// 현재 파일에서 소비한 바이트 수 (미완성 조각 포함)
    offset: u64,
    /// 개행을 기다리는 미완성 조각
    pending: Vec<u8>,
    /// tail 단계에서 내보낼 라인
    backlog: VecDeque<String>,
    /// 현재 상태
    state: FollowerState,
    /// 다시 연 횟수
    rotations: u64,
}

impl LogFollower {
    /// 로그 파일을 열고 마지막 N줄 위치를 찾습니다.
    ///
    /// 파일을 열 수 없으면 `SourceUnavailable`을 반환합니다.
    pub async fn open(config: FollowerConfig) -> Result<Self, LogPipelineError> {
        config.validate()?;

        let (file, identity) = open_source(&config.path).await?;

        let mut follower = Self {
            config,
            reader: BufReader::new(file),
            identity,
            offset: 0,
            pending: Vec::new(),
            backlog: VecDeque::new(),
            state: FollowerState::Seeking,
            rotations: 0,
        };
        follower.seek_tail().await?;

        info!(
            path = %follower.config.path.display(),
            tail_lines = follower.backlog.len(),
            offset = follower.offset,
            follow = follower.config.follow,
            "log source opened"
        );

        Ok(follower)
    }

    /// 다음 라인을 반환합니다. 라인은 개행으로 끝납니다.
    ///
    /// 팔로우 모드가 아니면 tail 라인을 모두 내보낸 뒤 `None`을 반환합니다.
    /// 팔로우 모드에서는 `None`을 반환하지 않습니다.
    pub async fn next_line(&mut self) -> Result<Option<String>, LogPipelineError> {
        loop {
            match self.state {
                FollowerState::Seeking => self.seek_tail().await?,
                FollowerState::Tailing => {
                    if let Some(line) = self.backlog.pop_front() {
                        metrics::counter!(m::FOLLOWER_LINES_READ_TOTAL).increment(1);
                        return Ok(Some(line));
                    }
                    if self.config.follow {
                        debug!(
                            path = %self.config.path.display(),
                            offset = self.offset,
                            "tail complete, following"
                        );
                        self.state = FollowerState::Following;
                    } else {
                        self.state = FollowerState::Finished;
                    }
                }
                FollowerState::Finished => return Ok(None),
                FollowerState::Following | FollowerState::Rotated => {
                    self.state = FollowerState::Following;

                    if let Some(line) = self.read_complete_line().await? {
                        metrics::counter!(m::FOLLOWER_LINES_READ_TOTAL).increment(1);
                        return Ok(Some(line));
                    }
                    if let Some(fragment) = self.poll_source().await? {
                        metrics::counter!(m::FOLLOWER_LINES_READ_TOTAL).increment(1);
                        return Ok(Some(fragment));
                    }
                }
            }
        }
    }

    /// 현재 상태를 반환합니다.
    pub fn state(&self) -> FollowerState {
        self.state
    }

    /// 로테이션으로 파일을 다시 연 횟수
    pub fn rotations(&self) -> u64 {
        self.rotations
    }

    /// 팔로우 중인 경로
    pub fn path(&self) -> &Path {
        &self.config.path
    }

    async fn seek_tail(&mut self) -> Result<(), LogPipelineError> {
        self.state = FollowerState::Seeking;

        let path = &self.config.path;
        let read_err = |e: io::Error| LogPipelineError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        };

        // lines == 0이면 기존 라인 없이 마지막 완성 라인 뒤에서 시작
        let (lines, resume_offset) = tail_lines(
            self.reader.get_mut(),
            self.config.lines,
            self.config.avg_line_bytes,
            self.config.seek_growth,
        )
        .await
        .map_err(read_err)?;
        self.backlog = lines.into();

        self.reader
            .seek(SeekFrom::Start(resume_offset))
            .await
            .map_err(read_err)?;
        self.offset = resume_offset;
        self.state = FollowerState::Tailing;
        Ok(())
    }

    /// 개행까지 읽습니다. 개행 전에 EOF에 도달하면 조각을 보관하고 `None`.
    async fn read_complete_line(&mut self) -> Result<Option<String>, LogPipelineError> {
        let read = self
            .reader
            .read_until(b'\n', &mut self.pending)
            .await
            .map_err(|e| LogPipelineError::Read {
                path: self.config.path.display().to_string(),
                reason: e.to_string(),
            })?;
        self.offset += read as u64;

        if self.pending.last() == Some(&b'\n') {
            let line = String::from_utf8_lossy(&self.pending).into_owned();
            self.pending.clear();
            Ok(Some(line))
        } else {
            Ok(None)
        }
    }

    /// 새 데이터가 없을 때 경로 상태를 확인합니다.
    ///
    /// 로테이션/truncation이 감지되면 대기 없이 돌아가며, 남은 조각이 있으면 반환합니다.
    /// 변화가 없으면 폴링 간격만큼 대기합니다.
    async fn poll_source(&mut self) -> Result<Option<String>, LogPipelineError> {
        match tokio::fs::metadata(&self.config.path).await {
            Ok(metadata) => {
                let current = FileIdentity::from_metadata(&metadata);
                if current.is_some() && current != self.identity {
                    // 이전 파일에 마지막으로 쓰인 라인부터 마저 읽음
                    if let Some(line) = self.read_complete_line().await? {
                        return Ok(Some(line));
                    }
                    return self.reopen(current).await;
                }
                if metadata.len() < self.offset {
                    return self.rewind_truncated(metadata.len()).await;
                }
            }
            Err(e) => {
                debug!(
                    path = %self.config.path.display(),
                    error = %e,
                    "stat failed, keeping current handle"
                );
            }
        }

        tokio::time::sleep(self.config.poll_interval()).await;
        Ok(None)
    }

    async fn reopen(
        &mut self,
        seen: Option<FileIdentity>,
    ) -> Result<Option<String>, LogPipelineError> {
        let path = self.config.path.display().to_string();

        let file = match File::open(&self.config.path).await {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path, "rotated path vanished before reopen, retrying");
                tokio::time::sleep(self.config.poll_interval()).await;
                return Ok(None);
            }
            Err(e) => {
                return Err(LogPipelineError::Read {
                    path,
                    reason: e.to_string(),
                });
            }
        };

        let identity = match file.metadata().await {
            Ok(metadata) => FileIdentity::from_metadata(&metadata),
            Err(_) => seen,
        };

        warn!(
            path = %path,
            old_inode = self.identity.map(|id| id.ino),
            new_inode = identity.map(|id| id.ino),
            "{} changed inode numbers from {} to {}",
            path,
            display_inode(self.identity),
            display_inode(identity),
        );

        let fragment = self.take_fragment();
        self.reader = BufReader::new(file);
        self.identity = identity;
        self.offset = 0;
        self.rotations += 1;
        self.state = FollowerState::Rotated;
        metrics::counter!(m::FOLLOWER_REOPENS_TOTAL).increment(1);

        Ok(fragment)
    }

    async fn rewind_truncated(&mut self, len: u64) -> Result<Option<String>, LogPipelineError> {
        warn!(
            path = %self.config.path.display(),
            offset = self.offset,
            len,
            "log file truncated, reading from start"
        );

        self.reader
            .seek(SeekFrom::Start(0))
            .await
            .map_err(|e| LogPipelineError::Read {
                path: self.config.path.display().to_string(),
                reason: e.to_string(),
            })?;

        let fragment = self.take_fragment();
        self.offset = 0;
        self.rotations += 1;
        self.state = FollowerState::Rotated;
        metrics::counter!(m::FOLLOWER_REOPENS_TOTAL).increment(1);

        Ok(fragment)
    }

    fn take_fragment(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            return None;
        }
        let mut line = String::from_utf8_lossy(&self.pending).into_owned();
        line.push('\n');
        self.pending.clear();
        Some(line)
    }
}

async fn open_source(path: &Path) -> Result<(File, Option<FileIdentity>), LogPipelineError> {
    let unavailable = |reason: String| LogPipelineError::SourceUnavailable {
        path: path.display().to_string(),
        reason,
    };

    let file = File::open(path)
        .await
        .map_err(|e| unavailable(e.to_string()))?;
    let metadata = file
        .metadata()
        .await
        .map_err(|e| unavailable(e.to_string()))?;

    if metadata.is_dir() {
        return Err(unavailable("is a directory".to_owned()));
    }

    Ok((file, FileIdentity::from_metadata(&metadata)))
}

fn display_inode(identity: Option<FileIdentity>) -> String {
    identity.map_or_else(|| "unknown".to_owned(), |id| id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use std::time::Duration;

    use proptest::prelude::*;

    use crate::config::FollowerConfigBuilder;

    const WAIT: Duration = Duration::from_secs(5);

    fn numbered(count: usize) -> String {
        (1..=count).map(|i| format!("line {i}\n")).collect()
    }

    fn config(path: &Path, lines: usize, follow: bool) -> FollowerConfig {
        FollowerConfigBuilder::new()
            .path(path)
            .lines(lines)
            .follow(follow)
            .poll_interval_ms(10)
            .build()
            .unwrap()
    }

    async fn next(follower: &mut LogFollower) -> Option<String> {
        tokio::time::timeout(WAIT, follower.next_line())
            .await
            .expect("next_line timed out")
            .unwrap()
    }

    async fn drain(follower: &mut LogFollower) -> Vec<String> {
        let mut lines = Vec::new();
        while let Some(line) = next(follower).await {
            lines.push(line);
        }
        lines
    }

    fn append(path: &Path, data: &str) {
        let mut file = std::fs::OpenOptions::new().append(true).open(path).unwrap();
        file.write_all(data.as_bytes()).unwrap();
        file.flush().unwrap();
    }

    #[tokio::test]
    async fn tail_lines_returns_last_n() {
        let mut cursor = Cursor::new(numbered(20).into_bytes());
        let (lines, offset) = tail_lines(&mut cursor, 3, 75, 1.3).await.unwrap();
        assert_eq!(lines, vec!["line 18\n", "line 19\n", "line 20\n"]);
        assert_eq!(offset, numbered(20).len() as u64);
    }

    #[tokio::test]
    async fn tail_lines_excludes_trailing_fragment() {
        let data = "one\ntwo\nthr";
        let mut cursor = Cursor::new(data.as_bytes().to_vec());
        let (lines, offset) = tail_lines(&mut cursor, 10, 75, 1.3).await.unwrap();
        assert_eq!(lines, vec!["one\n", "two\n"]);
        assert_eq!(offset, 8);
    }

    #[tokio::test]
    async fn tail_lines_retries_with_long_lines() {
        let long = "x".repeat(600);
        let data: String = (0..10).map(|i| format!("{i}{long}\n")).collect();
        let mut cursor = Cursor::new(data.into_bytes());
        let (lines, _) = tail_lines(&mut cursor, 4, 75, 1.3).await.unwrap();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with('6'));
        assert!(lines[3].starts_with('9'));
    }

    #[tokio::test]
    async fn tail_lines_zero_resumes_after_last_newline() {
        let mut cursor = Cursor::new(b"a\nb\nparti".to_vec());
        let (lines, offset) = tail_lines(&mut cursor, 0, 75, 1.3).await.unwrap();
        assert!(lines.is_empty());
        assert_eq!(offset, 4);
    }

    #[tokio::test]
    async fn tail_lines_empty_input() {
        let mut cursor = Cursor::new(Vec::new());
        let (lines, offset) = tail_lines(&mut cursor, 10, 75, 1.3).await.unwrap();
        assert!(lines.is_empty());
        assert_eq!(offset, 0);
    }

    fn block_on<F: std::future::Future>(future: F) -> F::Output {
        tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap()
            .block_on(future)
    }

    proptest! {
        #[test]
        fn tail_returns_min_of_n_and_line_count(
            lengths in proptest::collection::vec(0usize..300, 0..60),
            n in 0usize..40,
            avg in 1u64..200,
        ) {
            let lines: Vec<String> = lengths
                .iter()
                .enumerate()
                .map(|(i, len)| format!("{i}:{}\n", "a".repeat(*len)))
                .collect();
            let data: String = lines.concat();

            let mut cursor = Cursor::new(data.clone().into_bytes());
            let (tail, offset) = block_on(tail_lines(&mut cursor, n, avg, 1.3)).unwrap();

            let expected = &lines[lines.len().saturating_sub(n)..];
            prop_assert_eq!(tail.as_slice(), expected);
            prop_assert_eq!(offset, data.len() as u64);
        }
    }

    #[tokio::test]
    async fn non_follow_emits_last_n_then_finishes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("thrashd.log");
        std::fs::write(&path, numbered(20)).unwrap();

        let mut follower = LogFollower::open(config(&path, 10, false)).await.unwrap();
        assert_eq!(follower.state(), FollowerState::Tailing);

        let lines = drain(&mut follower).await;
        assert_eq!(lines.len(), 10);
        assert_eq!(lines[0], "line 11\n");
        assert_eq!(lines[9], "line 20\n");
        assert_eq!(follower.state(), FollowerState::Finished);
    }

    #[tokio::test]
    async fn short_file_emits_every_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("thrashd.log");
        std::fs::write(&path, numbered(7)).unwrap();

        let mut follower = LogFollower::open(config(&path, 10, false)).await.unwrap();
        let lines = drain(&mut follower).await;
        assert_eq!(lines.len(), 7);
        assert_eq!(lines[0], "line 1\n");
    }

    #[tokio::test]
    async fn zero_lines_emits_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("thrashd.log");
        std::fs::write(&path, numbered(5)).unwrap();

        let mut follower = LogFollower::open(config(&path, 0, false)).await.unwrap();
        assert!(next(&mut follower).await.is_none());
    }

    #[tokio::test]
    async fn missing_file_is_source_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.log");

        let result = LogFollower::open(config(&path, 10, false)).await;
        assert!(matches!(
            result,
            Err(LogPipelineError::SourceUnavailable { .. })
        ));
    }

    #[tokio::test]
    async fn directory_is_source_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let result = LogFollower::open(config(dir.path(), 10, false)).await;
        assert!(matches!(
            result,
            Err(LogPipelineError::SourceUnavailable { .. })
        ));
    }

    #[tokio::test]
    async fn follow_picks_up_appended_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("thrashd.log");
        std::fs::write(&path, numbered(2)).unwrap();

        let mut follower = LogFollower::open(config(&path, 10, true)).await.unwrap();
        assert_eq!(next(&mut follower).await.as_deref(), Some("line 1\n"));
        assert_eq!(next(&mut follower).await.as_deref(), Some("line 2\n"));

        append(&path, "line 3\n");
        assert_eq!(next(&mut follower).await.as_deref(), Some("line 3\n"));
        assert_eq!(follower.state(), FollowerState::Following);
    }

    #[tokio::test]
    async fn follow_waits_for_line_completion() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("thrashd.log");
        std::fs::write(&path, "line 1\nhalf").unwrap();

        let mut follower = LogFollower::open(config(&path, 10, true)).await.unwrap();
        assert_eq!(next(&mut follower).await.as_deref(), Some("line 1\n"));

        let pending = tokio::time::timeout(Duration::from_millis(100), follower.next_line()).await;
        assert!(pending.is_err(), "incomplete line must not be emitted");

        append(&path, " done\n");
        assert_eq!(next(&mut follower).await.as_deref(), Some("half done\n"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn rotation_reopens_without_loss_or_duplication() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("thrashd.log");
        let rotated = dir.path().join("thrashd.log.1");
        std::fs::write(&path, numbered(3)).unwrap();

        let mut follower = LogFollower::open(config(&path, 10, true)).await.unwrap();
        let before: Vec<String> = vec![
            next(&mut follower).await.unwrap(),
            next(&mut follower).await.unwrap(),
            next(&mut follower).await.unwrap(),
        ];
        assert_eq!(before, vec!["line 1\n", "line 2\n", "line 3\n"]);

        append(&path, "line 4\n");
        std::fs::rename(&path, &rotated).unwrap();
        std::fs::write(&path, "line 5\nline 6\n").unwrap();

        assert_eq!(next(&mut follower).await.as_deref(), Some("line 4\n"));
        assert_eq!(next(&mut follower).await.as_deref(), Some("line 5\n"));
        assert_eq!(next(&mut follower).await.as_deref(), Some("line 6\n"));
        assert_eq!(follower.rotations(), 1);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn rotation_flushes_pending_fragment() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("thrashd.log");
        std::fs::write(&path, "line 1\n").unwrap();

        let mut follower = LogFollower::open(config(&path, 10, true)).await.unwrap();
        assert_eq!(next(&mut follower).await.as_deref(), Some("line 1\n"));

        append(&path, "cut off");
        let pending = tokio::time::timeout(Duration::from_millis(100), follower.next_line()).await;
        assert!(pending.is_err());

        std::fs::rename(&path, dir.path().join("thrashd.log.1")).unwrap();
        std::fs::write(&path, "fresh\n").unwrap();

        assert_eq!(next(&mut follower).await.as_deref(), Some("cut off\n"));
        assert_eq!(next(&mut follower).await.as_deref(), Some("fresh\n"));
    }

    #[tokio::test]
    async fn truncation_rewinds_to_start() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("thrashd.log");
        std::fs::write(&path, numbered(5)).unwrap();

        let mut follower = LogFollower::open(config(&path, 0, true)).await.unwrap();

        std::fs::OpenOptions::new()
            .write(true)
            .truncate(true)
            .open(&path)
            .unwrap();
        append(&path, "new\n");

        assert_eq!(next(&mut follower).await.as_deref(), Some("new\n"));
        assert_eq!(follower.rotations(), 1);
    }

    #[tokio::test]
    async fn missing_path_keeps_current_handle() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("thrashd.log");
        std::fs::write(&path, "line 1\n").unwrap();

        let mut follower = LogFollower::open(config(&path, 10, true)).await.unwrap();
        assert_eq!(next(&mut follower).await.as_deref(), Some("line 1\n"));

        let mut handle = std::fs::OpenOptions::new().append(true).open(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        let pending = tokio::time::timeout(Duration::from_millis(50), follower.next_line()).await;
        assert!(pending.is_err());

        handle.write_all(b"still here\n").unwrap();
        handle.flush().unwrap();
        assert_eq!(next(&mut follower).await.as_deref(), Some("still here\n"));
        assert_eq!(follower.rotations(), 0);
    }
}
