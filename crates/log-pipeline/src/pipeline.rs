//! 반응 루프 -- 팔로우/파싱/차단/기록의 전체 흐름을 관리합니다.
//!
//! [`ReactionLoop`]는 라인 하나마다 다음 순서로 처리합니다.
//!
//! ```text
//! LogFollower -> 원시 라인 -> (observer.on_line) -> BlockLineParser
//!     -> BlockEvent -> Enforcer::apply -> ActionLedger::record -> (observer.on_outcome)
//! ```
//!
//! 한 라인은 최대 한 번의 차단 명령을 만들고, 라인은 엄격히 순서대로 처리됩니다.
//! 문법에 맞지 않는 라인은 조용히 건너뜁니다.

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use logdrop_core::event::{BlockEvent, EnforcementOutcome};
use logdrop_core::metrics as m;
use logdrop_core::pipeline::Enforcer;

use crate::collector::LogFollower;
use crate::error::LogPipelineError;
use crate::ledger::ActionLedger;
use crate::parser::BlockLineParser;

/// 루프 종료 사유
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// 팔로우 모드가 아니고 tail 라인을 모두 처리함
    EndOfInput,
    /// 취소 토큰으로 중단됨
    Interrupted,
}

/// 라인/결과 관찰자
///
/// CLI는 이 trait으로 원시 라인을 그대로 출력하고 주소별 성공/실패를 표시합니다.
pub trait LineObserver: Send {
    /// 파싱 전에 원시 라인마다 호출됩니다.
    fn on_line(&mut self, line: &str);

    /// 차단 명령 결과가 기록된 뒤 호출됩니다.
    fn on_outcome(&mut self, event: &BlockEvent, outcome: &EnforcementOutcome);
}

/// 아무것도 하지 않는 관찰자
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl LineObserver for NoopObserver {
    fn on_line(&mut self, _line: &str) {}

    fn on_outcome(&mut self, _event: &BlockEvent, _outcome: &EnforcementOutcome) {}
}

/// 반응 루프
///
/// # 사용 예시
/// ```ignore
/// use logdrop_log_pipeline::{LogFollower, NoopObserver, ReactionLoop};
///
/// let follower = LogFollower::open(config).await?;
/// let mut reaction = ReactionLoop::new(follower, enforcer, NoopObserver)?;
/// let reason = reaction.run(cancel.clone()).await?;
/// for entry in reaction.ledger().summary() { /* ... */ }
/// ```
pub struct ReactionLoop<E: Enforcer, O: LineObserver> {
    /// 라인 공급원
    follower: LogFollower,
    /// 차단 라인 파서
    parser: BlockLineParser,
    /// 차단 백엔드
    enforcer: E,
    /// 라인/결과 관찰자
    observer: O,
    /// 주소별 마지막 액션
    ledger: ActionLedger,
    /// 처리한 라인 수
    lines_seen: u64,
    /// 차단 문법에 맞은 라인 수
    events_matched: u64,
}

impl<E: Enforcer, O: LineObserver> ReactionLoop<E, O> {
    /// 새 반응 루프를 생성합니다.
    pub fn new(follower: LogFollower, enforcer: E, observer: O) -> Result<Self, LogPipelineError> {
        Ok(Self {
            follower,
            parser: BlockLineParser::new()?,
            enforcer,
            observer,
            ledger: ActionLedger::new(),
            lines_seen: 0,
            events_matched: 0,
        })
    }

    /// 기존 기록을 주입합니다.
    pub fn with_ledger(mut self, ledger: ActionLedger) -> Self {
        self.ledger = ledger;
        self
    }

    /// 입력이 끝나거나 취소될 때까지 라인을 처리합니다.
    ///
    /// 진행 중인 차단 명령은 취소되지 않고 끝까지 실행되며,
    /// 다음 라인을 기다리기 전에 취소 여부를 확인합니다.
    /// 읽기 에러가 발생해도 그때까지의 기록은 [`ledger`](Self::ledger)로 조회할 수 있습니다.
    pub async fn run(&mut self, cancel: CancellationToken) -> Result<StopReason, LogPipelineError> {
        info!(
            path = %self.follower.path().display(),
            backend = self.enforcer.name(),
            "reaction loop started"
        );

        let reason = loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => break StopReason::Interrupted,
                next = self.follower.next_line() => next?,
            };

            let Some(line) = next else {
                break StopReason::EndOfInput;
            };
            self.process_line(&line).await;
        };

        info!(
            reason = ?reason,
            lines = self.lines_seen,
            events = self.events_matched,
            addresses = self.ledger.size(),
            rotations = self.follower.rotations(),
            "reaction loop stopped"
        );
        Ok(reason)
    }

    async fn process_line(&mut self, line: &str) {
        self.lines_seen += 1;
        self.observer.on_line(line);

        let Some(event) = self.parser.parse(line) else {
            trace!(line = line.trim_end(), "line skipped");
            metrics::counter!(m::PIPELINE_LINES_SKIPPED_TOTAL).increment(1);
            return;
        };

        self.events_matched += 1;
        metrics::counter!(m::PIPELINE_EVENTS_MATCHED_TOTAL, m::LABEL_ACTION => event.action.label())
            .increment(1);
        debug!(
            attacker = %event.attacker,
            action = %event.action,
            instance = %event.instance,
            trigger = event.trigger.as_deref(),
            "block event matched"
        );

        let outcome = self.enforcer.apply(&event).await;
        self.ledger
            .record(&event.attacker, event.action, outcome.succeeded());

        if outcome.succeeded() {
            info!(
                attacker = %event.attacker,
                action = %event.action,
                command = %outcome.command,
                status = %outcome.status,
                "enforcement applied"
            );
        } else {
            warn!(
                attacker = %event.attacker,
                action = %event.action,
                command = %outcome.command,
                status = %outcome.status,
                detail = %outcome.detail,
                "enforcement failed"
            );
        }

        self.observer.on_outcome(&event, &outcome);
    }

    /// 주소별 기록
    pub fn ledger(&self) -> &ActionLedger {
        &self.ledger
    }

    /// 루프를 소비하고 기록을 반환합니다.
    pub fn into_ledger(self) -> ActionLedger {
        self.ledger
    }

    /// 관찰자
    pub fn observer(&self) -> &O {
        &self.observer
    }

    /// 처리한 라인 수
    pub fn lines_seen(&self) -> u64 {
        self.lines_seen
    }

    /// 차단 문법에 맞은 라인 수
    pub fn events_matched(&self) -> u64 {
        self.events_matched
    }
}
