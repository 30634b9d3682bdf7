//! 메트릭 상수 및 설명 등록
//!
//! 모든 메트릭의 이름과 설명을 중앙에서 정의합니다.
//! 각 모듈은 이 상수를 사용하여 `metrics::counter!()`, `metrics::gauge!()`,
//! `metrics::histogram!()` 매크로를 호출합니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `logdrop_`
//! - 모듈명: `follower_`, `pipeline_`, `enforcer_`, `ledger_`
//! - 접미어: `_total` (counter), `_seconds` (histogram/latency), 없음 (gauge)
//!
//! recorder가 설치되지 않으면 모든 매크로 호출은 no-op입니다.

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 차단 액션 레이블 키 (entering_block, leaving_block)
pub const LABEL_ACTION: &str = "action";

/// 백엔드 레이블 키 (iptables, route)
pub const LABEL_BACKEND: &str = "backend";

/// 결과 레이블 키 (success, failure)
pub const LABEL_RESULT: &str = "result";

// ─── Follower 메트릭 ──────────────────────────────────────────────

/// Follower: 읽은 전체 라인 수 (counter)
pub const FOLLOWER_LINES_READ_TOTAL: &str = "logdrop_follower_lines_read_total";

/// Follower: 로테이션/절단 감지 후 다시 연 횟수 (counter)
pub const FOLLOWER_REOPENS_TOTAL: &str = "logdrop_follower_reopens_total";

// ─── Pipeline 메트릭 ──────────────────────────────────────────────

/// Pipeline: 문법에 맞지 않아 건너뛴 라인 수 (counter)
pub const PIPELINE_LINES_SKIPPED_TOTAL: &str = "logdrop_pipeline_lines_skipped_total";

/// Pipeline: 인식된 차단 이벤트 수 (counter, label: action)
pub const PIPELINE_EVENTS_MATCHED_TOTAL: &str = "logdrop_pipeline_events_matched_total";

// ─── Enforcer 메트릭 ──────────────────────────────────────────────

/// Enforcer: 실행한 차단 명령 수 (counter, labels: backend, result)
pub const ENFORCER_COMMANDS_TOTAL: &str = "logdrop_enforcer_commands_total";

/// Enforcer: 명령 실행 시간 (histogram, 초)
pub const ENFORCER_COMMAND_DURATION_SECONDS: &str = "logdrop_enforcer_command_duration_seconds";

// ─── Ledger 메트릭 ────────────────────────────────────────────────

/// Ledger: 기록된 서로 다른 공격자 주소 수 (gauge)
pub const LEDGER_TRACKED_ADDRESSES: &str = "logdrop_ledger_tracked_addresses";

// ─── 설명 등록 함수 ─────────────────────────────────────────────────

/// 모든 메트릭의 설명을 등록합니다.
///
/// recorder 설치 직후 한 번 호출합니다.
pub fn describe_all() {
    use metrics::{describe_counter, describe_gauge, describe_histogram};

    describe_counter!(
        FOLLOWER_LINES_READ_TOTAL,
        "Total number of raw lines emitted by the log follower"
    );
    describe_counter!(
        FOLLOWER_REOPENS_TOTAL,
        "Times the followed log was reopened after rotation or truncation"
    );
    describe_counter!(
        PIPELINE_LINES_SKIPPED_TOTAL,
        "Lines that did not match the block-event grammar"
    );
    describe_counter!(
        PIPELINE_EVENTS_MATCHED_TOTAL,
        "Recognised block events, by action"
    );
    describe_counter!(
        ENFORCER_COMMANDS_TOTAL,
        "Enforcement commands dispatched, by backend and result"
    );
    describe_histogram!(
        ENFORCER_COMMAND_DURATION_SECONDS,
        "Wall-clock duration of enforcement commands in seconds"
    );
    describe_gauge!(
        LEDGER_TRACKED_ADDRESSES,
        "Distinct attacker addresses recorded in the action ledger"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_METRIC_NAMES: &[&str] = &[
        FOLLOWER_LINES_READ_TOTAL,
        FOLLOWER_REOPENS_TOTAL,
        PIPELINE_LINES_SKIPPED_TOTAL,
        PIPELINE_EVENTS_MATCHED_TOTAL,
        ENFORCER_COMMANDS_TOTAL,
        ENFORCER_COMMAND_DURATION_SECONDS,
        LEDGER_TRACKED_ADDRESSES,
    ];

    #[test]
    fn all_metrics_start_with_logdrop_prefix() {
        for name in ALL_METRIC_NAMES {
            assert!(
                name.starts_with("logdrop_"),
                "Metric '{}' does not start with 'logdrop_' prefix",
                name
            );
        }
    }

    #[test]
    fn describe_all_does_not_panic() {
        // recorder 없이 호출해도 패닉하지 않아야 함
        describe_all();
    }

    #[test]
    fn label_keys_are_lowercase() {
        for label in [LABEL_ACTION, LABEL_BACKEND, LABEL_RESULT] {
            assert_eq!(label.to_lowercase(), label);
        }
    }
}
