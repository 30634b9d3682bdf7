//! 주소별 마지막 차단 액션 기록
//!
//! [`ActionLedger`]는 공격자 주소마다 마지막으로 적용한 액션과 성공 여부를 보관합니다.
//! 같은 주소가 다시 기록되면 값만 바뀌고 처음 등장한 순서는 유지됩니다.
//! 종료 시 요약 출력에 사용됩니다.

use std::collections::HashMap;

use serde::Serialize;

use logdrop_core::event::BlockAction;
use logdrop_core::metrics as m;

/// 요약 한 줄
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerEntry {
    /// 공격자 주소
    pub attacker: String,
    /// 마지막 액션
    pub action: BlockAction,
    /// 마지막 명령 성공 여부
    pub succeeded: bool,
}

/// 주소별 마지막 액션 기록
#[derive(Debug, Default)]
pub struct ActionLedger {
    /// 처음 등장한 순서대로 보관
    entries: Vec<LedgerEntry>,
    /// 주소 -> `entries` 인덱스
    index: HashMap<String, usize>,
}

impl ActionLedger {
    /// 빈 기록을 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 주소의 마지막 액션을 기록합니다. 이전 값은 덮어씁니다.
    pub fn record(&mut self, attacker: &str, action: BlockAction, succeeded: bool) {
        if let Some(&slot) = self.index.get(attacker) {
            let entry = &mut self.entries[slot];
            entry.action = action;
            entry.succeeded = succeeded;
            return;
        }

        self.index.insert(attacker.to_owned(), self.entries.len());
        self.entries.push(LedgerEntry {
            attacker: attacker.to_owned(),
            action,
            succeeded,
        });
        metrics::gauge!(m::LEDGER_TRACKED_ADDRESSES).set(self.entries.len() as f64);
    }

    /// 주소의 마지막 기록을 조회합니다.
    pub fn get(&self, attacker: &str) -> Option<&LedgerEntry> {
        self.index.get(attacker).map(|&slot| &self.entries[slot])
    }

    /// 처음 등장한 순서대로 모든 기록을 반환합니다.
    pub fn summary(&self) -> &[LedgerEntry] {
        &self.entries
    }

    /// 기록된 주소 수
    pub fn size(&self) -> usize {
        self.entries.len()
    }

    /// 기록이 비어 있는지 여부
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty() {
        let ledger = ActionLedger::new();
        assert!(ledger.is_empty());
        assert_eq!(ledger.size(), 0);
        assert!(ledger.summary().is_empty());
    }

    #[test]
    fn records_new_address() {
        let mut ledger = ActionLedger::new();
        ledger.record("1.2.3.4", BlockAction::EnteringBlock, true);

        let entry = ledger.get("1.2.3.4").unwrap();
        assert_eq!(entry.action, BlockAction::EnteringBlock);
        assert!(entry.succeeded);
        assert_eq!(ledger.size(), 1);
    }

    #[test]
    fn later_record_overwrites_without_growing() {
        let mut ledger = ActionLedger::new();
        ledger.record("1.2.3.4", BlockAction::EnteringBlock, true);
        ledger.record("1.2.3.4", BlockAction::LeavingBlock, false);

        assert_eq!(ledger.size(), 1);
        let entry = ledger.get("1.2.3.4").unwrap();
        assert_eq!(entry.action, BlockAction::LeavingBlock);
        assert!(!entry.succeeded);
    }

    #[test]
    fn identical_record_is_idempotent() {
        let mut ledger = ActionLedger::new();
        ledger.record("10.0.0.1", BlockAction::EnteringBlock, true);
        ledger.record("1.2.3.4", BlockAction::LeavingBlock, false);
        let before = ledger.summary().to_vec();

        ledger.record("1.2.3.4", BlockAction::LeavingBlock, false);

        assert_eq!(ledger.size(), 2);
        assert_eq!(ledger.summary(), before.as_slice());
    }

    #[test]
    fn summary_keeps_first_seen_order() {
        let mut ledger = ActionLedger::new();
        ledger.record("9.9.9.9", BlockAction::EnteringBlock, true);
        ledger.record("1.1.1.1", BlockAction::EnteringBlock, true);
        ledger.record("9.9.9.9", BlockAction::LeavingBlock, true);

        let order: Vec<&str> = ledger.summary().iter().map(|e| e.attacker.as_str()).collect();
        assert_eq!(order, vec!["9.9.9.9", "1.1.1.1"]);
        assert_eq!(ledger.summary()[0].action, BlockAction::LeavingBlock);
    }

    #[test]
    fn unknown_address_is_none() {
        let ledger = ActionLedger::new();
        assert!(ledger.get("5.5.5.5").is_none());
    }

    #[test]
    fn entry_serializes_snake_case_action() {
        let entry = LedgerEntry {
            attacker: "1.2.3.4".to_owned(),
            action: BlockAction::EnteringBlock,
            succeeded: true,
        };
        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains("\"entering_block\""));
        assert!(json.contains("\"succeeded\":true"));
    }
}
