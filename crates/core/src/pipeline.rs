//! 파이프라인 trait -- 모듈 확장 포인트 정의

use std::future::Future;

use crate::event::{BlockEvent, EnforcementOutcome};

/// 차단 백엔드 capability
///
/// 새로운 차단 수단을 추가하려면 이 trait을 구현합니다.
/// `apply`는 실패를 `Err`로 올리지 않습니다. 명령 실패는 예상된 경로이므로
/// [`EnforcementOutcome`]에 담겨 호출자가 검사합니다.
pub trait Enforcer: Send + Sync {
    /// 백엔드 이름 (예: "iptables", "route")
    fn name(&self) -> &str;

    /// 이벤트를 백엔드 명령으로 변환하여 실행하고 결과를 반환
    fn apply(&self, event: &BlockEvent) -> impl Future<Output = EnforcementOutcome> + Send;
}
