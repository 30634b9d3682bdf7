#![no_main]

use libfuzzer_sys::fuzz_target;
use logdrop_core::config::LogdropConfig;

fuzz_target!(|data: &str| {
    // 파싱/검증 모두 크래시 없이 Ok 또는 Err
    if let Ok(config) = LogdropConfig::parse(data) {
        let _ = config.validate();
    }
});
