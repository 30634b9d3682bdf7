#![no_main]

use libfuzzer_sys::fuzz_target;
use logdrop_log_pipeline::parser::BlockLineParser;

fuzz_target!(|data: &[u8]| {
    let Ok(parser) = BlockLineParser::new() else {
        return;
    };
    let line = String::from_utf8_lossy(data);

    // 임의 입력에서도 패닉 없이 Some 또는 None
    if let Some(event) = parser.parse(&line) {
        assert_eq!(event.attacker.split('.').count(), 4);
        assert!(parser.matches(&line));
    }
});
