#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use logdrop_core::event::BlockAction;
use logdrop_log_pipeline::parser::BlockLineParser;

/// 퍼저용 구조적 입력
#[derive(Arbitrary, Debug)]
struct FuzzLine {
    day: u8,
    hour: u8,
    minute: u8,
    second: u8,
    host: [u8; 4],
    instance: u16,
    holding_down: bool,
    attacker: [u8; 4],
    trigger: Option<[u8; 4]>,
    tail: String,
}

fn dotted(octets: [u8; 4]) -> String {
    format!("{}.{}.{}.{}", octets[0], octets[1], octets[2], octets[3])
}

fuzz_target!(|input: FuzzLine| {
    let Ok(parser) = BlockLineParser::new() else {
        return;
    };

    let phrase = if input.holding_down { "holding down" } else { "expired" };
    let mut line = format!(
        "Nov {:2} {:02}:{:02}:{:02} {} thrashd-{}: {} address {}",
        input.day % 31 + 1,
        input.hour % 24,
        input.minute % 60,
        input.second % 60,
        dotted(input.host),
        input.instance,
        phrase,
        dotted(input.attacker),
    );
    if let Some(trigger) = input.trigger {
        line.push_str(&format!(" triggered by {}", dotted(trigger)));
    }
    if !input.tail.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
        line.push_str(&input.tail);
    }

    // 잘 만들어진 라인은 항상 매칭되어야 함
    let event = parser.parse(&line).expect("well-formed line must match");
    assert_eq!(event.attacker, dotted(input.attacker));
    let expected = if input.holding_down {
        BlockAction::EnteringBlock
    } else {
        BlockAction::LeavingBlock
    };
    assert_eq!(event.action, expected);
});
