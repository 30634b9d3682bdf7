//! 차단 라인 파서 벤치마크
//!
//! 매칭되는 라인과 매칭되지 않는 라인의 처리량을 측정합니다.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use logdrop_log_pipeline::parser::BlockLineParser;

/// 차단 시작 (trigger 포함)
const HOLDING_DOWN: &str = "Nov 18 18:53:31 63.10.213.37 thrashd-Sink1: holding down address 64.180.110.186 triggered by 46.21188.76\n";

/// 차단 해제
const EXPIRED: &str = "Nov 18 18:53:30 63.10.213.37 thrashd-Sink1: expired address 172.163.47.66\n";

/// 무관한 syslog 라인
const NOISE: &str = "Nov 18 18:53:29 63.10.213.37 sshd[2231]: Accepted publickey for deploy from 10.0.0.8 port 51234 ssh2\n";

fn bench_single_line(c: &mut Criterion) {
    let parser = BlockLineParser::new().unwrap();

    let mut group = c.benchmark_group("block_line");
    group.throughput(Throughput::Elements(1));

    for (name, line) in [
        ("holding_down", HOLDING_DOWN),
        ("expired", EXPIRED),
        ("noise", NOISE),
    ] {
        group.bench_with_input(BenchmarkId::from_parameter(name), line, |b, line| {
            b.iter(|| parser.parse(black_box(line)))
        });
    }

    group.finish();
}

fn bench_mixed_batch(c: &mut Criterion) {
    let parser = BlockLineParser::new().unwrap();

    let mut group = c.benchmark_group("block_line_batch");
    for size in [100usize, 1_000, 10_000] {
        let lines: Vec<&str> = [HOLDING_DOWN, NOISE, EXPIRED, NOISE]
            .iter()
            .cycle()
            .take(size)
            .copied()
            .collect();

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &lines, |b, lines| {
            b.iter(|| {
                lines
                    .iter()
                    .filter_map(|line| parser.parse(black_box(line)))
                    .count()
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_single_line, bench_mixed_batch);
criterion_main!(benches);
