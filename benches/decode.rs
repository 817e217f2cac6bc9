//! Benchmarks for packet decoding
//!
//! Tests decode throughput for:
//! - The full Forza Horizon 4 schema with each filter policy
//! - Line protocol encoding of a fully decoded packet
//!
//! Platform: Cross-platform (uses the bundled sample packet, CI-safe)

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use paddock::schema::forza_horizon_4;
use paddock::stores::line_protocol;
use paddock::test_utils::{SCENARIO_BUFFER, fh4_sample_bytes, scenario_schema};
use paddock::{LabelFilter, decode};
use std::hint::black_box;
use std::time::SystemTime;

fn bench_fh4_decode(c: &mut Criterion) {
    let schema = forza_horizon_4().expect("FH4 schema builds");
    let data = fh4_sample_bytes().expect("Sample packet fixture present");

    let filters = [
        ("allow_all", LabelFilter::allow_all()),
        ("deny_all", LabelFilter::deny_all()),
        ("allow_list_6", LabelFilter::allow_list(["speed", "gear", "accel", "brake", "steer", "is_race_on"])),
    ];

    let mut group = c.benchmark_group("fh4_decode");
    for (name, filter) in &filters {
        group.bench_with_input(BenchmarkId::from_parameter(name), filter, |b, filter| {
            b.iter(|| black_box(decode(black_box(&data), &schema, filter).unwrap()))
        });
    }
    group.finish();
}

fn bench_scenario_decode(c: &mut Criterion) {
    let schema = scenario_schema();
    let filter = LabelFilter::allow_all();

    c.bench_function("scenario_decode", |b| {
        b.iter(|| black_box(decode(black_box(&SCENARIO_BUFFER), &schema, &filter).unwrap()))
    });
}

fn bench_line_protocol(c: &mut Criterion) {
    let schema = forza_horizon_4().expect("FH4 schema builds");
    let data = fh4_sample_bytes().expect("Sample packet fixture present");
    let packet = decode(&data, &schema, &LabelFilter::allow_all()).unwrap();
    let timestamp = SystemTime::now();

    c.bench_function("line_protocol_encode", |b| {
        b.iter(|| black_box(line_protocol::encode("fh4", black_box(&packet), timestamp).unwrap()))
    });
}

criterion_group!(benches, bench_fh4_decode, bench_scenario_decode, bench_line_protocol);
criterion_main!(benches);
