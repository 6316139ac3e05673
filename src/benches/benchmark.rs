#[macro_use]
extern crate criterion;
extern crate hexlayout;

use criterion::{Criterion, Throughput};
use hexlayout::{HighlightSettings, highlight, highlight_master_boot_record, parse_pattern};

const HEADER_PATTERN: &str = include_str!("../../samples/header.hexpat");

fn records_pattern(count: usize) -> String {
    let mut pattern = String::from(HEADER_PATTERN);
    for i in 0..count {
        pattern.push_str(&format!(
            "struct Record{} {{ u32 id; u16 kind; u16 flags; u8 payload[24]; }};\n",
            i
        ));
    }
    pattern
}

fn bench_parse(c: &mut Criterion) {
    let pattern = records_pattern(64);
    c.bench_function("parse 67 structures", |b| {
        b.iter(|| criterion::black_box(parse_pattern(&pattern)))
    });
}

fn bench_pipeline(c: &mut Criterion) {
    let data: Vec<u8> = (0..=255u8).cycle().take(64 * 1024).collect();
    let settings = HighlightSettings::default();

    let mut group = c.benchmark_group("pipeline");
    group.throughput(Throughput::Bytes(data.len() as u64));
    group.bench_function("pattern hexdump", |b| {
        b.iter(|| {
            let result = highlight(&data, HEADER_PATTERN, &settings);
            criterion::black_box(result.hexdump().unwrap());
        })
    });
    group.bench_function("pattern html", |b| {
        b.iter(|| {
            let result = highlight(&data, HEADER_PATTERN, &settings);
            criterion::black_box(result.html().unwrap());
        })
    });
    group.bench_function("mbr styled", |b| {
        b.iter(|| {
            let result = highlight_master_boot_record(&data, &settings);
            criterion::black_box(result.styled_dump().unwrap());
        })
    });
    group.finish();
}

criterion_group!(benches, bench_parse, bench_pipeline);
criterion_main!(benches);
