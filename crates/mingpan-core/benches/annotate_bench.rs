//! # Annotation Benchmarks
//!
//! Performance benchmarks for mingpan-core chart annotation.
//!
//! Run with: `cargo bench -p mingpan-core`

use criterion::{Criterion, criterion_group, criterion_main};
use mingpan_core::{Chart, Pillar, RuleTables, analyze, enhance_document};
use std::hint::black_box;

fn reference_chart() -> Chart {
    let p = |s: &str| s.parse::<Pillar>().expect("pillar");
    Chart::from_pillars(p("戊寅"), p("丁巳"), p("丙子"), p("庚寅"))
}

fn bench_analyze(c: &mut Criterion) {
    let tables = RuleTables::builtin();
    let chart = reference_chart();

    c.bench_function("analyze_reference_chart", |b| {
        b.iter(|| analyze(black_box(tables), black_box(&chart)));
    });
}

fn bench_enhance_document(c: &mut Criterion) {
    let tables = RuleTables::builtin();
    let record = serde_json::Value::Object(reference_chart().to_record());

    c.bench_function("enhance_document_reference_chart", |b| {
        b.iter(|| enhance_document(black_box(tables), black_box(record.clone())));
    });
}

fn bench_sexagenary_sweep(c: &mut Criterion) {
    let tables = RuleTables::builtin();
    let pillars: Vec<Pillar> = Pillar::sexagenary().collect();

    c.bench_function("analyze_sixty_day_pillars", |b| {
        b.iter(|| {
            for &day in &pillars {
                let chart = Chart::from_pillars(pillars[0], pillars[1], day, pillars[2]);
                black_box(analyze(tables, &chart));
            }
        });
    });
}

fn bench_compile_tables(c: &mut Criterion) {
    let text = include_str!("../data/bazi_rule_tables.json");

    c.bench_function("compile_rule_tables", |b| {
        b.iter(|| RuleTables::from_json_str(black_box(text)));
    });
}

criterion_group!(
    benches,
    bench_analyze,
    bench_enhance_document,
    bench_sexagenary_sweep,
    bench_compile_tables
);
criterion_main!(benches);
