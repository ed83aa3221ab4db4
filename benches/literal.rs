//! Benchmarks for app state literals.
//!
//! These benchmarks measure parsing stored literals and rendering values
//! back into config text.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use maio::utils::literal::{coerce_literal, parse_literal, StateValue, ValueKind};

fn bench_parse_tuple(c: &mut Criterion) {
    c.bench_function("parse_literal_ink_tuple", |b| {
        b.iter(|| parse_literal(black_box("(0.69, 1.0, 0.39, 0.18)")))
    });
}

fn bench_parse_nested(c: &mut Criterion) {
    let text = "{'Lidl': ['Obst', 'Milch', 'Kaffee'], 'Aldi': [], 'filter': (True, False)}";

    c.bench_function("parse_literal_nested_dict", |b| {
        b.iter(|| parse_literal(black_box(text)))
    });
}

fn bench_coerce_fallback(c: &mut Criterion) {
    c.bench_function("coerce_literal_unquoted_text", |b| {
        b.iter(|| coerce_literal(black_box("plain text value"), ValueKind::Text))
    });
}

fn bench_render(c: &mut Criterion) {
    let path = StateValue::from(vec!["Lidl".to_string(), "Obst".to_string(), "it's".to_string()]);

    c.bench_function("render_context_path", |b| b.iter(|| black_box(&path).to_literal()));
}

criterion_group!(
    benches,
    bench_parse_tuple,
    bench_parse_nested,
    bench_coerce_fallback,
    bench_render
);
criterion_main!(benches);
