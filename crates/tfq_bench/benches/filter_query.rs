#![allow(clippy::unwrap_used)]

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use tfq_bench::{generated_query, typing_prefixes};
use tfq_core::{from_url, parse, parse_events, to_query_string, to_url};

const BASE_URL: &str = "https://widget.example/explore";

fn bench_parse_by_size(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");

    for n in [1, 8, 64, 512] {
        let query = generated_query(n);
        group.throughput(Throughput::Bytes(query.len() as u64));
        group.bench_with_input(BenchmarkId::new("filters", n), &query, |b, q| {
            b.iter(|| parse(black_box(q)))
        });
    }

    group.finish();
}

fn bench_typing(c: &mut Criterion) {
    let query = generated_query(8);
    let prefixes = typing_prefixes(&query);

    let mut group = c.benchmark_group("typing");

    // every keystroke reparses the whole box with events for autocomplete
    group.bench_function("events_per_keystroke", |b| {
        b.iter(|| {
            for prefix in &prefixes {
                black_box(parse_events(black_box(prefix)));
            }
        })
    });

    group.finish();
}

fn bench_serialize(c: &mut Criterion) {
    let params = parse(&generated_query(64)).unwrap();
    let url = to_url(&params, BASE_URL);

    let mut group = c.benchmark_group("serialize");

    group.bench_function("query_string", |b| {
        b.iter(|| to_query_string(black_box(&params)))
    });
    group.bench_function("to_url", |b| {
        b.iter(|| to_url(black_box(&params), black_box(BASE_URL)))
    });
    group.bench_function("from_url", |b| b.iter(|| from_url(black_box(&url))));

    group.finish();
}

criterion_group!(benches, bench_parse_by_size, bench_typing, bench_serialize);
criterion_main!(benches);
