use criterion::{criterion_group, criterion_main, Criterion};

use docmailer::index::builder::build_index;
use docmailer::index::reader::lookup;
use docmailer::model::document::Document;

fn sample_documents(count: usize) -> Vec<Document> {
    (0..count)
        .map(|i| Document::new(format!("KEY{:05}_statement_{}.pdf", i / 2, i % 2), vec![0u8; 64]))
        .collect()
}

fn bench_build_index(c: &mut Criterion) {
    c.bench_function("build_index_10k", |b| {
        b.iter_batched(
            || sample_documents(10_000),
            |docs| build_index(docs, '_'),
            criterion::BatchSize::LargeInput,
        )
    });
}

fn bench_lookup(c: &mut Criterion) {
    let index = build_index(sample_documents(10_000), '_');
    let keys: Vec<String> = (0..5_000).map(|i| format!("KEY{i:05}")).collect();

    c.bench_function("lookup_5k_rows", |b| {
        b.iter(|| keys.iter().map(|k| lookup(&index, k).len()).sum::<usize>())
    });
}

criterion_group!(benches, bench_build_index, bench_lookup);
criterion_main!(benches);
