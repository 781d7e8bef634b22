use complaint_index::chunking::{ChunkingConfig, split_narrative};
use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

fn synthetic_narrative() -> String {
    (0..200)
        .map(|i| {
            format!(
                "Sentence {} describes how the account was charged a fee that was never \
                 disclosed, and the company refused to reverse it after repeated calls. ",
                i
            )
        })
        .collect()
}

pub fn criterion_benchmark(c: &mut Criterion) {
    let narrative = synthetic_narrative();
    let config = ChunkingConfig::default();
    c.bench_function("split_narrative", |b| {
        b.iter(|| split_narrative(black_box(&narrative), black_box(&config)))
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
