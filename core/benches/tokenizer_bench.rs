use criterion::{criterion_group, criterion_main, Criterion};
use docsearch_core::tokenizer::tokenize;
use docsearch_core::{CorpusIndex, MemorySource};

const TEXT: &str = "This Lease Agreement is made between the Landlord and the Tenant.\n\
The Tenant shall pay the monthly rent on or before the first day of each month.\n\
Late payments incur a fee of five percent of the outstanding amount.\n";

fn bench_tokenize(c: &mut Criterion) {
    let text = TEXT.repeat(200);
    c.bench_function("tokenize_lease", |b| b.iter(|| tokenize(&text).iter().count()));
}

fn bench_build(c: &mut Criterion) {
    let mut src = MemorySource::new();
    for i in 0..50 {
        src.insert(&format!("doc{i}.txt"), &TEXT.repeat(20));
    }
    c.bench_function("build_50_docs", |b| b.iter(|| CorpusIndex::from_source(&src)));
}

criterion_group!(benches, bench_tokenize, bench_build);
criterion_main!(benches);
