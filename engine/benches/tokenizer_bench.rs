use criterion::{criterion_group, criterion_main, Criterion};
use engine::builder::parse_text;
use engine::tokenizer::{tokenize, unique_tokens};

const SAMPLE: &str = "The quick brown fox jumps over the lazy dog. Computers compute; \
companies compete. Running runners ran past the café while the compiler was compiling.";

fn bench_tokenize(c: &mut Criterion) {
    let text = SAMPLE.repeat(200);
    c.bench_function("tokenize_sample", |b| b.iter(|| tokenize(&text)));
}

fn bench_search(c: &mut Criterion) {
    let index = parse_text(&SAMPLE.repeat(200), "sample.txt");
    let exact = unique_tokens("fox compiler");
    let partial = unique_tokens("comp");
    c.bench_function("exact_search", |b| b.iter(|| index.exact_search(&exact)));
    c.bench_function("partial_search", |b| b.iter(|| index.partial_search(&partial)));
}

criterion_group!(benches, bench_tokenize, bench_search);
criterion_main!(benches);
