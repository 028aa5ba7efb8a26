use criterion::{criterion_group, criterion_main, Criterion};
use fts_core::tokenizer::parse;
use fts_core::{BinaryIndexAccessor, BinaryIndexWriter, Config, IndexAccessor, IndexBuilder};

const TITLES: &[&str] = &[
    "The Hitchhiker's Guide to the Galaxy",
    "Harry Potter and the Half-Blood Prince",
    "The Lord of the Rings: The Fellowship of the Ring",
    "A Short History of Nearly Everything",
    "Bill Bryson's African Diary",
    "The Ultimate Hitchhiker's Guide: Five Complete Novels and One Story",
];

fn config() -> Config {
    Config::new(vec!["the".into(), "of".into(), "and".into(), "a".into()], 3, 6).unwrap()
}

fn bench_parse(c: &mut Criterion) {
    let cfg = config();
    let text = TITLES.join(" ");
    c.bench_function("parse_titles", |b| b.iter(|| parse(&text, &cfg)));
}

fn bench_lookup(c: &mut Criterion) {
    let cfg = config();
    let mut builder = IndexBuilder::new();
    for i in 0..2_000u64 {
        builder.add_document(i, TITLES[i as usize % TITLES.len()], &cfg);
    }
    let bytes = BinaryIndexWriter::new().encode(builder.index()).to_bytes();
    let acc = BinaryIndexAccessor::new(&bytes).expect("valid index");
    c.bench_function("binary_term_lookup", |b| b.iter(|| acc.term_frequencies("hitchh")));
}

criterion_group!(benches, bench_parse, bench_lookup);
criterion_main!(benches);
