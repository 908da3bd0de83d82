use criterion::{criterion_group, criterion_main, Criterion};
use wikisearch_core::codec::{decode_postings, encode_postings};
use wikisearch_core::fusion::merge;
use wikisearch_core::ranked::normalize;
use wikisearch_core::tokenizer::tokenize;
use wikisearch_core::{Posting, RankedList, ScoredDoc};

fn bench_decode(c: &mut Criterion) {
    let postings: Vec<Posting> = (0..100_000).map(|i| Posting { doc_id: i * 7, tf: (i % 40 + 1) as u16 }).collect();
    let bytes = encode_postings(&postings);
    c.bench_function("decode_100k_postings", |b| b.iter(|| decode_postings(&bytes, postings.len())));
}

fn bench_fusion(c: &mut Criterion) {
    let lists: Vec<RankedList> = (0..4u32)
        .map(|s| (0..100u32).map(|i| ScoredDoc::new(i * (s + 1), 1.0 / (i + 1) as f64)).collect())
        .collect();
    let weights = [0.6, 0.3, 0.15, 0.15];
    c.bench_function("normalize_and_merge_4x100", |b| {
        b.iter(|| {
            let normalized: Vec<RankedList> = lists.iter().map(|l| normalize(l)).collect();
            merge(&normalized, &weights, 30)
        })
    });
}

fn bench_tokenize(c: &mut Criterion) {
    let text = "The history of the Byzantine Empire and its relations with the Caliphates";
    c.bench_function("tokenize_query", |b| b.iter(|| tokenize(text)));
}

criterion_group!(benches, bench_decode, bench_fusion, bench_tokenize);
criterion_main!(benches);
