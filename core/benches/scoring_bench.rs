use criterion::{black_box, criterion_group, criterion_main, Criterion};
use fieldrank_core::tokenizer::tokenize;
use fieldrank_core::{Document, DocumentCollection, FieldIndex, ModelConfig, ModelKind, ScoreCollection};

fn synthetic_corpus(num_docs: usize) -> DocumentCollection {
    let vocab: Vec<String> = (0..500).map(|i| format!("term{i}")).collect();
    let mut collection = DocumentCollection::new();
    for d in 0..num_docs {
        let title: Vec<String> = (0..4).map(|j| vocab[(d * 7 + j * 13) % vocab.len()].clone()).collect();
        let body: Vec<String> = (0..60).map(|j| vocab[(d * 31 + j * j) % vocab.len()].clone()).collect();
        collection.insert(format!("doc{d}"), Document::new().with_field("title", title).with_field("body", body));
    }
    collection
}

fn bench_models(c: &mut Criterion) {
    let collection = synthetic_corpus(2_000);
    let index = FieldIndex::from_collection(&collection);
    let query = ["term1", "term42", "term42", "term300"];
    for kind in ModelKind::ALL {
        let scorer = ModelConfig::default_for(kind).build(&collection, &index).expect("default config");
        c.bench_function(&format!("score_{kind}"), |b| b.iter(|| scorer.score_collection(black_box(&query[..]))));
    }
}

fn bench_tokenize(c: &mut Criterion) {
    let text = include_str!("../../README.md");
    c.bench_function("tokenize_readme", |b| b.iter(|| tokenize(black_box(text))));
}

criterion_group!(benches, bench_models, bench_tokenize);
criterion_main!(benches);
