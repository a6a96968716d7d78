//! Benchmarks for classification scoring.

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use corpus_curate::classify::{
    Document, KeywordMatch, SeedSimilarity, TermFrequency, classify,
};
use corpus_curate::config::CurateConfig;

const WORDS: &[&str] = &[
    "ancient", "empire", "market", "stock", "quantum", "energy", "acid", "bond", "the", "of",
    "river", "trade", "wave", "reaction", "city", "war", "capital", "force", "organic", "and",
];

/// Deterministic pseudo-text: `len` words drawn from `WORDS` with stride `step`.
fn text(len: usize, step: usize) -> String {
    (0..len)
        .map(|i| WORDS[(i * step + i / 7) % WORDS.len()])
        .collect::<Vec<_>>()
        .join(" ")
}

fn bench_cosine(c: &mut Criterion) {
    let a = TermFrequency::from_text(&text(500, 3));
    let b = TermFrequency::from_text(&text(500, 7));

    c.bench_function("cosine_500_words", |bench| {
        bench.iter(|| black_box(a.cosine(&b)))
    });
}

fn bench_tokenize(c: &mut Criterion) {
    let content = text(1000, 3);

    c.bench_function("term_frequency_1000_words", |bench| {
        bench.iter(|| black_box(TermFrequency::from_text(&content)))
    });
}

fn bench_keywords(c: &mut Criterion) {
    let config = CurateConfig::bundled().unwrap();
    let content = text(200, 3);

    c.bench_function("classify_keywords_200_words", |bench| {
        bench.iter(|| {
            let doc = Document::new(&content);
            black_box(classify(&KeywordMatch, &doc, &config.categories, config.threshold))
        })
    });
}

fn bench_seed_similarity(c: &mut Criterion) {
    let config = CurateConfig::bundled().unwrap();
    let seeds = SeedSimilarity::from_seed_texts(config.categories.names().map(|name| {
        let texts: Vec<String> = (1..=100).map(|i| text(60, i)).collect();
        (name.to_string(), texts)
    }));
    let doc = Document::new(&text(200, 5));

    c.bench_function("classify_seeds_4x100", |bench| {
        bench.iter(|| black_box(classify(&seeds, &doc, &config.categories, config.threshold)))
    });
}

criterion_group!(benches, bench_tokenize, bench_cosine, bench_keywords, bench_seed_similarity);
criterion_main!(benches);
