#![allow(missing_docs)]

use divan::{Bencher, black_box, counter::BytesCount};
use pairwright::{
    spanning::TextSpanner,
    training::{BpeTrainerOptions, TrainingOutcome, WordCounter, train},
};

fn main() {
    divan::main();
}

const WORDS: &[&str] = &[
    "the", "quick", "brown", "fox", "jumps", "over", "lazy", "dog", "lower", "lowest", "newer",
    "newest", "wider", "widest", "token", "tokens", "merge", "merged", "merging", "pair", "pairs",
    "byte", "bytes", "vocabulary", "corpus", "window", "windows", "stride",
];

/// A deterministic pseudo-english corpus.
fn corpus(docs: usize) -> Vec<String> {
    let mut state = 0x2545_f491_u64;
    (0..docs)
        .map(|_| {
            let mut doc = String::new();
            for i in 0..64 {
                state ^= state << 13;
                state ^= state >> 7;
                state ^= state << 17;
                if i > 0 {
                    doc.push(if state % 11 == 0 { '\n' } else { ' ' });
                }
                doc.push_str(WORDS[(state % WORDS.len() as u64) as usize]);
                if state % 7 == 0 {
                    doc.push(',');
                }
            }
            doc
        })
        .collect()
}

fn corpus_bytes(docs: &[String]) -> usize {
    docs.iter().map(String::len).sum()
}

#[divan::bench(args = [300, 500, 1000])]
fn train_serial(
    bencher: Bencher,
    target: usize,
) {
    let docs = corpus(512);
    let options = BpeTrainerOptions::new(target).with_parallel(false);
    bencher
        .counter(BytesCount::new(corpus_bytes(&docs)))
        .bench(|| -> TrainingOutcome<u32> { train(black_box(&docs), &options).unwrap() });
}

#[cfg(feature = "rayon")]
#[divan::bench(args = [300, 500, 1000])]
fn train_parallel(
    bencher: Bencher,
    target: usize,
) {
    let docs = corpus(512);
    let options = BpeTrainerOptions::new(target).with_parallel(true);
    bencher
        .counter(BytesCount::new(corpus_bytes(&docs)))
        .bench(|| -> TrainingOutcome<u32> { train(black_box(&docs), &options).unwrap() });
}

#[divan::bench]
fn count_words(bencher: Bencher) {
    let docs = corpus(512);
    let spanning = BpeTrainerOptions::new(300).spanning_config();
    bencher
        .counter(BytesCount::new(corpus_bytes(&docs)))
        .bench(|| {
            let mut counter = WordCounter::new(TextSpanner::from_config(&spanning).unwrap());
            counter.add_documents(black_box(&docs));
            counter.len()
        });
}
