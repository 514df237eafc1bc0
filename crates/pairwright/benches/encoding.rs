#![allow(missing_docs)]

use std::sync::LazyLock;

use divan::{Bencher, black_box, counter::BytesCount};
use pairwright::{
    Tokenizer,
    build_windows,
    training::{BpeTrainerOptions, train},
};

#[global_allocator]
static ALLOC: divan::AllocProfiler = divan::AllocProfiler::system();

fn main() {
    divan::main();
}

fn english_text() -> String {
    let paragraph = "The quick brown fox jumps over the lazy dog. \
        It's a beautiful day, and I'll be taking my 3 dogs for a walk. \
        Don't forget: the temperature is 72 degrees! \
        We've been waiting since 10:30am.\n\
        \n\
        In 2024, the lowest bids were lower than the newest offers. \
        The widest windows were wider than the tallest towers.<|endoftext|>\n";
    paragraph.repeat(100)
}

static TOKENIZER: LazyLock<Tokenizer<u32>> = LazyLock::new(|| {
    let text = english_text();
    let options = BpeTrainerOptions::new(1024).with_special_tokens(["<|endoftext|>"]);
    let outcome = train([text.as_str()], &options).unwrap();
    Tokenizer::from_outcome(outcome).unwrap()
});

#[divan::bench]
fn encode(bencher: Bencher) {
    let text = english_text();
    let tokenizer = &*TOKENIZER;
    bencher
        .counter(BytesCount::new(text.len()))
        .bench(|| tokenizer.encode_str(black_box(&text)).unwrap());
}

#[divan::bench]
fn encode_batch(bencher: Bencher) {
    let text = english_text();
    let batch: Vec<&[u8]> = text.as_bytes().chunks(512).collect();
    let encoder = TOKENIZER.to_encoder();
    bencher
        .counter(BytesCount::new(text.len()))
        .bench(|| encoder.try_encode_batch(black_box(&batch)).unwrap());
}

#[divan::bench]
fn decode(bencher: Bencher) {
    let text = english_text();
    let tokenizer = &*TOKENIZER;
    let tokens = tokenizer.encode_str(&text).unwrap();
    bencher
        .counter(BytesCount::new(text.len()))
        .bench(|| tokenizer.decode(black_box(&tokens)).unwrap());
}

#[divan::bench(args = [64, 256, 1024])]
fn windows(
    bencher: Bencher,
    max_length: usize,
) {
    let tokens = TOKENIZER.encode_str(&english_text().repeat(4)).unwrap();
    bencher.bench(|| {
        build_windows(black_box(&tokens), max_length, max_length / 2)
            .unwrap()
            .map(|w| w.input.len())
            .sum::<usize>()
    });
}
