use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

use anyhow::Context;
use clap::{Parser, Subcommand};
use humansize::{BINARY, format_size};
use pairwright::{
    Tokenizer,
    build_windows,
    spanning::SpanningPolicy,
    training::{BpeTrainer, BpeTrainerOptions, DEFAULT_MIN_FREQUENCY},
};
use similar::{ChangeTag, TextDiff};

type T = u32;

fn timeit<F, R>(f: F) -> (Duration, R)
where
    F: FnOnce() -> R,
{
    let t0 = Instant::now();
    let ret = f();
    (t0.elapsed(), ret)
}

/// Train and exercise pairwright vocabularies.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Silence all log output.
    #[arg(short, long)]
    pub quiet: bool,

    /// Increase log verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Learn a vocabulary from text files.
    Train {
        /// Input documents; one document per file.
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Where to write the vocabulary.
        #[arg(short, long)]
        output: PathBuf,

        /// Target vocabulary size, including bytes and special tokens.
        #[arg(long, default_value_t = 1024)]
        vocab_size: usize,

        /// Stop when the best pair occurs fewer times than this.
        #[arg(long, default_value_t = DEFAULT_MIN_FREQUENCY)]
        min_frequency: u64,

        /// A special token marker; may be repeated.
        #[arg(long = "special")]
        specials: Vec<String>,

        /// Treat each document as a single sequence.
        #[arg(long, conflicts_with = "pattern")]
        whole_text: bool,

        /// Word pattern for splitting documents.
        #[arg(long)]
        pattern: Option<String>,

        /// Fail if the corpus runs out of pairs before the target size.
        #[arg(long)]
        strict: bool,
    },

    /// Encode a text file to token ids.
    Encode {
        /// The vocabulary file.
        #[arg(long)]
        vocab: PathBuf,

        /// The text to encode.
        input: PathBuf,
    },

    /// Decode token ids back to text.
    Decode {
        /// The vocabulary file.
        #[arg(long)]
        vocab: PathBuf,

        /// Whitespace separated token ids.
        input: PathBuf,
    },

    /// Print next-token windows over an encoded text file.
    Windows {
        /// The vocabulary file.
        #[arg(long)]
        vocab: PathBuf,

        /// The text to encode and window.
        input: PathBuf,

        /// Window length.
        #[arg(long, default_value_t = 8)]
        max_length: usize,

        /// Offset between window starts.
        #[arg(long, default_value_t = 4)]
        stride: usize,

        /// Print at most this many windows.
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },

    /// Check that text files survive an encode/decode round trip.
    Verify {
        /// The vocabulary file.
        #[arg(long)]
        vocab: PathBuf,

        /// Files to check.
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    stderrlog::new()
        .module(module_path!())
        .module("pairwright")
        .quiet(args.quiet)
        .verbosity(args.verbose as usize + 2)
        .init()?;

    match args.command {
        Command::Train {
            inputs,
            output,
            vocab_size,
            min_frequency,
            specials,
            whole_text,
            pattern,
            strict,
        } => {
            let spanning = if whole_text {
                SpanningPolicy::WholeText
            } else if let Some(pattern) = pattern {
                SpanningPolicy::Pattern(pattern)
            } else {
                SpanningPolicy::default()
            };
            let options = BpeTrainerOptions::new(vocab_size)
                .with_min_frequency(min_frequency)
                .with_special_tokens(&specials)
                .with_spanning(spanning);
            run_train(&inputs, &output, options, strict)
        }
        Command::Encode { vocab, input } => run_encode(&vocab, &input),
        Command::Decode { vocab, input } => run_decode(&vocab, &input),
        Command::Windows {
            vocab,
            input,
            max_length,
            stride,
            limit,
        } => run_windows(&vocab, &input, max_length, stride, limit),
        Command::Verify { vocab, inputs } => run_verify(&vocab, &inputs),
    }
}

fn load_tokenizer(path: &Path) -> anyhow::Result<Tokenizer<T>> {
    Tokenizer::load_path(path).with_context(|| format!("loading vocabulary {}", path.display()))
}

fn read_input(path: &Path) -> anyhow::Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("reading {}", path.display()))
}

fn run_train(
    inputs: &[PathBuf],
    output: &Path,
    options: BpeTrainerOptions,
    strict: bool,
) -> anyhow::Result<()> {
    let mut trainer: BpeTrainer<T> = BpeTrainer::new(options)?;

    let mut total_bytes = 0;
    for path in inputs {
        let doc = read_input(path)?;
        total_bytes += doc.len();
        trainer.add_document(&doc)?;
    }
    log::info!(
        "read {} documents ({})",
        inputs.len(),
        format_size(total_bytes, BINARY)
    );

    let (duration, stop_reason) = timeit(|| trainer.run());
    let stop_reason = stop_reason?;

    let mut outcome = trainer.finish();
    if strict {
        outcome = outcome.require_target()?;
    }

    println!("Training Summary:");
    println!("- stop reason: {stop_reason}");
    println!("- vocab size: {}", outcome.vocab.len());
    println!("- merge rules: {}", outcome.rules.len());
    println!("- minted tokens: {}", outcome.merges_minted);
    println!("- duration: {duration:.2?}");

    let tokenizer = Tokenizer::from_outcome(outcome)?;
    tokenizer.save_path(output)?;
    println!("- saved: {}", output.display());

    Ok(())
}

fn run_encode(
    vocab: &Path,
    input: &Path,
) -> anyhow::Result<()> {
    let tokenizer = load_tokenizer(vocab)?;
    let text = read_input(input)?;

    let (duration, tokens) = timeit(|| tokenizer.encode(&text));
    let tokens = tokens?;
    log::info!(
        "encoded {} into {} tokens in {duration:.2?}",
        format_size(text.len(), BINARY),
        tokens.len()
    );

    let mut out = io::stdout().lock();
    let line = tokens
        .iter()
        .map(|t| t.to_string())
        .collect::<Vec<_>>()
        .join(" ");
    writeln!(out, "{line}")?;
    Ok(())
}

fn run_decode(
    vocab: &Path,
    input: &Path,
) -> anyhow::Result<()> {
    let tokenizer = load_tokenizer(vocab)?;
    let text = fs::read_to_string(input).with_context(|| format!("reading {}", input.display()))?;

    let tokens = text
        .split_whitespace()
        .map(|s| s.parse::<T>().with_context(|| format!("bad token id {s:?}")))
        .collect::<anyhow::Result<Vec<T>>>()?;

    let bytes = tokenizer.decode(&tokens)?;
    io::stdout().lock().write_all(&bytes)?;
    Ok(())
}

fn run_windows(
    vocab: &Path,
    input: &Path,
    max_length: usize,
    stride: usize,
    limit: usize,
) -> anyhow::Result<()> {
    let tokenizer = load_tokenizer(vocab)?;
    let tokens = tokenizer.encode(&read_input(input)?)?;

    let windows = build_windows(&tokens, max_length, stride)?;
    println!("{} tokens, {} windows", tokens.len(), windows.len());

    for window in windows.take(limit) {
        println!("@{}", window.start);
        println!("  input:  {:?}", window.input);
        println!("  target: {:?}", window.target);
    }
    Ok(())
}

fn run_verify(
    vocab: &Path,
    inputs: &[PathBuf],
) -> anyhow::Result<()> {
    let tokenizer = load_tokenizer(vocab)?;

    let mut failures = 0;
    for path in inputs {
        let text = read_input(path)?;
        let tokens = tokenizer.encode(&text)?;
        let decoded = tokenizer.decode(&tokens)?;

        if decoded == text {
            println!(
                "ok   {} ({} -> {} tokens, {:.2} bytes/token)",
                path.display(),
                format_size(text.len(), BINARY),
                tokens.len(),
                text.len() as f64 / tokens.len().max(1) as f64
            );
            continue;
        }

        failures += 1;
        println!("FAIL {}", path.display());
        let expected = String::from_utf8_lossy(&text);
        let actual = String::from_utf8_lossy(&decoded);
        let diff = TextDiff::from_lines(expected.as_ref(), actual.as_ref());
        for change in diff.iter_all_changes() {
            let sign = match change.tag() {
                ChangeTag::Delete => "-",
                ChangeTag::Insert => "+",
                ChangeTag::Equal => continue,
            };
            print!("{sign}{change}");
        }
    }

    if failures > 0 {
        anyhow::bail!("{failures} of {} files failed to round trip", inputs.len());
    }
    Ok(())
}
