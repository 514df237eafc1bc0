//! # Base64 Vocabulary Artifact
//!
//! A line-oriented text format; token bytes and word patterns are base64:
//!
//! ```text
//! pairwright-vocab v1
//! spanning pattern KD8tdSkgP1xTK3xccys=
//! tokens 258
//! 0 AA==
//! ...
//! 257 bG93
//! specials 0
//! merges 2
//! 0 108 111 256
//! 1 256 119 257
//! ```

use core::str::FromStr;
use std::{
    fs::File,
    io::{BufRead, BufReader, BufWriter, Lines, Write},
    path::Path,
};

use base64::{Engine, engine::general_purpose::STANDARD};

use crate::{
    errors::{PWError, PWResult},
    spanning::{SpanningKind, SpanningPolicy},
    types::{BYTE_ALPHABET_SIZE, TokenType, token_from_usize},
    vocab::{MergeRule, MergeRules, Vocabulary},
};

/// The first line of every artifact.
pub const VOCAB_HEADER: &str = "pairwright-vocab v1";

/// Everything needed to reproduce encode-time behavior without retraining.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VocabArtifact<T: TokenType> {
    /// The sequence-boundary policy used in training.
    pub spanning: SpanningPolicy,

    /// The token vocabulary.
    pub vocab: Vocabulary<T>,

    /// The merge rules.
    pub rules: MergeRules<T>,
}

/// Write a vocabulary artifact.
pub fn save_vocab<T: TokenType, W: Write>(
    artifact: &VocabArtifact<T>,
    writer: &mut W,
) -> PWResult<()> {
    writeln!(writer, "{VOCAB_HEADER}")?;

    match &artifact.spanning {
        SpanningPolicy::WholeText => writeln!(writer, "spanning {}", SpanningKind::WholeText)?,
        SpanningPolicy::Pattern(pattern) => writeln!(
            writer,
            "spanning {} {}",
            SpanningKind::Pattern,
            STANDARD.encode(pattern.as_bytes())
        )?,
    }

    writeln!(writer, "tokens {}", artifact.vocab.len())?;
    for (id, bytes) in artifact.vocab.iter() {
        writeln!(writer, "{id} {}", STANDARD.encode(bytes))?;
    }

    let specials = artifact.vocab.special_tokens();
    writeln!(writer, "specials {}", specials.len())?;
    for id in specials {
        writeln!(writer, "{id}")?;
    }

    writeln!(writer, "merges {}", artifact.rules.len())?;
    for rule in artifact.rules.iter() {
        writeln!(
            writer,
            "{} {} {} {}",
            rule.rank, rule.left, rule.right, rule.merged
        )?;
    }

    writer.flush()?;
    Ok(())
}

/// Write a vocabulary artifact to a file.
pub fn save_vocab_path<T: TokenType, P: AsRef<Path>>(
    artifact: &VocabArtifact<T>,
    path: P,
) -> PWResult<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    save_vocab(artifact, &mut writer)
}

/// Read a vocabulary artifact.
///
/// The artifact is fully validated: ids are dense and in order,
/// the base alphabet is intact, byte sequences are unique,
/// and every merge rule concatenates its operands.
pub fn load_vocab<T: TokenType, R: BufRead>(reader: R) -> PWResult<VocabArtifact<T>> {
    let mut lines = LineReader::new(reader);

    let (line, header) = lines.next_line()?;
    if header != VOCAB_HEADER {
        return Err(PWError::parse(line, format!("expected header {VOCAB_HEADER:?}")));
    }

    let spanning = parse_spanning(&mut lines)?;

    let mut vocab: Vocabulary<T> = Vocabulary::new();
    let num_tokens = lines.next_count("tokens")?;
    if num_tokens < BYTE_ALPHABET_SIZE {
        return Err(PWError::parse(
            lines.line_no(),
            format!("expected at least {BYTE_ALPHABET_SIZE} tokens, found {num_tokens}"),
        ));
    }
    for idx in 0..num_tokens {
        let (line, text) = lines.next_line()?;
        let (id, encoded) = text
            .split_once(' ')
            .ok_or_else(|| PWError::parse(line, "expected `<id> <base64>`"))?;
        if parse_usize(line, id)? != idx {
            return Err(PWError::parse(line, format!("expected token id {idx}")));
        }
        let bytes = STANDARD
            .decode(encoded)
            .map_err(|e| PWError::parse(line, format!("bad base64: {e}")))?;

        if idx < BYTE_ALPHABET_SIZE {
            if bytes != [idx as u8] {
                return Err(PWError::parse(line, format!("base token {idx} altered")));
            }
        } else {
            vocab
                .register(bytes)
                .map_err(|e| PWError::parse(line, e.to_string()))?;
        }
    }
    let num_specials = lines.next_count("specials")?;
    for _ in 0..num_specials {
        let (line, text) = lines.next_line()?;
        let id: T = parse_token(line, &text)?;
        vocab
            .mark_special(id)
            .map_err(|e| PWError::parse(line, e.to_string()))?;
    }

    let mut rules: MergeRules<T> = MergeRules::default();
    let num_rules = lines.next_count("merges")?;
    for _ in 0..num_rules {
        let (line, text) = lines.next_line()?;
        let fields: Vec<&str> = text.split(' ').collect();
        let [rank, left, right, merged] = fields.as_slice() else {
            return Err(PWError::parse(
                line,
                "expected `<rank> <left> <right> <merged>`",
            ));
        };
        rules
            .insert(MergeRule {
                left: parse_token(line, left)?,
                right: parse_token(line, right)?,
                merged: parse_token(line, merged)?,
                rank: parse_usize(line, rank)?,
            })
            .map_err(|e| PWError::parse(line, e.to_string()))?;
    }
    vocab
        .validate_rules(&rules)
        .map_err(|e| PWError::parse(lines.line_no(), e.to_string()))?;

    lines.expect_end()?;

    Ok(VocabArtifact {
        spanning,
        vocab,
        rules,
    })
}

/// Read a vocabulary artifact from a file.
pub fn load_vocab_path<T: TokenType, P: AsRef<Path>>(path: P) -> PWResult<VocabArtifact<T>> {
    load_vocab(BufReader::new(File::open(path)?))
}

fn parse_spanning<R: BufRead>(lines: &mut LineReader<R>) -> PWResult<SpanningPolicy> {
    let (line, text) = lines.next_line()?;
    let rest = text
        .strip_prefix("spanning ")
        .ok_or_else(|| PWError::parse(line, "expected `spanning <kind>`"))?;
    let (kind, arg) = match rest.split_once(' ') {
        Some((kind, arg)) => (kind, Some(arg)),
        None => (rest, None),
    };
    let kind = SpanningKind::from_str(kind)
        .map_err(|_| PWError::parse(line, format!("unknown spanning kind {kind:?}")))?;

    match (kind, arg) {
        (SpanningKind::WholeText, None) => Ok(SpanningPolicy::WholeText),
        (SpanningKind::Pattern, Some(encoded)) => {
            let bytes = STANDARD
                .decode(encoded)
                .map_err(|e| PWError::parse(line, format!("bad base64: {e}")))?;
            let pattern = String::from_utf8(bytes)
                .map_err(|_| PWError::parse(line, "word pattern is not UTF-8"))?;
            Ok(SpanningPolicy::Pattern(pattern))
        }
        _ => Err(PWError::parse(line, "malformed spanning line")),
    }
}

fn parse_usize(
    line: usize,
    text: &str,
) -> PWResult<usize> {
    text.parse::<usize>()
        .map_err(|_| PWError::parse(line, format!("expected an integer, found {text:?}")))
}

fn parse_token<T: TokenType>(
    line: usize,
    text: &str,
) -> PWResult<T> {
    token_from_usize(parse_usize(line, text)?).map_err(|e| PWError::parse(line, e.to_string()))
}

struct LineReader<R: BufRead> {
    lines: Lines<R>,
    line_no: usize,
}

impl<R: BufRead> LineReader<R> {
    fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_no: 0,
        }
    }

    fn line_no(&self) -> usize {
        self.line_no
    }

    fn next_line(&mut self) -> PWResult<(usize, String)> {
        match self.lines.next() {
            Some(line) => {
                self.line_no += 1;
                Ok((self.line_no, line?))
            }
            None => Err(PWError::parse(self.line_no + 1, "unexpected end of file")),
        }
    }

    fn next_count(
        &mut self,
        section: &str,
    ) -> PWResult<usize> {
        let (line, text) = self.next_line()?;
        let count = text
            .strip_prefix(section)
            .and_then(|rest| rest.strip_prefix(' '))
            .ok_or_else(|| PWError::parse(line, format!("expected `{section} <count>`")))?;
        parse_usize(line, count)
    }

    fn expect_end(&mut self) -> PWResult<()> {
        for line in self.lines.by_ref() {
            self.line_no += 1;
            if !line?.trim().is_empty() {
                return Err(PWError::parse(self.line_no, "trailing content"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use tempdir::TempDir;

    use super::*;

    fn sample_artifact() -> VocabArtifact<u32> {
        let mut vocab: Vocabulary<u32> = Vocabulary::new();
        let eot = vocab.register_special("<|endoftext|>").unwrap();
        let lo = vocab.register("lo").unwrap();
        let low = vocab.register("low").unwrap();
        let bin = vocab.register(vec![0xff, 0x00]).unwrap();
        assert_eq!(eot, 256);

        let mut rules = MergeRules::default();
        rules.push(b'l' as u32, b'o' as u32, lo).unwrap();
        rules.push(lo, b'w' as u32, low).unwrap();
        rules.push(0xff, 0x00, bin).unwrap();

        VocabArtifact {
            spanning: SpanningPolicy::default(),
            vocab,
            rules,
        }
    }

    fn to_text(artifact: &VocabArtifact<u32>) -> String {
        let mut buf = Vec::new();
        save_vocab(artifact, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_save_load() {
        let artifact = sample_artifact();
        let text = to_text(&artifact);

        assert!(text.starts_with("pairwright-vocab v1\nspanning pattern "));
        assert!(text.contains("\ntokens 260\n"));
        assert!(text.contains("\n257 bG8=\n"));
        assert!(text.contains("\nspecials 1\n256\n"));
        assert!(text.contains("\nmerges 3\n0 108 111 257\n1 257 119 258\n"));

        let loaded: VocabArtifact<u32> = load_vocab(Cursor::new(text.as_bytes())).unwrap();
        assert_eq!(loaded, artifact);
        assert!(loaded.vocab.is_special(256));
        assert_eq!(loaded.rules.lookup_pair(&(257, 119)), Some((1, 258)));
    }

    #[test]
    fn test_whole_text_spanning() {
        let mut artifact = sample_artifact();
        artifact.spanning = SpanningPolicy::WholeText;
        let text = to_text(&artifact);
        assert!(text.contains("\nspanning whole-text\n"));

        let loaded: VocabArtifact<u32> = load_vocab(Cursor::new(text.as_bytes())).unwrap();
        assert_eq!(loaded.spanning, SpanningPolicy::WholeText);
    }

    #[test]
    fn test_save_load_path() {
        let artifact = sample_artifact();

        let tmp = TempDir::new("pairwright").unwrap();
        let path = tmp.path().join("vocab.pairwright");

        save_vocab_path(&artifact, &path).unwrap();
        let loaded: VocabArtifact<u32> = load_vocab_path(&path).unwrap();
        assert_eq!(loaded, artifact);
    }

    #[test]
    fn test_load_u16() {
        let text = to_text(&sample_artifact());
        let loaded: VocabArtifact<u16> = load_vocab(Cursor::new(text.as_bytes())).unwrap();
        assert_eq!(loaded.vocab.len(), 260);

        // Rule ids past `u16::MAX` do not fit.
        let wide = text.replacen("\n2 255 0 259\n", "\n2 70000 0 259\n", 1);
        assert_ne!(wide, text);
        match load_vocab::<u16, _>(Cursor::new(wide.as_bytes())) {
            Err(PWError::Parse { line, .. }) => assert_eq!(line, 269),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    fn assert_parse_error(
        text: &str,
        expected_line: usize,
    ) {
        match load_vocab::<u32, _>(Cursor::new(text.as_bytes())) {
            Err(PWError::Parse { line, .. }) => assert_eq!(line, expected_line, "{text}"),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_malformed() {
        let good = to_text(&sample_artifact());

        assert_parse_error("bogus\n", 1);
        assert_parse_error("pairwright-vocab v1\nspanning sideways\n", 2);
        // End of file is reported at the line that was expected.
        assert_parse_error("pairwright-vocab v1\nspanning whole-text\ntokens 256\n", 4);

        // A token table shorter than the byte alphabet.
        assert_parse_error("pairwright-vocab v1\nspanning whole-text\ntokens 2\n", 3);
        assert_parse_error(
            "pairwright-vocab v1\nspanning whole-text\ntokens 2\n0 AA==\n1 AQ==\nspecials 0\nmerges 0\n",
            3,
        );

        // Altered base token.
        let altered = good.replacen("\n97 YQ==\n", "\n97 Yg==\n", 1);
        assert_parse_error(&altered, 101);

        // Duplicate learned token.
        let dup = good.replacen("\n258 bG93\n", "\n258 bG8=\n", 1);
        assert_parse_error(&dup, 262);

        // Rule that does not concatenate.
        let bad_rule = good.replacen("\n1 257 119 258\n", "\n1 257 120 258\n", 1);
        assert!(matches!(
            load_vocab::<u32, _>(Cursor::new(bad_rule.as_bytes())),
            Err(PWError::Parse { .. })
        ));

        // Truncated.
        let truncated = &good[..good.len() - 12];
        assert!(load_vocab::<u32, _>(Cursor::new(truncated.as_bytes())).is_err());

        // Trailing junk.
        let junk = format!("{good}junk\n");
        assert!(matches!(
            load_vocab::<u32, _>(Cursor::new(junk.as_bytes())),
            Err(PWError::Parse { .. })
        ));
    }
}
