//! # Merge Rule Encoder

use std::sync::Arc;

use crate::{
    encoders::{SpanMerger, TokenEncoder},
    errors::{PWError, PWResult},
    spanning::{SpanRef, SpanningPolicy, TextSpanner, TextSpanningConfig},
    types::TokenType,
    vocab::{MergeRules, Vocabulary},
};

/// A [`TokenEncoder`] over a [`Vocabulary`] and its [`MergeRules`].
///
/// Text is split by a [`TextSpanner`]; every ordinary span is decomposed
/// into byte tokens and merged by rank, and every special span becomes
/// its special token.
#[derive(Debug, Clone)]
pub struct MergeEncoder<T: TokenType> {
    vocab: Arc<Vocabulary<T>>,
    rules: Arc<MergeRules<T>>,
    spanner: TextSpanner,
}

impl<T: TokenType> MergeEncoder<T> {
    /// Build an encoder that splits out the vocabulary's special tokens.
    ///
    /// ## Arguments
    /// * `vocab` - The vocabulary.
    /// * `rules` - The merge rules.
    /// * `policy` - The policy the vocabulary was trained with.
    pub fn new(
        vocab: Arc<Vocabulary<T>>,
        rules: Arc<MergeRules<T>>,
        policy: &SpanningPolicy,
    ) -> PWResult<Self> {
        let config =
            TextSpanningConfig::from_policy(policy.clone()).with_special_tokens(vocab.special_markers());
        Self::from_config(vocab, rules, &config)
    }

    /// Build an encoder with an explicit spanning configuration.
    ///
    /// ## Returns
    /// [`PWError::UnencodableInput`] if a configured special token is empty,
    /// or is not a token of `vocab`.
    pub fn from_config(
        vocab: Arc<Vocabulary<T>>,
        rules: Arc<MergeRules<T>>,
        config: &TextSpanningConfig,
    ) -> PWResult<Self> {
        for marker in config.special_tokens() {
            if vocab.lookup_token(marker).is_none() {
                return Err(PWError::UnencodableInput(format!(
                    "special token {:?} is not in the vocabulary",
                    String::from_utf8_lossy(marker)
                )));
            }
        }
        let spanner = TextSpanner::from_config(config)?;
        Ok(Self {
            vocab,
            rules,
            spanner,
        })
    }

    /// The vocabulary.
    pub fn vocab(&self) -> &Arc<Vocabulary<T>> {
        &self.vocab
    }

    /// The merge rules.
    pub fn rules(&self) -> &Arc<MergeRules<T>> {
        &self.rules
    }
}

impl<T: TokenType> TokenEncoder<T> for MergeEncoder<T> {
    fn spanner(&self) -> &TextSpanner {
        &self.spanner
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(level = "trace", skip(self, text, tokens))
    )]
    fn try_encode_append(
        &self,
        text: &[u8],
        tokens: &mut Vec<T>,
    ) -> PWResult<()> {
        encode_append(&self.spanner, &self.vocab, &self.rules, text, tokens)
    }
}

fn encode_append<T: TokenType>(
    spanner: &TextSpanner,
    vocab: &Vocabulary<T>,
    rules: &MergeRules<T>,
    text: &[u8],
    tokens: &mut Vec<T>,
) -> PWResult<()> {
    let mut merger = SpanMerger::default();
    let mut failure: Option<PWError> = None;

    spanner.for_each_split_span(text, &mut |span_ref| {
        match span_ref {
            SpanRef::Word(range) | SpanRef::Gap(range) => {
                merger.merge_append(rules, &text[range], tokens);
            }
            SpanRef::Special(range) => match vocab.bytes_to_id(&text[range]) {
                Ok(token) => tokens.push(token),
                Err(e) => {
                    failure = Some(PWError::UnencodableInput(e.to_string()));
                    return false;
                }
            },
        }
        true
    });

    match failure {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

/// Encode `text` with a vocabulary, its rules, and its spanning policy.
///
/// The vocabulary's special tokens are matched literally.
///
/// Each call compiles the word pattern and the special token matcher;
/// to encode many texts with the same tables, build a [`MergeEncoder`]
/// (or a [`crate::Tokenizer`]) once and reuse it.
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(level = "trace", skip(text, vocab, rules))
)]
pub fn encode<T: TokenType>(
    text: &[u8],
    vocab: &Vocabulary<T>,
    rules: &MergeRules<T>,
    policy: &SpanningPolicy,
) -> PWResult<Vec<T>> {
    let spanner = TextSpanner::from_policy(policy, &vocab.special_markers())?;
    let mut tokens = Vec::with_capacity(text.len() / 3 + 1);
    encode_append(&spanner, vocab, rules, text, &mut tokens)?;
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ROUND_TRIP_SAMPLES, common_encoder_tests, low_fixture};

    fn test_encoder<T: TokenType>() {
        let fixture = low_fixture::<T>();
        let encoder = MergeEncoder::new(
            fixture.vocab.clone().into(),
            fixture.rules.clone().into(),
            &fixture.spanning,
        )
        .unwrap();
        common_encoder_tests(&fixture, &encoder);
    }

    #[test]
    fn test_encoder_u16() {
        test_encoder::<u16>();
    }

    #[test]
    fn test_encoder_u32() {
        test_encoder::<u32>();
    }

    #[test]
    fn test_encode_matches_encoder() {
        let fixture = low_fixture::<u32>();
        let encoder = MergeEncoder::new(
            fixture.vocab.clone().into(),
            fixture.rules.clone().into(),
            &fixture.spanning,
        )
        .unwrap();

        for sample in ROUND_TRIP_SAMPLES {
            assert_eq!(
                encode(sample, &fixture.vocab, &fixture.rules, &fixture.spanning).unwrap(),
                encoder.try_encode(sample).unwrap()
            );
        }
    }

    #[test]
    fn test_lowest() {
        let mut vocab: Vocabulary<u32> = Vocabulary::new();
        let lo = vocab.register("lo").unwrap();
        let low = vocab.register("low").unwrap();
        let mut rules = MergeRules::default();
        rules.push(b'l' as u32, b'o' as u32, lo).unwrap();
        rules.push(lo, b'w' as u32, low).unwrap();

        let tokens = encode(b"lowest", &vocab, &rules, &SpanningPolicy::default()).unwrap();
        assert_eq!(tokens, vec![low, b'e' as u32, b's' as u32, b't' as u32]);
    }

    #[test]
    fn test_no_rules_is_bytes() {
        let vocab: Vocabulary<u16> = Vocabulary::new();
        let rules = MergeRules::default();
        let text = b"\xff\x00 hi";
        let tokens = encode(text, &vocab, &rules, &SpanningPolicy::WholeText).unwrap();
        assert_eq!(tokens, vec![0xff, 0x00, 0x20, 0x68, 0x69]);
        assert!(encode(b"", &vocab, &rules, &SpanningPolicy::WholeText).unwrap().is_empty());
    }

    #[test]
    fn test_unregistered_special() {
        let vocab: Arc<Vocabulary<u32>> = Vocabulary::new().into();
        let rules: Arc<MergeRules<u32>> = MergeRules::default().into();

        assert!(matches!(
            MergeEncoder::from_config(
                vocab.clone(),
                rules.clone(),
                &TextSpanningConfig::default().with_special_tokens(["<|nope|>"]),
            ),
            Err(PWError::UnencodableInput(_))
        ));
        assert!(matches!(
            MergeEncoder::from_config(
                vocab,
                rules,
                &TextSpanningConfig::default().with_special_tokens([""]),
            ),
            Err(PWError::UnencodableInput(_))
        ));
    }

    #[test]
    fn test_special_pass_through() {
        let mut vocab: Vocabulary<u32> = Vocabulary::new();
        let eot = vocab.register_special("<|eot|>").unwrap();
        let rules = MergeRules::default();

        let tokens = encode(b"a<|eot|><|eot|>b", &vocab, &rules, &SpanningPolicy::default()).unwrap();
        assert_eq!(tokens, vec![b'a' as u32, eot, eot, b'b' as u32]);
    }
}
