//! # Test Utilities
//!
//! Shared fixtures and conformance checks for encoders and decoders.

use crate::{
    decoders::TokenDecoder,
    encoders::TokenEncoder,
    spanning::SpanningPolicy,
    types::TokenType,
    vocab::{MergeRules, Vocabulary, io::VocabArtifact},
};

/// The special token of [`low_fixture`].
pub const FIXTURE_EOT: &str = "<|endoftext|>";

/// Sample texts every encoder must round-trip.
pub const ROUND_TRIP_SAMPLES: &[&[u8]] = &[
    b"",
    b"low",
    b"low low low low low lower lowest",
    b"the lowest slower flower",
    b"  leading and trailing  \n\t",
    b"<|endoftext|>",
    b"low<|endoftext|>lower<|endoftext|><|endoftext|>",
    b"<|endoftext",
    b"\xff\xfe\x00 low \xc3\x28 invalid utf-8",
    "unicode: caf\u{e9} \u{1f980} \u{65e5}\u{672c}".as_bytes(),
];

/// A small hand-built vocabulary over "low"-like words.
///
/// Special token `<|endoftext|>` is id 256; the default spanning policy applies.
pub fn low_fixture<T: TokenType>() -> VocabArtifact<T> {
    let mut vocab: Vocabulary<T> = Vocabulary::new();
    vocab.register_special(FIXTURE_EOT).unwrap();

    let mut rules = MergeRules::default();
    for (left, right) in [
        ("l", "o"),
        ("lo", "w"),
        (" ", "low"),
        ("e", "s"),
        ("es", "t"),
        ("e", "r"),
        (" low", "er"),
        (" low", "est"),
        ("t", "h"),
        ("th", "e"),
    ] {
        let l = vocab.bytes_to_id(left.as_bytes()).unwrap();
        let r = vocab.bytes_to_id(right.as_bytes()).unwrap();
        let merged = vocab.register(format!("{left}{right}")).unwrap();
        rules.push(l, r, merged).unwrap();
    }
    vocab.validate_rules(&rules).unwrap();

    VocabArtifact {
        spanning: SpanningPolicy::default(),
        vocab,
        rules,
    }
}

fn token<T: TokenType>(
    fixture: &VocabArtifact<T>,
    bytes: &str,
) -> T {
    fixture.vocab.bytes_to_id(bytes.as_bytes()).unwrap()
}

/// Conformance checks for an encoder built over [`low_fixture`].
pub fn common_encoder_tests<T: TokenType, E: TokenEncoder<T>>(
    fixture: &VocabArtifact<T>,
    encoder: &E,
) {
    let t = |s: &str| token(fixture, s);

    assert_eq!(
        encoder.try_encode_str("lowest").unwrap(),
        vec![t("low"), t("est")]
    );
    assert_eq!(
        encoder.try_encode_str("low lower lowest").unwrap(),
        vec![t("low"), t(" lower"), t(" lowest")]
    );
    assert_eq!(
        encoder.try_encode_str("the<|endoftext|>low").unwrap(),
        vec![t("the"), t(FIXTURE_EOT), t("low")]
    );

    // Append keeps the existing prefix.
    let mut buf = vec![t("the")];
    encoder.try_encode_append(b" low", &mut buf).unwrap();
    assert_eq!(buf, vec![t("the"), t(" low")]);

    for sample in ROUND_TRIP_SAMPLES {
        let tokens = encoder.try_encode(sample).unwrap();

        let mut decoded = Vec::new();
        for &tok in &tokens {
            decoded.extend_from_slice(fixture.vocab.id_to_bytes(tok).unwrap());
        }
        assert_eq!(&decoded, sample, "{:?}", String::from_utf8_lossy(sample));

        let marker = FIXTURE_EOT.as_bytes();
        let markers = sample.windows(marker.len()).filter(|w| *w == marker).count();
        let eot_tokens = tokens.iter().filter(|&&tok| tok == t(FIXTURE_EOT)).count();
        assert_eq!(markers, eot_tokens);
    }

    let batch: Vec<Vec<T>> = encoder.try_encode_batch(ROUND_TRIP_SAMPLES).unwrap();
    for (sample, tokens) in ROUND_TRIP_SAMPLES.iter().zip(batch) {
        assert_eq!(tokens, encoder.try_encode(sample).unwrap());
    }
}

/// Conformance checks for a decoder built over [`low_fixture`].
pub fn common_decoder_tests<T: TokenType, D: TokenDecoder<T>>(
    fixture: &VocabArtifact<T>,
    decoder: &D,
) {
    let t = |s: &str| token(fixture, s);

    let tokens = vec![t("low"), t(" lowest"), t(FIXTURE_EOT), t("the")];
    assert_eq!(
        decoder.try_decode_to_string(&tokens).unwrap(),
        "low lowest<|endoftext|>the"
    );

    let mut buf = b"> ".to_vec();
    decoder.try_decode_append(&[t("low")], &mut buf).unwrap();
    assert_eq!(buf, b"> low");

    assert!(decoder.try_decode_to_bytes(&[]).unwrap().is_empty());

    let unknown = T::from_usize(fixture.vocab.len()).unwrap();
    assert!(decoder.try_decode_to_bytes(&[t("low"), unknown]).is_err());

    let batch = decoder
        .try_decode_batch_to_bytes(&[&tokens[..1], &tokens[1..]])
        .unwrap();
    assert_eq!(batch, vec![b"low".to_vec(), b" lowest<|endoftext|>the".to_vec()]);
}
