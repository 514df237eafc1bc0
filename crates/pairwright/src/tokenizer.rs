//! # Tokenizer Bundle

use std::{path::Path, sync::Arc};

use crate::{
    decoders::{DictionaryDecoder, TokenDecoder},
    encoders::{MergeEncoder, TokenEncoder},
    errors::PWResult,
    spanning::SpanningPolicy,
    types::TokenType,
    vocab::{
        MergeRules,
        Vocabulary,
        io::{VocabArtifact, load_vocab_path, save_vocab_path},
    },
};

/// A vocabulary, its merge rules, and its spanning policy,
/// with a ready encoder and decoder.
///
/// ```rust,no_run
/// use pairwright::{PWResult, Tokenizer};
///
/// fn example() -> PWResult<()> {
///     let tokenizer: Tokenizer<u32> = Tokenizer::load_path("vocab.pairwright")?;
///     let tokens = tokenizer.encode_str("hello world")?;
///     assert_eq!(tokenizer.decode_to_string(&tokens)?, "hello world");
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Tokenizer<T: TokenType> {
    spanning: SpanningPolicy,
    encoder: MergeEncoder<T>,
    decoder: DictionaryDecoder<T>,
}

impl<T: TokenType> Tokenizer<T> {
    /// Build a tokenizer from its parts.
    ///
    /// ## Returns
    /// * [`crate::PWError::InvalidConfiguration`] if the rules do not fit the vocabulary,
    ///   or the word pattern does not compile.
    pub fn new(
        vocab: Vocabulary<T>,
        rules: MergeRules<T>,
        spanning: SpanningPolicy,
    ) -> PWResult<Self> {
        vocab.validate_rules(&rules)?;

        let vocab = Arc::new(vocab);
        let encoder = MergeEncoder::new(vocab.clone(), Arc::new(rules), &spanning)?;
        let decoder = DictionaryDecoder::new(vocab);

        Ok(Self {
            spanning,
            encoder,
            decoder,
        })
    }

    /// Build a tokenizer from a loaded artifact.
    pub fn from_artifact(artifact: VocabArtifact<T>) -> PWResult<Self> {
        Self::new(artifact.vocab, artifact.rules, artifact.spanning)
    }

    /// Build a tokenizer from a training outcome.
    #[cfg(feature = "training")]
    pub fn from_outcome(outcome: crate::training::TrainingOutcome<T>) -> PWResult<Self> {
        Self::from_artifact(outcome.into_artifact())
    }

    /// Load a tokenizer from a vocabulary artifact file.
    pub fn load_path<P: AsRef<Path>>(path: P) -> PWResult<Self> {
        Self::from_artifact(load_vocab_path(path)?)
    }

    /// Save the tokenizer as a vocabulary artifact file.
    pub fn save_path<P: AsRef<Path>>(
        &self,
        path: P,
    ) -> PWResult<()> {
        save_vocab_path(&self.to_artifact(), path)
    }

    /// Copy the tables out as an artifact.
    pub fn to_artifact(&self) -> VocabArtifact<T> {
        VocabArtifact {
            spanning: self.spanning.clone(),
            vocab: self.vocab().clone(),
            rules: self.rules().clone(),
        }
    }

    /// The vocabulary.
    pub fn vocab(&self) -> &Vocabulary<T> {
        self.encoder.vocab()
    }

    /// The merge rules.
    pub fn rules(&self) -> &MergeRules<T> {
        self.encoder.rules()
    }

    /// The spanning policy.
    pub fn spanning(&self) -> &SpanningPolicy {
        &self.spanning
    }

    /// The encoder.
    pub fn encoder(&self) -> &MergeEncoder<T> {
        &self.encoder
    }

    /// The decoder.
    pub fn decoder(&self) -> &DictionaryDecoder<T> {
        &self.decoder
    }

    /// A shareable encoder.
    pub fn to_encoder(&self) -> Arc<dyn TokenEncoder<T>> {
        Arc::new(self.encoder.clone())
    }

    /// A shareable decoder.
    pub fn to_decoder(&self) -> Arc<dyn TokenDecoder<T>> {
        Arc::new(self.decoder.clone())
    }

    /// Encode bytes.
    pub fn encode(
        &self,
        text: &[u8],
    ) -> PWResult<Vec<T>> {
        self.encoder.try_encode(text)
    }

    /// Encode a string.
    pub fn encode_str(
        &self,
        text: &str,
    ) -> PWResult<Vec<T>> {
        self.encoder.try_encode_str(text)
    }

    /// Decode tokens to bytes.
    pub fn decode(
        &self,
        tokens: &[T],
    ) -> PWResult<Vec<u8>> {
        self.decoder.try_decode_to_bytes(tokens)
    }

    /// Decode tokens to a string.
    pub fn decode_to_string(
        &self,
        tokens: &[T],
    ) -> PWResult<String> {
        self.decoder.try_decode_to_string(tokens)
    }
}
