//! # Dictionary Decoder

use std::sync::Arc;

use crate::{decoders::TokenDecoder, errors::PWResult, types::TokenType, vocab::Vocabulary};

/// A [`TokenDecoder`] that concatenates each token's bytes.
#[derive(Debug, Clone)]
pub struct DictionaryDecoder<T: TokenType> {
    vocab: Arc<Vocabulary<T>>,
}

impl<T: TokenType> DictionaryDecoder<T> {
    /// Build a decoder over a vocabulary.
    pub fn new(vocab: Arc<Vocabulary<T>>) -> Self {
        Self { vocab }
    }

    /// The vocabulary.
    pub fn vocab(&self) -> &Arc<Vocabulary<T>> {
        &self.vocab
    }
}

impl<T: TokenType> TokenDecoder<T> for DictionaryDecoder<T> {
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(level = "trace", skip(self, tokens, buf))
    )]
    fn try_decode_append(
        &self,
        tokens: &[T],
        buf: &mut Vec<u8>,
    ) -> PWResult<()> {
        decode_append(&self.vocab, tokens, buf)
    }
}

fn decode_append<T: TokenType>(
    vocab: &Vocabulary<T>,
    tokens: &[T],
    buf: &mut Vec<u8>,
) -> PWResult<()> {
    for &token in tokens {
        buf.extend_from_slice(vocab.id_to_bytes(token)?);
    }
    Ok(())
}

/// Decode tokens to the concatenation of their bytes.
///
/// ## Returns
/// [`crate::PWError::UnknownToken`] if any token is outside the vocabulary.
pub fn decode<T: TokenType>(
    tokens: &[T],
    vocab: &Vocabulary<T>,
) -> PWResult<Vec<u8>> {
    let mut buf = Vec::with_capacity(tokens.len() * 4);
    decode_append(vocab, tokens, &mut buf)?;
    Ok(buf)
}
