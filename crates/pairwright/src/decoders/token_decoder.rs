//! # Token Decoder Trait

use crate::{errors::PWResult, types::TokenType};

/// A trait for token decoders.
pub trait TokenDecoder<T: TokenType>: Send + Sync {
    /// Decode tokens, appending their bytes to a buffer.
    ///
    /// ## Arguments
    /// * `tokens` - The tokens to decode.
    /// * `buf` - The target byte buffer to append to.
    ///
    /// ## Returns
    /// [`crate::PWError::UnknownToken`] on the first token outside the vocabulary;
    /// bytes of earlier tokens may already be appended.
    fn try_decode_append(
        &self,
        tokens: &[T],
        buf: &mut Vec<u8>,
    ) -> PWResult<()>;

    /// Decode tokens to bytes.
    fn try_decode_to_bytes(
        &self,
        tokens: &[T],
    ) -> PWResult<Vec<u8>> {
        let mut buf = Vec::with_capacity(tokens.len() * 4);
        self.try_decode_append(tokens, &mut buf)?;
        Ok(buf)
    }

    /// Decode tokens to a string.
    ///
    /// ## Returns
    /// [`crate::PWError::InvalidUtf8`] if the bytes are not UTF-8.
    fn try_decode_to_string(
        &self,
        tokens: &[T],
    ) -> PWResult<String> {
        Ok(String::from_utf8(self.try_decode_to_bytes(tokens)?)?)
    }

    /// Decode a batch of token sequences to bytes.
    ///
    /// Runs on the ``rayon`` pool when the `rayon` feature is enabled.
    fn try_decode_batch_to_bytes(
        &self,
        batch: &[&[T]],
    ) -> PWResult<Vec<Vec<u8>>> {
        #[cfg(feature = "rayon")]
        {
            use rayon::prelude::*;

            batch
                .par_iter()
                .map(|tokens| self.try_decode_to_bytes(tokens))
                .collect()
        }

        #[cfg(not(feature = "rayon"))]
        {
            batch
                .iter()
                .map(|tokens| self.try_decode_to_bytes(tokens))
                .collect()
        }
    }
}
