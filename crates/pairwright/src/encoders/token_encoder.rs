//! # Token Encoder Trait

use crate::{errors::PWResult, spanning::TextSpanner, types::TokenType};

/// A trait for token encoders.
///
/// Encoders are pure functions of their input and their read-only tables;
/// a single encoder may be shared across threads.
pub trait TokenEncoder<T: TokenType>: Send + Sync {
    /// Return the spanner used to split input text.
    fn spanner(&self) -> &TextSpanner;

    /// Encode bytes into tokens, appending to a buffer.
    ///
    /// ## Arguments
    /// * `text` - The bytes to encode.
    /// * `tokens` - The target token buffer to append to.
    fn try_encode_append(
        &self,
        text: &[u8],
        tokens: &mut Vec<T>,
    ) -> PWResult<()>;

    /// Encode bytes into tokens.
    fn try_encode(
        &self,
        text: &[u8],
    ) -> PWResult<Vec<T>> {
        let mut tokens = Vec::with_capacity(text.len() / 3 + 1);
        self.try_encode_append(text, &mut tokens)?;
        Ok(tokens)
    }

    /// Encode a string into tokens.
    fn try_encode_str(
        &self,
        text: &str,
    ) -> PWResult<Vec<T>> {
        self.try_encode(text.as_bytes())
    }

    /// Encode a batch of documents.
    ///
    /// Runs on the ``rayon`` pool when the `rayon` feature is enabled.
    fn try_encode_batch(
        &self,
        batch: &[&[u8]],
    ) -> PWResult<Vec<Vec<T>>> {
        #[cfg(feature = "rayon")]
        {
            use rayon::prelude::*;

            batch.par_iter().map(|text| self.try_encode(text)).collect()
        }

        #[cfg(not(feature = "rayon"))]
        {
            batch.iter().map(|text| self.try_encode(text)).collect()
        }
    }
}
