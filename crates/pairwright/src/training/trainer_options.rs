//! # Trainer Options

use crate::{
    errors::{PWError, PWResult},
    spanning::{SpanningPolicy, TextSpanningConfig},
    types::{BYTE_ALPHABET_SIZE, TokenType, token_from_usize},
};

/// The default [`BpeTrainerOptions::min_frequency`].
pub const DEFAULT_MIN_FREQUENCY: u64 = 2;

/// The default [`BpeTrainerOptions::parallel`]; on when built with `rayon`.
pub const DEFAULT_PARALLEL: bool = cfg!(feature = "rayon");

/// Options for [`crate::training::BpeTrainer`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BpeTrainerOptions {
    /// Stop once the vocabulary holds this many tokens.
    ///
    /// Counts the base bytes and the special tokens.
    pub target_vocab_size: usize,

    /// Stop once the best pair occurs fewer times than this.
    ///
    /// `0` is treated as `1`.
    pub min_frequency: u64,

    /// Special tokens, registered before training in this order.
    pub special_tokens: Vec<Vec<u8>>,

    /// The sequence-boundary policy.
    pub spanning: SpanningPolicy,

    /// Count and merge in parallel; ignored without the `rayon` feature.
    pub parallel: bool,
}

impl BpeTrainerOptions {
    /// Create options for a target vocabulary size, with defaults elsewhere.
    pub fn new(target_vocab_size: usize) -> Self {
        Self {
            target_vocab_size,
            min_frequency: DEFAULT_MIN_FREQUENCY,
            special_tokens: Vec::new(),
            spanning: SpanningPolicy::default(),
            parallel: DEFAULT_PARALLEL,
        }
    }

    /// Set the target vocabulary size.
    pub fn with_target_vocab_size(
        self,
        target_vocab_size: usize,
    ) -> Self {
        Self {
            target_vocab_size,
            ..self
        }
    }

    /// Set the minimum pair frequency.
    pub fn with_min_frequency(
        self,
        min_frequency: u64,
    ) -> Self {
        Self {
            min_frequency,
            ..self
        }
    }

    /// Append special tokens.
    pub fn with_special_tokens<I, S>(
        mut self,
        specials: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[u8]>,
    {
        self.special_tokens
            .extend(specials.into_iter().map(|s| s.as_ref().to_vec()));
        self
    }

    /// Set the spanning policy.
    pub fn with_spanning(
        self,
        spanning: SpanningPolicy,
    ) -> Self {
        Self { spanning, ..self }
    }

    /// Enable or disable parallel training.
    pub fn with_parallel(
        self,
        parallel: bool,
    ) -> Self {
        Self { parallel, ..self }
    }

    /// The minimum frequency actually applied.
    pub fn effective_min_frequency(&self) -> u64 {
        self.min_frequency.max(1)
    }

    /// The vocabulary size before any merge.
    pub fn base_vocab_size(&self) -> usize {
        BYTE_ALPHABET_SIZE + self.special_tokens.len()
    }

    /// The spanning configuration shared with the encoder.
    pub fn spanning_config(&self) -> TextSpanningConfig {
        TextSpanningConfig::from_policy(self.spanning.clone())
            .with_special_tokens(&self.special_tokens)
    }

    /// Check the options against the token type `T`.
    ///
    /// ## Returns
    /// [`PWError::InvalidConfiguration`] if the target is smaller than the
    /// base alphabet plus special tokens, or the largest id would not fit in `T`.
    pub fn validate<T: TokenType>(&self) -> PWResult<()> {
        if self.target_vocab_size < self.base_vocab_size() {
            return Err(PWError::invalid_config(format!(
                "target_vocab_size ({}) < 256 base tokens + {} special tokens",
                self.target_vocab_size,
                self.special_tokens.len()
            )));
        }
        token_from_usize::<T>(self.target_vocab_size - 1)?;
        Ok(())
    }
}
