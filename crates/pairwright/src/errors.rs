//! # Error Types
//!
//! All fallible operations in this crate return [`PWResult`].
//!
//! Every error here is a deterministic function of the input;
//! nothing is transient, and nothing is retried.

use std::string::FromUtf8Error;

/// Crate error type.
#[derive(Debug, thiserror::Error)]
pub enum PWError {
    /// A token id that is not present in the vocabulary.
    #[error("unknown token: {0}")]
    UnknownToken(u64),

    /// A byte sequence that was never registered in the vocabulary.
    #[error("byte sequence is not in the vocabulary: {0:?}")]
    NotInVocabulary(Vec<u8>),

    /// A byte sequence that is already registered under another id.
    #[error("byte sequence is already registered as token {id}: {bytes:?}")]
    DuplicateToken {
        /// The offending byte sequence.
        bytes: Vec<u8>,

        /// The id already holding the sequence.
        id: u64,
    },

    /// An option or parameter outside its legal range.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A token stream too short to produce a single window.
    #[error("insufficient tokens: need more than {max_length} tokens, got {len}")]
    InsufficientTokens {
        /// The length of the token stream.
        len: usize,

        /// The requested window length.
        max_length: usize,
    },

    /// The corpus ran out of mergeable pairs before the target size was reached.
    #[error("training stalled at vocabulary size {reached}, before target size {target}")]
    TrainingStalled {
        /// The vocabulary size reached.
        reached: usize,

        /// The configured target size.
        target: usize,
    },

    /// The special-token configuration cannot be honored by the encoder.
    #[error("unencodable input: {0}")]
    UnencodableInput(String),

    /// Decoded bytes were requested as a string, but are not UTF-8.
    #[error(transparent)]
    InvalidUtf8(#[from] FromUtf8Error),

    /// A malformed vocabulary artifact.
    #[error("parse error at line {line}: {message}")]
    Parse {
        /// The 1-based line number.
        line: usize,

        /// What went wrong.
        message: String,
    },

    /// An underlying I/O failure.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl PWError {
    /// Build a [`PWError::InvalidConfiguration`].
    pub fn invalid_config<S: Into<String>>(message: S) -> Self {
        Self::InvalidConfiguration(message.into())
    }

    /// Build a [`PWError::Parse`].
    pub fn parse<S: Into<String>>(
        line: usize,
        message: S,
    ) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }
}

/// Crate result type.
pub type PWResult<T> = Result<T, PWError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(PWError::UnknownToken(300).to_string(), "unknown token: 300");
        assert_eq!(
            PWError::InsufficientTokens {
                len: 3,
                max_length: 3
            }
            .to_string(),
            "insufficient tokens: need more than 3 tokens, got 3"
        );
        assert_eq!(
            PWError::parse(7, "bad id").to_string(),
            "parse error at line 7: bad id"
        );
    }

    #[test]
    fn test_from_utf8() {
        let err: PWError = String::from_utf8(vec![0xff]).unwrap_err().into();
        assert!(matches!(err, PWError::InvalidUtf8(_)));
    }
}
