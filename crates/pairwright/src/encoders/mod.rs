//! # Token Encoders
//!
//! [`TokenEncoder`] is the encoding interface; [`MergeEncoder`] implements it
//! over a [`crate::vocab::Vocabulary`] and its [`crate::vocab::MergeRules`].
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use pairwright::{
//!     encoders::{MergeEncoder, TokenEncoder},
//!     spanning::SpanningPolicy,
//!     vocab::{MergeRules, Vocabulary},
//! };
//!
//! let mut vocab: Vocabulary<u32> = Vocabulary::new();
//! let mut rules = MergeRules::default();
//! let hi = vocab.register("hi").unwrap();
//! rules.push(b'h' as u32, b'i' as u32, hi).unwrap();
//!
//! let encoder = MergeEncoder::new(Arc::new(vocab), Arc::new(rules), &SpanningPolicy::default())
//!     .unwrap();
//! assert_eq!(encoder.try_encode_str("hi!").unwrap(), vec![hi, b'!' as u32]);
//! ```

mod merge_encoder;
mod span_merger;
mod token_encoder;

#[doc(inline)]
pub use merge_encoder::*;
#[doc(inline)]
pub use span_merger::*;
#[doc(inline)]
pub use token_encoder::*;
