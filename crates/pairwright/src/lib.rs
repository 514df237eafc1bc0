#![warn(missing_docs, unused)]
//! # `pairwright` Byte Pair Encoding
//!
//! This crate learns a byte-level BPE vocabulary from a corpus,
//! encodes text with it, decodes tokens back to text exactly,
//! and slices token streams into training windows.
//!
//! ## Pipeline
//!
//! * [`training`] - learn a [`vocab::Vocabulary`] and its [`vocab::MergeRules`].
//! * [`encoders`] - text to tokens, by replaying the merge rules in rank order.
//! * [`decoders`] - tokens to text, by concatenating token bytes.
//! * [`windows`] - `(input, target)` next-token windows over a token stream.
//! * [`vocab::io`] - the persisted vocabulary artifact.
//!
//! [`Tokenizer`] bundles a vocabulary, its rules, and its spanning policy
//! with a ready encoder and decoder.
//!
//! ## Example
//!
//! ```rust
//! use pairwright::{
//!     Tokenizer,
//!     build_windows,
//!     training::{BpeTrainerOptions, train},
//! };
//!
//! let corpus = [
//!     "low low low low low lower lower newest newest newest",
//!     "newest newest newest widest widest widest<|endoftext|>",
//! ];
//! let options = BpeTrainerOptions::new(280).with_special_tokens(["<|endoftext|>"]);
//! let outcome = train::<u32, _, _>(corpus, &options).unwrap();
//! let tokenizer = Tokenizer::from_outcome(outcome).unwrap();
//!
//! let tokens = tokenizer.encode_str(corpus[1]).unwrap();
//! assert_eq!(tokenizer.decode_to_string(&tokens).unwrap(), corpus[1]);
//!
//! for window in build_windows(&tokens, 4, 2).unwrap() {
//!     assert_eq!(window.input[1..], window.target[..3]);
//! }
//! ```
//!
//! ## Crate Features
#![doc = document_features::document_features!()]

pub mod compat;
pub mod decoders;
pub mod encoders;
pub mod errors;
pub mod spanning;
pub mod types;
pub mod vocab;
pub mod windows;

#[cfg(feature = "training")]
pub mod training;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

mod tokenizer;

#[doc(inline)]
pub use decoders::{TokenDecoder, decode};
#[doc(inline)]
pub use encoders::{TokenEncoder, encode};
#[doc(inline)]
pub use errors::{PWError, PWResult};
#[doc(inline)]
pub use tokenizer::*;
#[cfg(feature = "training")]
#[doc(inline)]
pub use training::train;
#[doc(inline)]
pub use types::TokenType;
#[doc(inline)]
pub use windows::build_windows;
