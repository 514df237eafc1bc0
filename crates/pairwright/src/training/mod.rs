//! # Vocabulary Training
//!
//! Learns [`crate::vocab::MergeRules`] and a [`crate::vocab::Vocabulary`]
//! from a corpus of documents.
//!
//! The learner is a small state machine:
//! `Collecting -> SelectPair -> ApplyMerge -> SelectPair -> ... -> Stopped`.
//!
//! ```rust
//! use pairwright::{
//!     spanning::SpanningPolicy,
//!     training::{BpeTrainerOptions, TrainingOutcome, train},
//! };
//!
//! let options = BpeTrainerOptions::new(300)
//!     .with_special_tokens(["<|endoftext|>"])
//!     .with_spanning(SpanningPolicy::default());
//!
//! let outcome: TrainingOutcome<u32> =
//!     train(["hello world<|endoftext|>hello there"], &options).unwrap();
//!
//! assert!(outcome.vocab.len() <= 300);
//! ```

mod bpe_trainer;
mod corpus;
mod merge_job;
mod pair_counter;
mod trainer_options;
mod word;

#[doc(inline)]
pub use bpe_trainer::*;
#[doc(inline)]
pub use corpus::*;
#[doc(inline)]
pub use merge_job::*;
#[doc(inline)]
pub use pair_counter::*;
#[doc(inline)]
pub use trainer_options::*;
#[doc(inline)]
pub use word::*;
