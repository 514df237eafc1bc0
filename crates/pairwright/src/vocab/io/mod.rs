//! # Vocabulary IO
//!
//! ## Saving And Loading A Vocab
//!
//! ```rust,no_run
//! use pairwright::{
//!     PWResult,
//!     spanning::SpanningPolicy,
//!     vocab::{MergeRules, Vocabulary, io::{VocabArtifact, load_vocab_path, save_vocab_path}},
//! };
//!
//! fn example(vocab: Vocabulary<u32>, rules: MergeRules<u32>) -> PWResult<()> {
//!     let artifact = VocabArtifact {
//!         spanning: SpanningPolicy::default(),
//!         vocab,
//!         rules,
//!     };
//!     save_vocab_path(&artifact, "vocab.pairwright")?;
//!
//!     let loaded: VocabArtifact<u32> = load_vocab_path("vocab.pairwright")?;
//!     assert_eq!(loaded, artifact);
//!     Ok(())
//! }
//! ```

mod base64_vocab;

#[doc(inline)]
pub use base64_vocab::*;
