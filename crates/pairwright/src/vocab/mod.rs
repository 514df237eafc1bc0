//! # Vocabulary Data
//!
//! * [`Vocabulary`] - the bijective `{ id <-> bytes }` token table.
//! * [`MergeRules`] - the rank-ordered merge rule table.
//! * [`io`] - the persisted vocabulary artifact.
//!
//! Both tables are produced once by training, and are read-only afterwards;
//! encoders and decoders share them through `Arc`.

pub mod io;
mod merge_rules;
mod vocabulary;

#[doc(inline)]
pub use merge_rules::*;
#[doc(inline)]
pub use vocabulary::*;
