//! # Text Spanning
//!
//! This module factors out the sequence-boundary policy shared by
//! training and encoding.
//!
//! [`TextSpanningConfig`] describes the declarative needs of a tokenizer:
//! * `policy` - how runs of ordinary text are cut into symbol sequences.
//! * `special_tokens` - literal markers that are split out and never merged.
//!
//! [`TextSpanner`] is the compiled run-time form, built over [`SpanLexer`] plugins.
//!
//! Byte pairs are only ever counted, or merged, inside a single span;
//! so the same policy must be used to train a vocabulary and to encode with it.

mod span_lexer;
mod spanning_config;
mod text_spanner;

#[doc(inline)]
pub use span_lexer::*;
#[doc(inline)]
pub use spanning_config::*;
#[doc(inline)]
pub use text_spanner::*;
