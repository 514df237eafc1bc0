//! # Token Decoders
//!
//! [`TokenDecoder`] is the decoding interface; [`DictionaryDecoder`]
//! implements it over a [`crate::vocab::Vocabulary`].
//!
//! Decoding is the exact left inverse of encoding:
//! `decode(encode(s)) == s` for every byte string `s`.

mod dictionary_decoder;
mod token_decoder;

#[doc(inline)]
pub use dictionary_decoder::*;
#[doc(inline)]
pub use token_decoder::*;
