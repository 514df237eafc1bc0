//! # Common Types and Traits

use core::fmt::{Debug, Display};
use core::hash::Hash;

use num_traits::{FromPrimitive, PrimInt, ToPrimitive, Unsigned};

use crate::errors::{PWError, PWResult};

/// A type that can be used as a token id.
pub trait TokenType:
    'static
    + PrimInt
    + Unsigned
    + FromPrimitive
    + ToPrimitive
    + Hash
    + Default
    + Debug
    + Display
    + Send
    + Sync
{
}

impl<T> TokenType for T where
    T: 'static
        + PrimInt
        + Unsigned
        + FromPrimitive
        + ToPrimitive
        + Hash
        + Default
        + Debug
        + Display
        + Send
        + Sync
{
}

/// A pair of adjacent tokens.
pub type Pair<T> = (T, T);

/// The number of single-byte base tokens.
pub const BYTE_ALPHABET_SIZE: usize = 256;

/// Convert a `usize` id into `T`.
///
/// ## Returns
/// [`PWError::InvalidConfiguration`] if the id does not fit in `T`.
pub fn token_from_usize<T: TokenType>(id: usize) -> PWResult<T> {
    T::from_usize(id).ok_or_else(|| {
        PWError::invalid_config(format!(
            "token id {id} does not fit in {}",
            core::any::type_name::<T>()
        ))
    })
}

/// Widen a token to `u64`, for error reporting.
pub fn token_to_u64<T: TokenType>(token: T) -> u64 {
    token.to_u64().unwrap_or(u64::MAX)
}

cfg_if::cfg_if! {
    if #[cfg(feature = "ahash")] {
        /// Type Alias for hash maps in this crate.
        pub type PWHashMap<K, V> = ahash::AHashMap<K, V>;

        /// Type Alias for hash sets in this crate.
        pub type PWHashSet<V> = ahash::AHashSet<V>;
    } else if #[cfg(feature = "foldhash")] {
        /// Type Alias for hash maps in this crate.
        pub type PWHashMap<K, V> = foldhash::HashMap<K, V>;

        /// Type Alias for hash sets in this crate.
        pub type PWHashSet<V> = foldhash::HashSet<V>;
    } else {
        /// Type Alias for hash maps in this crate.
        pub type PWHashMap<K, V> = std::collections::HashMap<K, V>;

        /// Type Alias for hash sets in this crate.
        pub type PWHashSet<V> = std::collections::HashSet<V>;
    }
}
