//! # Token Vocabulary

use crate::{
    errors::{PWError, PWResult},
    types::{BYTE_ALPHABET_SIZE, PWHashMap, TokenType, token_from_usize, token_to_u64},
    vocab::MergeRules,
};

/// Returns an iterator over all byte tokens (0-255).
pub fn byte_tokens_iter<T: TokenType>() -> impl Iterator<Item = T> {
    (0..BYTE_ALPHABET_SIZE).map(move |i| T::from_usize(i).unwrap())
}

/// Bidirectional `{ T <-> Vec<u8> }` token vocabulary.
///
/// Ids `0..256` are the single-byte base tokens; every later id
/// is assigned by [`Vocabulary::register`] in increasing order.
/// No id is ever reused or removed, and no two ids share a byte sequence.
#[derive(Debug, Clone)]
pub struct Vocabulary<T: TokenType> {
    tokens: Vec<Vec<u8>>,
    lookup: PWHashMap<Vec<u8>, T>,
    specials: Vec<T>,
}

impl<T: TokenType> Default for Vocabulary<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: TokenType> PartialEq for Vocabulary<T> {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        // `lookup` is derived from `tokens`.
        self.tokens == other.tokens && self.specials == other.specials
    }
}

impl<T: TokenType> Eq for Vocabulary<T> {}

impl<T: TokenType> Vocabulary<T> {
    /// Create a vocabulary seeded with the 256 base byte tokens.
    pub fn new() -> Self {
        let mut lookup = PWHashMap::default();
        let tokens: Vec<Vec<u8>> = (0..BYTE_ALPHABET_SIZE).map(|b| vec![b as u8]).collect();
        for (token, bytes) in byte_tokens_iter::<T>().zip(tokens.iter()) {
            lookup.insert(bytes.clone(), token);
        }
        Self {
            tokens,
            lookup,
            specials: Vec::new(),
        }
    }

    /// The number of tokens, including the base bytes.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Is the vocabulary empty?
    ///
    /// Always `false`; the base byte tokens are always present.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// The largest assigned id.
    pub fn max_token(&self) -> T {
        // `tokens` is never shorter than the byte alphabet.
        T::from_usize(self.tokens.len() - 1).unwrap_or_else(T::max_value)
    }

    /// The base token for a single byte.
    pub fn byte_token(byte: u8) -> T {
        T::from_u8(byte).unwrap()
    }

    /// Append the base byte tokens for `bytes` to `tokens`.
    pub fn append_byte_tokens(
        bytes: &[u8],
        tokens: &mut Vec<T>,
    ) {
        tokens.extend(bytes.iter().map(|&b| Self::byte_token(b)));
    }

    /// Look up the byte sequence of a token.
    pub fn token_bytes(
        &self,
        id: T,
    ) -> Option<&[u8]> {
        self.tokens.get(id.to_usize()?).map(Vec::as_slice)
    }

    /// Look up the token for an exact byte sequence.
    pub fn lookup_token(
        &self,
        bytes: &[u8],
    ) -> Option<T> {
        self.lookup.get(bytes).copied()
    }

    /// Get the byte sequence of a token.
    ///
    /// ## Returns
    /// [`PWError::UnknownToken`] if `id` is out of range.
    pub fn id_to_bytes(
        &self,
        id: T,
    ) -> PWResult<&[u8]> {
        self.token_bytes(id)
            .ok_or_else(|| PWError::UnknownToken(token_to_u64(id)))
    }

    /// Get the token for an exact byte sequence.
    ///
    /// ## Returns
    /// [`PWError::NotInVocabulary`] if the sequence was never registered.
    pub fn bytes_to_id(
        &self,
        bytes: &[u8],
    ) -> PWResult<T> {
        self.lookup_token(bytes)
            .ok_or_else(|| PWError::NotInVocabulary(bytes.to_vec()))
    }

    /// Register a new byte sequence under the next unused id.
    ///
    /// ## Returns
    /// * [`PWError::DuplicateToken`] if the sequence is already registered.
    /// * [`PWError::InvalidConfiguration`] if the sequence is empty,
    ///   or the next id does not fit in `T`.
    pub fn register<B: Into<Vec<u8>>>(
        &mut self,
        bytes: B,
    ) -> PWResult<T> {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Err(PWError::invalid_config("cannot register an empty token"));
        }
        if let Some(&id) = self.lookup.get(&bytes) {
            return Err(PWError::DuplicateToken {
                bytes,
                id: token_to_u64(id),
            });
        }

        let id: T = token_from_usize(self.tokens.len())?;
        self.lookup.insert(bytes.clone(), id);
        self.tokens.push(bytes);
        Ok(id)
    }

    /// Register a special token.
    ///
    /// Special tokens are matched literally during encoding,
    /// and never take part in merges.
    ///
    /// ## Returns
    /// [`PWError::InvalidConfiguration`] if the marker is empty,
    /// or collides with an existing token.
    pub fn register_special<B: Into<Vec<u8>>>(
        &mut self,
        bytes: B,
    ) -> PWResult<T> {
        let id = self.register(bytes).map_err(|e| match e {
            PWError::DuplicateToken { bytes, id } => PWError::invalid_config(format!(
                "special token {bytes:?} collides with token {id}"
            )),
            e => e,
        })?;
        self.specials.push(id);
        Ok(id)
    }

    /// Mark an already registered id as special.
    pub(crate) fn mark_special(
        &mut self,
        id: T,
    ) -> PWResult<()> {
        let idx = id
            .to_usize()
            .ok_or_else(|| PWError::UnknownToken(token_to_u64(id)))?;
        if idx < BYTE_ALPHABET_SIZE || idx >= self.tokens.len() {
            return Err(PWError::invalid_config(format!(
                "token {id} cannot be special"
            )));
        }
        if !self.specials.contains(&id) {
            self.specials.push(id);
        }
        Ok(())
    }

    /// The special tokens, in registration order.
    pub fn special_tokens(&self) -> &[T] {
        &self.specials
    }

    /// Is `id` a special token?
    pub fn is_special(
        &self,
        id: T,
    ) -> bool {
        self.specials.contains(&id)
    }

    /// The byte markers of the special tokens, in registration order.
    pub fn special_markers(&self) -> Vec<Vec<u8>> {
        self.specials
            .iter()
            .filter_map(|&id| self.token_bytes(id).map(<[u8]>::to_vec))
            .collect()
    }

    /// Iterate `(id, bytes)` in id order.
    pub fn iter(&self) -> impl Iterator<Item = (T, &[u8])> + '_ {
        self.tokens
            .iter()
            .enumerate()
            .filter_map(|(i, bytes)| T::from_usize(i).map(|id| (id, bytes.as_slice())))
    }

    /// Check that a rule table is consistent with this vocabulary.
    ///
    /// Every rule must join two known, non-special tokens into a known token
    /// whose bytes are exactly the concatenation of the two.
    pub fn validate_rules(
        &self,
        rules: &MergeRules<T>,
    ) -> PWResult<()> {
        for rule in rules.iter() {
            for id in [rule.left, rule.right, rule.merged] {
                if self.is_special(id) {
                    return Err(PWError::invalid_config(format!(
                        "merge rule {} touches special token {id}",
                        rule.rank
                    )));
                }
            }

            let left = self.id_to_bytes(rule.left)?;
            let right = self.id_to_bytes(rule.right)?;
            let merged = self.id_to_bytes(rule.merged)?;

            if merged.len() != left.len() + right.len()
                || &merged[..left.len()] != left
                || &merged[left.len()..] != right
            {
                return Err(PWError::invalid_config(format!(
                    "merge rule {} ({}, {}) -> {} does not concatenate",
                    rule.rank, rule.left, rule.right, rule.merged
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_vocab<T: TokenType>() {
        let mut vocab: Vocabulary<T> = Vocabulary::new();
        assert_eq!(vocab.len(), 256);
        assert_eq!(vocab.max_token(), T::from_usize(255).unwrap());

        for b in 0..=255u8 {
            let t = Vocabulary::<T>::byte_token(b);
            assert_eq!(vocab.id_to_bytes(t).unwrap(), &[b]);
            assert_eq!(vocab.bytes_to_id(&[b]).unwrap(), t);
        }

        let lo = vocab.register(b"lo".to_vec()).unwrap();
        assert_eq!(lo, T::from_usize(256).unwrap());
        let low = vocab.register(&b"low"[..]).unwrap();
        assert_eq!(low, T::from_usize(257).unwrap());

        assert_eq!(vocab.id_to_bytes(low).unwrap(), b"low");
        assert_eq!(vocab.bytes_to_id(b"lo").unwrap(), lo);
        assert_eq!(vocab.len(), 258);

        assert!(matches!(
            vocab.id_to_bytes(T::from_usize(258).unwrap()),
            Err(PWError::UnknownToken(258))
        ));
        assert!(matches!(
            vocab.bytes_to_id(b"lower"),
            Err(PWError::NotInVocabulary(_))
        ));
        assert!(matches!(
            vocab.register(b"lo".to_vec()),
            Err(PWError::DuplicateToken { id: 256, .. })
        ));
        assert!(matches!(
            vocab.register(Vec::new()),
            Err(PWError::InvalidConfiguration(_))
        ));

        // Failed registrations do not consume ids.
        assert_eq!(vocab.len(), 258);
    }

    #[test]
    fn test_vocab_u16() {
        test_vocab::<u16>();
    }

    #[test]
    fn test_vocab_u32() {
        test_vocab::<u32>();
    }

    #[test]
    fn test_specials() {
        let mut vocab: Vocabulary<u32> = Vocabulary::new();
        let eot = vocab.register_special("<|endoftext|>").unwrap();
        assert_eq!(eot, 256);
        assert!(vocab.is_special(eot));
        assert!(!vocab.is_special(65));
        assert_eq!(vocab.special_tokens(), &[256]);
        assert_eq!(vocab.special_markers(), vec![b"<|endoftext|>".to_vec()]);

        assert!(matches!(
            vocab.register_special("a"),
            Err(PWError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            vocab.register_special(""),
            Err(PWError::InvalidConfiguration(_))
        ));

        assert!(vocab.mark_special(12).is_err());
        assert!(vocab.mark_special(999).is_err());
    }

    #[test]
    fn test_overflow() {
        let mut vocab: Vocabulary<u8> = Vocabulary::new();
        assert_eq!(vocab.len(), 256);
        assert!(matches!(
            vocab.register(b"ab".to_vec()),
            Err(PWError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_validate_rules() {
        let mut vocab: Vocabulary<u32> = Vocabulary::new();
        let ab = vocab.register("ab").unwrap();
        let xy = vocab.register("xy").unwrap();
        let special = vocab.register_special("<s>").unwrap();

        let mut rules = MergeRules::default();
        rules.push(b'a' as u32, b'b' as u32, ab).unwrap();
        vocab.validate_rules(&rules).unwrap();

        let mut bad = MergeRules::default();
        bad.push(b'a' as u32, b'b' as u32, xy).unwrap();
        assert!(vocab.validate_rules(&bad).is_err());

        let mut bad = MergeRules::default();
        bad.push(special, b'b' as u32, ab).unwrap();
        assert!(vocab.validate_rules(&bad).is_err());
    }

    #[test]
    fn test_iter_and_eq() {
        let mut a: Vocabulary<u32> = Vocabulary::new();
        a.register("hi").unwrap();
        let mut b: Vocabulary<u32> = Vocabulary::new();
        assert_ne!(a, b);
        b.register("hi").unwrap();
        assert_eq!(a, b);

        let last = a.iter().last().unwrap();
        assert_eq!(last, (256, &b"hi"[..]));
        assert_eq!(a.iter().count(), 257);
    }
}
