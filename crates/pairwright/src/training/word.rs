//! # Training Words

use crate::{
    types::{Pair, TokenType},
    vocab::Vocabulary,
};

/// One symbol sequence of the training corpus.
///
/// Pairs are only ever formed between neighbors inside one [`Word`];
/// they never cross from one word into the next.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Word<T: TokenType> {
    tokens: Vec<T>,
}

impl<T: TokenType> Word<T> {
    /// Build a word from tokens.
    pub fn new(tokens: Vec<T>) -> Self {
        Self { tokens }
    }

    /// Build a word from the base byte tokens of `bytes`.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut tokens = Vec::with_capacity(bytes.len());
        Vocabulary::<T>::append_byte_tokens(bytes, &mut tokens);
        Self { tokens }
    }

    /// The current tokens.
    pub fn tokens(&self) -> &[T] {
        &self.tokens
    }

    /// The number of tokens.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Is the word empty?
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Iterate the adjacent pairs, left to right.
    pub fn pairs(&self) -> impl Iterator<Item = Pair<T>> + '_ {
        self.tokens.windows(2).map(|w| (w[0], w[1]))
    }

    /// Replace every non-overlapping, left-to-right occurrence of `pair` with `new_token`.
    ///
    /// ## Returns
    /// The per-occurrence pair count changes, unscaled by word multiplicity.
    /// Summing them gives the exact difference between the pair counts
    /// of the word before and after the merge.
    pub fn merge_pair(
        &mut self,
        pair: Pair<T>,
        new_token: T,
    ) -> Vec<(Pair<T>, i64)> {
        let (a, b) = pair;
        let n = self.tokens.len();
        if n < 2 {
            return Vec::new();
        }

        let mut out: Vec<T> = Vec::with_capacity(n);
        let mut deltas: Vec<(Pair<T>, i64)> = Vec::with_capacity(6);

        let mut i = 0;
        while i < n {
            if i + 1 < n && self.tokens[i] == a && self.tokens[i + 1] == b {
                // The left neighbor is read from `out`, so a preceding
                // merge in this same pass is already accounted for.
                if let Some(&x) = out.last() {
                    deltas.push(((x, a), -1));
                    deltas.push(((x, new_token), 1));
                }

                deltas.push(((a, b), -1));

                if let Some(&y) = self.tokens.get(i + 2) {
                    deltas.push(((b, y), -1));
                    deltas.push(((new_token, y), 1));
                }

                out.push(new_token);
                i += 2;
            } else {
                out.push(self.tokens[i]);
                i += 1;
            }
        }

        self.tokens = out;
        deltas
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PWHashMap;

    fn pair_counts<T: TokenType>(word: &Word<T>) -> PWHashMap<Pair<T>, i64> {
        let mut counts = PWHashMap::default();
        for pair in word.pairs() {
            *counts.entry(pair).or_default() += 1;
        }
        counts
    }

    fn check_merge<T: TokenType>(
        bytes: &[u8],
        pair: (u8, u8),
        expected: &[usize],
    ) {
        let t = |i: usize| T::from_usize(i).unwrap();
        let pair = (t(pair.0 as usize), t(pair.1 as usize));
        let new_token = t(300);

        let mut word: Word<T> = Word::from_bytes(bytes);
        let mut counts = pair_counts(&word);

        for (p, delta) in word.merge_pair(pair, new_token) {
            *counts.entry(p).or_default() += delta;
        }
        counts.retain(|_, c| *c != 0);

        assert_eq!(
            word.tokens(),
            expected.iter().map(|&i| t(i)).collect::<Vec<_>>().as_slice()
        );
        assert_eq!(counts, pair_counts(&word), "{bytes:?}");
    }

    fn test_merge_pair<T: TokenType>() {
        check_merge::<T>(b"abcab", (b'a', b'b'), &[300, 99, 300]);
        check_merge::<T>(b"xaby", (b'a', b'b'), &[120, 300, 121]);
        check_merge::<T>(b"aaa", (b'a', b'a'), &[300, 97]);
        check_merge::<T>(b"aaaa", (b'a', b'a'), &[300, 300]);
        check_merge::<T>(b"aaaaa", (b'a', b'a'), &[300, 300, 97]);
        check_merge::<T>(b"abab", (b'b', b'a'), &[97, 300, 98]);
        check_merge::<T>(b"xyz", (b'a', b'b'), &[120, 121, 122]);
        check_merge::<T>(b"a", (b'a', b'b'), &[97]);
        check_merge::<T>(b"", (b'a', b'b'), &[]);
    }

    #[test]
    fn test_merge_pair_u16() {
        test_merge_pair::<u16>();
    }

    #[test]
    fn test_merge_pair_u32() {
        test_merge_pair::<u32>();
    }

    #[test]
    fn test_pairs() {
        let word: Word<u32> = Word::from_bytes(b"low");
        assert_eq!(word.len(), 3);
        assert!(!word.is_empty());
        assert_eq!(word.pairs().collect::<Vec<_>>(), vec![(108, 111), (111, 119)]);

        let word: Word<u32> = Word::new(vec![7]);
        assert_eq!(word.pairs().count(), 0);
    }
}
