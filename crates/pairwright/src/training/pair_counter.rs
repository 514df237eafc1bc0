//! # Pair Frequency Counter
//!
//! Adjacent-pair counts over a [`TrainingCorpus`], maintained incrementally
//! as merges are applied.

use crate::{
    training::{TrainingCorpus, Word},
    types::{PWHashMap, PWHashSet, Pair, TokenType},
};

/// Minimum number of affected words before a merge is applied in parallel.
pub const PARALLEL_MERGE_THRESHOLD: usize = 256;

/// Words per parallel counting shard.
#[cfg(feature = "rayon")]
const COUNT_SHARD_SIZE: usize = 1024;

type PairCounts<T> = PWHashMap<Pair<T>, i64>;
type PairIndex<T> = PWHashMap<Pair<T>, PWHashSet<usize>>;

/// Pair counts plus a pair -> word index.
///
/// The index may list words that no longer hold a pair;
/// it never misses a word that does.
#[derive(Debug, Clone)]
pub struct PairCounter<T: TokenType> {
    counts: PairCounts<T>,
    index: PairIndex<T>,
    parallel: bool,
}

impl<T: TokenType> PairCounter<T> {
    /// Count every adjacent pair of every word, weighted by multiplicity.
    ///
    /// With `parallel` (and the `rayon` feature), the corpus is sharded,
    /// and the partial counts are summed before returning.
    #[cfg_attr(feature = "tracing", tracing::instrument(level = "debug", skip_all))]
    pub fn count_all(
        corpus: &TrainingCorpus<T>,
        parallel: bool,
    ) -> Self {
        let (counts, index) = count_shards(corpus, parallel);
        Self {
            counts,
            index,
            parallel,
        }
    }

    /// Are merges applied in parallel?
    pub fn is_parallel(&self) -> bool {
        self.parallel
    }

    /// The current count of `pair`.
    pub fn count(
        &self,
        pair: &Pair<T>,
    ) -> i64 {
        self.counts.get(pair).copied().unwrap_or_default()
    }

    /// The number of pairs with a positive count.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Are there no pairs left?
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Iterate `(pair, count)` over pairs with a positive count, in no order.
    pub fn iter(&self) -> impl Iterator<Item = (Pair<T>, i64)> + '_ {
        self.counts.iter().map(|(&p, &c)| (p, c))
    }

    /// The counts as a map.
    pub fn counts(&self) -> &PWHashMap<Pair<T>, i64> {
        &self.counts
    }

    /// Select the best pair by scanning every count.
    ///
    /// This is the reference selection rule: highest count,
    /// then smallest pair. It is `O(pairs)`; the trainer uses a heap.
    pub fn scan_max(&self) -> Option<(Pair<T>, i64)> {
        self.iter()
            .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(&a.0)))
    }

    /// Rewrite every occurrence of `pair` in the corpus as `new_token`,
    /// and update the counts exactly.
    ///
    /// Only words listed in the index for `pair` are touched.
    ///
    /// ## Returns
    /// The pairs whose counts rose, sorted.
    pub fn apply_merge(
        &mut self,
        corpus: &mut TrainingCorpus<T>,
        pair: Pair<T>,
        new_token: T,
    ) -> Vec<Pair<T>> {
        let Some(affected) = self.index.remove(&pair) else {
            self.counts.remove(&pair);
            return Vec::new();
        };
        let mut affected: Vec<usize> = affected.into_iter().collect();
        affected.sort_unstable();

        let word_deltas = self.merge_words(corpus, &affected, pair, new_token);

        // barrier: every word is rewritten before any count moves.
        let mut net: PWHashMap<Pair<T>, i64> = PWHashMap::default();
        for (idx, deltas) in word_deltas {
            let weight = corpus.count(idx) as i64;
            for (p, delta) in deltas {
                *net.entry(p).or_default() += delta * weight;
                if delta > 0 {
                    self.index.entry(p).or_default().insert(idx);
                }
            }
        }

        let mut increased = Vec::new();
        for (p, delta) in net {
            if delta == 0 {
                continue;
            }
            let count = self.counts.entry(p).or_default();
            *count += delta;
            if *count <= 0 {
                self.counts.remove(&p);
                self.index.remove(&p);
            } else if delta > 0 {
                increased.push(p);
            }
        }
        self.counts.remove(&pair);

        increased.sort_unstable();
        increased
    }

    fn merge_words(
        &self,
        corpus: &mut TrainingCorpus<T>,
        affected: &[usize],
        pair: Pair<T>,
        new_token: T,
    ) -> Vec<(usize, Vec<(Pair<T>, i64)>)> {
        let words = corpus.words_mut();

        #[cfg(feature = "rayon")]
        if self.parallel && affected.len() >= PARALLEL_MERGE_THRESHOLD {
            use rayon::prelude::*;

            let mut taken: Vec<(usize, Word<T>)> = affected
                .iter()
                .map(|&idx| (idx, core::mem::take(&mut words[idx])))
                .collect();

            let deltas = taken
                .par_iter_mut()
                .map(|(idx, word)| (*idx, word.merge_pair(pair, new_token)))
                .collect();

            for (idx, word) in taken {
                words[idx] = word;
            }
            return deltas;
        }

        affected
            .iter()
            .map(|&idx| (idx, words[idx].merge_pair(pair, new_token)))
            .collect()
    }
}

fn count_words<T: TokenType>(
    words: &[Word<T>],
    weights: &[u64],
    offset: usize,
) -> (PairCounts<T>, PairIndex<T>) {
    let mut counts: PairCounts<T> = PWHashMap::default();
    let mut index: PairIndex<T> = PWHashMap::default();
    for (i, (word, &weight)) in words.iter().zip(weights).enumerate() {
        for pair in word.pairs() {
            *counts.entry(pair).or_default() += weight as i64;
            index.entry(pair).or_default().insert(offset + i);
        }
    }
    (counts, index)
}

#[cfg(feature = "rayon")]
fn count_shards<T: TokenType>(
    corpus: &TrainingCorpus<T>,
    parallel: bool,
) -> (PairCounts<T>, PairIndex<T>) {
    use rayon::prelude::*;

    if !parallel || corpus.len() <= COUNT_SHARD_SIZE {
        return count_words(corpus.words(), corpus.counts(), 0);
    }

    corpus
        .words()
        .par_chunks(COUNT_SHARD_SIZE)
        .zip(corpus.counts().par_chunks(COUNT_SHARD_SIZE))
        .enumerate()
        .map(|(shard, (words, weights))| count_words(words, weights, shard * COUNT_SHARD_SIZE))
        .reduce(
            || (PWHashMap::default(), PWHashMap::default()),
            |(mut counts, mut index), (shard_counts, shard_index)| {
                for (p, c) in shard_counts {
                    *counts.entry(p).or_default() += c;
                }
                for (p, words) in shard_index {
                    index.entry(p).or_default().extend(words);
                }
                (counts, index)
            },
        )
}

#[cfg(not(feature = "rayon"))]
fn count_shards<T: TokenType>(
    corpus: &TrainingCorpus<T>,
    _parallel: bool,
) -> (PairCounts<T>, PairIndex<T>) {
    count_words(corpus.words(), corpus.counts(), 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus<T: TokenType>() -> TrainingCorpus<T> {
        TrainingCorpus::from_counts([
            ("low", 1u64),
            (" low", 4),
            (" lower", 1),
            (" lowest", 1),
            ("aaaa", 2),
            ("x", 9),
        ])
    }

    fn t<T: TokenType>(c: u8) -> T {
        T::from_u8(c).unwrap()
    }

    fn test_count_all<T: TokenType>(parallel: bool) {
        let corpus: TrainingCorpus<T> = corpus();
        let counter = PairCounter::count_all(&corpus, parallel);

        assert_eq!(counter.count(&(t(b'l'), t(b'o'))), 7);
        assert_eq!(counter.count(&(t(b'o'), t(b'w'))), 7);
        assert_eq!(counter.count(&(t(b' '), t(b'l'))), 6);
        assert_eq!(counter.count(&(t(b'a'), t(b'a'))), 6);
        assert_eq!(counter.count(&(t(b'w'), t(b'e'))), 2);
        assert_eq!(counter.count(&(t(b'x'), t(b'x'))), 0);

        assert_eq!(counter.scan_max(), Some(((t(b'l'), t(b'o')), 7)));
    }

    #[test]
    fn test_count_all_u16() {
        test_count_all::<u16>(false);
        test_count_all::<u16>(true);
    }

    #[test]
    fn test_count_all_u32() {
        test_count_all::<u32>(false);
        test_count_all::<u32>(true);
    }

    fn check_incremental_matches_recount<T: TokenType>(parallel: bool) {
        let mut corpus: TrainingCorpus<T> = corpus();
        let mut counter = PairCounter::count_all(&corpus, parallel);

        let mut next = 256;
        while let Some((pair, _)) = counter.scan_max() {
            let new_token = T::from_usize(next).unwrap();
            next += 1;

            let increased = counter.apply_merge(&mut corpus, pair, new_token);
            assert_eq!(counter.count(&pair), 0);
            for p in &increased {
                assert!(counter.count(p) > 0);
            }

            let recount = PairCounter::count_all(&corpus, parallel);
            assert_eq!(counter.counts(), recount.counts());
        }

        assert!(counter.is_empty());
        assert!(corpus.words().iter().all(|w| w.len() == 1));
    }

    #[test]
    fn test_incremental_matches_recount() {
        check_incremental_matches_recount::<u16>(false);
        check_incremental_matches_recount::<u32>(false);
        check_incremental_matches_recount::<u32>(true);
    }

    #[test]
    fn test_parallel_merge_matches_serial() {
        let entries: Vec<(String, u64)> = (0..(2 * PARALLEL_MERGE_THRESHOLD))
            .map(|i| (format!("ab{i}ab"), 1 + (i % 3) as u64))
            .collect();

        let mut serial: TrainingCorpus<u32> = TrainingCorpus::from_counts(entries.clone());
        let mut parallel: TrainingCorpus<u32> = TrainingCorpus::from_counts(entries);

        let mut a = PairCounter::count_all(&serial, false);
        let mut b = PairCounter::count_all(&parallel, true);

        let pair = (b'a' as u32, b'b' as u32);
        assert_eq!(
            a.apply_merge(&mut serial, pair, 256),
            b.apply_merge(&mut parallel, pair, 256)
        );
        assert_eq!(serial, parallel);
        assert_eq!(a.counts(), b.counts());
    }

    #[test]
    fn test_apply_unknown_pair() {
        let mut corpus: TrainingCorpus<u32> = corpus();
        let mut counter = PairCounter::count_all(&corpus, false);
        let before = counter.counts().clone();

        assert!(counter.apply_merge(&mut corpus, (1, 2), 300).is_empty());
        assert_eq!(counter.counts(), &before);
    }
}
