//! # Training Corpus

use crate::{
    spanning::{SpanRef, TextSpanner},
    training::Word,
    types::{PWHashMap, TokenType},
};

/// Counts the unique symbol sequences of a stream of documents.
///
/// Special-token spans are dropped; every other span (words and gaps)
/// is counted as its own sequence.
#[derive(Debug, Clone)]
pub struct WordCounter {
    spanner: TextSpanner,
    counts: PWHashMap<Vec<u8>, u64>,
}

impl WordCounter {
    /// Create an empty counter.
    pub fn new(spanner: TextSpanner) -> Self {
        Self {
            spanner,
            counts: PWHashMap::default(),
        }
    }

    /// The spanner used to split documents.
    pub fn spanner(&self) -> &TextSpanner {
        &self.spanner
    }

    /// The number of unique sequences seen.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Have no sequences been seen?
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// The multiplicity of one sequence.
    pub fn count(
        &self,
        bytes: &[u8],
    ) -> u64 {
        self.counts.get(bytes).copied().unwrap_or_default()
    }

    /// Count the sequences of one document.
    pub fn add_document<S: AsRef<[u8]>>(
        &mut self,
        doc: S,
    ) {
        count_spans(&self.spanner, doc.as_ref(), &mut self.counts);
    }

    /// Count the sequences of many documents.
    pub fn add_documents<I, S>(
        &mut self,
        docs: I,
    ) where
        I: IntoIterator<Item = S>,
        S: AsRef<[u8]>,
    {
        for doc in docs {
            self.add_document(doc);
        }
    }

    /// Count the sequences of many documents, in parallel.
    #[cfg(feature = "rayon")]
    pub fn add_documents_par<S>(
        &mut self,
        docs: &[S],
    ) where
        S: AsRef<[u8]> + Sync,
    {
        use rayon::prelude::*;

        let spanner = &self.spanner;
        let partial = docs
            .par_iter()
            .fold(PWHashMap::default, |mut acc, doc| {
                count_spans(spanner, doc.as_ref(), &mut acc);
                acc
            })
            .reduce(PWHashMap::default, merge_counts);

        self.counts = merge_counts(core::mem::take(&mut self.counts), partial);
    }

    /// Freeze the counts into a [`TrainingCorpus`].
    ///
    /// Sequences are sorted by their bytes, so word indices
    /// do not depend on hash or document order.
    pub fn into_corpus<T: TokenType>(self) -> TrainingCorpus<T> {
        let mut entries: Vec<(Vec<u8>, u64)> = self.counts.into_iter().collect();
        entries.sort_unstable_by(|a, b| a.0.cmp(&b.0));

        TrainingCorpus::from_counts(entries)
    }
}

fn count_spans(
    spanner: &TextSpanner,
    text: &[u8],
    counts: &mut PWHashMap<Vec<u8>, u64>,
) {
    spanner.for_each_split_span(text, &mut |span| {
        if let SpanRef::Word(range) | SpanRef::Gap(range) = span {
            let bytes = &text[range];
            match counts.get_mut(bytes) {
                Some(count) => *count += 1,
                None => {
                    counts.insert(bytes.to_vec(), 1);
                }
            }
        }
        true
    });
}

fn merge_counts(
    mut a: PWHashMap<Vec<u8>, u64>,
    mut b: PWHashMap<Vec<u8>, u64>,
) -> PWHashMap<Vec<u8>, u64> {
    if a.len() < b.len() {
        core::mem::swap(&mut a, &mut b);
    }
    for (k, v) in b {
        *a.entry(k).or_default() += v;
    }
    a
}

/// The unique symbol sequences of a corpus, with multiplicities.
///
/// Each sequence starts as the base byte tokens of its bytes,
/// and is rewritten in place as merges are applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrainingCorpus<T: TokenType> {
    words: Vec<Word<T>>,
    counts: Vec<u64>,
}

impl<T: TokenType> TrainingCorpus<T> {
    /// Build a corpus from `(bytes, multiplicity)` entries, in the given order.
    ///
    /// Entries with multiplicity 0 are dropped.
    pub fn from_counts<I, B>(entries: I) -> Self
    where
        I: IntoIterator<Item = (B, u64)>,
        B: AsRef<[u8]>,
    {
        let (words, counts) = entries
            .into_iter()
            .filter(|(_, count)| *count > 0)
            .map(|(bytes, count)| (Word::from_bytes(bytes.as_ref()), count))
            .unzip();
        Self { words, counts }
    }

    /// The number of unique sequences.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Is the corpus empty?
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// The sequences.
    pub fn words(&self) -> &[Word<T>] {
        &self.words
    }

    /// The multiplicities, parallel to [`Self::words`].
    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    /// The multiplicity of the sequence at `idx`.
    pub fn count(
        &self,
        idx: usize,
    ) -> u64 {
        self.counts[idx]
    }

    /// The total number of tokens, counting multiplicity.
    pub fn total_tokens(&self) -> u64 {
        self.words
            .iter()
            .zip(self.counts.iter())
            .map(|(w, &c)| w.len() as u64 * c)
            .sum()
    }

    pub(crate) fn words_mut(&mut self) -> &mut [Word<T>] {
        &mut self.words
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spanning::{SpanningPolicy, TextSpanningConfig};

    fn counter(policy: SpanningPolicy) -> WordCounter {
        let config = TextSpanningConfig::from_policy(policy).with_special_tokens(["<|eot|>"]);
        WordCounter::new(TextSpanner::from_config(&config).unwrap())
    }

    #[test]
    fn test_word_counter() {
        let mut wc = counter(SpanningPolicy::default());
        assert!(wc.is_empty());

        wc.add_documents(["low low lower", "low<|eot|>low"]);
        assert_eq!(wc.count(b"low"), 3);
        assert_eq!(wc.count(b" low"), 1);
        assert_eq!(wc.count(b" lower"), 1);
        assert_eq!(wc.count(b"<|eot|>"), 0);
        assert_eq!(wc.len(), 3);

        let corpus: TrainingCorpus<u32> = wc.into_corpus();
        assert_eq!(corpus.len(), 3);
        assert_eq!(
            corpus.words()[0].tokens(),
            &[b' ' as u32, b'l' as u32, b'o' as u32, b'w' as u32]
        );
        assert_eq!(corpus.counts(), &[1, 1, 3]);
        assert_eq!(corpus.total_tokens(), 4 + 6 + 9);
    }

    #[test]
    fn test_whole_text_counter() {
        let mut wc = counter(SpanningPolicy::WholeText);
        wc.add_document("a b<|eot|>a b");
        assert_eq!(wc.count(b"a b"), 2);
        assert_eq!(wc.len(), 1);
    }

    #[test]
    fn test_gaps_are_counted() {
        let mut wc = counter(SpanningPolicy::from_pattern(r"[a-z]+"));
        wc.add_document("ab, cd");
        assert_eq!(wc.count(b"ab"), 1);
        assert_eq!(wc.count(b", "), 1);
        assert_eq!(wc.count(b"cd"), 1);
    }

    #[cfg(feature = "rayon")]
    #[test]
    fn test_add_documents_par() {
        let docs: Vec<String> = (0..100).map(|i| format!("doc {} doc", i % 7)).collect();

        let mut serial = counter(SpanningPolicy::default());
        serial.add_documents(&docs);

        let mut parallel = counter(SpanningPolicy::default());
        parallel.add_documents_par(&docs);

        let a: TrainingCorpus<u32> = serial.into_corpus();
        let b: TrainingCorpus<u32> = parallel.into_corpus();
        assert_eq!(a, b);
    }

    #[test]
    fn test_from_counts_drops_zero() {
        let corpus: TrainingCorpus<u16> = TrainingCorpus::from_counts([("ab", 3), ("cd", 0)]);
        assert_eq!(corpus.len(), 1);
        assert_eq!(corpus.count(0), 3);
    }
}
