//! # Hybrid sweep/heap span merging.
//!
//! Short spans use an inline linear sweep (low overhead, O(m*n)).
//! Long spans switch to a min-heap + linked-list algorithm (O(m log n)).
//!
//! Both paths apply the lowest-rank rule first, leftmost on ties,
//! and stop when no adjacent pair has a rule.

use core::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::{
    types::TokenType,
    vocab::{MergeRules, Vocabulary},
};

/// Spans with at most this many bytes use the linear sweep path.
pub const SWEEP_THRESHOLD: usize = 16;

/// Sentinel value for "no neighbor" in the linked list.
const SENTINEL: u32 = u32::MAX;

/// A heap entry: (rank, position, generation_at_push_time).
///
/// Wrapped in [`Reverse`] so the [`BinaryHeap`] acts as a min-heap by rank,
/// with ties broken by position (leftmost first).
type HeapEntry = Reverse<(usize, u32, u32)>;

/// Reusable working buffers for merging one span at a time.
#[derive(Debug, Clone, Default)]
pub struct SpanMerger {
    next: Vec<u32>,
    prev: Vec<u32>,
    generation: Vec<u32>,
    heap: BinaryHeap<HeapEntry>,
}

impl SpanMerger {
    /// Decompose `span` into byte tokens and merge them, appending to `tokens`.
    pub fn merge_append<T: TokenType>(
        &mut self,
        rules: &MergeRules<T>,
        span: &[u8],
        tokens: &mut Vec<T>,
    ) {
        let start = tokens.len();
        Vocabulary::<T>::append_byte_tokens(span, tokens);

        let n = tokens.len() - start;
        if n <= 1 || rules.is_empty() {
            return;
        }

        if n <= SWEEP_THRESHOLD || n >= SENTINEL as usize {
            Self::sweep(rules, tokens, start);
        } else {
            self.heap_merge(rules, tokens, start);
        }
    }

    /// Linear sweep merge.
    fn sweep<T: TokenType>(
        rules: &MergeRules<T>,
        tokens: &mut Vec<T>,
        start: usize,
    ) {
        let stop = start + 2;
        while tokens.len() >= stop {
            let Some(((_, merged), idx)) = tokens[start..]
                .windows(2)
                .enumerate()
                .filter_map(|(idx, w)| rules.lookup_pair(&(w[0], w[1])).map(|hit| (hit, idx)))
                .min_by_key(|&((rank, _), idx)| (rank, idx))
            else {
                break;
            };

            let idx = start + idx;
            tokens[idx] = merged;
            tokens.remove(idx + 1);
        }
    }

    /// Heap-based merge for long spans.
    fn heap_merge<T: TokenType>(
        &mut self,
        rules: &MergeRules<T>,
        tokens: &mut Vec<T>,
        start: usize,
    ) {
        let n = tokens.len() - start;

        // Initialize linked-list arrays and generation counters.
        self.next.clear();
        self.next
            .extend((1..=n as u32).map(|i| if i < n as u32 { i } else { SENTINEL }));

        self.prev.clear();
        self.prev.push(SENTINEL);
        self.prev.extend(0..n as u32 - 1);

        self.generation.clear();
        self.generation.resize(n, 0);

        // Seed the heap with all adjacent pairs.
        self.heap.clear();
        for pos in 0..n - 1 {
            if let Some((rank, _)) =
                rules.lookup_pair(&(tokens[start + pos], tokens[start + pos + 1]))
            {
                self.heap.push(Reverse((rank, pos as u32, 0)));
            }
        }

        // Merge loop.
        while let Some(Reverse((_, i, entry_gen))) = self.heap.pop() {
            let ii = i as usize;
            if entry_gen != self.generation[ii] {
                continue;
            }
            let j = self.next[ii];
            if j == SENTINEL {
                continue;
            }
            let jj = j as usize;

            // The pair at `i` is unchanged since the push; look up its target.
            let Some((_, merged)) = rules.lookup_pair(&(tokens[start + ii], tokens[start + jj]))
            else {
                continue;
            };
            tokens[start + ii] = merged;

            let k = self.next[jj];
            self.next[ii] = k;
            if k != SENTINEL {
                self.prev[k as usize] = i;
            }
            self.next[jj] = SENTINEL;

            self.generation[ii] = self.generation[ii].wrapping_add(1);

            let p = self.prev[ii];
            if p != SENTINEL {
                let pp = p as usize;
                self.generation[pp] = self.generation[pp].wrapping_add(1);
                if let Some((rank, _)) = rules.lookup_pair(&(tokens[start + pp], tokens[start + ii]))
                {
                    self.heap.push(Reverse((rank, p, self.generation[pp])));
                }
            }

            if k != SENTINEL {
                if let Some((rank, _)) =
                    rules.lookup_pair(&(tokens[start + ii], tokens[start + k as usize]))
                {
                    self.heap.push(Reverse((rank, i, self.generation[ii])));
                }
            }
        }

        // Compact live tokens in-place by walking the linked list.
        let mut write = start;
        let mut pos = 0u32;
        loop {
            tokens[write] = tokens[start + pos as usize];
            write += 1;
            let nxt = self.next[pos as usize];
            if nxt == SENTINEL {
                break;
            }
            pos = nxt;
        }
        tokens.truncate(write);
    }
}
