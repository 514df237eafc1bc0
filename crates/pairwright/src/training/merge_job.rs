//! # Merge Candidates

use core::cmp::Ordering;

use crate::types::{Pair, TokenType};

/// A candidate merge on the selection heap.
///
/// Ordered so that the max-heap yields the highest count first,
/// and on equal counts the lexicographically smallest pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeJob<T: TokenType> {
    /// The pair count when the job was pushed; may be stale.
    pub count: u64,

    /// The candidate pair.
    pub pair: Pair<T>,
}

impl<T: TokenType> PartialOrd for MergeJob<T> {
    fn partial_cmp(
        &self,
        other: &Self,
    ) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T: TokenType> Ord for MergeJob<T> {
    fn cmp(
        &self,
        other: &Self,
    ) -> Ordering {
        self.count
            .cmp(&other.count)
            .then_with(|| other.pair.cmp(&self.pair))
    }
}

#[cfg(test)]
mod tests {
    use dary_heap::OctonaryHeap;

    use super::*;

    #[test]
    fn test_heap_order() {
        let mut heap: OctonaryHeap<MergeJob<u32>> = OctonaryHeap::new();
        heap.push(MergeJob {
            count: 5,
            pair: (111, 119),
        });
        heap.push(MergeJob {
            count: 5,
            pair: (108, 111),
        });
        heap.push(MergeJob {
            count: 3,
            pair: (1, 2),
        });
        heap.push(MergeJob {
            count: 7,
            pair: (200, 200),
        });

        let order: Vec<_> = core::iter::from_fn(|| heap.pop())
            .map(|job| job.pair)
            .collect();
        assert_eq!(order, vec![(200, 200), (108, 111), (111, 119), (1, 2)]);
    }
}
