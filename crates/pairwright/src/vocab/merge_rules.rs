//! # Merge Rules

use crate::{
    errors::{PWError, PWResult},
    types::{Pair, PWHashMap, TokenType},
};

/// A learned rewrite `(left, right) -> merged`.
///
/// `rank` is the order in which the rule was learned;
/// lower rank means higher priority at encode time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MergeRule<T> {
    /// The left token.
    pub left: T,

    /// The right token.
    pub right: T,

    /// The token the pair rewrites to.
    pub merged: T,

    /// The learning order, from 0.
    pub rank: usize,
}

impl<T: TokenType> MergeRule<T> {
    /// The `(left, right)` pair.
    pub fn pair(&self) -> Pair<T> {
        (self.left, self.right)
    }
}

/// Rank-ordered merge rule table with pair lookup.
///
/// This table is the single source of truth for merge priority;
/// the trainer appends to it, and the encoder consults it.
#[derive(Debug, Clone)]
pub struct MergeRules<T: TokenType> {
    rules: Vec<MergeRule<T>>,
    lookup: PWHashMap<Pair<T>, usize>,
}

impl<T: TokenType> Default for MergeRules<T> {
    fn default() -> Self {
        Self {
            rules: Vec::new(),
            lookup: PWHashMap::default(),
        }
    }
}

impl<T: TokenType> PartialEq for MergeRules<T> {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        self.rules == other.rules
    }
}

impl<T: TokenType> Eq for MergeRules<T> {}

impl<T: TokenType> MergeRules<T> {
    /// Append a rule with the next rank.
    ///
    /// ## Returns
    /// The appended rule, or [`PWError::InvalidConfiguration`]
    /// if the pair already has a rule.
    pub fn push(
        &mut self,
        left: T,
        right: T,
        merged: T,
    ) -> PWResult<MergeRule<T>> {
        let rank = self.rules.len();
        self.insert(MergeRule {
            left,
            right,
            merged,
            rank,
        })
    }

    /// Append a fully specified rule.
    ///
    /// ## Returns
    /// [`PWError::InvalidConfiguration`] if the rank is not the next rank,
    /// or the pair already has a rule.
    pub fn insert(
        &mut self,
        rule: MergeRule<T>,
    ) -> PWResult<MergeRule<T>> {
        if rule.rank != self.rules.len() {
            return Err(PWError::invalid_config(format!(
                "merge rule rank {} out of order; expected {}",
                rule.rank,
                self.rules.len()
            )));
        }
        if let Some(existing) = self.lookup.get(&rule.pair()) {
            return Err(PWError::invalid_config(format!(
                "pair ({}, {}) already merged at rank {existing}",
                rule.left, rule.right
            )));
        }

        self.lookup.insert(rule.pair(), rule.rank);
        self.rules.push(rule);
        Ok(rule)
    }

    /// The number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Are there no rules?
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Get the rule at `rank`.
    pub fn get(
        &self,
        rank: usize,
    ) -> Option<&MergeRule<T>> {
        self.rules.get(rank)
    }

    /// Look up the `(rank, merged)` for a pair.
    #[inline(always)]
    pub fn lookup_pair(
        &self,
        pair: &Pair<T>,
    ) -> Option<(usize, T)> {
        self.lookup
            .get(pair)
            .map(|&rank| (rank, self.rules[rank].merged))
    }

    /// Iterate rules in rank order.
    pub fn iter(&self) -> impl Iterator<Item = &MergeRule<T>> {
        self.rules.iter()
    }

    /// The rules, in rank order.
    pub fn as_slice(&self) -> &[MergeRule<T>] {
        &self.rules
    }
}
