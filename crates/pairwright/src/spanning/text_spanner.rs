//! # Text Spanner

use core::ops::Range;
use std::sync::Arc;

use crate::{
    compat::ranges::offset_range,
    errors::PWResult,
    spanning::{
        RegexSpanLexer,
        SpanLexer,
        SpanningPolicy,
        SpecialSpanLexer,
        TextSpanningConfig,
    },
};

/// Span label and byte range, relative to the spanned text.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum SpanRef {
    /// A run matched by the word lexer (or a whole run, under [`SpanningPolicy::WholeText`]).
    Word(Range<usize>),

    /// A run between word matches, not matched by the word lexer.
    Gap(Range<usize>),

    /// A special-token marker.
    Special(Range<usize>),
}

impl SpanRef {
    /// Is this a [`SpanRef::Special`]?
    pub fn is_special(&self) -> bool {
        matches!(self, SpanRef::Special(_))
    }

    /// The byte range of this span.
    pub fn range(&self) -> Range<usize> {
        self.clone().into()
    }
}

impl From<SpanRef> for Range<usize> {
    fn from(span: SpanRef) -> Self {
        match span {
            SpanRef::Word(range) => range,
            SpanRef::Gap(range) => range,
            SpanRef::Special(range) => range,
        }
    }
}

/// Splits text into [`SpanRef`]s, composed over [`SpanLexer`] plugins.
///
/// Every byte of the input lands in exactly one span, so concatenating
/// the spans in order reproduces the input.
#[derive(Clone)]
pub struct TextSpanner {
    word_lexer: Option<Arc<dyn SpanLexer>>,
    special_lexer: Option<Arc<dyn SpanLexer>>,
}

impl core::fmt::Debug for TextSpanner {
    fn fmt(
        &self,
        f: &mut core::fmt::Formatter<'_>,
    ) -> core::fmt::Result {
        f.debug_struct("TextSpanner")
            .field("word_lexer", &self.word_lexer.is_some())
            .field("special_lexer", &self.special_lexer.is_some())
            .finish()
    }
}

impl TextSpanner {
    /// Build a new [`TextSpanner`] from lexers.
    ///
    /// ## Arguments
    /// * `word_lexer` - The word splitting lexer; `None` means whole-text runs.
    /// * `special_lexer` - The optional special-token lexer.
    pub fn new(
        word_lexer: Option<Arc<dyn SpanLexer>>,
        special_lexer: Option<Arc<dyn SpanLexer>>,
    ) -> Self {
        Self {
            word_lexer,
            special_lexer,
        }
    }

    /// Compile a spanner for a policy and set of special markers.
    ///
    /// ## Returns
    /// * [`crate::PWError::InvalidConfiguration`] for a bad word pattern.
    /// * [`crate::PWError::UnencodableInput`] for empty special markers.
    pub fn from_policy<S: AsRef<[u8]>>(
        policy: &SpanningPolicy,
        specials: &[S],
    ) -> PWResult<Self> {
        let word_lexer = match policy {
            SpanningPolicy::WholeText => None,
            SpanningPolicy::Pattern(pattern) => {
                Some(Arc::new(RegexSpanLexer::compile(pattern)?) as Arc<dyn SpanLexer>)
            }
        };

        let special_lexer =
            SpecialSpanLexer::build(specials)?.map(|lexer| Arc::new(lexer) as Arc<dyn SpanLexer>);

        Ok(Self::new(word_lexer, special_lexer))
    }

    /// Compile a spanner from a [`TextSpanningConfig`].
    pub fn from_config(config: &TextSpanningConfig) -> PWResult<Self> {
        Self::from_policy(config.policy(), config.special_tokens())
    }

    fn for_each_word(
        &self,
        text: &[u8],
        offset: usize,
        f: &mut dyn FnMut(SpanRef) -> bool,
    ) -> (bool, usize) {
        let Some(word_lexer) = &self.word_lexer else {
            if !text.is_empty() && !f(SpanRef::Word(offset..offset + text.len())) {
                return (false, 0);
            }
            return (true, text.len());
        };

        let mut last = 0;
        let mut search = 0;
        while search <= text.len() {
            let Some((start, end)) = word_lexer.next_span(text, search) else {
                break;
            };
            if start == end {
                // Empty matches make no progress; they fold into gaps.
                search = end + 1;
                continue;
            }

            if last < start {
                if !f(SpanRef::Gap(offset_range::<usize>(last..start, offset))) {
                    // Leading Gap Exit
                    return (false, last);
                }
                last = start;
            }

            if !f(SpanRef::Word(offset_range::<usize>(start..end, offset))) {
                // Word Exit
                return (false, last);
            }
            last = end;
            search = end;
        }

        if last < text.len() {
            if !f(SpanRef::Gap(offset_range::<usize>(
                last..text.len(),
                offset,
            ))) {
                // Trailing Gap Exit
                return (false, last);
            }
            last = text.len();
        }

        (true, last)
    }

    fn next_special_span(
        &self,
        text: &[u8],
    ) -> Option<(usize, usize)> {
        match &self.special_lexer {
            None => None,
            Some(lexer) => lexer.next_span(text, 0),
        }
    }

    /// Walk the spans of `text` in order.
    ///
    /// ## Arguments
    /// * `text` - The bytes to split.
    /// * `f` - Called per span; returning `false` halts the walk.
    ///
    /// ## Returns
    /// `(completed, consumed)`: whether the walk ran to the end,
    /// and how many leading bytes were fully handed to `f`.
    pub fn for_each_split_span(
        &self,
        text: &[u8],
        f: &mut dyn FnMut(SpanRef) -> bool,
    ) -> (bool, usize) {
        let mut current = text;
        let mut offset = 0;

        while let Some((start, end)) = self.next_special_span(current) {
            let pre = &current[..start];

            let (cont, used) = self.for_each_word(pre, offset, f);
            if !cont {
                return (false, offset + used);
            }

            // we've consumed `offset + start` bytes at this point.
            if !f(SpanRef::Special(offset_range::<usize>(start..end, offset))) {
                // Special Exit
                return (false, offset + start);
            }

            // we've consumed `offset + end` bytes at this point.
            current = &current[end..];
            offset += end;
        }

        let (cont, used) = self.for_each_word(current, offset, f);
        (cont, offset + used)
    }

    /// Split text into spans.
    pub fn split_spans(
        &self,
        text: &[u8],
    ) -> Vec<SpanRef> {
        let mut spans = Vec::new();
        self.for_each_split_span(text, &mut |span_ref| {
            spans.push(span_ref);
            true
        });
        spans
    }
}
