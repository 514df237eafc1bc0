//! # Span Lexers

use core::ops::Deref;

use aho_corasick::{AhoCorasick, Input, MatchKind};
use regex::bytes::Regex;

use crate::errors::{PWError, PWResult};

/// Trait for finding the next occurrence of a span.
///
/// ## Implementation Notes
///
/// Smart pointer types that implement `Deref<Target: SpanLexer>` (such as `Arc<T>` and `Box<T>`)
/// automatically implement `SpanLexer` through a blanket implementation.
pub trait SpanLexer: Send + Sync {
    /// Find the next occurrence of a span.
    ///
    /// ## Arguments
    /// * `text` - the bytes to scan over.
    /// * `offset` - the offset to start scanning from; `offset <= text.len()`.
    ///
    /// ## Returns
    /// The span bounds, if found, relative to `text`.
    fn next_span(
        &self,
        text: &[u8],
        offset: usize,
    ) -> Option<(usize, usize)>;
}

// Blanket implementation for any type that derefs to a SpanLexer.
impl<D> SpanLexer for D
where
    D: Deref + Send + Sync,
    D::Target: SpanLexer,
{
    fn next_span(
        &self,
        text: &[u8],
        offset: usize,
    ) -> Option<(usize, usize)> {
        self.deref().next_span(text, offset)
    }
}

/// A [`SpanLexer`] over a byte regex.
#[derive(Debug, Clone)]
pub struct RegexSpanLexer {
    regex: Regex,
}

impl RegexSpanLexer {
    /// Compile a word pattern.
    ///
    /// ## Returns
    /// [`PWError::InvalidConfiguration`] if the pattern does not compile.
    pub fn compile(pattern: &str) -> PWResult<Self> {
        let regex = Regex::new(pattern)
            .map_err(|e| PWError::invalid_config(format!("bad word pattern {pattern:?}: {e}")))?;
        Ok(Self { regex })
    }

    /// Get the source pattern.
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

impl SpanLexer for RegexSpanLexer {
    fn next_span(
        &self,
        text: &[u8],
        offset: usize,
    ) -> Option<(usize, usize)> {
        self.regex
            .find_at(text, offset)
            .map(|m| (m.start(), m.end()))
    }
}

/// A [`SpanLexer`] matching literal special-token markers.
///
/// Uses leftmost-longest semantics: the earliest marker wins,
/// and among markers starting at the same position, the longest.
#[derive(Debug, Clone)]
pub struct SpecialSpanLexer {
    matcher: AhoCorasick,
}

impl SpecialSpanLexer {
    /// Build a matcher over the given markers.
    ///
    /// ## Returns
    /// * `Ok(None)` if `specials` is empty.
    /// * [`PWError::UnencodableInput`] if any marker is empty.
    pub fn build<S: AsRef<[u8]>>(specials: &[S]) -> PWResult<Option<Self>> {
        if specials.is_empty() {
            return Ok(None);
        }
        if specials.iter().any(|s| s.as_ref().is_empty()) {
            return Err(PWError::UnencodableInput(
                "special token markers must not be empty".to_string(),
            ));
        }

        let matcher = AhoCorasick::builder()
            .match_kind(MatchKind::LeftmostLongest)
            .build(specials)
            .map_err(|e| PWError::UnencodableInput(format!("bad special token markers: {e}")))?;

        Ok(Some(Self { matcher }))
    }
}

impl SpanLexer for SpecialSpanLexer {
    fn next_span(
        &self,
        text: &[u8],
        offset: usize,
    ) -> Option<(usize, usize)> {
        self.matcher
            .find(Input::new(text).span(offset..text.len()))
            .map(|m| (m.start(), m.end()))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn test_regex_lexer() {
        let lexer = RegexSpanLexer::compile(r"\w+").unwrap();
        assert_eq!(lexer.as_str(), r"\w+");

        let text = b"ab  cd";
        assert_eq!(lexer.next_span(text, 0), Some((0, 2)));
        assert_eq!(lexer.next_span(text, 2), Some((4, 6)));
        assert_eq!(lexer.next_span(text, 6), None);

        assert!(matches!(
            RegexSpanLexer::compile(r"(unclosed"),
            Err(PWError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_special_lexer() {
        assert!(SpecialSpanLexer::build::<&str>(&[]).unwrap().is_none());
        assert!(matches!(
            SpecialSpanLexer::build(&["<a>", ""]),
            Err(PWError::UnencodableInput(_))
        ));

        let lexer = SpecialSpanLexer::build(&["<|x|>", "<|x|>!"]).unwrap().unwrap();
        let text = b"ab<|x|>!cd<|x|>";
        assert_eq!(lexer.next_span(text, 0), Some((2, 8)));
        assert_eq!(lexer.next_span(text, 8), Some((10, 15)));
        assert_eq!(lexer.next_span(text, 15), None);
    }

    #[test]
    fn test_blanket_deref() {
        let lexer: Arc<dyn SpanLexer> = Arc::new(RegexSpanLexer::compile(r"b+").unwrap());
        assert_eq!(lexer.next_span(b"aabba", 0), Some((2, 4)));

        let boxed: Box<RegexSpanLexer> = Box::new(RegexSpanLexer::compile(r"a").unwrap());
        assert_eq!(boxed.next_span(b"ba", 0), Some((1, 2)));
    }
}
