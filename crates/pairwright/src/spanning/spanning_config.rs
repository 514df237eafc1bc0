//! # Spanning Configuration

/// The default word pattern for [`SpanningPolicy::Pattern`].
///
/// A run of non-whitespace bytes with at most one leading space,
/// or a run of whitespace. Matched in byte mode, so every byte
/// (including non-UTF-8 bytes) falls in some match.
pub const DEFAULT_WORD_PATTERN: &str = r"(?-u) ?\S+|\s+";

/// The kind tag of a [`SpanningPolicy`], as written in vocabulary artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display, strum_macros::EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum SpanningKind {
    /// See [`SpanningPolicy::WholeText`].
    WholeText,

    /// See [`SpanningPolicy::Pattern`].
    Pattern,
}

/// Sequence-boundary policy.
///
/// Special-token markers always split text; this policy decides what
/// happens to the runs of ordinary bytes between them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SpanningPolicy {
    /// Each run between special markers is one symbol sequence;
    /// pairs may form across whitespace.
    WholeText,

    /// Each run is split by a byte regex; every match is one sequence,
    /// and every unmatched gap between matches is its own sequence.
    Pattern(String),
}

impl Default for SpanningPolicy {
    fn default() -> Self {
        Self::Pattern(DEFAULT_WORD_PATTERN.to_string())
    }
}

impl SpanningPolicy {
    /// Build a [`SpanningPolicy::Pattern`].
    pub fn from_pattern<S: Into<String>>(pattern: S) -> Self {
        Self::Pattern(pattern.into())
    }

    /// The kind tag of this policy.
    pub fn kind(&self) -> SpanningKind {
        match self {
            Self::WholeText => SpanningKind::WholeText,
            Self::Pattern(_) => SpanningKind::Pattern,
        }
    }

    /// The word pattern, if any.
    pub fn pattern(&self) -> Option<&str> {
        match self {
            Self::WholeText => None,
            Self::Pattern(pattern) => Some(pattern),
        }
    }
}

/// Declarative spanning configuration: a policy plus literal special tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TextSpanningConfig {
    /// The sequence-boundary policy.
    pub policy: SpanningPolicy,

    /// Special-token markers, in registration order.
    pub special_tokens: Vec<Vec<u8>>,
}

impl TextSpanningConfig {
    /// Build a config from a policy, with no special tokens.
    pub fn from_policy(policy: SpanningPolicy) -> Self {
        Self {
            policy,
            special_tokens: Vec::new(),
        }
    }

    /// Build a [`SpanningPolicy::WholeText`] config.
    pub fn whole_text() -> Self {
        Self::from_policy(SpanningPolicy::WholeText)
    }

    /// Build a [`SpanningPolicy::Pattern`] config.
    pub fn from_pattern<S: Into<String>>(pattern: S) -> Self {
        Self::from_policy(SpanningPolicy::from_pattern(pattern))
    }

    /// Replace the policy.
    pub fn with_policy(
        self,
        policy: SpanningPolicy,
    ) -> Self {
        Self { policy, ..self }
    }

    /// Append special tokens.
    pub fn with_special_tokens<I, S>(
        mut self,
        specials: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[u8]>,
    {
        self.special_tokens
            .extend(specials.into_iter().map(|s| s.as_ref().to_vec()));
        self
    }

    /// Get the policy.
    pub fn policy(&self) -> &SpanningPolicy {
        &self.policy
    }

    /// Get the special tokens.
    pub fn special_tokens(&self) -> &[Vec<u8>] {
        &self.special_tokens
    }
}

#[cfg(test)]
mod tests {
    use core::str::FromStr;

    use super::*;

    #[test]
    fn test_default_policy() {
        let config = TextSpanningConfig::default();
        assert_eq!(config.policy().pattern(), Some(DEFAULT_WORD_PATTERN));
        assert!(config.special_tokens().is_empty());
    }

    #[test]
    fn test_builder() {
        let config = TextSpanningConfig::whole_text().with_special_tokens(["<|a|>", "<|b|>"]);
        assert_eq!(config.policy(), &SpanningPolicy::WholeText);
        assert_eq!(
            config.special_tokens(),
            &[b"<|a|>".to_vec(), b"<|b|>".to_vec()]
        );

        let config = config.with_policy(SpanningPolicy::from_pattern(r"\w+"));
        assert_eq!(config.policy().pattern(), Some(r"\w+"));
        assert_eq!(config.special_tokens().len(), 2);
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(SpanningKind::WholeText.to_string(), "whole-text");
        assert_eq!(SpanningKind::Pattern.to_string(), "pattern");
        assert_eq!(
            SpanningKind::from_str("whole-text").unwrap(),
            SpanningKind::WholeText
        );
        assert!(SpanningKind::from_str("bogus").is_err());

        assert_eq!(SpanningPolicy::WholeText.kind(), SpanningKind::WholeText);
        assert_eq!(SpanningPolicy::default().kind(), SpanningKind::Pattern);
    }
}
