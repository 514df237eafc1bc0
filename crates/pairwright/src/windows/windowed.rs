//! # Windowed Datasets

use core::iter::FusedIterator;
use std::sync::Arc;

use crate::{errors::PWResult, types::TokenType, windows::WindowConfig};

/// One aligned `(input, target)` pair, borrowed from a token stream.
///
/// `target` is `input` shifted one position forward in the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Window<'a, T> {
    /// The offset of `input` in the stream.
    pub start: usize,

    /// `stream[start..start + max_length]`.
    pub input: &'a [T],

    /// `stream[start + 1..start + max_length + 1]`.
    pub target: &'a [T],
}

impl<T: TokenType> Window<'_, T> {
    /// Copy the window out of the stream.
    pub fn into_owned(self) -> OwnedWindow<T> {
        OwnedWindow {
            start: self.start,
            input: self.input.to_vec(),
            target: self.target.to_vec(),
        }
    }
}

/// An owned [`Window`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OwnedWindow<T> {
    /// The offset of `input` in the stream.
    pub start: usize,

    /// The input tokens.
    pub input: Vec<T>,

    /// The target tokens.
    pub target: Vec<T>,
}

/// A lazy, restartable sequence of [`Window`]s over a token slice.
///
/// A clone resumes from the same position; clone before iterating to replay.
#[derive(Debug, Clone)]
pub struct Windows<'a, T> {
    tokens: &'a [T],
    config: WindowConfig,
    front: usize,
    back: usize,
}

impl<'a, T: TokenType> Windows<'a, T> {
    /// Build the windows of `tokens`.
    ///
    /// All configuration errors are returned here, before any window is produced.
    pub fn new(
        tokens: &'a [T],
        config: WindowConfig,
    ) -> PWResult<Self> {
        let count = config.num_windows(tokens.len())?;
        Ok(Self {
            tokens,
            config,
            front: 0,
            back: count,
        })
    }

    /// The windowing parameters.
    pub fn config(&self) -> WindowConfig {
        self.config
    }

    fn window(
        &self,
        idx: usize,
    ) -> Window<'a, T> {
        let start = idx * self.config.stride;
        let end = start + self.config.max_length;
        Window {
            start,
            input: &self.tokens[start..end],
            target: &self.tokens[start + 1..end + 1],
        }
    }
}

impl<'a, T: TokenType> Iterator for Windows<'a, T> {
    type Item = Window<'a, T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        let window = self.window(self.front);
        self.front += 1;
        Some(window)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.back - self.front;
        (n, Some(n))
    }

    fn nth(
        &mut self,
        n: usize,
    ) -> Option<Self::Item> {
        self.front = self.front.saturating_add(n).min(self.back);
        self.next()
    }
}

impl<T: TokenType> DoubleEndedIterator for Windows<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        self.back -= 1;
        Some(self.window(self.back))
    }
}

impl<T: TokenType> ExactSizeIterator for Windows<'_, T> {}

impl<T: TokenType> FusedIterator for Windows<'_, T> {}

/// Slice a token stream into overlapping `(input, target)` windows.
///
/// Windows start at `0, stride, 2 * stride, ...` while a full window
/// plus its shifted target fits; trailing tokens are dropped.
///
/// ## Returns
/// * [`crate::PWError::InvalidConfiguration`] if `max_length` or `stride` is zero.
/// * [`crate::PWError::InsufficientTokens`] if `tokens.len() <= max_length`.
///
/// ```rust
/// use pairwright::windows::build_windows;
///
/// let tokens = [1u32, 2, 3, 4, 5, 6];
/// let windows: Vec<_> = build_windows(&tokens, 3, 2)
///     .unwrap()
///     .map(|w| (w.input.to_vec(), w.target.to_vec()))
///     .collect();
///
/// assert_eq!(
///     windows,
///     vec![
///         (vec![1, 2, 3], vec![2, 3, 4]),
///         (vec![3, 4, 5], vec![4, 5, 6]),
///     ]
/// );
/// ```
pub fn build_windows<T: TokenType>(
    tokens: &[T],
    max_length: usize,
    stride: usize,
) -> PWResult<Windows<'_, T>> {
    Windows::new(tokens, WindowConfig::new(max_length, stride))
}

/// A shareable windowed view over an owned token stream.
///
/// Random access by window index; safe to iterate from many threads at once.
#[derive(Debug, Clone)]
pub struct WindowedDataset<T: TokenType> {
    tokens: Arc<[T]>,
    config: WindowConfig,
    len: usize,
}

impl<T: TokenType> WindowedDataset<T> {
    /// Build a dataset over `tokens`.
    ///
    /// ## Returns
    /// The same errors as [`build_windows`].
    pub fn new<A: Into<Arc<[T]>>>(
        tokens: A,
        config: WindowConfig,
    ) -> PWResult<Self> {
        let tokens = tokens.into();
        let len = config.num_windows(tokens.len())?;
        log::debug!(
            "windowed dataset: {} tokens, {len} windows (max_length {}, stride {})",
            tokens.len(),
            config.max_length,
            config.stride
        );
        Ok(Self {
            tokens,
            config,
            len,
        })
    }

    /// The number of windows.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Are there no windows?
    ///
    /// Always `false`; construction fails instead.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The windowing parameters.
    pub fn config(&self) -> WindowConfig {
        self.config
    }

    /// The underlying token stream.
    pub fn tokens(&self) -> &Arc<[T]> {
        &self.tokens
    }

    /// Get the window at `idx`.
    pub fn get(
        &self,
        idx: usize,
    ) -> Option<Window<'_, T>> {
        if idx >= self.len {
            return None;
        }
        self.iter().nth(idx)
    }

    /// Iterate all windows, from the start.
    pub fn iter(&self) -> Windows<'_, T> {
        Windows {
            tokens: &self.tokens[..],
            config: self.config,
            front: 0,
            back: self.len,
        }
    }
}

impl<'a, T: TokenType> IntoIterator for &'a WindowedDataset<T> {
    type Item = Window<'a, T>;
    type IntoIter = Windows<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
