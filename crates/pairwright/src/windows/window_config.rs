//! # Window Configuration

use crate::errors::{PWError, PWResult};

/// Windowing parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WindowConfig {
    /// The number of tokens in each `input` (and each `target`).
    pub max_length: usize,

    /// The distance between consecutive window starts.
    pub stride: usize,
}

impl WindowConfig {
    /// Build a config.
    pub fn new(
        max_length: usize,
        stride: usize,
    ) -> Self {
        Self { max_length, stride }
    }

    /// Set the window length.
    pub fn with_max_length(
        self,
        max_length: usize,
    ) -> Self {
        Self { max_length, ..self }
    }

    /// Set the stride.
    pub fn with_stride(
        self,
        stride: usize,
    ) -> Self {
        Self { stride, ..self }
    }

    /// Check the parameters.
    ///
    /// ## Returns
    /// [`PWError::InvalidConfiguration`] if `max_length` or `stride` is zero.
    pub fn validate(&self) -> PWResult<()> {
        if self.max_length == 0 {
            return Err(PWError::invalid_config("max_length must be at least 1"));
        }
        if self.stride == 0 {
            return Err(PWError::invalid_config("stride must be at least 1"));
        }
        Ok(())
    }

    /// The number of complete windows over `len` tokens.
    ///
    /// ## Returns
    /// * [`PWError::InvalidConfiguration`] for invalid parameters.
    /// * [`PWError::InsufficientTokens`] if `len <= max_length`.
    pub fn num_windows(
        &self,
        len: usize,
    ) -> PWResult<usize> {
        self.validate()?;
        if len <= self.max_length {
            return Err(PWError::InsufficientTokens {
                len,
                max_length: self.max_length,
            });
        }
        Ok((len - self.max_length - 1) / self.stride + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_num_windows() {
        let config = WindowConfig::new(3, 2);
        assert_eq!(config.num_windows(6).unwrap(), 2);
        assert_eq!(config.num_windows(4).unwrap(), 1);
        assert_eq!(config.with_stride(1).num_windows(6).unwrap(), 3);
        assert_eq!(config.with_max_length(1).num_windows(6).unwrap(), 3);

        assert!(matches!(
            config.num_windows(3),
            Err(PWError::InsufficientTokens {
                len: 3,
                max_length: 3
            })
        ));
        assert!(matches!(
            config.with_stride(0).num_windows(100),
            Err(PWError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            config.with_max_length(0).num_windows(100),
            Err(PWError::InvalidConfiguration(_))
        ));
    }
}
