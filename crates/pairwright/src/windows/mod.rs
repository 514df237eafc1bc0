//! # Windowed Datasets
//!
//! Slices a flat token stream into aligned `(input, target)` windows
//! for next-token prediction; `target` is `input` shifted by one.
//!
//! * [`build_windows`] - a borrowing, lazy [`Windows`] iterator.
//! * [`WindowedDataset`] - an owned, shareable, randomly accessible view.

mod window_config;
mod windowed;

#[doc(inline)]
pub use window_config::*;
#[doc(inline)]
pub use windowed::*;
