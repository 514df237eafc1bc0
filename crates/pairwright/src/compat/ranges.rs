//! # Range Helpers

use core::ops::{Add, Range};

/// Shift both ends of a range by `offset`.
pub fn offset_range<I>(
    range: Range<I>,
    offset: I,
) -> Range<I>
where
    I: Add<Output = I> + Copy,
{
    Range {
        start: range.start + offset,
        end: range.end + offset,
    }
}
