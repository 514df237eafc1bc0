//! # Cross-Rust Version Compatibility

pub mod ranges;
