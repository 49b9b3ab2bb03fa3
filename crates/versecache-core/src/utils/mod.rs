//! Utility functions for string matching and display formatting.

pub mod format;

// Re-export commonly used functions at module level
pub use format::{contains_ignore_case, format_age, format_duration};
