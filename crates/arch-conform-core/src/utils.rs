//! Utility functions for rule implementations.

pub mod paths;

// Re-export commonly used utilities for rule implementations
#[doc(inline)]
pub use paths::{has_dir_segment, is_under, path_matches, to_slash};
