//! Error types for the Galaxy3D spatial indices
//!
//! Only construction can fail: a partitioner built from an invalid
//! configuration is rejected before it is ever usable. Runtime operations
//! report nothing but the span-query overflow sentinel.

use std::fmt;

/// Result type for Galaxy3D spatial operations
pub type Result<T> = std::result::Result<T, Error>;

/// Galaxy3D spatial errors
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Grid cell size is zero, negative, or not finite
    InvalidCellSize(f32),

    /// World bounds are inverted (min > max on some axis) or not finite
    InvalidWorldBounds(String),

    /// Tree depth exceeds the supported maximum
    InvalidMaxDepth(u32),

    /// Tree nodes must be allowed to hold at least one entity
    InvalidNodeCapacity(usize),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidCellSize(size) => write!(f, "Invalid cell size: {} (must be positive and finite)", size),
            Error::InvalidWorldBounds(msg) => write!(f, "Invalid world bounds: {}", msg),
            Error::InvalidMaxDepth(depth) => write!(f, "Invalid max depth: {}", depth),
            Error::InvalidNodeCapacity(capacity) => write!(f, "Invalid node capacity: {}", capacity),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
