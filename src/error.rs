//! Error types for the cache
//!
//! Provides unified error handling using thiserror. A missing key is not an
//! error: lookups report it as `None`.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache and its command driver.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Capacity must allow at least one entry
    #[error("Invalid capacity: {0} (must be at least 1)")]
    InvalidCapacity(usize),

    /// Malformed command line
    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    /// Environment variable present but unusable
    #[error("Invalid configuration: {0}")]
    Config(String),
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            CacheError::InvalidCapacity(0).to_string(),
            "Invalid capacity: 0 (must be at least 1)"
        );
        assert_eq!(
            CacheError::InvalidCommand("FLY".to_string()).to_string(),
            "Invalid command: FLY"
        );
        assert!(CacheError::Config("LRU_CAPACITY".to_string())
            .to_string()
            .contains("LRU_CAPACITY"));
    }
}
