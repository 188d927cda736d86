//! Configuration Module
//!
//! Handles loading cache and logging settings from environment variables.

use std::env;

use crate::error::{CacheError, Result};

/// Default maximum number of cached entries
pub const DEFAULT_CAPACITY: usize = 1000;

/// Default tracing filter when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "mini_lru=info";

/// Runtime configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Maximum number of entries the cache can hold
    pub capacity: usize,
    /// Tracing filter directive used when `RUST_LOG` is unset
    pub log_filter: String,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `LRU_CAPACITY` - Maximum cache entries (default: 1000)
    /// - `LRU_LOG_FILTER` - Fallback tracing filter (default: "mini_lru=info")
    ///
    /// # Errors
    /// Returns [`CacheError::Config`] if `LRU_CAPACITY` is set but is not a
    /// positive integer.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds a Config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let capacity = match lookup("LRU_CAPACITY") {
            Some(raw) => parse_capacity(&raw)?,
            None => DEFAULT_CAPACITY,
        };
        let log_filter = lookup("LRU_LOG_FILTER")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

        Ok(Self {
            capacity,
            log_filter,
        })
    }
}

fn parse_capacity(raw: &str) -> Result<usize> {
    match raw.trim().parse::<usize>() {
        Ok(0) => Err(CacheError::Config(
            "LRU_CAPACITY must be at least 1".to_string(),
        )),
        Ok(capacity) => Ok(capacity),
        Err(e) => Err(CacheError::Config(format!(
            "LRU_CAPACITY '{}' is not a valid integer: {}",
            raw, e
        ))),
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.capacity, 1000);
        assert_eq!(config.log_filter, "mini_lru=info");
    }

    #[test]
    fn test_config_lookup_defaults() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_config_lookup_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("LRU_CAPACITY", " 64 "),
            ("LRU_LOG_FILTER", "mini_lru=debug"),
        ]))
        .unwrap();
        assert_eq!(config.capacity, 64);
        assert_eq!(config.log_filter, "mini_lru=debug");
    }

    #[test]
    fn test_config_zero_capacity() {
        let result = Config::from_lookup(lookup_from(&[("LRU_CAPACITY", "0")]));
        assert!(matches!(result, Err(CacheError::Config(_))));
    }

    #[test]
    fn test_config_garbage_capacity() {
        let result = Config::from_lookup(lookup_from(&[("LRU_CAPACITY", "-3")]));
        assert!(matches!(result, Err(CacheError::Config(_))));
    }

    #[test]
    fn test_config_blank_log_filter_falls_back() {
        let config = Config::from_lookup(lookup_from(&[("LRU_LOG_FILTER", "  ")])).unwrap();
        assert_eq!(config.log_filter, DEFAULT_LOG_FILTER);
    }
}
