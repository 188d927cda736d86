//! Mini LRU - A fixed-capacity in-memory cache
//!
//! Provides O(1) `get`/`put` with least-recently-used eviction, backed by a
//! hash index and an arena-allocated recency list.

pub mod cache;
pub mod command;
pub mod config;
pub mod error;

pub use cache::{CacheStats, LruCache};
pub use config::Config;
pub use error::{CacheError, Result};
