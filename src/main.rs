//! Mini LRU - A fixed-capacity in-memory cache
//!
//! Replays cache commands read from stdin and prints one JSON response per
//! line on stdout. Logs go to stderr.

use std::io;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mini_lru::command::run_session;
use mini_lru::{Config, LruCache};

/// Main entry point for the replay driver.
///
/// # Startup Sequence
/// 1. Load configuration from environment variables
/// 2. Initialize tracing subscriber for logging
/// 3. Create the cache with the configured capacity
/// 4. Replay stdin until EOF
fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("failed to load configuration")?;

    // RUST_LOG wins over the configured fallback filter
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_filter.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    info!("Starting Mini LRU replay session");
    info!("Configuration loaded: capacity={}", config.capacity);

    let mut cache: LruCache<String, String> =
        LruCache::new(config.capacity).context("failed to create cache")?;

    let stdin = io::stdin();
    let stdout = io::stdout();
    let written = run_session(&mut cache, stdin.lock(), stdout.lock())?;

    let stats = cache.stats();
    info!(
        "Session complete: responses={}, entries={}, hits={}, misses={}, evictions={}",
        written, stats.total_entries, stats.hits, stats.misses, stats.evictions
    );

    Ok(())
}
