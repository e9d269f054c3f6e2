//! Short-lived cache for public waitlist figures.
//!
//! The landing page shows the waitlist count on every request. Counts and
//! stats are cached for 30 seconds and dropped whenever a signup or
//! unsubscribe changes them.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use tracing::debug;

use atmos_core::WaitlistStats;

const TTL: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
enum CacheKey {
    Count,
    Stats,
}

#[derive(Debug, Clone)]
enum CacheValue {
    Count(i64),
    Stats(Arc<WaitlistStats>),
}

/// Cache for waitlist count and stats.
#[derive(Clone)]
pub struct WaitlistCache {
    cache: Cache<CacheKey, CacheValue>,
}

impl Default for WaitlistCache {
    fn default() -> Self {
        Self::new(TTL)
    }
}

impl WaitlistCache {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        let cache = Cache::builder().max_capacity(4).time_to_live(ttl).build();
        Self { cache }
    }

    pub async fn count(&self) -> Option<i64> {
        match self.cache.get(&CacheKey::Count).await {
            Some(CacheValue::Count(count)) => {
                debug!("Cache hit for waitlist count");
                Some(count)
            }
            _ => None,
        }
    }

    pub async fn set_count(&self, count: i64) {
        self.cache
            .insert(CacheKey::Count, CacheValue::Count(count))
            .await;
    }

    pub async fn stats(&self) -> Option<Arc<WaitlistStats>> {
        match self.cache.get(&CacheKey::Stats).await {
            Some(CacheValue::Stats(stats)) => {
                debug!("Cache hit for waitlist stats");
                Some(stats)
            }
            _ => None,
        }
    }

    pub async fn set_stats(&self, stats: WaitlistStats) {
        self.cache
            .insert(CacheKey::Stats, CacheValue::Stats(Arc::new(stats)))
            .await;
    }

    /// Drop cached figures after the waitlist changed.
    pub async fn invalidate(&self) {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
    }
}
