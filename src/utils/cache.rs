use crate::data_sync::traits::MarketStateProvider;
use crate::error::{Result, WatchlistError};
use crate::logic::types::MarketContext;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::warn;

/// Cached value with the time it was written.
#[derive(Clone, Debug)]
pub struct CacheItem<T> {
    pub data: T,
    pub timestamp: Instant,
    pub ttl: Duration,
}

impl<T> CacheItem<T> {
    pub fn new(data: T, ttl: Duration) -> Self {
        Self { data, timestamp: Instant::now(), ttl }
    }

    pub fn is_expired(&self) -> bool {
        self.timestamp.elapsed() > self.ttl
    }
}

#[derive(Debug, Default)]
pub struct CacheStats {
    pub hits: AtomicU64,
    pub misses: AtomicU64,
    pub stale_reads: AtomicU64,
    pub updates: AtomicU64,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        if total == 0 { 0.0 } else { hits as f64 / total as f64 }
    }
}

/// Ambient "current ETH price / daily checkpoint block" store.
///
/// An external refresher writes it; the pipeline only reads whole
/// snapshots, so both values always come from the same write.
#[derive(Debug)]
pub struct MarketStateCache {
    state: RwLock<Option<CacheItem<MarketContext>>>,
    pub stats: CacheStats,
    ttl: Duration,
}

impl MarketStateCache {
    pub fn new(ttl: Duration) -> Self {
        Self { state: RwLock::new(None), stats: CacheStats::default(), ttl }
    }

    /// Cache with the default 5 minute staleness window.
    pub fn new_default() -> Self {
        Self::new(Duration::from_secs(300))
    }

    pub fn with_context(context: MarketContext, ttl: Duration) -> Self {
        Self { state: RwLock::new(Some(CacheItem::new(context, ttl))), stats: CacheStats::default(), ttl }
    }

    pub async fn update(&self, context: MarketContext) {
        *self.state.write().await = Some(CacheItem::new(context, self.ttl));
        self.stats.updates.fetch_add(1, Ordering::Relaxed);
    }

    pub async fn set_eth_price(&self, eth_price_usd: f64) -> Result<()> {
        let mut guard = self.state.write().await;
        let current = guard.as_ref().map(|item| item.data).ok_or(WatchlistError::MarketStateUnavailable)?;
        *guard = Some(CacheItem::new(MarketContext { eth_price_usd, ..current }, self.ttl));
        self.stats.updates.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    pub async fn set_daily_block(&self, daily_block: u64) -> Result<()> {
        let mut guard = self.state.write().await;
        let current = guard.as_ref().map(|item| item.data).ok_or(WatchlistError::MarketStateUnavailable)?;
        *guard = Some(CacheItem::new(MarketContext { daily_block, ..current }, self.ttl));
        self.stats.updates.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    pub async fn is_stale(&self) -> bool {
        self.state.read().await.as_ref().is_none_or(|item| item.is_expired())
    }
}

#[async_trait]
impl MarketStateProvider for MarketStateCache {
    async fn snapshot(&self) -> Result<MarketContext> {
        let guard = self.state.read().await;
        let Some(item) = guard.as_ref() else {
            self.stats.misses.fetch_add(1, Ordering::Relaxed);
            return Err(WatchlistError::MarketStateUnavailable);
        };

        if item.is_expired() {
            self.stats.stale_reads.fetch_add(1, Ordering::Relaxed);
            warn!(
                "Market state is {:?} old (ttl {:?}), serving stale daily block {} / ETH ${:.2}",
                item.timestamp.elapsed(),
                item.ttl,
                item.data.daily_block,
                item.data.eth_price_usd
            );
        }

        self.stats.hits.fetch_add(1, Ordering::Relaxed);
        Ok(item.data)
    }
}
