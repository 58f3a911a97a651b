//! Caching decorator over any [`Fetcher`]
//!
//! Outcomes are memoized per URL for the lifetime of the cache. Lookups take
//! a shared lock so many units can read concurrently; population takes the
//! exclusive lock, which excludes readers and other writers for the duration
//! of the inner fetch.

use crate::fetcher::{FetchOutcome, Fetcher};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

/// Snapshot of cache activity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of memoized URLs
    pub entries: usize,

    /// Lookups answered from the cache
    pub hits: u64,

    /// Lookups that called the inner fetcher
    pub misses: u64,
}

/// Fetcher that memoizes the outcome of an inner fetcher
///
/// # Population
///
/// 1. Take the read lock and look the URL up; a hit returns immediately.
/// 2. On a miss, drop the read lock and take the write lock fresh (no
///    upgrade). Look again, since another unit may have populated the entry
///    while this one waited, then call the inner fetcher and store the result.
///
/// Because the inner fetch runs under the write lock and the entry is
/// re-checked, the inner fetcher is called at most once per URL. An entry is
/// never overwritten once written.
#[derive(Debug)]
pub struct CachingFetcher<F> {
    inner: F,
    entries: RwLock<HashMap<String, FetchOutcome>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<F: Fetcher> CachingFetcher<F> {
    pub fn new(inner: F) -> Self {
        Self {
            inner,
            entries: RwLock::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// The wrapped fetcher
    pub fn inner(&self) -> &F {
        &self.inner
    }

    /// Returns the memoized outcome for a URL without fetching
    pub async fn cached(&self, url: &str) -> Option<FetchOutcome> {
        self.entries.read().await.get(url).cloned()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    pub async fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.len().await,
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

impl<F: Fetcher> Fetcher for CachingFetcher<F> {
    async fn fetch(&self, url: &str) -> FetchOutcome {
        if let Some(outcome) = self.cached(url).await {
            self.hits.fetch_add(1, Ordering::Relaxed);
            tracing::trace!("Cache hit for {}", url);
            return outcome;
        }

        let mut entries = self.entries.write().await;
        if let Some(outcome) = entries.get(url) {
            // Populated by another unit while we waited for the write lock
            self.hits.fetch_add(1, Ordering::Relaxed);
            return outcome.clone();
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        tracing::debug!("Cache miss for {}, fetching", url);
        let outcome = self.inner.fetch(url).await;
        // Absence was checked under this same write guard
        entries.insert(url.to_string(), outcome.clone());
        outcome
    }
}
