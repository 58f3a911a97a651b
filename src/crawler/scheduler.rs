//! Admission control for units of work
//!
//! This module handles:
//! - Optional global concurrency limiting via a semaphore
//! - Optional simulated latency before each fetch
//!
//! Units are spawned without bound; the scheduler only gates how many of
//! them may be fetching at the same time.

use crate::crawler::CrawlOptions;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Permission to issue one fetch
///
/// Releases its concurrency slot (if any) when dropped.
#[derive(Debug)]
pub struct FetchPermit {
    _permit: Option<OwnedSemaphorePermit>,
}

/// Scheduler gates fetches issued by crawl units
///
/// The scheduler coordinates:
/// - Global concurrency limits (max concurrent fetches, unlimited when unset)
/// - A fixed delay applied before every fetch
#[derive(Debug, Clone)]
pub struct Scheduler {
    /// Global semaphore for limiting concurrent fetches
    global_semaphore: Option<Arc<Semaphore>>,

    /// Simulated latency before each fetch
    fetch_delay: Duration,
}

impl Scheduler {
    pub fn new(options: &CrawlOptions) -> Self {
        Self {
            global_semaphore: options
                .max_concurrency
                .map(|limit| Arc::new(Semaphore::new(limit))),
            fetch_delay: options.fetch_delay,
        }
    }

    /// Waits until a fetch may be issued
    ///
    /// This method:
    /// 1. Acquires a global semaphore permit, if concurrency is bounded
    /// 2. Sleeps for the configured fetch delay, if any
    pub async fn admit(&self) -> FetchPermit {
        let permit = match &self.global_semaphore {
            // The semaphore is never closed, so acquisition only fails if it were
            Some(semaphore) => Arc::clone(semaphore).acquire_owned().await.ok(),
            None => None,
        };
        if let Some(free) = self.available_permits() {
            tracing::trace!("Fetch admitted, {} concurrency slots left", free);
        }

        if !self.fetch_delay.is_zero() {
            tokio::time::sleep(self.fetch_delay).await;
        }

        FetchPermit { _permit: permit }
    }

    /// Free concurrency slots, or `None` when unbounded
    pub fn available_permits(&self) -> Option<usize> {
        self.global_semaphore
            .as_ref()
            .map(|semaphore| semaphore.available_permits())
    }
}
