//! Crawler coordinator - main crawl orchestration logic
//!
//! This module ties the pieces of one crawl together:
//! - Creating a fresh completion tracker and result sink per crawl
//! - Seeding the tracker with the root unit and launching it
//! - Waiting for the task graph to converge
//! - Closing the result sink exactly once and handing it to the caller

use crate::config::{validate, Config, CrawlerConfig};
use crate::crawler::engine::{spawn_unit, CrawlContext, UnitSummary};
use crate::crawler::scheduler::Scheduler;
use crate::crawler::sink::{result_channel, CrawlReport, ResultStream, DEFAULT_RESULT_CAPACITY};
use crate::crawler::tracker::Progress;
use crate::fetcher::{CachingFetcher, Fetcher, StaticFetcher};
use crate::{CrawlError, Result};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Tuning knobs for a crawl
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlOptions {
    /// Capacity of the result sink; must cover every report the crawl emits
    pub result_capacity: usize,

    /// Maximum number of fetches in flight, unlimited when `None`
    pub max_concurrency: Option<usize>,

    /// Simulated latency applied before every fetch
    pub fetch_delay: Duration,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            result_capacity: DEFAULT_RESULT_CAPACITY,
            max_concurrency: None,
            fetch_delay: Duration::ZERO,
        }
    }
}

impl From<&CrawlerConfig> for CrawlOptions {
    fn from(config: &CrawlerConfig) -> Self {
        Self {
            result_capacity: config.result_capacity,
            max_concurrency: config.max_concurrency,
            fetch_delay: Duration::from_millis(config.fetch_delay_ms),
        }
    }
}

/// Everything a finished crawl hands back to the caller
#[derive(Debug)]
pub struct CrawlOutput {
    /// Closed stream of reports, in no particular order
    pub results: ResultStream,

    /// Final tracker counters; `done == pending` units
    pub progress: Progress,

    /// How the units ended
    pub summary: UnitSummary,

    /// Wall-clock time until convergence
    pub elapsed: Duration,
}

impl CrawlOutput {
    /// Drains the result stream
    pub async fn reports(self) -> Vec<CrawlReport> {
        self.results.collect().await
    }
}

/// Main crawler structure
///
/// Owns the fetcher used for every crawl it runs. Each call to
/// [`crawl`](Self::crawl) gets its own tracker and result sink; crawls only
/// share state through the fetcher (for instance a shared cache).
#[derive(Debug)]
pub struct Crawler<F> {
    fetcher: Arc<F>,
    options: CrawlOptions,
}

impl<F> Crawler<F>
where
    F: Fetcher + 'static,
{
    pub fn new(fetcher: F, options: CrawlOptions) -> Self {
        Self::with_shared(Arc::new(fetcher), options)
    }

    /// Creates a crawler over a fetcher the caller keeps a handle to
    pub fn with_shared(fetcher: Arc<F>, options: CrawlOptions) -> Self {
        Self { fetcher, options }
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub fn options(&self) -> &CrawlOptions {
        &self.options
    }

    /// Crawls from `root_url`, following links up to `max_depth` levels
    ///
    /// Must be called from within a tokio runtime. Returns once every unit
    /// of work has finished; the returned result stream is already closed.
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlOutput)` - Crawl converged
    /// * `Err(CrawlError::InvalidCapacity)` - Result capacity is zero
    /// * `Err(CrawlError::SinkOverflow)` - More reports than the sink can hold
    pub async fn crawl(&self, root_url: &str, max_depth: u32) -> Result<CrawlOutput> {
        let capacity = self.options.result_capacity;
        if capacity == 0 {
            return Err(CrawlError::InvalidCapacity);
        }

        tracing::info!("Starting crawl of {} with max depth {}", root_url, max_depth);
        let start_time = Instant::now();

        let (sink, mut results) = result_channel(capacity);
        let ctx = Arc::new(CrawlContext::new(
            Arc::clone(&self.fetcher),
            sink,
            Scheduler::new(&self.options),
        ));

        // The root is announced before it can possibly finish
        ctx.tracker.announce(1);
        spawn_unit(Arc::clone(&ctx), root_url.to_string(), max_depth);

        let progress = ctx.tracker.wait().await;
        results.close();

        let summary = ctx.summary();
        let elapsed = start_time.elapsed();

        if results.overflowed() {
            tracing::error!(
                "Crawl of {} produced more than {} reports",
                root_url,
                capacity
            );
            return Err(CrawlError::SinkOverflow {
                capacity: results.capacity(),
            });
        }

        tracing::info!(
            "Crawl completed: {} units ({} found, {} failed, {} exhausted) in {:?}",
            progress.done,
            summary.found,
            summary.failed,
            summary.exhausted,
            elapsed
        );

        Ok(CrawlOutput {
            results,
            progress,
            summary,
            elapsed,
        })
    }
}

impl<F> Crawler<CachingFetcher<F>>
where
    F: Fetcher + 'static,
{
    /// Creates a crawler whose fetches go through a fresh cache over `inner`
    pub fn cached(inner: F, options: CrawlOptions) -> Self {
        Self::new(CachingFetcher::new(inner), options)
    }
}

impl Crawler<CachingFetcher<StaticFetcher>> {
    /// Creates a cached crawler over the dataset and options of `config`
    ///
    /// # Returns
    ///
    /// * `Ok(Crawler)` - Configuration is valid
    /// * `Err(CrawlError::Config)` - Configuration failed validation
    pub fn from_config(config: &Config) -> Result<Self> {
        validate(config)?;
        Ok(Self::cached(
            config.fetcher(),
            CrawlOptions::from(&config.crawler),
        ))
    }
}
