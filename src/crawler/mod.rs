//! Crawler module for concurrent page traversal
//!
//! This module contains the core crawling logic, including:
//! - The recursive unit of work and its fan-out
//! - Completion tracking for the growing task graph
//! - Admission control (concurrency bound, simulated latency)
//! - Bounded delivery of results
//! - Overall crawl coordination

mod coordinator;
mod engine;
mod scheduler;
mod sink;
mod tracker;

pub use coordinator::{CrawlOptions, CrawlOutput, Crawler};
pub use engine::UnitSummary;
pub use scheduler::{FetchPermit, Scheduler};
pub use sink::{result_channel, CrawlReport, ResultSink, ResultStream, DEFAULT_RESULT_CAPACITY};
pub use tracker::{CompletionTracker, Progress};

use crate::fetcher::Fetcher;
use crate::Result;

/// Runs a complete crawl with default options
///
/// This is the main entry point for a one-off crawl. It will:
/// 1. Wrap `fetcher` in a fresh cache owned by this crawl
/// 2. Seed the completion tracker with the root unit
/// 3. Fan out one task per discovered link, down to `max_depth`
/// 4. Wait for every task to finish
/// 5. Close the result sink and return it for draining
///
/// # Example
///
/// ```no_run
/// use ripple_crawl::crawler::crawl;
/// use ripple_crawl::fetcher::StaticFetcher;
///
/// # async fn example() -> ripple_crawl::Result<()> {
/// let output = crawl(StaticFetcher::golang_sample(), "https://golang.org/", 4).await?;
/// for report in output.reports().await {
///     println!("{}", report);
/// }
/// # Ok(())
/// # }
/// ```
pub async fn crawl<F>(fetcher: F, root_url: &str, max_depth: u32) -> Result<CrawlOutput>
where
    F: Fetcher + 'static,
{
    Crawler::cached(fetcher, CrawlOptions::default())
        .crawl(root_url, max_depth)
        .await
}
