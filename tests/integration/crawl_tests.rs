//! Integration tests for the crawler
//!
//! These tests drive full crawls over canned datasets and check termination,
//! result completeness and cache behavior end-to-end.

use ripple_crawl::crawler::{crawl, CrawlOptions, CrawlOutput, Crawler};
use ripple_crawl::fetcher::{CachingFetcher, FetchOutcome, Fetcher, StaticFetcher};
use ripple_crawl::output::CrawlStatistics;
use ripple_crawl::CrawlError;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Upper bound for any single crawl in these tests
const CRAWL_TIMEOUT: Duration = Duration::from_secs(10);

/// Fetcher that records how many fetches are in flight
struct ProbeFetcher {
    inner: StaticFetcher,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ProbeFetcher {
    fn new(inner: StaticFetcher) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

impl Fetcher for ProbeFetcher {
    async fn fetch(&self, url: &str) -> FetchOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        tokio::time::sleep(Duration::from_millis(2)).await;
        let outcome = self.inner.lookup(url);

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        outcome
    }
}

/// `{A: [B, C], B: [A], C: []}`
fn abc() -> StaticFetcher {
    StaticFetcher::new()
        .with_page("A", "page a", &["B", "C"])
        .with_page("B", "page b", &["A"])
        .with_page("C", "page c", &[])
}

async fn run<F: Fetcher + 'static>(
    crawler: &Crawler<F>,
    root: &str,
    depth: u32,
) -> CrawlOutput {
    tokio::time::timeout(CRAWL_TIMEOUT, crawler.crawl(root, depth))
        .await
        .expect("crawl did not terminate")
        .expect("crawl failed")
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_abc_crawl_reports_every_page() {
    let crawler = Crawler::cached(abc(), CrawlOptions::default());
    let output = run(&crawler, "A", 2).await;

    assert!(output.progress.is_complete());

    let reports = output.reports().await;
    let urls: HashSet<&str> = reports.iter().map(|r| r.url()).collect();
    assert!(urls.contains("A"));
    assert!(urls.contains("B"));
    assert!(urls.contains("C"));
    assert!(reports.iter().all(|r| r.is_found()));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_missing_root_produces_one_failure() {
    let crawler = Crawler::cached(abc(), CrawlOptions::default());
    let output = run(&crawler, "missing-url", 3).await;

    assert_eq!(output.progress.pending, 1);
    assert_eq!(output.progress.done, 1);

    let reports = output.reports().await;
    assert_eq!(reports.len(), 1);
    assert!(!reports[0].is_found());
    assert_eq!(reports[0].to_string(), "not found: missing-url");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_depth_zero_fetches_nothing_and_converges() {
    let crawler = Crawler::new(ProbeFetcher::new(abc()), CrawlOptions::default());
    let output = run(&crawler, "A", 0).await;

    assert_eq!(crawler.fetcher().calls(), 0);
    assert_eq!(output.progress.pending, 1);
    assert_eq!(output.progress.done, 1);
    assert_eq!(output.summary.exhausted, 1);
    assert!(output.reports().await.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_cycle_terminates_with_bounded_depth() {
    let fetcher = StaticFetcher::new()
        .with_page("A", "page a", &["B"])
        .with_page("B", "page b", &["A"]);
    let crawler = Crawler::cached(fetcher, CrawlOptions::default());
    let output = run(&crawler, "A", 10).await;

    // A chain of ten fetches plus one exhausted unit
    assert_eq!(output.summary.found, 10);
    assert_eq!(output.summary.exhausted, 1);
    assert_eq!(output.progress.done, 11);

    // Only two distinct pages were ever fetched from the inner fetcher
    let cache = crawler.fetcher().stats().await;
    assert_eq!(cache.entries, 2);
    assert_eq!(cache.misses, 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_finish_called_once_per_spawned_unit() {
    let crawler = Crawler::cached(StaticFetcher::golang_sample(), CrawlOptions::default());
    let output = run(&crawler, "https://golang.org/", 4).await;

    let summary = output.summary;
    let progress = output.progress;
    let reports = output.reports().await;

    // Root plus one unit per link of every page found
    let spawned: u64 = 1 + reports
        .iter()
        .filter_map(|r| match r {
            ripple_crawl::CrawlReport::Found { links, .. } => Some(links.len() as u64),
            ripple_crawl::CrawlReport::Failed { .. } => None,
        })
        .sum::<u64>();

    assert_eq!(progress.pending, spawned);
    assert_eq!(progress.done, spawned);
    assert_eq!(summary.total(), spawned);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_golang_sample_crawl() {
    let crawler = Crawler::cached(StaticFetcher::golang_sample(), CrawlOptions::default());
    let output = run(&crawler, "https://golang.org/", 4).await;

    assert_eq!(output.summary.found, 10);
    assert_eq!(output.summary.failed, 3);
    assert_eq!(output.summary.exhausted, 16);
    assert_eq!(output.progress.done, 29);

    let cache = crawler.fetcher().stats().await;
    assert_eq!(cache.entries, 5);
    assert_eq!(cache.misses, 5);
    assert_eq!(cache.hits, 8);

    let stats = CrawlStatistics::collect(&output, Some(cache));
    assert_eq!(stats.units_scheduled, 29);
    assert!(stats.to_string().contains("Created 5 cache entries"));

    let reports = output.reports().await;
    assert_eq!(reports.len(), 13);
    let failures: Vec<_> = reports.iter().filter(|r| !r.is_found()).collect();
    assert_eq!(failures.len(), 3);
    assert!(failures
        .iter()
        .all(|r| r.to_string() == "not found: https://golang.org/cmd/"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_no_fetch_in_flight_after_completion() {
    let crawler = Crawler::new(
        ProbeFetcher::new(StaticFetcher::golang_sample()),
        CrawlOptions::default(),
    );
    let output = run(&crawler, "https://golang.org/", 4).await;

    let probe = crawler.fetcher();
    assert_eq!(probe.in_flight(), 0);
    assert_eq!(probe.calls() as u64, output.summary.fetches());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_max_concurrency_bounds_fetches() {
    let options = CrawlOptions {
        max_concurrency: Some(1),
        ..CrawlOptions::default()
    };
    let crawler = Crawler::new(ProbeFetcher::new(StaticFetcher::golang_sample()), options);
    let output = run(&crawler, "https://golang.org/", 3).await;

    assert!(output.progress.is_complete());
    assert_eq!(crawler.fetcher().max_in_flight(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_cache_hits_still_emit_reports() {
    let crawler = Crawler::cached(abc(), CrawlOptions::default());
    let output = run(&crawler, "A", 3).await;

    // A(3) -> B(2), C(2); B -> A(1); A(1) -> B(0), C(0)
    let reports = output.reports().await;
    let a_reports = reports.iter().filter(|r| r.url() == "A").count();
    assert_eq!(a_reports, 2);
    assert_eq!(crawler.fetcher().stats().await.misses, 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_crawls_do_not_share_state() {
    let (first, second) = tokio::join!(
        crawl(abc(), "A", 2),
        crawl(StaticFetcher::golang_sample(), "https://golang.org/", 4)
    );
    let first = first.unwrap();
    let second = second.unwrap();

    assert!(first.progress.is_complete());
    assert!(second.progress.is_complete());
    assert_eq!(second.progress.done, 29);

    let first_urls: HashSet<String> = first
        .reports()
        .await
        .into_iter()
        .map(|r| r.url().to_string())
        .collect();
    assert!(first_urls.iter().all(|u| ["A", "B", "C"].contains(&u.as_str())));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_sink_overflow_is_an_error() {
    let options = CrawlOptions {
        result_capacity: 2,
        ..CrawlOptions::default()
    };
    let crawler = Crawler::cached(StaticFetcher::golang_sample(), options);
    let result = tokio::time::timeout(CRAWL_TIMEOUT, crawler.crawl("https://golang.org/", 4))
        .await
        .expect("crawl did not terminate");

    assert!(matches!(result, Err(CrawlError::SinkOverflow { capacity: 2 })));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_fifty_concurrent_fetches_through_cache() {
    let cache = Arc::new(CachingFetcher::new(ProbeFetcher::new(abc())));

    let handles: Vec<_> = (0..50)
        .map(|_| {
            let cache = Arc::clone(&cache);
            tokio::spawn(async move { cache.fetch("A").await })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.await.unwrap(), abc().lookup("A"));
    }

    assert!(cache.inner().calls() >= 1);
    assert_eq!(cache.len().await, 1);
    assert_eq!(cache.cached("A").await, Some(abc().lookup("A")));
}
