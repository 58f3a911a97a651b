use crate::crawler::DEFAULT_RESULT_CAPACITY;
use crate::fetcher::StaticFetcher;
use serde::Deserialize;

/// Root URL of the built-in sample dataset
pub const DEFAULT_ROOT_URL: &str = "https://golang.org/";

/// Default crawl depth
pub const DEFAULT_MAX_DEPTH: u32 = 4;

/// Main configuration structure for Ripple-Crawl
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,

    /// Canned pages served by the fetcher; empty means the built-in sample
    #[serde(default, rename = "page")]
    pub pages: Vec<PageEntry>,
}

impl Config {
    /// Builds the canned-data fetcher described by this configuration
    pub fn fetcher(&self) -> StaticFetcher {
        if self.pages.is_empty() {
            return StaticFetcher::golang_sample();
        }
        StaticFetcher::from_pages(
            self.pages
                .iter()
                .map(|p| (p.url.as_str(), p.body.as_str(), p.links.iter().map(String::as_str))),
        )
    }
}

/// Crawler behavior configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// URL the crawl starts from
    #[serde(rename = "root-url")]
    pub root_url: String,

    /// Maximum depth to crawl from the root URL
    #[serde(rename = "max-depth")]
    pub max_depth: u32,

    /// Capacity of the result sink
    #[serde(rename = "result-capacity")]
    pub result_capacity: usize,

    /// Maximum number of concurrent fetches (unlimited when unset)
    #[serde(rename = "max-concurrency")]
    pub max_concurrency: Option<usize>,

    /// Simulated latency before each fetch (milliseconds)
    #[serde(rename = "fetch-delay-ms")]
    pub fetch_delay_ms: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            root_url: DEFAULT_ROOT_URL.to_string(),
            max_depth: DEFAULT_MAX_DEPTH,
            result_capacity: DEFAULT_RESULT_CAPACITY,
            max_concurrency: None,
            fetch_delay_ms: 0,
        }
    }
}

/// A canned page served by the static fetcher
#[derive(Debug, Clone, Deserialize)]
pub struct PageEntry {
    /// Page URL
    pub url: String,

    /// Page body
    #[serde(default)]
    pub body: String,

    /// Outbound links
    #[serde(default)]
    pub links: Vec<String>,
}
