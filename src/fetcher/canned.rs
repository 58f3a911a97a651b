//! Canned-data fetcher
//!
//! Resolves URLs from a fixed in-memory mapping. Used as the test double for
//! the crawler and as the default dataset of the command-line tool.

use crate::fetcher::{FetchError, FetchOutcome, Fetcher, Page};
use std::collections::HashMap;

/// Fetcher that returns canned results
#[derive(Debug, Clone, Default)]
pub struct StaticFetcher {
    pages: HashMap<String, Page>,
}

impl StaticFetcher {
    /// Creates an empty fetcher; every URL is reported as not found
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a fetcher from `(url, body, links)` entries
    ///
    /// A later entry for the same URL replaces an earlier one.
    pub fn from_pages<I, U, B, L>(pages: I) -> Self
    where
        I: IntoIterator<Item = (U, B, L)>,
        U: Into<String>,
        B: Into<String>,
        L: IntoIterator,
        L::Item: Into<String>,
    {
        let pages = pages
            .into_iter()
            .map(|(url, body, links)| {
                let links = links.into_iter().map(Into::into).collect();
                (url.into(), Page::new(body, links))
            })
            .collect();
        Self { pages }
    }

    /// Adds or replaces a page
    pub fn with_page(
        mut self,
        url: impl Into<String>,
        body: impl Into<String>,
        links: &[&str],
    ) -> Self {
        let links = links.iter().map(|l| l.to_string()).collect();
        self.pages.insert(url.into(), Page::new(body, links));
        self
    }

    /// The golang.org tour dataset
    ///
    /// Four pages linking to each other; `https://golang.org/cmd/` is linked
    /// but deliberately missing, so a crawl of the root exercises both the
    /// cycle and the not-found paths.
    pub fn golang_sample() -> Self {
        Self::from_pages([
            (
                "https://golang.org/",
                "The Go Programming Language",
                vec!["https://golang.org/pkg/", "https://golang.org/cmd/"],
            ),
            (
                "https://golang.org/pkg/",
                "Packages",
                vec![
                    "https://golang.org/",
                    "https://golang.org/cmd/",
                    "https://golang.org/pkg/fmt/",
                    "https://golang.org/pkg/os/",
                ],
            ),
            (
                "https://golang.org/pkg/fmt/",
                "Package fmt",
                vec!["https://golang.org/", "https://golang.org/pkg/"],
            ),
            (
                "https://golang.org/pkg/os/",
                "Package os",
                vec!["https://golang.org/", "https://golang.org/pkg/"],
            ),
        ])
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Looks up a page without going through the async interface
    pub fn lookup(&self, url: &str) -> FetchOutcome {
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::NotFound {
                url: url.to_string(),
            })
            .into()
    }
}

impl Fetcher for StaticFetcher {
    async fn fetch(&self, url: &str) -> FetchOutcome {
        self.lookup(url)
    }
}
