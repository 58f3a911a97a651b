//! Retrieval capability for the crawler
//!
//! This module defines the [`Fetcher`] trait, the single extension point for
//! plugging page retrieval into the crawler, along with:
//! - The [`FetchOutcome`] data returned by every fetch
//! - A canned-data fetcher used as a test double and default dataset
//! - A caching decorator that memoizes outcomes per URL

mod cache;
mod canned;

pub use cache::{CacheStats, CachingFetcher};
pub use canned::StaticFetcher;

use std::future::Future;
use std::sync::Arc;
use thiserror::Error;

/// Fetches the body and outbound links of a URL.
///
/// Implementations must be safe to call concurrently. A URL that cannot be
/// retrieved is reported as [`FetchOutcome::Failed`], never as a panic.
pub trait Fetcher: Send + Sync {
    fn fetch(&self, url: &str) -> impl Future<Output = FetchOutcome> + Send;
}

impl<F: Fetcher> Fetcher for Arc<F> {
    async fn fetch(&self, url: &str) -> FetchOutcome {
        (**self).fetch(url).await
    }
}

impl<F: Fetcher> Fetcher for &F {
    async fn fetch(&self, url: &str) -> FetchOutcome {
        (**self).fetch(url).await
    }
}

/// A successfully retrieved page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// Page body content
    pub body: String,

    /// Outbound links, in document order
    pub links: Vec<String>,
}

impl Page {
    pub fn new(body: impl Into<String>, links: Vec<String>) -> Self {
        Self {
            body: body.into(),
            links,
        }
    }
}

/// Reason a fetch failed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The fetcher has no entry for the URL
    #[error("not found: {url}")]
    NotFound { url: String },

    /// The URL exists but could not be retrieved
    #[error("unreachable: {url}: {reason}")]
    Unreachable { url: String, reason: String },
}

impl FetchError {
    /// The URL the failure refers to
    pub fn url(&self) -> &str {
        match self {
            Self::NotFound { url } | Self::Unreachable { url, .. } => url,
        }
    }
}

/// Result of a single fetch
///
/// Outcomes are immutable once produced. A failure is data, not a
/// control-flow error: callers branch on it and carry on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The page was retrieved
    Found(Page),

    /// The page could not be retrieved
    Failed(FetchError),
}

impl FetchOutcome {
    pub fn found(body: impl Into<String>, links: Vec<String>) -> Self {
        Self::Found(Page::new(body, links))
    }

    pub fn not_found(url: impl Into<String>) -> Self {
        Self::Failed(FetchError::NotFound { url: url.into() })
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    pub fn page(&self) -> Option<&Page> {
        match self {
            Self::Found(page) => Some(page),
            Self::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&FetchError> {
        match self {
            Self::Found(_) => None,
            Self::Failed(err) => Some(err),
        }
    }
}

impl From<std::result::Result<Page, FetchError>> for FetchOutcome {
    fn from(result: std::result::Result<Page, FetchError>) -> Self {
        match result {
            Ok(page) => Self::Found(page),
            Err(err) => Self::Failed(err),
        }
    }
}
