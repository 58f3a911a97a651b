//! Ripple-Crawl: a concurrent, depth-bounded web crawler core
//!
//! This crate implements a recursive fan-out crawler that spawns one task per
//! discovered link, detects termination of the growing task graph with a
//! two-counter completion tracker, and de-duplicates fetches through a
//! read-mostly caching decorator over a pluggable [`Fetcher`].

pub mod config;
pub mod crawler;
pub mod fetcher;
pub mod output;
pub mod state;

use thiserror::Error;

/// Main error type for crawl operations
///
/// Fetch failures are not represented here: they travel as data inside
/// [`fetcher::FetchOutcome`] and [`crawler::CrawlReport`].
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Result sink overflowed its capacity of {capacity} reports")]
    SinkOverflow { capacity: usize },

    #[error("Result sink capacity must be at least 1")]
    InvalidCapacity,
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type alias for crawl operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{crawl, CrawlOptions, CrawlOutput, CrawlReport, Crawler};
pub use fetcher::{CachingFetcher, FetchError, FetchOutcome, Fetcher, Page, StaticFetcher};
pub use state::UnitState;
