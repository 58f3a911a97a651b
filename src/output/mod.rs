//! Output module for reporting crawl results
//!
//! This module handles:
//! - Recording crawl statistics and metrics
//! - Rendering them for the command line

pub mod stats;

pub use stats::{print_statistics, CrawlStatistics};
