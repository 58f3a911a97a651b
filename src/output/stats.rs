//! Statistics for a finished crawl
//!
//! This module summarizes the tracker counters, unit outcomes and cache
//! activity of a crawl for display.

use crate::crawler::CrawlOutput;
use crate::fetcher::CacheStats;
use std::fmt;
use std::time::Duration;

/// Crawl statistics summary
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CrawlStatistics {
    /// Units announced on the completion tracker
    pub units_scheduled: u64,

    /// Units that resolved themselves on the tracker
    pub units_finished: u64,

    /// Fetches that returned a page
    pub pages_found: u64,

    /// Fetches that failed
    pub pages_failed: u64,

    /// Units stopped by the depth budget
    pub depth_exhausted: u64,

    /// Cache activity, when the crawl went through a cache
    pub cache: Option<CacheStats>,

    /// Time until the crawl converged
    pub elapsed: Duration,
}

impl CrawlStatistics {
    /// Collects statistics from a crawl output
    pub fn collect(output: &CrawlOutput, cache: Option<CacheStats>) -> Self {
        Self {
            units_scheduled: output.progress.pending,
            units_finished: output.progress.done,
            pages_found: output.summary.found,
            pages_failed: output.summary.failed,
            depth_exhausted: output.summary.exhausted,
            cache,
            elapsed: output.elapsed,
        }
    }

    /// Share of fetches that returned a page, as a percentage
    pub fn success_rate(&self) -> f64 {
        let fetches = self.pages_found + self.pages_failed;
        if fetches == 0 {
            return 0.0;
        }
        (self.pages_found as f64 / fetches as f64) * 100.0
    }
}

impl fmt::Display for CrawlStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Crawl Statistics ===\n")?;

        writeln!(f, "Units:")?;
        writeln!(f, "  Scheduled: {}", self.units_scheduled)?;
        writeln!(f, "  Finished: {}", self.units_finished)?;
        writeln!(f, "  Found: {}", self.pages_found)?;
        writeln!(f, "  Failed: {}", self.pages_failed)?;
        writeln!(f, "  Depth exhausted: {}", self.depth_exhausted)?;
        writeln!(f)?;

        if let Some(cache) = &self.cache {
            writeln!(f, "Cache:")?;
            writeln!(f, "  Created {} cache entries", cache.entries)?;
            writeln!(f, "  Hits: {}", cache.hits)?;
            writeln!(f, "  Misses: {}", cache.misses)?;
            writeln!(f)?;
        }

        writeln!(
            f,
            "Success Rate: {:.1}% ({} / {} fetches returned a page)",
            self.success_rate(),
            self.pages_found,
            self.pages_found + self.pages_failed
        )?;
        write!(f, "Elapsed: {:?}", self.elapsed)
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("{}", stats);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CrawlStatistics {
        CrawlStatistics {
            units_scheduled: 12,
            units_finished: 12,
            pages_found: 6,
            pages_failed: 2,
            depth_exhausted: 4,
            cache: Some(CacheStats {
                entries: 5,
                hits: 3,
                misses: 5,
            }),
            elapsed: Duration::from_millis(3),
        }
    }

    #[test]
    fn test_success_rate() {
        assert_eq!(sample().success_rate(), 75.0);
        assert_eq!(CrawlStatistics::default().success_rate(), 0.0);
    }

    #[test]
    fn test_format_includes_cache_entries() {
        let text = sample().to_string();
        assert!(text.contains("Scheduled: 12"));
        assert!(text.contains("Created 5 cache entries"));
        assert!(text.contains("Success Rate: 75.0% (6 / 8"));
    }

    #[test]
    fn test_format_without_cache() {
        let stats = CrawlStatistics {
            cache: None,
            ..sample()
        };
        assert!(!stats.to_string().contains("Cache:"));
    }
}
