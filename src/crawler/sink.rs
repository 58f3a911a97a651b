//! Bounded delivery of crawl results to the caller
//!
//! Units of work push [`CrawlReport`]s into a [`ResultSink`] without ever
//! blocking. The coordinator closes the paired [`ResultStream`] exactly once,
//! after the completion tracker has converged, and hands it to the caller to
//! drain.

use crate::fetcher::FetchError;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError};

/// Capacity used when none is configured
pub const DEFAULT_RESULT_CAPACITY: usize = 1000;

/// Longest body prefix shown when a report is displayed
const BODY_EXCERPT_CHARS: usize = 80;

/// One result record per attempted fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrawlReport {
    /// The page was fetched
    Found {
        url: String,
        /// Remaining depth budget of the unit that fetched the page
        depth: u32,
        body: String,
        links: Vec<String>,
    },

    /// The page could not be fetched
    Failed {
        url: String,
        depth: u32,
        error: FetchError,
    },
}

impl CrawlReport {
    pub fn url(&self) -> &str {
        match self {
            Self::Found { url, .. } | Self::Failed { url, .. } => url,
        }
    }

    pub fn depth(&self) -> u32 {
        match self {
            Self::Found { depth, .. } | Self::Failed { depth, .. } => *depth,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found { .. })
    }

    /// The first characters of the body, or the whole body if short
    pub fn excerpt(&self) -> Option<&str> {
        match self {
            Self::Found { body, .. } => {
                let end = body
                    .char_indices()
                    .nth(BODY_EXCERPT_CHARS)
                    .map_or(body.len(), |(idx, _)| idx);
                Some(&body[..end])
            }
            Self::Failed { .. } => None,
        }
    }
}

impl fmt::Display for CrawlReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Found { url, links, .. } => write!(
                f,
                "found: {} {:?} with urls: {:?}",
                url,
                self.excerpt().unwrap_or_default(),
                links
            ),
            Self::Failed { error, .. } => write!(f, "{}", error),
        }
    }
}

/// Creates a bounded sink / stream pair
///
/// `capacity` must be at least 1.
pub fn result_channel(capacity: usize) -> (ResultSink, ResultStream) {
    let (tx, rx) = mpsc::channel(capacity);
    let overflowed = Arc::new(AtomicBool::new(false));
    (
        ResultSink {
            tx,
            overflowed: Arc::clone(&overflowed),
        },
        ResultStream {
            rx,
            capacity,
            overflowed,
            closed: false,
        },
    )
}

/// Writing half, cloned into every unit of work
#[derive(Debug, Clone)]
pub struct ResultSink {
    tx: mpsc::Sender<CrawlReport>,
    overflowed: Arc<AtomicBool>,
}

impl ResultSink {
    /// Delivers a report without waiting
    ///
    /// A full sink cannot drain before the crawl finishes, so a report that
    /// does not fit latches the overflow flag instead of blocking the unit.
    pub fn emit(&self, report: CrawlReport) {
        tracing::trace!("Emitting report for {} at depth {}", report.url(), report.depth());
        match self.tx.try_send(report) {
            Ok(()) => {}
            Err(TrySendError::Full(report)) => {
                if !self.overflowed.swap(true, Ordering::SeqCst) {
                    tracing::error!(
                        "Result sink is full, dropping report for {}",
                        report.url()
                    );
                }
            }
            Err(TrySendError::Closed(report)) => {
                tracing::warn!("Result sink closed, dropping report for {}", report.url());
            }
        }
    }
}

/// Reading half, drained by the caller once the crawl has converged
#[derive(Debug)]
pub struct ResultStream {
    rx: mpsc::Receiver<CrawlReport>,
    capacity: usize,
    overflowed: Arc<AtomicBool>,
    closed: bool,
}

impl ResultStream {
    /// Stops accepting reports; buffered reports remain readable
    ///
    /// Closing twice is a no-op.
    pub fn close(&mut self) {
        if !self.closed {
            self.rx.close();
            self.closed = true;
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// True if any report was dropped because the sink was full
    pub fn overflowed(&self) -> bool {
        self.overflowed.load(Ordering::SeqCst)
    }

    /// Next buffered report, or `None` once closed and drained
    pub async fn next(&mut self) -> Option<CrawlReport> {
        self.rx.recv().await
    }

    /// Drains every remaining report
    ///
    /// Only returns once the stream is closed; the coordinator closes it
    /// before handing it out.
    pub async fn collect(mut self) -> Vec<CrawlReport> {
        let mut reports = Vec::new();
        while let Some(report) = self.next().await {
            reports.push(report);
        }
        reports
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn found(url: &str) -> CrawlReport {
        CrawlReport::Found {
            url: url.to_string(),
            depth: 1,
            body: format!("body of {}", url),
            links: vec![],
        }
    }

    #[tokio::test]
    async fn test_close_then_drain_yields_buffered_reports() {
        let (sink, mut stream) = result_channel(4);
        sink.emit(found("A"));
        sink.emit(found("B"));

        stream.close();
        assert!(stream.is_closed());

        // Senders are still alive, yet the drain terminates
        let reports = stream.collect().await;
        assert_eq!(reports, vec![found("A"), found("B")]);
        drop(sink);
    }

    #[tokio::test]
    async fn test_emit_after_close_is_dropped() {
        let (sink, mut stream) = result_channel(4);
        stream.close();
        sink.emit(found("late"));
        assert!(stream.next().await.is_none());
        assert!(!stream.overflowed());
    }

    #[tokio::test]
    async fn test_overflow_latches_flag() {
        let (sink, mut stream) = result_channel(1);
        sink.emit(found("A"));
        assert!(!stream.overflowed());
        sink.emit(found("B"));
        sink.emit(found("C"));
        assert!(stream.overflowed());

        stream.close();
        assert_eq!(stream.capacity(), 1);
        assert_eq!(stream.collect().await, vec![found("A")]);
    }

    #[test]
    fn test_display_found() {
        let report = CrawlReport::Found {
            url: "https://golang.org/".to_string(),
            depth: 4,
            body: "The Go Programming Language".to_string(),
            links: vec!["https://golang.org/pkg/".to_string()],
        };
        assert_eq!(
            report.to_string(),
            "found: https://golang.org/ \"The Go Programming Language\" with urls: [\"https://golang.org/pkg/\"]"
        );
    }

    #[test]
    fn test_display_failed() {
        let report = CrawlReport::Failed {
            url: "https://golang.org/cmd/".to_string(),
            depth: 2,
            error: FetchError::NotFound {
                url: "https://golang.org/cmd/".to_string(),
            },
        };
        assert_eq!(report.to_string(), "not found: https://golang.org/cmd/");
        assert_eq!(report.url(), "https://golang.org/cmd/");
        assert_eq!(report.depth(), 2);
        assert!(report.excerpt().is_none());
    }

    #[test]
    fn test_excerpt_truncates_long_bodies() {
        let report = CrawlReport::Found {
            url: "A".to_string(),
            depth: 1,
            body: "é".repeat(200),
            links: vec![],
        };
        let excerpt = report.excerpt().unwrap();
        assert_eq!(excerpt.chars().count(), BODY_EXCERPT_CHARS);
    }
}
