//! The recursive crawl step
//!
//! Each unit of work handles one URL at one remaining depth:
//!
//! 1. `Scheduled -> Fetching`
//! 2. Depth budget exhausted: `Fetching -> Terminated`, nothing fetched
//! 3. Fetch through the shared fetcher (normally the cache)
//!    - failure: emit a failure report, `Failed -> Terminated`
//!    - success: emit a report, announce the children, spawn one unit per
//!      link with `depth - 1`, `Succeeded -> Terminated`
//!
//! Every unit resolves itself on the completion tracker exactly once, when
//! its [`Unit`] guard is dropped. Children are always announced before that
//! happens.

use crate::crawler::scheduler::Scheduler;
use crate::crawler::sink::{CrawlReport, ResultSink};
use crate::crawler::tracker::CompletionTracker;
use crate::fetcher::{FetchOutcome, Fetcher};
use crate::state::UnitState;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// How the units of a crawl ended
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UnitSummary {
    /// Units whose fetch succeeded
    pub found: u64,

    /// Units whose fetch failed
    pub failed: u64,

    /// Units that ran out of depth budget and fetched nothing
    pub exhausted: u64,
}

impl UnitSummary {
    /// Total units that ran to completion
    pub fn total(&self) -> u64 {
        self.found + self.failed + self.exhausted
    }

    /// Fetches issued (cache hits included)
    pub fn fetches(&self) -> u64 {
        self.found + self.failed
    }
}

#[derive(Debug, Default)]
struct UnitCounters {
    found: AtomicU64,
    failed: AtomicU64,
    exhausted: AtomicU64,
}

/// State shared by every unit of one crawl
pub(crate) struct CrawlContext<F> {
    fetcher: Arc<F>,
    pub(crate) tracker: CompletionTracker,
    sink: ResultSink,
    scheduler: Scheduler,
    counters: UnitCounters,
}

impl<F> CrawlContext<F> {
    pub(crate) fn new(fetcher: Arc<F>, sink: ResultSink, scheduler: Scheduler) -> Self {
        Self {
            fetcher,
            tracker: CompletionTracker::new(),
            sink,
            scheduler,
            counters: UnitCounters::default(),
        }
    }

    pub(crate) fn summary(&self) -> UnitSummary {
        UnitSummary {
            found: self.counters.found.load(Ordering::SeqCst),
            failed: self.counters.failed.load(Ordering::SeqCst),
            exhausted: self.counters.exhausted.load(Ordering::SeqCst),
        }
    }
}

/// One unit of work; finishes itself on the tracker when dropped
struct Unit<'a> {
    tracker: &'a CompletionTracker,
    url: &'a str,
    depth: u32,
    state: UnitState,
}

impl<'a> Unit<'a> {
    fn new(tracker: &'a CompletionTracker, url: &'a str, depth: u32) -> Self {
        Self {
            tracker,
            url,
            depth,
            state: UnitState::Scheduled,
        }
    }

    fn advance(&mut self, next: UnitState) {
        if !self.state.can_transition_to(next) {
            tracing::warn!(
                "Unexpected unit transition for {} at depth {}: {} -> {}",
                self.url,
                self.depth,
                self.state,
                next
            );
        }
        tracing::trace!("{} (depth {}): {} -> {}", self.url, self.depth, self.state, next);
        self.state = next;
    }
}

impl Drop for Unit<'_> {
    fn drop(&mut self) {
        if !self.state.is_terminal() {
            self.advance(UnitState::Terminated);
        }
        self.tracker.finish(1);
    }
}

/// Spawns a unit of work onto the current tokio runtime
///
/// The caller must already have announced this unit on the tracker.
pub(crate) fn spawn_unit<F>(ctx: Arc<CrawlContext<F>>, url: String, depth: u32)
where
    F: Fetcher + 'static,
{
    tokio::spawn(run_unit(ctx, url, depth));
}

async fn run_unit<F>(ctx: Arc<CrawlContext<F>>, url: String, depth: u32)
where
    F: Fetcher + 'static,
{
    let mut unit = Unit::new(&ctx.tracker, &url, depth);
    unit.advance(UnitState::Fetching);

    if depth == 0 {
        tracing::debug!("Depth budget exhausted at {}", url);
        ctx.counters.exhausted.fetch_add(1, Ordering::SeqCst);
        return;
    }

    let outcome = {
        let _permit = ctx.scheduler.admit().await;
        ctx.fetcher.fetch(&url).await
    };

    match outcome {
        FetchOutcome::Found(page) => {
            unit.advance(UnitState::Succeeded);
            tracing::debug!("Found {} with {} links", url, page.links.len());
            ctx.counters.found.fetch_add(1, Ordering::SeqCst);

            ctx.sink.emit(CrawlReport::Found {
                url: url.clone(),
                depth,
                body: page.body,
                links: page.links.clone(),
            });

            // Children must be announced before this unit finishes
            ctx.tracker.announce(page.links.len() as u64);
            for link in page.links {
                spawn_unit(Arc::clone(&ctx), link, depth - 1);
            }
        }
        FetchOutcome::Failed(error) => {
            unit.advance(UnitState::Failed);
            tracing::debug!("Fetch failed for {}: {}", url, error);
            ctx.counters.failed.fetch_add(1, Ordering::SeqCst);

            ctx.sink.emit(CrawlReport::Failed {
                url: url.clone(),
                depth,
                error,
            });
        }
    }
}
