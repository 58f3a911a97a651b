//! Completion tracking for a task graph that grows while it runs
//!
//! A crawl does not know in advance how many units it will spawn: any live
//! unit may still be scheduling children. Instead of a single counter that
//! falls to zero (which a waiter could observe between a unit finishing and
//! its children being registered), the tracker keeps two cumulative counters
//! and reports completion once they meet after at least one unit has
//! finished.
//!
//! # Protocol
//!
//! Every unit that spawns children must call [`CompletionTracker::announce`]
//! for them *before* it calls [`CompletionTracker::finish`] for itself, and
//! must call `finish(1)` exactly once. Violations are not detected at runtime;
//! they show up as completion being signalled while work is still running.

use tokio::sync::watch;

/// Cumulative scheduled / finished unit counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Progress {
    /// Units announced so far
    pub pending: u64,

    /// Units finished so far
    pub done: u64,
}

impl Progress {
    /// True once every announced unit has finished and at least one has
    pub fn is_complete(&self) -> bool {
        self.done > 0 && self.done == self.pending
    }

    /// Units announced but not yet finished
    pub fn outstanding(&self) -> u64 {
        self.pending.saturating_sub(self.done)
    }
}

/// Two-counter completion tracker with an async wait
///
/// Counter updates are serialized through a `watch` channel, which also
/// wakes waiters on every change, so [`wait`](Self::wait) never polls.
#[derive(Debug)]
pub struct CompletionTracker {
    progress: watch::Sender<Progress>,
}

impl Default for CompletionTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl CompletionTracker {
    pub fn new() -> Self {
        let (progress, _) = watch::channel(Progress::default());
        Self { progress }
    }

    /// Records that `n` more units have been scheduled
    pub fn announce(&self, n: u64) {
        if n == 0 {
            return;
        }
        self.progress.send_modify(|p| p.pending += n);
    }

    /// Records that `n` units have finished
    pub fn finish(&self, n: u64) {
        self.progress.send_modify(|p| {
            p.done += n;
            if p.done > p.pending {
                tracing::warn!(
                    "Completion tracker finished {} units but only {} were announced",
                    p.done,
                    p.pending
                );
            }
            tracing::trace!("{} units outstanding", p.outstanding());
        });
    }

    /// Current counter values
    pub fn progress(&self) -> Progress {
        *self.progress.borrow()
    }

    /// Waits until every announced unit has finished
    ///
    /// Does not resolve while both counters are still zero, so a waiter that
    /// starts before the root unit runs is not released early.
    pub async fn wait(&self) -> Progress {
        let mut rx = self.progress.subscribe();
        match rx.wait_for(Progress::is_complete).await.map(|progress| *progress) {
            Ok(progress) => progress,
            // Unreachable while `self` holds the sender
            Err(_) => self.progress(),
        }
    }
}
