// Deadline enforcement
//
// The deadline timer and process completion race. Whichever claims the latch
// first decides the classification; the loser's claim fails and is ignored.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::debug;

const PENDING: u8 = 0;
const COMPLETED: u8 = 1;
const EXPIRED: u8 = 2;

/// Which event ended the invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The process exited on its own (any code or signal)
    Natural,
    /// The engine's own deadline fired first
    Deadline,
}

/// One-way pending → completed | expired flag
///
/// Set to expired immediately before the engine signals the child, so it is
/// the sole timeout discriminator. A SIGTERM sent by someone else leaves it
/// untouched.
#[derive(Debug, Default)]
pub struct TerminationLatch {
    state: AtomicU8,
}

impl TerminationLatch {
    pub fn new() -> Self {
        Self {
            state: AtomicU8::new(PENDING),
        }
    }

    fn claim(&self, to: u8) -> bool {
        self.state
            .compare_exchange(PENDING, to, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Claim for the deadline. False if completion already won.
    pub fn try_expire(&self) -> bool {
        self.claim(EXPIRED)
    }

    /// Claim for natural completion. False if the deadline already won.
    pub fn try_complete(&self) -> bool {
        self.claim(COMPLETED)
    }

    /// Record that the process is gone and report who won
    pub fn settle(&self) -> Termination {
        if self.try_complete() || self.state.load(Ordering::Acquire) == COMPLETED {
            Termination::Natural
        } else {
            Termination::Deadline
        }
    }

    #[cfg(test)]
    fn is_expired(&self) -> bool {
        self.state.load(Ordering::Acquire) == EXPIRED
    }
}

/// Background timer that fires at most once
///
/// Dropping the task cancels it, so an early return can never leave a timer
/// that later signals a reaped process.
pub struct DeadlineTask {
    handle: JoinHandle<()>,
}

impl DeadlineTask {
    /// Start the timer
    ///
    /// The receiver resolves only if the timer claimed `latch` for the
    /// deadline. If completion claimed it first the sender is dropped.
    pub fn start(timeout: Duration, latch: Arc<TerminationLatch>) -> (Self, oneshot::Receiver<()>) {
        let (tx, rx) = oneshot::channel();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            if latch.try_expire() {
                let _ = tx.send(());
            } else {
                debug!("Deadline reached after completion, ignoring");
            }
        });
        (Self { handle }, rx)
    }

    /// Stop the timer. No-op if it already fired.
    pub fn cancel(self) {
        drop(self);
    }
}

impl Drop for DeadlineTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
