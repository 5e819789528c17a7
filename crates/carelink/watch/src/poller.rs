//! Generic interval polling primitive.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::trace;

/// What the action tells the poller after each tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PollTick {
    /// Schedule the next tick.
    Continue,
    /// Stop polling; no further ticks.
    Stop,
}

/// Repeats an async action on a fixed interval.
///
/// The action runs once immediately, then once per interval. Ticks are
/// strictly serialized: the next tick does not start while the previous
/// action is still running, so a slow endpoint never accumulates
/// duplicate in-flight requests.
pub struct Poller;

impl Poller {
    /// Spawn a polling task. The returned handle stops it; dropping the
    /// handle stops it too.
    pub fn spawn<F, Fut>(interval: Duration, mut action: F) -> PollHandle
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = PollTick> + Send,
    {
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // Late ticks delay the schedule instead of bursting.
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                match action().await {
                    PollTick::Continue => trace!("poll tick complete"),
                    PollTick::Stop => break,
                }
            }
        });

        PollHandle { handle }
    }
}

/// Disposable handle to a polling task.
///
/// `stop` (and `Drop`) aborts deterministically: once called, no further
/// action invocations occur, even if one was already scheduled. A tick
/// in flight at disposal time is cancelled and its result discarded.
#[derive(Debug)]
pub struct PollHandle {
    handle: JoinHandle<()>,
}

impl PollHandle {
    /// Stop polling. Idempotent.
    pub fn stop(&self) {
        self.handle.abort();
    }

    /// False once the task has stopped (terminal tick or disposal).
    pub fn is_active(&self) -> bool {
        !self.handle.is_finished()
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
