//! Interval polling.
//!
//! The server keeps no per-client state, so "near real-time" is a timer
//! on this side: the open thread is re-fetched every few seconds and the
//! unread badge less often.  [`Poller`] is that timer made explicit --
//! one scheduled task, parameterized by interval, that can be stopped at
//! any point.  Polled reads are safe to abandon mid-flight; the only
//! write they can trigger (mark-on-view) is atomic per message on the
//! server side.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;

/// A repeating task on a fixed interval.
#[derive(Debug, Clone, Copy)]
pub struct Poller {
    interval: Duration,
}

/// Handle to a running poller.  Dropping the handle does not stop the
/// task; call [`PollerHandle::stop`].
pub struct PollerHandle {
    handle: JoinHandle<()>,
}

impl PollerHandle {
    /// Cancel the polling task.  In-flight work is abandoned.
    pub fn stop(&self) {
        self.handle.abort();
    }
}

impl Poller {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    pub fn every_secs(secs: u64) -> Self {
        Self::new(Duration::from_secs(secs))
    }

    /// Spawn the polling loop.  `task` runs once immediately, then once
    /// per interval.  A slow task delays the next tick rather than
    /// stacking up.
    pub fn spawn<F, Fut>(self, mut task: F) -> PollerHandle
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send,
    {
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                task().await;
            }
        });

        PollerHandle { handle }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn ticks_repeatedly() {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = count.clone();

        let handle = Poller::new(Duration::from_millis(10)).spawn(move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });

        tokio::time::sleep(Duration::from_millis(100)).await;
        handle.stop();

        // First tick fires immediately, then roughly every 10ms.
        assert!(count.load(Ordering::SeqCst) >= 3);
    }

    #[tokio::test]
    async fn stop_halts_the_loop() {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = count.clone();

        let handle = Poller::new(Duration::from_millis(5)).spawn(move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });

        tokio::time::sleep(Duration::from_millis(30)).await;
        handle.stop();
        let after_stop = count.load(Ordering::SeqCst);

        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(count.load(Ordering::SeqCst), after_stop);
    }
}
