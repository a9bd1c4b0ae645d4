//! Session Timer
//!
//! Elapsed time is measured from a start instant; a background interval task
//! only publishes the running value once per second so a UI can redraw.
//! Stopping (or dropping) the timer cancels the task and freezes the reading.

use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, Instant, MissedTickBehavior};

/// How often the elapsed value is published.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Cancellable stopwatch with a once-per-second broadcast.
#[derive(Debug)]
pub struct SessionTimer {
    started_at: Instant,
    frozen: Option<Duration>,
    ticker: Option<JoinHandle<()>>,
}

impl SessionTimer {
    /// Start timing. Must be called inside a tokio runtime.
    ///
    /// The receiver sees whole elapsed seconds; it stops updating once the
    /// timer is stopped.
    pub fn start() -> (Self, watch::Receiver<u32>) {
        let started_at = Instant::now();
        let (tx, rx) = watch::channel(0u32);

        let ticker = tokio::spawn(async move {
            let mut ticks = interval(TICK_PERIOD);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // First tick completes immediately
            ticks.tick().await;
            loop {
                ticks.tick().await;
                let secs = started_at.elapsed().as_secs() as u32;
                if tx.send(secs).is_err() {
                    // Nobody is listening any more
                    break;
                }
            }
        });

        (
            Self {
                started_at,
                frozen: None,
                ticker: Some(ticker),
            },
            rx,
        )
    }

    /// Elapsed time so far (or at the moment it was stopped).
    pub fn elapsed(&self) -> Duration {
        self.frozen.unwrap_or_else(|| self.started_at.elapsed())
    }

    /// Elapsed whole seconds.
    pub fn elapsed_secs(&self) -> u32 {
        self.elapsed().as_secs() as u32
    }

    /// Whether the timer is still running.
    pub fn is_running(&self) -> bool {
        self.frozen.is_none()
    }

    /// Stop the timer and cancel the ticker. Idempotent.
    pub fn stop(&mut self) -> Duration {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
        *self.frozen.get_or_insert_with(|| self.started_at.elapsed())
    }
}

impl Drop for SessionTimer {
    fn drop(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::advance;

    #[tokio::test(start_paused = true)]
    async fn test_elapsed_tracks_clock() {
        let (timer, _rx) = SessionTimer::start();
        advance(Duration::from_secs(7)).await;
        assert_eq!(timer.elapsed_secs(), 7);
        assert!(timer.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_freezes_reading() {
        let (mut timer, _rx) = SessionTimer::start();
        advance(Duration::from_secs(3)).await;

        let stopped = timer.stop();
        assert_eq!(stopped.as_secs(), 3);

        advance(Duration::from_secs(10)).await;
        assert_eq!(timer.elapsed_secs(), 3);
        assert!(!timer.is_running());

        // Second stop keeps the first reading
        assert_eq!(timer.stop().as_secs(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticker_publishes_seconds() {
        let (_timer, mut rx) = SessionTimer::start();

        // Paused clock auto-advances to the next timer when the runtime idles
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), 1);
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_cancels_ticker() {
        let (mut timer, mut rx) = SessionTimer::start();
        timer.stop();

        // Sender dropped with the aborted task
        assert!(rx.changed().await.is_err());
    }
}
