//! Simulated progress shown while an extraction is running.
//!
//! The service gives no progress feedback, so a ticker creeps the value up
//! while the request is in flight. It never reaches 100 on its own; only a
//! successful settlement reports completion.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

pub const TICK_INTERVAL: Duration = Duration::from_millis(500);

/// Highest value the ticker may report.
pub const PROGRESS_CEILING: u8 = 95;

pub const PROGRESS_COMPLETE: u8 = 100;

/// What the progress indicator should currently show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Progress {
    /// Indicator not shown (idle, or reset after a failure)
    #[default]
    Hidden,
    /// Request in flight; simulated percentage
    Running(u8),
    /// Request settled successfully
    Complete,
}

impl Progress {
    pub fn percent(&self) -> u8 {
        match self {
            Progress::Hidden => 0,
            Progress::Running(p) => *p,
            Progress::Complete => PROGRESS_COMPLETE,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Progress::Hidden => "",
            Progress::Running(_) => "Extracting data with multiple strategies...",
            Progress::Complete => "Complete!",
        }
    }

    pub fn is_visible(&self) -> bool {
        !matches!(self, Progress::Hidden)
    }
}

/// Background task that advances [`Progress::Running`] on a fixed interval.
///
/// Dropping the ticker cancels it; [`ProgressTicker::stop`] additionally
/// waits for the task to exit so no tick can land afterwards.
pub struct ProgressTicker {
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl ProgressTicker {
    /// Publish `Running(0)` and start ticking.
    pub fn start(progress: Arc<watch::Sender<Progress>>, interval: Duration) -> Self {
        let cancel = CancellationToken::new();
        let tick_cancel = cancel.clone();
        progress.send_replace(Progress::Running(0));

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await; // Skip first immediate tick
            let mut value: u8 = 0;

            loop {
                tokio::select! {
                    biased;
                    _ = tick_cancel.cancelled() => break,
                    _ = ticker.tick() => {
                        value = (value + 1).min(PROGRESS_CEILING);
                        progress.send_replace(Progress::Running(value));
                    }
                }
            }
        });

        Self {
            cancel,
            handle: Some(handle),
        }
    }

    /// Cancel the ticker and wait for it to finish.
    pub async fn stop(mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for ProgressTicker {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_ticks_once_per_interval() {
        let (tx, rx) = watch::channel(Progress::Hidden);
        let ticker = ProgressTicker::start(Arc::new(tx), TICK_INTERVAL);
        assert_eq!(*rx.borrow(), Progress::Running(0));

        tokio::time::sleep(Duration::from_millis(1_250)).await;
        assert_eq!(*rx.borrow(), Progress::Running(2));

        ticker.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_clamped_at_ceiling() {
        let (tx, rx) = watch::channel(Progress::Hidden);
        let ticker = ProgressTicker::start(Arc::new(tx), TICK_INTERVAL);

        tokio::time::sleep(Duration::from_secs(120)).await;
        assert_eq!(*rx.borrow(), Progress::Running(PROGRESS_CEILING));

        ticker.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_ticks_after_stop() {
        let (tx, mut rx) = watch::channel(Progress::Hidden);
        let ticker = ProgressTicker::start(Arc::new(tx), TICK_INTERVAL);

        tokio::time::sleep(Duration::from_millis(1_600)).await;
        ticker.stop().await;
        rx.borrow_and_update();

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(!rx.has_changed().unwrap_or(false));
        assert_eq!(*rx.borrow(), Progress::Running(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_ticker() {
        let (tx, mut rx) = watch::channel(Progress::Hidden);
        let ticker = ProgressTicker::start(Arc::new(tx), TICK_INTERVAL);
        drop(ticker);

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(*rx.borrow_and_update(), Progress::Running(0));
        // The task exits and drops its sender.
        assert!(rx.changed().await.is_err());
    }

    #[test]
    fn test_percent_and_visibility() {
        assert_eq!(Progress::Hidden.percent(), 0);
        assert!(!Progress::Hidden.is_visible());
        assert_eq!(Progress::Running(42).percent(), 42);
        assert_eq!(Progress::Complete.percent(), 100);
        assert_eq!(Progress::Complete.message(), "Complete!");
    }
}
