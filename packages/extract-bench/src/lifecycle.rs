//! End-to-end submission of one extraction job.
//!
//! A submission runs the progress ticker alongside the real request. Whatever
//! way the request settles, the ticker is stopped first, then the final
//! progress value is published, and the state goes back to `Idle`.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{info, warn};

use crate::backend::BenchBackend;
use crate::error::{BenchError, Result};
use crate::fields::ExtractionFieldsProjection;
use crate::progress::{Progress, ProgressTicker, TICK_INTERVAL};
use crate::request::{ExtractRequest, SubmissionForm};
use crate::types::{ExtractionReport, StrategyResult};

/// Whether a submission is in flight. Front ends gate their submit control on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmissionState {
    #[default]
    Idle,
    Submitting,
}

/// Returns the state to `Idle` when dropped, on every exit path.
struct SubmittingGuard {
    state: Arc<watch::Sender<SubmissionState>>,
}

impl SubmittingGuard {
    fn acquire(state: &Arc<watch::Sender<SubmissionState>>) -> Option<Self> {
        let acquired = state.send_if_modified(|current| match current {
            SubmissionState::Idle => {
                *current = SubmissionState::Submitting;
                true
            }
            SubmissionState::Submitting => false,
        });

        acquired.then(|| Self {
            state: Arc::clone(state),
        })
    }
}

impl Drop for SubmittingGuard {
    fn drop(&mut self) {
        self.state.send_replace(SubmissionState::Idle);
    }
}

/// Runs submissions against a backend, one at a time.
pub struct SubmissionLifecycle<B: ?Sized> {
    backend: Arc<B>,
    state: Arc<watch::Sender<SubmissionState>>,
    progress: Arc<watch::Sender<Progress>>,
    tick_interval: Duration,
}

impl<B: ?Sized> Clone for SubmissionLifecycle<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            state: Arc::clone(&self.state),
            progress: Arc::clone(&self.progress),
            tick_interval: self.tick_interval,
        }
    }
}

impl<B: BenchBackend + ?Sized> SubmissionLifecycle<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            state: Arc::new(watch::channel(SubmissionState::Idle).0),
            progress: Arc::new(watch::channel(Progress::Hidden).0),
            tick_interval: TICK_INTERVAL,
        }
    }

    /// Override the ticker interval.
    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    pub fn state(&self) -> SubmissionState {
        *self.state.borrow()
    }

    pub fn is_submitting(&self) -> bool {
        self.state() == SubmissionState::Submitting
    }

    pub fn progress(&self) -> Progress {
        *self.progress.borrow()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<SubmissionState> {
        self.state.subscribe()
    }

    pub fn subscribe_progress(&self) -> watch::Receiver<Progress> {
        self.progress.subscribe()
    }

    /// Submit one extraction job.
    ///
    /// Rejected with [`BenchError::SubmissionInProgress`] while another
    /// submission is running. An invalid form (e.g. no file) fails before the
    /// state changes and without any request being made.
    pub async fn submit(
        &self,
        form: SubmissionForm,
        fields: ExtractionFieldsProjection,
    ) -> Result<ExtractionReport> {
        let report = self
            .drive(form, fields, |backend, request| async move {
                backend.extract(&request).await
            })
            .await?;

        info!(
            document = %report.document_name,
            total = report.total_strategies,
            successful = report.successful_extractions,
            failed = report.failed_extractions,
            "Extraction complete"
        );
        Ok(report)
    }

    /// Run a single strategy against the document, with the same state and
    /// progress handling as [`submit`](Self::submit).
    pub async fn submit_single(
        &self,
        form: SubmissionForm,
        strategy_id: &str,
    ) -> Result<StrategyResult> {
        let strategy_id = strategy_id.to_string();
        let result = self
            .drive(form, ExtractionFieldsProjection::default(), |backend, request| async move {
                backend.extract_single(&request, &strategy_id).await
            })
            .await?;

        info!(
            strategy_id = %result.strategy_id,
            success = result.success,
            "Single-strategy extraction complete"
        );
        Ok(result)
    }

    async fn drive<T, F, Fut>(
        &self,
        form: SubmissionForm,
        fields: ExtractionFieldsProjection,
        call: F,
    ) -> Result<T>
    where
        F: FnOnce(Arc<B>, ExtractRequest) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let request = match form.into_request(fields) {
            Ok(request) => request,
            Err(e) => {
                // A running submission owns the progress value.
                if !self.is_submitting() {
                    self.progress.send_replace(Progress::Hidden);
                }
                return Err(e);
            }
        };

        let Some(_guard) = SubmittingGuard::acquire(&self.state) else {
            warn!("Submission rejected: another submission is in progress");
            return Err(BenchError::SubmissionInProgress);
        };

        info!(
            file = %request.file.file_name,
            provider = %request.provider,
            max_concurrent = request.max_concurrent,
            "Submitting extraction"
        );

        let ticker = ProgressTicker::start(Arc::clone(&self.progress), self.tick_interval);
        let outcome = call(Arc::clone(&self.backend), request).await;
        ticker.stop().await;

        match outcome {
            Ok(value) => {
                self.progress.send_replace(Progress::Complete);
                Ok(value)
            }
            Err(e) => {
                self.progress.send_replace(Progress::Hidden);
                warn!(error = %e, "Extraction failed");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{sample_form, sample_report, MockBackend, MockCall};

    #[test]
    fn test_guard_is_exclusive_and_resets() {
        let state = Arc::new(watch::channel(SubmissionState::Idle).0);

        let guard = SubmittingGuard::acquire(&state).unwrap();
        assert_eq!(*state.borrow(), SubmissionState::Submitting);
        assert!(SubmittingGuard::acquire(&state).is_none());

        drop(guard);
        assert_eq!(*state.borrow(), SubmissionState::Idle);
        assert!(SubmittingGuard::acquire(&state).is_some());
    }

    #[tokio::test]
    async fn test_idle_before_and_after() {
        let backend = Arc::new(MockBackend::new().with_report(sample_report()));
        let lifecycle = SubmissionLifecycle::new(backend);
        assert_eq!(lifecycle.state(), SubmissionState::Idle);
        assert_eq!(lifecycle.progress(), Progress::Hidden);

        let form = sample_form();
        lifecycle
            .submit(form, ExtractionFieldsProjection::default())
            .await
            .unwrap();

        assert_eq!(lifecycle.state(), SubmissionState::Idle);
        assert_eq!(lifecycle.progress(), Progress::Complete);
    }

    #[tokio::test]
    async fn test_invalid_form_never_enters_submitting() {
        let backend = Arc::new(MockBackend::new().with_report(sample_report()));
        let lifecycle = SubmissionLifecycle::new(Arc::clone(&backend));
        let mut state_rx = lifecycle.subscribe_state();

        let form = SubmissionForm {
            file: None,
            ..sample_form()
        };
        let err = lifecycle
            .submit(form, ExtractionFieldsProjection::default())
            .await
            .unwrap_err();

        assert!(matches!(err, BenchError::Validation(_)));
        assert!(!state_rx.has_changed().unwrap());
        assert_eq!(*state_rx.borrow_and_update(), SubmissionState::Idle);
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_submit_single_sends_strategy_id() {
        let backend = Arc::new(MockBackend::new().with_report(sample_report()));
        let lifecycle = SubmissionLifecycle::new(Arc::clone(&backend));

        let result = lifecycle
            .submit_single(sample_form(), "strategy_03")
            .await
            .unwrap();

        assert_eq!(result.strategy_name, "Chain of Thought");
        assert!(!result.success);
        assert_eq!(lifecycle.progress(), Progress::Complete);
        assert_eq!(lifecycle.state(), SubmissionState::Idle);
        assert!(matches!(
            &backend.calls()[..],
            [MockCall::ExtractSingle { strategy_id, .. }] if strategy_id == "strategy_03"
        ));
    }

    #[tokio::test]
    async fn test_submit_single_unknown_strategy_fails() {
        let backend = Arc::new(MockBackend::new().with_report(sample_report()));
        let lifecycle = SubmissionLifecycle::new(backend);

        let err = lifecycle
            .submit_single(sample_form(), "strategy_99")
            .await
            .unwrap_err();

        assert!(matches!(err, BenchError::Api { status: 404, .. }));
        assert_eq!(lifecycle.progress(), Progress::Hidden);
        assert_eq!(lifecycle.state(), SubmissionState::Idle);
    }
}
