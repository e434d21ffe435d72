//! Session-scoped owner of all client state.

use std::sync::Arc;

use tracing::{error, info};

use crate::backend::BenchBackend;
use crate::error::Result;
use crate::fields::FieldSchemaModel;
use crate::inspector::{PromptInspector, PromptView};
use crate::lifecycle::SubmissionLifecycle;
use crate::present::{present, ResultsView};
use crate::request::SubmissionForm;
use crate::types::{ExtractionReport, Strategy, StrategyResult};

/// Holds the strategy catalog, the field rows, and the current report for one
/// session, and wires the components together.
pub struct BenchController<B: ?Sized> {
    backend: Arc<B>,
    strategies: Vec<Strategy>,
    fields: FieldSchemaModel,
    lifecycle: SubmissionLifecycle<B>,
    inspector: PromptInspector<B>,
    current_report: Option<ExtractionReport>,
}

impl<B: BenchBackend + ?Sized> BenchController<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self::with_lifecycle(Arc::clone(&backend), SubmissionLifecycle::new(backend))
    }

    /// Use a preconfigured lifecycle (e.g. a custom tick interval).
    pub fn with_lifecycle(backend: Arc<B>, lifecycle: SubmissionLifecycle<B>) -> Self {
        Self {
            inspector: PromptInspector::new(Arc::clone(&backend)),
            backend,
            strategies: Vec::new(),
            fields: FieldSchemaModel::new(),
            lifecycle,
            current_report: None,
        }
    }

    /// Fetch the catalog and replace the current one wholesale.
    ///
    /// On failure the previous catalog is kept.
    pub async fn load_strategies(&mut self) -> Result<&[Strategy]> {
        match self.backend.list_strategies().await {
            Ok(strategies) => {
                info!(count = strategies.len(), "Loaded strategy catalog");
                self.strategies = strategies;
                Ok(&self.strategies)
            }
            Err(e) => {
                error!(error = %e, "Error loading strategies");
                Err(e)
            }
        }
    }

    pub fn strategies(&self) -> &[Strategy] {
        &self.strategies
    }

    pub fn fields(&self) -> &FieldSchemaModel {
        &self.fields
    }

    pub fn fields_mut(&mut self) -> &mut FieldSchemaModel {
        &mut self.fields
    }

    pub fn lifecycle(&self) -> &SubmissionLifecycle<B> {
        &self.lifecycle
    }

    pub fn inspector(&self) -> &PromptInspector<B> {
        &self.inspector
    }

    pub fn current_report(&self) -> Option<&ExtractionReport> {
        self.current_report.as_ref()
    }

    /// Display model of the current report, if any.
    pub fn current_view(&self) -> Option<ResultsView> {
        self.current_report.as_ref().map(present)
    }

    /// Submit the form with the current field rows.
    ///
    /// A successful report replaces the current one; a failure leaves the
    /// previous report untouched.
    pub async fn submit(&mut self, form: SubmissionForm) -> Result<ResultsView> {
        let projection = self.fields.project();
        let report = self.lifecycle.submit(form, projection).await?;
        let view = present(&report);
        self.current_report = Some(report);
        Ok(view)
    }

    /// Run one strategy against the document. The current report is left
    /// untouched.
    pub async fn submit_single(
        &self,
        form: SubmissionForm,
        strategy_id: &str,
    ) -> Result<StrategyResult> {
        self.lifecycle.submit_single(form, strategy_id).await
    }

    pub async fn inspect_prompt(&self, strategy_id: &str) -> PromptView {
        self.inspector.inspect(strategy_id).await
    }
}
