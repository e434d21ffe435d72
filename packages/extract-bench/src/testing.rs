//! Testing utilities including a mock backend.
//!
//! Useful for exercising controllers and front ends without a running
//! benchmark service.

use async_trait::async_trait;
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::backend::BenchBackend;
use crate::error::{BenchError, Result};
use crate::request::{DocumentUpload, ExtractRequest, SubmissionForm};
use crate::types::{ExtractionReport, Strategy, StrategyPromptDetail, StrategyResult};

/// How the mock answers `extract`. `extract_single` answers with the
/// matching result of the report, or a 404 when there is none.
#[derive(Debug, Clone)]
pub enum MockOutcome {
    Report(ExtractionReport),
    Api { status: u16, message: String },
    Network(String),
}

/// Record of a call made to the mock backend.
#[derive(Debug, Clone, PartialEq)]
pub enum MockCall {
    ListStrategies,
    StrategyPrompt { strategy_id: String },
    Extract { request: ExtractRequest },
    ExtractSingle { request: ExtractRequest, strategy_id: String },
    Health,
}

/// A mock backend with configurable responses.
pub struct MockBackend {
    /// Catalog returned by `list_strategies`; `None` makes it fail
    strategies: Arc<RwLock<Option<Vec<Strategy>>>>,

    /// Prompts by strategy id
    prompts: Arc<RwLock<HashMap<String, StrategyPromptDetail>>>,

    /// Answer for `extract`
    outcome: Arc<RwLock<MockOutcome>>,

    /// Simulated time the extraction takes
    extract_delay: Duration,

    /// Call tracking for assertions
    calls: Arc<RwLock<Vec<MockCall>>>,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBackend {
    /// Empty catalog, no prompts, and an empty report for `extract`.
    pub fn new() -> Self {
        Self {
            strategies: Arc::new(RwLock::new(Some(Vec::new()))),
            prompts: Arc::new(RwLock::new(HashMap::new())),
            outcome: Arc::new(RwLock::new(MockOutcome::Report(empty_report()))),
            extract_delay: Duration::ZERO,
            calls: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub fn with_strategies(self, strategies: Vec<Strategy>) -> Self {
        self.set_strategies(Some(strategies));
        self
    }

    /// Make `list_strategies` fail with a 500.
    pub fn with_failing_catalog(self) -> Self {
        self.set_strategies(None);
        self
    }

    pub fn with_prompt(self, prompt: StrategyPromptDetail) -> Self {
        self.prompts
            .write()
            .unwrap()
            .insert(prompt.id.clone(), prompt);
        self
    }

    pub fn with_report(self, report: ExtractionReport) -> Self {
        self.set_outcome(MockOutcome::Report(report));
        self
    }

    pub fn with_api_error(self, status: u16, message: impl Into<String>) -> Self {
        self.set_outcome(MockOutcome::Api {
            status,
            message: message.into(),
        });
        self
    }

    pub fn with_network_error(self, message: impl Into<String>) -> Self {
        self.set_outcome(MockOutcome::Network(message.into()));
        self
    }

    pub fn with_extract_delay(mut self, delay: Duration) -> Self {
        self.extract_delay = delay;
        self
    }

    /// Change the catalog after construction; `None` makes it fail.
    pub fn set_strategies(&self, strategies: Option<Vec<Strategy>>) {
        *self.strategies.write().unwrap() = strategies;
    }

    /// Change the `extract` answer after construction.
    pub fn set_outcome(&self, outcome: MockOutcome) {
        *self.outcome.write().unwrap() = outcome;
    }

    /// All calls made so far.
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.read().unwrap().clone()
    }

    /// Requests passed to `extract`, in call order.
    pub fn extract_requests(&self) -> Vec<ExtractRequest> {
        self.calls
            .read()
            .unwrap()
            .iter()
            .filter_map(|c| match c {
                MockCall::Extract { request } => Some(request.clone()),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: MockCall) {
        self.calls.write().unwrap().push(call);
    }
}

#[async_trait]
impl BenchBackend for MockBackend {
    async fn list_strategies(&self) -> Result<Vec<Strategy>> {
        self.record(MockCall::ListStrategies);
        self.strategies
            .read()
            .unwrap()
            .clone()
            .ok_or_else(|| BenchError::Api {
                status: 500,
                message: "catalog unavailable".into(),
            })
    }

    async fn strategy_prompt(&self, strategy_id: &str) -> Result<StrategyPromptDetail> {
        self.record(MockCall::StrategyPrompt {
            strategy_id: strategy_id.to_string(),
        });
        self.prompts
            .read()
            .unwrap()
            .get(strategy_id)
            .cloned()
            .ok_or_else(|| BenchError::Api {
                status: 404,
                message: format!("Strategy not found: {}", strategy_id),
            })
    }

    async fn extract(&self, request: &ExtractRequest) -> Result<ExtractionReport> {
        self.record(MockCall::Extract {
            request: request.clone(),
        });

        if !self.extract_delay.is_zero() {
            tokio::time::sleep(self.extract_delay).await;
        }

        let outcome = self.outcome.read().unwrap().clone();
        match outcome {
            MockOutcome::Report(report) => Ok(report),
            MockOutcome::Api { status, message } => Err(BenchError::Api { status, message }),
            MockOutcome::Network(message) => Err(BenchError::Network(message)),
        }
    }

    async fn extract_single(
        &self,
        request: &ExtractRequest,
        strategy_id: &str,
    ) -> Result<StrategyResult> {
        self.record(MockCall::ExtractSingle {
            request: request.clone(),
            strategy_id: strategy_id.to_string(),
        });

        if !self.extract_delay.is_zero() {
            tokio::time::sleep(self.extract_delay).await;
        }

        let outcome = self.outcome.read().unwrap().clone();
        match outcome {
            MockOutcome::Report(report) => report
                .results
                .into_iter()
                .find(|r| r.strategy_id == strategy_id)
                .ok_or_else(|| BenchError::Api {
                    status: 404,
                    message: format!("Strategy not found: {}", strategy_id),
                }),
            MockOutcome::Api { status, message } => Err(BenchError::Api { status, message }),
            MockOutcome::Network(message) => Err(BenchError::Network(message)),
        }
    }

    async fn health(&self) -> Result<String> {
        self.record(MockCall::Health);
        Ok("healthy".to_string())
    }
}

/// A report with no results.
pub fn empty_report() -> ExtractionReport {
    ExtractionReport {
        document_name: "empty.txt".into(),
        timestamp: "2025-03-14T09:26:53".into(),
        results: Vec::new(),
        total_strategies: 0,
        successful_extractions: 0,
        failed_extractions: 0,
        average_execution_time: 0.0,
        best_strategy: None,
    }
}

/// A three-strategy report: two successes and one failure.
pub fn sample_report() -> ExtractionReport {
    ExtractionReport {
        document_name: "invoice.pdf".into(),
        timestamp: "2025-03-14T09:26:53.589793".into(),
        results: vec![
            StrategyResult {
                strategy_id: "strategy_01".into(),
                strategy_name: "Basic Extraction".into(),
                success: true,
                execution_time: 1.25,
                tokens_used: Some(812),
                cost: Some(0.0004),
                extracted_data: Some(json!({"invoice_number": "INV-001", "total": "42.00"})),
                error: None,
            },
            StrategyResult {
                strategy_id: "strategy_03".into(),
                strategy_name: "Chain of Thought".into(),
                success: false,
                execution_time: 0.4,
                tokens_used: None,
                cost: None,
                extracted_data: None,
                error: Some("rate limited".into()),
            },
            StrategyResult {
                strategy_id: "strategy_02".into(),
                strategy_name: "Structured Output".into(),
                success: true,
                execution_time: 0.9,
                tokens_used: None,
                cost: None,
                extracted_data: Some(json!("{\"invoice_number\": \"INV-001\"}")),
                error: None,
            },
        ],
        total_strategies: 3,
        successful_extractions: 2,
        failed_extractions: 1,
        average_execution_time: 0.85,
        best_strategy: Some("Basic Extraction".into()),
    }
}

pub fn sample_strategies() -> Vec<Strategy> {
    vec![
        Strategy {
            id: "strategy_01".into(),
            name: "Basic Extraction".into(),
            category: "baseline".into(),
            description: "Direct instruction with no scaffolding".into(),
            expected_cost: 0.0005,
        },
        Strategy {
            id: "strategy_02".into(),
            name: "Structured Output".into(),
            category: "format".into(),
            description: "Requests a strict JSON object".into(),
            expected_cost: 0.0007,
        },
    ]
}

pub fn sample_prompt(strategy_id: &str) -> StrategyPromptDetail {
    StrategyPromptDetail {
        id: strategy_id.to_string(),
        name: format!("Strategy {}", strategy_id),
        category: "baseline".into(),
        description: "Test strategy".into(),
        prompt_template: "Extract the following fields from the document:\n{document}".into(),
    }
}

/// A complete, valid submission form.
pub fn sample_form() -> SubmissionForm {
    SubmissionForm {
        file: Some(DocumentUpload::new("invoice.pdf", b"%PDF-1.4 test".to_vec())),
        provider: "openrouter".into(),
        max_concurrent: 5,
        model: None,
        api_key: None,
    }
}
