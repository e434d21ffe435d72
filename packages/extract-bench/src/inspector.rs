//! On-demand lookup of a strategy's prompt template.

use std::sync::Arc;

use tracing::warn;

use crate::backend::BenchBackend;
use crate::error::Result;
use crate::types::StrategyPromptDetail;

/// Shown in place of the prompt when the lookup fails for any reason.
pub const PROMPT_UNAVAILABLE: &str = "Failed to load strategy prompt";

#[derive(Debug, Clone, PartialEq)]
pub enum PromptView {
    Detail(StrategyPromptDetail),
    Unavailable(String),
}

/// Fetches strategy prompts. Holds no state, so any number of lookups may run
/// at once and none of them interact with a running submission.
pub struct PromptInspector<B: ?Sized> {
    backend: Arc<B>,
}

impl<B: ?Sized> Clone for PromptInspector<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
        }
    }
}

impl<B: BenchBackend + ?Sized> PromptInspector<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self { backend }
    }

    pub async fn fetch_prompt(&self, strategy_id: &str) -> Result<StrategyPromptDetail> {
        self.backend.strategy_prompt(strategy_id).await
    }

    /// Fetch and fold any failure into a generic notice.
    pub async fn inspect(&self, strategy_id: &str) -> PromptView {
        match self.fetch_prompt(strategy_id).await {
            Ok(detail) => PromptView::Detail(detail),
            Err(e) => {
                warn!(strategy_id, error = %e, "Prompt lookup failed");
                PromptView::Unavailable(PROMPT_UNAVAILABLE.to_string())
            }
        }
    }
}
