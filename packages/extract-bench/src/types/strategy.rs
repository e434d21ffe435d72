use serde::{Deserialize, Serialize};

/// One backend-defined extraction method, as listed by `GET /strategies`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Strategy {
    pub id: String,
    pub name: String,
    pub category: String,
    pub description: String,
    /// Estimated cost per call in USD
    pub expected_cost: f64,
}

impl Strategy {
    /// Estimated cost formatted for display, e.g. `$0.0012`.
    pub fn cost_label(&self) -> String {
        format!("${:.4}", self.expected_cost)
    }
}

/// Metadata and prompt for a single strategy (`GET /strategy/{id}/prompt`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyPromptDetail {
    pub id: String,
    pub name: String,
    pub category: String,
    pub description: String,
    pub prompt_template: String,
}
