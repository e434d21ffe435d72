use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Outcome of one strategy run against the uploaded document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyResult {
    pub strategy_id: String,
    pub strategy_name: String,
    pub success: bool,

    /// Wall-clock seconds spent by the strategy
    pub execution_time: f64,

    #[serde(default, alias = "token_count", skip_serializing_if = "Option::is_none")]
    pub tokens_used: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,

    /// Present iff `success`. Either structured JSON or a string that may
    /// itself contain JSON.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extracted_data: Option<Value>,

    /// Present iff not `success`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Aggregate result of running every strategy once against one document.
///
/// The summary counters are computed by the backend and trusted as-is:
/// `total_strategies == successful_extractions + failed_extractions == results.len()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionReport {
    pub document_name: String,

    /// ISO-8601 timestamp, kept as sent
    pub timestamp: String,

    /// Empty when the key is absent or `null`
    #[serde(default, deserialize_with = "null_as_empty")]
    pub results: Vec<StrategyResult>,

    pub total_strategies: u32,
    pub successful_extractions: u32,
    pub failed_extractions: u32,
    pub average_execution_time: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best_strategy: Option<String>,
}

impl ExtractionReport {
    pub fn successful_results(&self) -> impl Iterator<Item = &StrategyResult> {
        self.results.iter().filter(|r| r.success)
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<StrategyResult>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<StrategyResult>>::deserialize(deserializer)?.unwrap_or_default())
}
