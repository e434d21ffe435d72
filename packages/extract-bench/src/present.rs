//! Turns a raw report into a ranked, display-ready view.
//!
//! Everything here is a pure function of the report. The summary numbers are
//! passed through from the service rather than recomputed.

use chrono::{DateTime, Local, NaiveDateTime};
use serde_json::Value;

use crate::types::{ExtractionReport, StrategyResult};

/// Token count placeholder when the service did not report one.
pub const NOT_AVAILABLE: &str = "N/A";

/// Error placeholder for a failed result without a message.
pub const UNKNOWN_ERROR: &str = "Unknown error";

/// Display model for a report.
#[derive(Debug, Clone, PartialEq)]
pub enum ResultsView {
    /// The report had no results at all
    Empty,
    Report(ReportView),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportView {
    pub document_name: String,
    /// Report timestamp formatted for display
    pub tested_at: String,
    /// Banner text; `None` hides the banner
    pub best_strategy: Option<String>,
    pub summary: SummaryView,
    /// Successes first, then fastest first
    pub cards: Vec<ResultCard>,
}

/// Counters copied from the report.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryView {
    pub total_strategies: u32,
    pub successful_extractions: u32,
    pub failed_extractions: u32,
    pub average_execution_time: f64,
}

impl SummaryView {
    pub fn average_time_label(&self) -> String {
        format!("{:.2}s", self.average_execution_time)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResultCard {
    pub strategy_id: String,
    pub strategy_name: String,
    pub success: bool,
    pub is_best: bool,
    pub execution_time: f64,
    pub tokens_used: Option<u64>,
    pub cost: f64,
    pub outcome: CardOutcome,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CardOutcome {
    /// Pretty-printed extracted data
    Extracted(String),
    /// Error message
    Failed(String),
}

impl ResultCard {
    pub fn cost_label(&self) -> String {
        format!("${:.4}", self.cost)
    }

    pub fn tokens_label(&self) -> String {
        self.tokens_used
            .map(|t| t.to_string())
            .unwrap_or_else(|| NOT_AVAILABLE.to_string())
    }

    pub fn time_label(&self) -> String {
        format!("{:.2}s", self.execution_time)
    }

    pub fn status_label(&self) -> &'static str {
        if self.success {
            "Success"
        } else {
            "Failed"
        }
    }
}

/// Build the display model for a report.
pub fn present(report: &ExtractionReport) -> ResultsView {
    if report.results.is_empty() {
        return ResultsView::Empty;
    }

    let best = report.best_strategy.as_deref();
    let mut best_marked = false;

    let cards = rank_results(&report.results)
        .into_iter()
        .map(|result| {
            let is_best = !best_marked && best == Some(result.strategy_name.as_str());
            best_marked |= is_best;
            card_for(result, is_best)
        })
        .collect();

    ResultsView::Report(ReportView {
        document_name: report.document_name.clone(),
        tested_at: format_timestamp(&report.timestamp),
        best_strategy: report.best_strategy.clone(),
        summary: SummaryView {
            total_strategies: report.total_strategies,
            successful_extractions: report.successful_extractions,
            failed_extractions: report.failed_extractions,
            average_execution_time: report.average_execution_time,
        },
        cards,
    })
}

/// Order results for display without touching the input.
///
/// `sort_by` is stable, so results equal on both keys keep their input order.
pub fn rank_results(results: &[StrategyResult]) -> Vec<&StrategyResult> {
    let mut ranked: Vec<&StrategyResult> = results.iter().collect();
    ranked.sort_by(|a, b| {
        b.success
            .cmp(&a.success)
            .then_with(|| a.execution_time.total_cmp(&b.execution_time))
    });
    ranked
}

/// Card for a result outside of any report, e.g. a single-strategy run.
pub fn result_card(result: &StrategyResult) -> ResultCard {
    card_for(result, false)
}

fn card_for(result: &StrategyResult, is_best: bool) -> ResultCard {
    let outcome = if result.success {
        CardOutcome::Extracted(format_extracted(result.extracted_data.as_ref()))
    } else {
        CardOutcome::Failed(
            result
                .error
                .clone()
                .filter(|e| !e.trim().is_empty())
                .unwrap_or_else(|| UNKNOWN_ERROR.to_string()),
        )
    };

    ResultCard {
        strategy_id: result.strategy_id.clone(),
        strategy_name: result.strategy_name.clone(),
        success: result.success,
        is_best,
        execution_time: result.execution_time,
        tokens_used: result.tokens_used,
        cost: result.cost.unwrap_or(0.0),
        outcome,
    }
}

/// Pretty-print extracted data. String payloads are parsed as JSON when they
/// hold JSON and shown unchanged otherwise.
pub fn format_extracted(data: Option<&Value>) -> String {
    match data {
        None => "null".to_string(),
        Some(Value::String(raw)) => match serde_json::from_str::<Value>(raw) {
            Ok(parsed) => pretty(&parsed),
            Err(_) => raw.clone(),
        },
        Some(value) => pretty(value),
    }
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// Render an ISO-8601 timestamp in local time. Unparsable input is returned as-is.
pub fn format_timestamp(raw: &str) -> String {
    const DISPLAY: &str = "%Y-%m-%d %H:%M:%S";

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.with_timezone(&Local).format(DISPLAY).to_string();
    }
    // Naive timestamps carry no zone; show them as written.
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return naive.format(DISPLAY).to_string();
    }
    raw.to_string()
}
