//! Persisting a report to disk: full JSON, CSV summary, and per-strategy data.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::error::Result;
use crate::types::ExtractionReport;

/// One row of the CSV summary.
#[derive(Debug, Serialize)]
struct SummaryRow<'a> {
    #[serde(rename = "Strategy ID")]
    strategy_id: &'a str,
    #[serde(rename = "Strategy Name")]
    strategy_name: &'a str,
    #[serde(rename = "Success")]
    success: bool,
    #[serde(rename = "Execution Time")]
    execution_time: f64,
    #[serde(rename = "Cost")]
    cost: f64,
    #[serde(rename = "Tokens")]
    tokens: Option<u64>,
    #[serde(rename = "Error")]
    error: &'a str,
}

/// File-name stamp for a report, e.g. `20250314_092653`.
///
/// Taken from the report's own timestamp; falls back to the current UTC time
/// when that does not parse.
pub fn report_stamp(report: &ExtractionReport) -> String {
    const STAMP: &str = "%Y%m%d_%H%M%S";

    if let Ok(dt) = DateTime::parse_from_rfc3339(&report.timestamp) {
        return dt.format(STAMP).to_string();
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(&report.timestamp, "%Y-%m-%dT%H:%M:%S%.f") {
        return naive.format(STAMP).to_string();
    }
    Utc::now().format(STAMP).to_string()
}

/// Write the full report as pretty JSON to `report_<stamp>.json`.
pub fn save_json_report(report: &ExtractionReport, output_dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(output_dir)?;
    let path = output_dir.join(format!("report_{}.json", report_stamp(report)));
    fs::write(&path, serde_json::to_string_pretty(report)?)?;
    info!(path = %path.display(), "Saved JSON report");
    Ok(path)
}

/// Write one CSV row per result to `summary_<stamp>.csv`, in report order.
pub fn save_csv_summary(report: &ExtractionReport, output_dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(output_dir)?;
    let path = output_dir.join(format!("summary_{}.csv", report_stamp(report)));

    let mut wtr = csv::Writer::from_path(&path)?;
    for result in &report.results {
        wtr.serialize(SummaryRow {
            strategy_id: &result.strategy_id,
            strategy_name: &result.strategy_name,
            success: result.success,
            execution_time: result.execution_time,
            cost: result.cost.unwrap_or(0.0),
            tokens: result.tokens_used,
            error: result.error.as_deref().unwrap_or(""),
        })?;
    }
    wtr.flush()?;

    info!(path = %path.display(), rows = report.results.len(), "Saved CSV summary");
    Ok(path)
}

/// Write each successful result's data to `<strategy_id>_extracted.json`.
pub fn save_extracted_data(report: &ExtractionReport, output_dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(output_dir)?;

    let mut saved = Vec::new();
    for result in report.successful_results() {
        let Some(data) = &result.extracted_data else {
            continue;
        };

        let file_name = format!("{}_extracted.json", result.strategy_id.replace(['/', '\\'], "_"));
        let path = output_dir.join(file_name);
        fs::write(&path, serde_json::to_string_pretty(&normalize(data))?)?;
        saved.push(path);
    }

    info!(count = saved.len(), dir = %output_dir.display(), "Saved extracted data");
    Ok(saved)
}

/// Paths written by [`save_all`].
#[derive(Debug, Clone)]
pub struct SavedReport {
    pub json_report: PathBuf,
    pub csv_summary: PathBuf,
    pub extracted: Vec<PathBuf>,
}

/// Save the JSON report and CSV summary into `output_dir`, and the per-strategy
/// data into `output_dir/extracted_data`.
pub fn save_all(report: &ExtractionReport, output_dir: &Path) -> Result<SavedReport> {
    Ok(SavedReport {
        json_report: save_json_report(report, output_dir)?,
        csv_summary: save_csv_summary(report, output_dir)?,
        extracted: save_extracted_data(report, &output_dir.join("extracted_data"))?,
    })
}

// String payloads holding JSON are stored as the JSON they contain.
fn normalize(data: &Value) -> Value {
    match data {
        Value::String(raw) => serde_json::from_str(raw).unwrap_or_else(|_| data.clone()),
        other => other.clone(),
    }
}
