//! Typed errors for the benchmark client.
//!
//! Uses `thiserror` for library errors (not `anyhow`) so front ends can match
//! on the failure class and pick what to show.

use thiserror::Error;

/// Result type for benchmark client operations.
pub type Result<T> = std::result::Result<T, BenchError>;

/// Message shown when the backend fails without a readable reason.
pub const GENERIC_EXTRACTION_FAILURE: &str = "Extraction failed";

/// Message shown when the backend could not be reached at all.
pub const GENERIC_NETWORK_FAILURE: &str = "Could not reach the extraction service";

/// Errors that can occur while talking to the benchmark service.
#[derive(Debug, Error)]
pub enum BenchError {
    /// Input rejected before any request was made (e.g. no file selected)
    #[error("{0}")]
    Validation(String),

    /// Another submission is still in flight
    #[error("a submission is already in progress")]
    SubmissionInProgress,

    /// Non-2xx response from the backend
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// No response at all (connection refused, DNS, reset)
    #[error("network error: {0}")]
    Network(String),

    /// Response arrived but could not be decoded
    #[error("parse error: {0}")]
    Parse(String),

    /// Filesystem error while exporting a report
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV encoding error while exporting a report
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON encoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl BenchError {
    /// The text a front end should put in front of the user.
    ///
    /// Structured backend messages are surfaced verbatim; transport failures
    /// collapse to a generic message.
    pub fn user_message(&self) -> String {
        match self {
            BenchError::Validation(msg) => msg.clone(),
            BenchError::Api { message, .. } => message.clone(),
            BenchError::Network(_) => GENERIC_NETWORK_FAILURE.to_string(),
            BenchError::Parse(_) => GENERIC_EXTRACTION_FAILURE.to_string(),
            other => other.to_string(),
        }
    }
}

impl From<reqwest::Error> for BenchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            BenchError::Parse(err.to_string())
        } else {
            BenchError::Network(err.to_string())
        }
    }
}
