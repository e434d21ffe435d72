//! Client-side controller for the document extraction benchmark service.
//!
//! The service runs every extraction strategy it knows against an uploaded
//! document and returns a comparative report. This crate builds the request
//! (document, provider settings, field schema, ground truth), drives the
//! submission with a simulated progress indicator, and turns the report into
//! a ranked view.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use extract_bench::{BenchController, DocumentUpload, HttpBackend, SubmissionForm};
//!
//! let backend = Arc::new(HttpBackend::new("http://localhost:8000"));
//! let mut controller = BenchController::new(backend);
//! controller.load_strategies().await?;
//!
//! let id = controller.fields_mut().add_field();
//! controller.fields_mut().set_name(id, "invoice_number");
//!
//! let view = controller
//!     .submit(SubmissionForm {
//!         file: Some(DocumentUpload::from_path("invoice.pdf").await?),
//!         provider: "openrouter".into(),
//!         max_concurrent: 5,
//!         ..Default::default()
//!     })
//!     .await?;
//! ```

pub mod backend;
pub mod controller;
pub mod error;
pub mod export;
pub mod fields;
pub mod inspector;
pub mod lifecycle;
pub mod present;
pub mod progress;
pub mod request;
pub mod testing;
pub mod types;

pub use backend::{BenchBackend, HttpBackend, DEFAULT_BASE_URL};
pub use controller::BenchController;
pub use error::{BenchError, Result};
pub use fields::{ExtractionField, ExtractionFieldsProjection, FieldId, FieldSchemaModel, FieldType};
pub use inspector::{PromptInspector, PromptView};
pub use lifecycle::{SubmissionLifecycle, SubmissionState};
pub use present::{present, result_card, CardOutcome, ReportView, ResultCard, ResultsView, SummaryView};
pub use progress::Progress;
pub use request::{DocumentUpload, ExtractRequest, SubmissionForm};
pub use types::{ExtractionReport, Strategy, StrategyPromptDetail, StrategyResult};
