//! Assembly of the multipart `POST /extract` and `POST /extract-single` payloads.

use std::path::Path;

use reqwest::multipart::{Form, Part};

use crate::error::{BenchError, Result};
use crate::fields::ExtractionFieldsProjection;

/// Shown when a submission is attempted without a document.
pub const MISSING_FILE_MESSAGE: &str = "Please select a file";

/// A document selected for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl DocumentUpload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    /// Read a document from disk, keeping only its file name for the upload.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string());
        Ok(Self { file_name, bytes })
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// Raw form inputs as the user left them.
#[derive(Debug, Clone, Default)]
pub struct SubmissionForm {
    pub file: Option<DocumentUpload>,
    pub provider: String,
    pub max_concurrent: u32,
    pub model: Option<String>,
    pub api_key: Option<String>,
}

impl SubmissionForm {
    /// Check the form and combine it with the field projection.
    ///
    /// Blank `model` and `api_key` become `None` so they are left out of the
    /// payload instead of being sent as empty strings.
    pub fn into_request(self, fields: ExtractionFieldsProjection) -> Result<ExtractRequest> {
        let file = self
            .file
            .ok_or_else(|| BenchError::Validation(MISSING_FILE_MESSAGE.into()))?;

        let provider = self.provider.trim().to_string();
        if provider.is_empty() {
            return Err(BenchError::Validation("Please choose a provider".into()));
        }
        if self.max_concurrent == 0 {
            return Err(BenchError::Validation(
                "Max concurrent requests must be at least 1".into(),
            ));
        }

        Ok(ExtractRequest {
            file,
            provider,
            max_concurrent: self.max_concurrent,
            model: non_blank(self.model),
            api_key: non_blank(self.api_key),
            fields,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// A validated extraction request.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractRequest {
    pub file: DocumentUpload,
    pub provider: String,
    pub max_concurrent: u32,
    pub model: Option<String>,
    pub api_key: Option<String>,
    pub fields: ExtractionFieldsProjection,
}

impl ExtractRequest {
    /// The scalar (non-file) form parts, in send order.
    pub fn text_parts(&self) -> Result<Vec<(&'static str, String)>> {
        let mut parts = vec![
            ("provider", self.provider.clone()),
            ("max_concurrent", self.max_concurrent.to_string()),
        ];

        if let Some(model) = &self.model {
            parts.push(("model", model.clone()));
        }
        if let Some(api_key) = &self.api_key {
            parts.push(("api_key", api_key.clone()));
        }
        if let Some(schema) = &self.fields.schema {
            parts.push(("schema", serde_json::to_string(schema)?));
        }
        if let Some(truth) = &self.fields.ground_truth {
            parts.push(("ground_truth", serde_json::to_string(truth)?));
        }

        Ok(parts)
    }

    /// Form parts for a run of one strategy. Concurrency and fields do not
    /// apply there and are left out.
    pub fn single_text_parts(&self, strategy_id: &str) -> Vec<(&'static str, String)> {
        let mut parts = vec![
            ("strategy_id", strategy_id.to_string()),
            ("provider", self.provider.clone()),
        ];
        if let Some(model) = &self.model {
            parts.push(("model", model.clone()));
        }
        if let Some(api_key) = &self.api_key {
            parts.push(("api_key", api_key.clone()));
        }
        parts
    }

    /// Build the multipart body.
    pub fn to_multipart(&self) -> Result<Form> {
        Ok(self.form_with(self.text_parts()?))
    }

    /// Build the multipart body for `POST /extract-single`.
    pub fn to_single_multipart(&self, strategy_id: &str) -> Form {
        self.form_with(self.single_text_parts(strategy_id))
    }

    fn form_with(&self, parts: Vec<(&'static str, String)>) -> Form {
        let file = Part::bytes(self.file.bytes.clone()).file_name(self.file.file_name.clone());
        parts
            .into_iter()
            .fold(Form::new().part("file", file), |form, (name, value)| form.text(name, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::FieldSchemaModel;

    fn form() -> SubmissionForm {
        SubmissionForm {
            file: Some(DocumentUpload::new("invoice.pdf", b"%PDF-1.4".to_vec())),
            provider: "openrouter".into(),
            max_concurrent: 5,
            model: None,
            api_key: None,
        }
    }

    fn names(parts: &[(&'static str, String)]) -> Vec<&'static str> {
        parts.iter().map(|(n, _)| *n).collect()
    }

    #[test]
    fn test_missing_file_is_rejected() {
        let err = SubmissionForm {
            file: None,
            ..form()
        }
        .into_request(ExtractionFieldsProjection::default())
        .unwrap_err();

        assert!(matches!(err, BenchError::Validation(ref m) if m == MISSING_FILE_MESSAGE));
    }

    #[test]
    fn test_blank_provider_and_zero_concurrency_rejected() {
        let blank = SubmissionForm {
            provider: "  ".into(),
            ..form()
        };
        assert!(matches!(
            blank.into_request(ExtractionFieldsProjection::default()),
            Err(BenchError::Validation(_))
        ));

        let zero = SubmissionForm {
            max_concurrent: 0,
            ..form()
        };
        assert!(matches!(
            zero.into_request(ExtractionFieldsProjection::default()),
            Err(BenchError::Validation(_))
        ));
    }

    #[test]
    fn test_blank_optionals_are_omitted() {
        let request = SubmissionForm {
            model: Some("   ".into()),
            api_key: Some(String::new()),
            ..form()
        }
        .into_request(ExtractionFieldsProjection::default())
        .unwrap();

        assert_eq!(request.model, None);
        assert_eq!(request.api_key, None);

        let parts = request.text_parts().unwrap();
        assert_eq!(names(&parts), vec!["provider", "max_concurrent"]);
    }

    #[test]
    fn test_all_parts_present() {
        let mut model = FieldSchemaModel::new();
        model.add_named_field("vendor", Some("Acme".into()));
        model.add_named_field("total", None);

        let request = SubmissionForm {
            model: Some("google/gemini-2.5-flash".into()),
            api_key: Some("sk-or-test".into()),
            ..form()
        }
        .into_request(model.project())
        .unwrap();

        let parts = request.text_parts().unwrap();
        assert_eq!(
            names(&parts),
            vec!["provider", "max_concurrent", "model", "api_key", "schema", "ground_truth"]
        );
        assert_eq!(parts[1].1, "5");
        assert_eq!(parts[4].1, r#"{"vendor":"string","total":"string"}"#);
        assert_eq!(parts[5].1, r#"{"vendor":"Acme"}"#);
    }

    #[test]
    fn test_single_parts_skip_batch_only_values() {
        let mut model = FieldSchemaModel::new();
        model.add_named_field("vendor", Some("Acme".into()));

        let request = SubmissionForm {
            api_key: Some("sk-or-test".into()),
            ..form()
        }
        .into_request(model.project())
        .unwrap();

        let parts = request.single_text_parts("strategy_07");
        assert_eq!(names(&parts), vec!["strategy_id", "provider", "api_key"]);
        assert_eq!(parts[0].1, "strategy_07");
    }

    #[tokio::test]
    async fn test_document_from_path_keeps_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("receipt.txt");
        std::fs::write(&path, "Total: 12.00").unwrap();

        let doc = DocumentUpload::from_path(&path).await.unwrap();
        assert_eq!(doc.file_name, "receipt.txt");
        assert_eq!(doc.size(), 12);
    }
}
