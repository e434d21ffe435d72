//! User-authored extraction fields and their projection into request maps.
//!
//! The model is the single source of truth for the field rows. Front ends
//! render it and write edits back through [`FieldSchemaModel::set_name`] and
//! [`FieldSchemaModel::set_ground_truth`]; nothing re-reads widget state.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Identifier of a field row. Monotonic within one model, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldId(u64);

impl FieldId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for FieldId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "field-{}", self.0)
    }
}

/// The only field type the backend accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
}

/// One row of the schema builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionField {
    pub id: FieldId,
    pub name: String,
    pub ground_truth: Option<String>,
}

/// Request-ready view of the field rows. Computed fresh for every submission.
///
/// Each map is `None` when no row contributes to it; the two are independent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExtractionFieldsProjection {
    pub schema: Option<IndexMap<String, FieldType>>,
    pub ground_truth: Option<IndexMap<String, String>>,
}

impl ExtractionFieldsProjection {
    pub fn is_empty(&self) -> bool {
        self.schema.is_none() && self.ground_truth.is_none()
    }
}

/// Ordered collection of field rows.
#[derive(Debug, Default)]
pub struct FieldSchemaModel {
    fields: Vec<ExtractionField>,
    next_id: u64,
}

impl FieldSchemaModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an empty row and return its id.
    pub fn add_field(&mut self) -> FieldId {
        let id = FieldId(self.next_id);
        self.next_id += 1;
        self.fields.push(ExtractionField {
            id,
            name: String::new(),
            ground_truth: None,
        });
        id
    }

    /// Append a row with its values already filled in.
    pub fn add_named_field(
        &mut self,
        name: impl Into<String>,
        ground_truth: Option<String>,
    ) -> FieldId {
        let id = self.add_field();
        self.set_name(id, name);
        self.set_ground_truth(id, ground_truth);
        id
    }

    /// Seed one row per key of a ground-truth JSON object.
    ///
    /// String values are used as-is; anything else is stored as compact JSON.
    pub fn add_ground_truth_entries(&mut self, entries: &Map<String, Value>) -> Vec<FieldId> {
        entries
            .iter()
            .map(|(name, value)| {
                let truth = match value {
                    Value::String(s) => s.clone(),
                    Value::Null => String::new(),
                    other => other.to_string(),
                };
                self.add_named_field(name.clone(), Some(truth))
            })
            .collect()
    }

    /// Delete a row. Unknown ids are ignored; returns whether a row was removed.
    pub fn remove_field(&mut self, id: FieldId) -> bool {
        let before = self.fields.len();
        self.fields.retain(|f| f.id != id);
        before != self.fields.len()
    }

    pub fn set_name(&mut self, id: FieldId, name: impl Into<String>) -> bool {
        match self.field_mut(id) {
            Some(field) => {
                field.name = name.into();
                true
            }
            None => false,
        }
    }

    pub fn set_ground_truth(&mut self, id: FieldId, value: Option<String>) -> bool {
        match self.field_mut(id) {
            Some(field) => {
                field.ground_truth = value;
                true
            }
            None => false,
        }
    }

    pub fn get(&self, id: FieldId) -> Option<&ExtractionField> {
        self.fields.iter().find(|f| f.id == id)
    }

    /// Rows in display order.
    pub fn fields(&self) -> &[ExtractionField] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Project the rows into the `schema` and `ground_truth` request maps.
    ///
    /// Names and values are trimmed; rows with an empty name are skipped. When
    /// two rows share a trimmed name the later row wins in both maps.
    pub fn project(&self) -> ExtractionFieldsProjection {
        let mut schema = IndexMap::new();
        let mut ground_truth = IndexMap::new();

        for field in &self.fields {
            let name = field.name.trim();
            if name.is_empty() {
                continue;
            }

            schema.insert(name.to_string(), FieldType::String);

            let truth = field.ground_truth.as_deref().map(str::trim).unwrap_or("");
            if !truth.is_empty() {
                ground_truth.insert(name.to_string(), truth.to_string());
            }
        }

        ExtractionFieldsProjection {
            schema: (!schema.is_empty()).then_some(schema),
            ground_truth: (!ground_truth.is_empty()).then_some(ground_truth),
        }
    }

    fn field_mut(&mut self, id: FieldId) -> Option<&mut ExtractionField> {
        self.fields.iter_mut().find(|f| f.id == id)
    }
}
