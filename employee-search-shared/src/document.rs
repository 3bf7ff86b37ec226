//! Flat key-value document type.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A flat record derived from one source row.
///
/// Fields map column names to JSON values. Missing cells are stored as an
/// explicit `null` rather than being omitted, so every document carries the
/// full set of columns that survived ingestion. No identity is assigned here;
/// the backend generates one on insert.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document {
    fields: Map<String, Value>,
}

impl Document {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field, replacing any previous value.
    pub fn insert(&mut self, field: impl Into<String>, value: Value) -> Option<Value> {
        self.fields.insert(field.into(), value)
    }

    /// Builder-style variant of [`Document::insert`].
    pub fn with_field(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// The field's value as a string slice, if it is a JSON string.
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.fields.get(field).and_then(Value::as_str)
    }

    pub fn contains_field(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// True if the field is present with a non-null value.
    pub fn has_value(&self, field: &str) -> bool {
        matches!(self.fields.get(field), Some(v) if !v.is_null())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }
}

impl From<Map<String, Value>> for Document {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_document_serializes_as_flat_object() {
        let doc = Document::new()
            .with_field("Employee ID", "E02002")
            .with_field("Age", 55)
            .with_field("Exit Date", Value::Null);

        let value = serde_json::to_value(&doc).unwrap();

        assert_eq!(
            value,
            json!({"Employee ID": "E02002", "Age": 55, "Exit Date": null})
        );
    }

    #[test]
    fn test_document_deserializes_from_source() {
        let doc: Document =
            serde_json::from_value(json!({"Department": "IT", "Gender": null})).unwrap();

        assert_eq!(doc.get_str("Department"), Some("IT"));
        assert!(doc.contains_field("Gender"));
        assert!(!doc.has_value("Gender"));
        assert!(doc.has_value("Department"));
    }
}
