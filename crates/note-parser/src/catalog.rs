//! Canonical fields and their header synonyms

use crate::{NoteParserError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// How a field's value is laid out in the text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldShape {
    /// `Header: value` on one line (or the value on the next line)
    #[default]
    SingleLine,
    /// `Header:` on its own line followed by a block of lines
    MultiLine,
}

/// One canonical field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSpec {
    /// Canonical key in the parse result
    pub key: String,
    /// Human-readable name used in the summary
    pub label: String,
    #[serde(default)]
    pub shape: FieldShape,
    /// Header synonyms in priority order
    pub headers: Vec<String>,
}

impl FieldSpec {
    pub fn new(key: &str, label: &str, shape: FieldShape, headers: &[&str]) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            shape,
            headers: headers.iter().map(|h| h.to_string()).collect(),
        }
    }
}

/// Ordered list of canonical fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderCatalog {
    pub fields: Vec<FieldSpec>,
}

impl HeaderCatalog {
    /// The AVIXO clinical note export
    pub fn avixo() -> Self {
        use FieldShape::{MultiLine, SingleLine};

        Self {
            fields: vec![
                FieldSpec::new("name", "Name", SingleLine, &["Name", "Patient Name", "Client Name"]),
                FieldSpec::new("nric", "NRIC", SingleLine, &["NRIC", "NRIC/FIN", "IC", "IC No"]),
                FieldSpec::new(
                    "date_of_visit",
                    "Date of Visit",
                    SingleLine,
                    &["Date of Visit", "Visit Date", "Date"],
                ),
                FieldSpec::new("bp", "BP", SingleLine, &["BP", "Blood Pressure"]),
                FieldSpec::new("pulse", "Pulse", SingleLine, &["Pulse", "HR", "Heart Rate"]),
                FieldSpec::new("spo2", "SpO2", SingleLine, &["SpO2", "SPO2", "Spo2", "O2 Sat"]),
                FieldSpec::new("temperature", "Temp", SingleLine, &["Temp", "Temperature"]),
                FieldSpec::new(
                    "hypocount",
                    "Hypocount",
                    SingleLine,
                    &["Hypocount", "H/C", "CBG", "Glucose"],
                ),
                FieldSpec::new(
                    "past_medical_history",
                    "PMH",
                    MultiLine,
                    &["Past Medical History", "PMH", "PMHx"],
                ),
                FieldSpec::new(
                    "presenting_complaint",
                    "Complaint",
                    MultiLine,
                    &["Presenting Complaint", "Chief Complaint", "Complaint", "PC"],
                ),
                FieldSpec::new(
                    "issues",
                    "Issues",
                    MultiLine,
                    &["Issues", "Current Issues", "Problems"],
                ),
                FieldSpec::new(
                    "examination",
                    "Examination",
                    MultiLine,
                    &["Examination", "Physical Examination", "O/E"],
                ),
                FieldSpec::new("plan", "Plan", MultiLine, &["Plan", "Management Plan"]),
            ],
        }
    }

    /// Load a catalog from JSON and validate it
    pub fn from_json(json: &str) -> Result<Self> {
        let catalog: Self = serde_json::from_str(json)?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Keys must be unique and non-empty; every field needs a header
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for field in &self.fields {
            if field.key.trim().is_empty() {
                return Err(NoteParserError::InvalidCatalog(
                    "field key must not be empty".to_string(),
                ));
            }
            if !seen.insert(field.key.as_str()) {
                return Err(NoteParserError::InvalidCatalog(format!(
                    "duplicate field key '{}'",
                    field.key
                )));
            }
            if field.headers.iter().all(|h| h.trim().is_empty()) {
                return Err(NoteParserError::InvalidCatalog(format!(
                    "field '{}' has no headers",
                    field.key
                )));
            }
        }
        Ok(())
    }

    pub fn field(&self, key: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.key == key)
    }

    /// Every header synonym of every field
    pub fn all_headers(&self) -> impl Iterator<Item = &str> {
        self.fields
            .iter()
            .flat_map(|f| f.headers.iter().map(String::as_str))
    }
}

impl Default for HeaderCatalog {
    fn default() -> Self {
        Self::avixo()
    }
}
