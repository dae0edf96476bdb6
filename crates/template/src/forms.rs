//! Typed records for the built-in forms

use crate::binding::{DataRecord, FieldValue};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Fields of the medical notes form
///
/// Keys match the clinical note parser's canonical keys so a parsed note can
/// be merged straight in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MedicalNoteField {
    Name,
    Nric,
    DateOfVisit,
    Bp,
    Pulse,
    Spo2,
    Temperature,
    Hypocount,
    PastMedicalHistory,
    PresentingComplaint,
    Issues,
    Examination,
    Plan,
}

impl MedicalNoteField {
    pub const ALL: [MedicalNoteField; 13] = [
        MedicalNoteField::Name,
        MedicalNoteField::Nric,
        MedicalNoteField::DateOfVisit,
        MedicalNoteField::Bp,
        MedicalNoteField::Pulse,
        MedicalNoteField::Spo2,
        MedicalNoteField::Temperature,
        MedicalNoteField::Hypocount,
        MedicalNoteField::PastMedicalHistory,
        MedicalNoteField::PresentingComplaint,
        MedicalNoteField::Issues,
        MedicalNoteField::Examination,
        MedicalNoteField::Plan,
    ];

    pub fn key(self) -> &'static str {
        match self {
            MedicalNoteField::Name => "name",
            MedicalNoteField::Nric => "nric",
            MedicalNoteField::DateOfVisit => "date_of_visit",
            MedicalNoteField::Bp => "bp",
            MedicalNoteField::Pulse => "pulse",
            MedicalNoteField::Spo2 => "spo2",
            MedicalNoteField::Temperature => "temperature",
            MedicalNoteField::Hypocount => "hypocount",
            MedicalNoteField::PastMedicalHistory => "past_medical_history",
            MedicalNoteField::PresentingComplaint => "presenting_complaint",
            MedicalNoteField::Issues => "issues",
            MedicalNoteField::Examination => "examination",
            MedicalNoteField::Plan => "plan",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.key() == key)
    }
}

/// Medical notes form data
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MedicalNoteRecord {
    pub name: String,
    pub nric: String,
    pub date_of_visit: String,
    pub bp: String,
    pub pulse: String,
    pub spo2: String,
    pub temperature: String,
    pub hypocount: String,
    pub past_medical_history: String,
    pub presenting_complaint: String,
    pub issues: String,
    pub examination: String,
    pub plan: String,
}

impl MedicalNoteRecord {
    pub fn get(&self, field: MedicalNoteField) -> &str {
        match field {
            MedicalNoteField::Name => &self.name,
            MedicalNoteField::Nric => &self.nric,
            MedicalNoteField::DateOfVisit => &self.date_of_visit,
            MedicalNoteField::Bp => &self.bp,
            MedicalNoteField::Pulse => &self.pulse,
            MedicalNoteField::Spo2 => &self.spo2,
            MedicalNoteField::Temperature => &self.temperature,
            MedicalNoteField::Hypocount => &self.hypocount,
            MedicalNoteField::PastMedicalHistory => &self.past_medical_history,
            MedicalNoteField::PresentingComplaint => &self.presenting_complaint,
            MedicalNoteField::Issues => &self.issues,
            MedicalNoteField::Examination => &self.examination,
            MedicalNoteField::Plan => &self.plan,
        }
    }

    pub fn get_mut(&mut self, field: MedicalNoteField) -> &mut String {
        match field {
            MedicalNoteField::Name => &mut self.name,
            MedicalNoteField::Nric => &mut self.nric,
            MedicalNoteField::DateOfVisit => &mut self.date_of_visit,
            MedicalNoteField::Bp => &mut self.bp,
            MedicalNoteField::Pulse => &mut self.pulse,
            MedicalNoteField::Spo2 => &mut self.spo2,
            MedicalNoteField::Temperature => &mut self.temperature,
            MedicalNoteField::Hypocount => &mut self.hypocount,
            MedicalNoteField::PastMedicalHistory => &mut self.past_medical_history,
            MedicalNoteField::PresentingComplaint => &mut self.presenting_complaint,
            MedicalNoteField::Issues => &mut self.issues,
            MedicalNoteField::Examination => &mut self.examination,
            MedicalNoteField::Plan => &mut self.plan,
        }
    }

    pub fn set(&mut self, field: MedicalNoteField, value: impl Into<String>) {
        *self.get_mut(field) = value.into();
    }

    /// Copy parsed values into fields that are still empty
    ///
    /// Unknown keys are ignored. Returns the number of fields written.
    pub fn fill_empty(&mut self, values: &BTreeMap<String, String>) -> usize {
        let mut written = 0;
        for (key, value) in values {
            let Some(field) = MedicalNoteField::from_key(key) else {
                continue;
            };
            let slot = self.get_mut(field);
            if slot.trim().is_empty() && !value.trim().is_empty() {
                *slot = value.clone();
                written += 1;
            }
        }
        written
    }
}

impl DataRecord for MedicalNoteRecord {
    fn value(&self, key: &str) -> FieldValue {
        MedicalNoteField::from_key(key)
            .map_or(FieldValue::Missing, |f| FieldValue::Text(self.get(f).to_string()))
    }
}

/// One line of a visit log or attendance sheet
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VisitRow {
    pub date: String,
    pub client_name: String,
    pub remarks: String,
    pub attended: bool,
}

impl VisitRow {
    pub fn new(date: &str, client_name: &str, attended: bool) -> Self {
        Self {
            date: date.to_string(),
            client_name: client_name.to_string(),
            remarks: String::new(),
            attended,
        }
    }
}

impl DataRecord for VisitRow {
    fn value(&self, key: &str) -> FieldValue {
        match key {
            "date" => FieldValue::Text(self.date.clone()),
            "clientName" => FieldValue::Text(self.client_name.clone()),
            "remarks" => FieldValue::Text(self.remarks.clone()),
            "attended" => FieldValue::Flag(self.attended),
            _ => FieldValue::Missing,
        }
    }
}
