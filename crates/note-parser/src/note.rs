//! Parse result

use serde::Serialize;
use std::collections::BTreeMap;

/// Fields recovered from one note
///
/// Only fields that were found appear in `fields`; nothing is stored as an
/// empty string, so merging a result never blanks existing data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedNote {
    /// Canonical key -> extracted value
    pub fields: BTreeMap<String, String>,
    /// Labels of found fields, in catalog order
    pub filled: Vec<String>,
    /// Labels of missing fields, in catalog order
    pub empty: Vec<String>,
    /// `✓ Filled: …` and `○ Empty: …` lines
    pub summary: String,
}

impl ParsedNote {
    /// Build a result from `(key, label)` pairs in catalog order
    pub(crate) fn from_values<'a, I>(fields: I, mut values: BTreeMap<String, String>) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        values.retain(|_, value| !value.trim().is_empty());

        let mut filled = Vec::new();
        let mut empty = Vec::new();
        for (key, label) in fields {
            if values.contains_key(key) {
                filled.push(label.to_string());
            } else {
                empty.push(label.to_string());
            }
        }

        let summary = summarize(&filled, &empty);
        Self {
            fields: values,
            filled,
            empty,
            summary,
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    pub fn is_filled(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Copy values into `target` where it has no entry or an empty one
    ///
    /// Returns the number of entries written.
    pub fn merge_into(&self, target: &mut BTreeMap<String, String>) -> usize {
        let mut written = 0;
        for (key, value) in &self.fields {
            let slot = target.entry(key.clone()).or_default();
            if slot.trim().is_empty() {
                *slot = value.clone();
                written += 1;
            }
        }
        written
    }
}

fn summarize(filled: &[String], empty: &[String]) -> String {
    format!(
        "{}\n{}",
        summary_line("✓ Filled", filled),
        summary_line("○ Empty", empty)
    )
}

fn summary_line(title: &str, labels: &[String]) -> String {
    if labels.is_empty() {
        format!("{title}:")
    } else {
        format!("{title}: {}", labels.join(", "))
    }
}
