//! Lentor exports
//!
//! Headers are fixed line prefixes. Every line after a header belongs to that
//! header's field until the next header line.

use crate::normalize::normalize_line_endings;
use crate::note::ParsedNote;
use std::collections::BTreeMap;
use tracing::debug;

/// One field of the Lentor format
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LentorField {
    pub key: String,
    pub label: String,
    /// Lower-case line prefixes, colon included
    pub prefixes: Vec<String>,
    /// Yes/No field
    pub boolean: bool,
}

impl LentorField {
    pub fn text(key: &str, label: &str, prefixes: &[&str]) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            prefixes: prefixes.iter().map(|p| p.to_lowercase()).collect(),
            boolean: false,
        }
    }

    pub fn flag(key: &str, label: &str, prefixes: &[&str]) -> Self {
        Self {
            boolean: true,
            ..Self::text(key, label, prefixes)
        }
    }
}

#[derive(Debug, Clone)]
pub struct LentorParser {
    fields: Vec<LentorField>,
    /// (prefix, field index), longest prefix first
    prefixes: Vec<(String, usize)>,
}

impl LentorParser {
    pub fn new(fields: Vec<LentorField>) -> Self {
        let mut prefixes: Vec<(String, usize)> = fields
            .iter()
            .enumerate()
            .flat_map(|(index, field)| {
                field
                    .prefixes
                    .iter()
                    .filter(|p| !p.trim().is_empty())
                    .map(move |p| (p.clone(), index))
            })
            .collect();
        prefixes.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(&b.0)));

        Self { fields, prefixes }
    }

    pub fn fields(&self) -> &[LentorField] {
        &self.fields
    }

    /// Field index and the rest of the line, if `line` opens a field
    fn header<'a>(&self, line: &'a str) -> Option<(usize, &'a str)> {
        self.prefixes.iter().find_map(|(prefix, index)| {
            strip_prefix_ignore_case(line, prefix).map(|rest| (*index, rest))
        })
    }

    pub fn parse(&self, text: &str) -> ParsedNote {
        let text = normalize_line_endings(text);

        let mut blocks: BTreeMap<usize, Vec<String>> = BTreeMap::new();
        let mut open: Option<usize> = None;

        for line in text.lines() {
            let trimmed = line.trim();
            if let Some((index, rest)) = self.header(trimmed) {
                open = Some(index);
                blocks
                    .entry(index)
                    .or_default()
                    .push(rest.trim().to_string());
            } else if let Some(index) = open {
                blocks
                    .entry(index)
                    .or_default()
                    .push(line.trim_end().to_string());
            }
        }

        let mut values = BTreeMap::new();
        for (index, lines) in blocks {
            let Some(field) = self.fields.get(index) else {
                continue;
            };
            let value = lines.join("\n").trim().to_string();
            let value = if field.boolean {
                normalize_flag(&value).to_string()
            } else {
                value
            };
            values.insert(field.key.clone(), value);
        }

        let note = ParsedNote::from_values(
            self.fields
                .iter()
                .map(|f| (f.key.as_str(), f.label.as_str())),
            values,
        );
        debug!(
            filled = note.filled.len(),
            empty = note.empty.len(),
            "parsed lentor note"
        );
        note
    }
}

impl Default for LentorParser {
    fn default() -> Self {
        Self::new(vec![
            LentorField::text("name", "Name", &["resident name:", "name:"]),
            LentorField::text("nric", "NRIC", &["nric:"]),
            LentorField::text("ward", "Ward", &["ward:"]),
            LentorField::text("date_of_visit", "Date", &["date:"]),
            LentorField::text("vitals", "Vitals", &["vitals:"]),
            LentorField::text("progress_notes", "Progress Notes", &["progress notes:", "notes:"]),
            LentorField::text("plan", "Plan", &["plan:"]),
            LentorField::flag("fall_risk", "Fall Risk", &["fall risk:"]),
            LentorField::flag("isolation", "Isolation", &["isolation:"]),
            LentorField::flag("doctor_review", "Doctor Review", &["doctor review required:"]),
        ])
    }
}

/// `"Yes"` for yes/y/✓/true (first word, any case), otherwise `"No"`
pub fn normalize_flag(value: &str) -> &'static str {
    let word = value
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .trim_matches(|c: char| c.is_ascii_punctuation())
        .to_lowercase();

    match word.as_str() {
        "yes" | "y" | "✓" | "true" => "Yes",
        _ => "No",
    }
}

fn strip_prefix_ignore_case<'a>(line: &'a str, prefix: &str) -> Option<&'a str> {
    let mut chars = line.char_indices();
    for expected in prefix.chars() {
        let (_, c) = chars.next()?;
        if !c.to_lowercase().eq(expected.to_lowercase()) {
            return None;
        }
    }
    let end = chars.next().map_or(line.len(), |(i, _)| i);
    Some(&line[end..])
}
