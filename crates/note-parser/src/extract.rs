//! Header-anchored extraction (AVIXO exports)

use crate::catalog::{FieldShape, HeaderCatalog};
use crate::header::{HeaderPatterns, HeaderSet};
use crate::normalize::normalize_line_endings;
use crate::note::ParsedNote;
use crate::Result;
use std::collections::BTreeMap;
use std::sync::LazyLock;
use tracing::debug;

static AVIXO: LazyLock<Option<NoteParser>> = LazyLock::new(|| NoteParser::avixo().ok());

/// Extract a one-line value for the first header synonym that yields one
///
/// Tries, for each header in order: `Header: value` on the same line, the
/// value on the next line, then a line-by-line scan. A candidate on the next
/// line is refused when it is itself a header line. Returns an empty string
/// when nothing is found.
pub fn parse_single_line_field(text: &str, headers: &[&str]) -> String {
    with_headers(headers)
        .map(|parser| parser.single_line(text, headers))
        .unwrap_or_default()
}

/// Extract the block of lines under the first header synonym that yields one
///
/// The block ends before the next recognized header line.
pub fn parse_multi_line_field(text: &str, headers: &[&str]) -> String {
    with_headers(headers)
        .map(|parser| parser.multi_line(text, headers))
        .unwrap_or_default()
}

/// Parse a note with the built-in AVIXO catalog
pub fn parse_document(text: &str) -> ParsedNote {
    AVIXO
        .as_ref()
        .map(|parser| parser.parse(text))
        .unwrap_or_default()
}

/// The AVIXO parser with `headers` also recognized as header lines
fn with_headers(headers: &[&str]) -> Option<NoteParser> {
    AVIXO.as_ref()?.with_extra_headers(headers).ok()
}

/// Parser for one header catalog
#[derive(Debug, Clone)]
pub struct NoteParser {
    catalog: HeaderCatalog,
    /// Compiled synonyms, parallel to `catalog.fields`
    patterns: Vec<Vec<HeaderPatterns>>,
    header_set: HeaderSet,
}

impl NoteParser {
    pub fn new(catalog: HeaderCatalog) -> Result<Self> {
        catalog.validate()?;

        let patterns = catalog
            .fields
            .iter()
            .map(|field| compile_headers(&field.headers))
            .collect::<Result<Vec<_>>>()?;
        let header_set = HeaderSet::new(catalog.all_headers())?;

        Ok(Self {
            catalog,
            patterns,
            header_set,
        })
    }

    pub fn avixo() -> Result<Self> {
        Self::new(HeaderCatalog::avixo())
    }

    pub fn catalog(&self) -> &HeaderCatalog {
        &self.catalog
    }

    pub fn header_set(&self) -> &HeaderSet {
        &self.header_set
    }

    /// Same parser, also treating `headers` as header lines
    pub fn with_extra_headers(&self, headers: &[&str]) -> Result<Self> {
        Ok(Self {
            catalog: self.catalog.clone(),
            patterns: self.patterns.clone(),
            header_set: self.header_set.extended(headers)?,
        })
    }

    pub fn is_header_line(&self, line: &str) -> bool {
        self.header_set.is_header_line(line)
    }

    /// Single-line extraction with ad-hoc header synonyms
    pub fn single_line(&self, text: &str, headers: &[&str]) -> String {
        let text = normalize_line_endings(text);
        self.single_line_with(&text, &compile_lenient(headers))
    }

    /// Multi-line extraction with ad-hoc header synonyms
    pub fn multi_line(&self, text: &str, headers: &[&str]) -> String {
        let text = normalize_line_endings(text);
        self.multi_line_with(&text, &compile_lenient(headers))
    }

    /// Extract every catalog field
    pub fn parse(&self, text: &str) -> ParsedNote {
        let text = normalize_line_endings(text);

        let mut values = BTreeMap::new();
        for (field, patterns) in self.catalog.fields.iter().zip(&self.patterns) {
            let value = match field.shape {
                FieldShape::SingleLine => self.single_line_with(&text, patterns),
                FieldShape::MultiLine => self.multi_line_with(&text, patterns),
            };
            if !value.is_empty() {
                values.insert(field.key.clone(), value);
            }
        }

        let note = ParsedNote::from_values(
            self.catalog
                .fields
                .iter()
                .map(|f| (f.key.as_str(), f.label.as_str())),
            values,
        );
        debug!(
            filled = note.filled.len(),
            empty = note.empty.len(),
            "parsed note"
        );
        note
    }

    fn single_line_with(&self, text: &str, patterns: &[HeaderPatterns]) -> String {
        patterns
            .iter()
            .find_map(|p| self.single_line_for(text, p))
            .unwrap_or_default()
    }

    fn multi_line_with(&self, text: &str, patterns: &[HeaderPatterns]) -> String {
        patterns
            .iter()
            .find_map(|p| self.multi_line_for(text, p))
            .unwrap_or_default()
    }

    fn single_line_for(&self, text: &str, p: &HeaderPatterns) -> Option<String> {
        // same line
        for caps in p.same_line.captures_iter(text) {
            let value = caps[1].trim();
            if !value.is_empty() {
                return Some(value.to_string());
            }
        }

        // next line
        for caps in p.next_line.captures_iter(text) {
            let value = caps[1].trim();
            if !value.is_empty() && !self.is_header_line(value) {
                return Some(value.to_string());
            }
        }

        // header at the start of any line
        let lines: Vec<&str> = text.lines().collect();
        for (index, line) in lines.iter().enumerate() {
            let Some(caps) = p.line_start.captures(line) else {
                continue;
            };

            let trailing = caps[1].trim();
            if !trailing.is_empty() {
                return Some(trailing.to_string());
            }

            let next = lines[index + 1..]
                .iter()
                .map(|l| l.trim())
                .find(|l| !l.is_empty());
            if let Some(next) = next {
                if !self.is_header_line(next) {
                    return Some(next.to_string());
                }
            }
        }

        None
    }

    fn multi_line_for(&self, text: &str, p: &HeaderPatterns) -> Option<String> {
        // header alone on its line
        for found in p.bare_line.find_iter(text) {
            let block = self.collect_block(None, after_line(text, found.end()));
            if !block.is_empty() {
                return Some(block);
            }
        }

        // header with content on the same line, plus continuation lines
        for caps in p.inline.captures_iter(text) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            let block = self.collect_block(Some(&caps[1]), after_line(text, whole.end()));
            if !block.is_empty() {
                return Some(block);
            }
        }

        None
    }

    /// Lines up to (not including) the next header line, trimmed as a block
    fn collect_block(&self, first: Option<&str>, rest: &str) -> String {
        let mut lines: Vec<&str> = first.into_iter().collect();
        for line in rest.lines() {
            if self.is_header_line(line) {
                break;
            }
            lines.push(line.trim_end());
        }
        lines.join("\n").trim().to_string()
    }
}

/// Text following the line that ends at `end`
fn after_line(text: &str, end: usize) -> &str {
    text[end..].strip_prefix('\n').unwrap_or_default()
}

fn compile_headers(headers: &[String]) -> Result<Vec<HeaderPatterns>> {
    headers
        .iter()
        .filter(|h| !h.trim().is_empty())
        .map(|h| HeaderPatterns::new(h))
        .collect()
}

/// Compile ad-hoc headers, skipping any that cannot be compiled
fn compile_lenient(headers: &[&str]) -> Vec<HeaderPatterns> {
    headers
        .iter()
        .filter(|h| !h.trim().is_empty())
        .filter_map(|h| HeaderPatterns::new(h).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::FieldSpec;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_same_line() {
        assert_eq!(parse_single_line_field("Pulse: 72 bpm\n", &["Pulse"]), "72 bpm");
    }

    #[test]
    fn test_blank_same_line_falls_through_to_next_line() {
        let text = "Temp:   \n  36.8 C\n";
        assert_eq!(parse_single_line_field(text, &["Temp"]), "36.8 C");
    }

    #[test]
    fn test_next_line_skips_blank_lines() {
        let text = "Name:\n\n   John Tan\nNRIC: S1234567A";
        assert_eq!(parse_single_line_field(text, &["Name"]), "John Tan");
    }

    #[test]
    fn test_first_synonym_wins() {
        let text = "Heart Rate: 80\nPulse: 72";
        assert_eq!(parse_single_line_field(text, &["Pulse", "Heart Rate"]), "72");
        assert_eq!(parse_single_line_field(text, &["Heart Rate", "Pulse"]), "80");
    }

    #[test]
    fn test_later_synonym_used_when_first_missing() {
        let text = "O2 Sat: 97%";
        assert_eq!(parse_single_line_field(text, &["SpO2", "O2 Sat"]), "97%");
    }

    #[test]
    fn test_missing_header_is_empty() {
        assert_eq!(parse_single_line_field("Name: John", &["NRIC"]), "");
        assert_eq!(parse_multi_line_field("Name: John", &["Plan"]), "");
        assert_eq!(parse_single_line_field("", &["Name"]), "");
    }

    #[test]
    fn test_colon_is_required() {
        assert_eq!(parse_single_line_field("BP 130/80", &["BP"]), "");
    }

    #[test]
    fn test_ad_hoc_header_stops_next_line() {
        // "Ward" is not in the built-in catalog but is passed in
        let text = "Bed:\nWard: 5A";
        assert_eq!(parse_single_line_field(text, &["Bed", "Ward"]), "5A");
    }

    #[test]
    fn test_multi_line_runs_to_end() {
        let text = "Plan:\nReview in 2 weeks\nRepeat HbA1c\n\n";
        assert_eq!(
            parse_multi_line_field(text, &["Plan"]),
            "Review in 2 weeks\nRepeat HbA1c"
        );
    }

    #[test]
    fn test_multi_line_inline_fallback() {
        let text = "Plan: Review in 2 weeks\nCall if worse\nIssues:\nnone";
        assert_eq!(
            parse_multi_line_field(text, &["Plan"]),
            "Review in 2 weeks\nCall if worse"
        );
    }

    #[test]
    fn test_multi_line_keeps_inner_blank_lines() {
        let text = "Examination:\nChest clear\n\nAbdomen soft\nPlan:\nnil";
        assert_eq!(
            parse_multi_line_field(text, &["Examination"]),
            "Chest clear\n\nAbdomen soft"
        );
    }

    #[test]
    fn test_multi_line_crlf() {
        let text = "PMH:\r\nHypertension\r\nPlan:\r\nnil";
        assert_eq!(parse_multi_line_field(text, &["PMH"]), "Hypertension");
    }

    #[test]
    fn test_custom_catalog() {
        let catalog = HeaderCatalog {
            fields: vec![
                FieldSpec::new("ward", "Ward", FieldShape::SingleLine, &["Ward"]),
                FieldSpec::new("notes", "Notes", FieldShape::MultiLine, &["Notes"]),
            ],
        };
        let parser = NoteParser::new(catalog).unwrap();
        let note = parser.parse("Ward: 3B\nNotes:\nComfortable overnight\n");

        assert_eq!(note.get("ward"), Some("3B"));
        assert_eq!(note.get("notes"), Some("Comfortable overnight"));
        assert_eq!(note.summary, "✓ Filled: Ward, Notes\n○ Empty:");
    }

    #[test]
    fn test_parser_recognizes_catalog_headers() {
        let parser = NoteParser::avixo().unwrap();
        assert!(parser.is_header_line("Presenting Complaint:"));
        assert!(parser.is_header_line("o/e: chest clear"));
        assert!(!parser.is_header_line("chest clear"));
    }
}
