//! Header patterns
//!
//! A header matches case-insensitively, any run of whitespace inside it
//! matches any run of whitespace in the text, a `/` may carry spaces on
//! either side, and it only counts as a header when followed by a colon.

use crate::{NoteParserError, Result};
use regex::Regex;

/// Regex fragment matching `header` (no anchors, no colon)
///
/// `"Client / NOK"`, `"Client/NOK"` and `"client/nok"` all produce a pattern
/// matching each other.
pub fn header_pattern(header: &str) -> String {
    let collapsed = header
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .replace(" /", "/")
        .replace("/ ", "/");

    collapsed
        .split('/')
        .map(|part| {
            part.split(' ')
                .map(regex::escape)
                .collect::<Vec<_>>()
                .join(r"\s+")
        })
        .collect::<Vec<_>>()
        .join(r"\s*/\s*")
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| NoteParserError::InvalidCatalog(e.to_string()))
}

/// `\b` when the header starts with a word character, so `BP` does not match `SBP:`
fn word_boundary(header: &str) -> &'static str {
    match header.trim_start().chars().next() {
        Some(c) if c.is_alphanumeric() || c == '_' => r"\b",
        _ => "",
    }
}

/// Compiled regexes for one header synonym
#[derive(Debug, Clone)]
pub(crate) struct HeaderPatterns {
    /// `Header: value` anywhere in the text
    pub same_line: Regex,
    /// `Header:` then the value on a following line
    pub next_line: Regex,
    /// `Header: rest` at the start of a single line
    pub line_start: Regex,
    /// `Header:` alone on its line
    pub bare_line: Regex,
    /// `Header: content` at the start of a line
    pub inline: Regex,
}

impl HeaderPatterns {
    pub(crate) fn new(header: &str) -> Result<Self> {
        let pat = header_pattern(header);
        let b = word_boundary(header);

        Ok(Self {
            same_line: compile(&format!(r"(?i){b}{pat}[ \t]*:[ \t]*([^\n]*)"))?,
            next_line: compile(&format!(r"(?i){b}{pat}[ \t]*:[ \t]*\n\s*([^\n]*)"))?,
            line_start: compile(&format!(r"(?i)^[ \t]*{pat}[ \t]*:[ \t]*(.*)$"))?,
            bare_line: compile(&format!(r"(?im)^[ \t]*{pat}[ \t]*:[ \t]*$"))?,
            inline: compile(&format!(r"(?im)^[ \t]*{pat}[ \t]*:[ \t]*(\S[^\n]*)$"))?,
        })
    }
}

/// Recognizes lines that start with any known header
#[derive(Debug, Clone)]
pub struct HeaderSet {
    headers: Vec<String>,
    line: Option<Regex>,
}

impl HeaderSet {
    pub fn new<I, S>(headers: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut headers: Vec<String> = headers
            .into_iter()
            .map(|h| h.as_ref().trim().to_string())
            .filter(|h| !h.is_empty())
            .collect();
        headers.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        headers.dedup();

        let line = if headers.is_empty() {
            None
        } else {
            let alternatives = headers
                .iter()
                .map(|h| header_pattern(h))
                .collect::<Vec<_>>()
                .join("|");
            Some(compile(&format!(r"(?i)^[ \t]*(?:{alternatives})[ \t]*:"))?)
        };

        Ok(Self { headers, line })
    }

    /// Known headers, longest first
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Same set plus `extra` headers
    pub fn extended<S: AsRef<str>>(&self, extra: &[S]) -> Result<Self> {
        Self::new(
            self.headers
                .iter()
                .map(String::as_str)
                .chain(extra.iter().map(|h| h.as_ref())),
        )
    }

    /// Whether `line` starts with a known header followed by a colon
    pub fn is_header_line(&self, line: &str) -> bool {
        self.line.as_ref().is_some_and(|re| re.is_match(line))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn matches(header: &str, text: &str) -> bool {
        Regex::new(&format!("(?i)^{}$", header_pattern(header)))
            .unwrap()
            .is_match(text)
    }

    #[test]
    fn test_pattern_spacing_and_slash() {
        assert!(matches("Client/NOK", "Client / NOK"));
        assert!(matches("Client / NOK", "client/nok"));
        assert!(matches("Date of Visit", "date  of\tvisit"));
        assert!(!matches("Date of Visit", "dateofvisit"));
    }

    #[test]
    fn test_pattern_escapes_metacharacters() {
        assert_eq!(header_pattern("O2 Sat (%)"), r"O2\s+Sat\s+\(%\)");
        assert!(matches("Temp.", "TEMP."));
        assert!(!matches("Temp.", "TempX"));
    }

    #[test]
    fn test_header_line_requires_colon() {
        let set = HeaderSet::new(["BP", "SpO2"]).unwrap();
        assert!(set.is_header_line("BP: 120/80"));
        assert!(set.is_header_line("  spo2 :"));
        assert!(!set.is_header_line("BP 120/80"));
        assert!(!set.is_header_line("Lying BP: 120/80"));
    }

    #[test]
    fn test_longest_header_first() {
        let set = HeaderSet::new(["Date", "Date of Visit", "BP"]).unwrap();
        assert_eq!(set.headers(), ["Date of Visit", "Date", "BP"]);
        assert!(set.is_header_line("Date of Visit: 01/02/2024"));
    }

    #[test]
    fn test_empty_set_matches_nothing() {
        let set = HeaderSet::new(Vec::<String>::new()).unwrap();
        assert!(!set.is_header_line("Name: x"));

        let extended = set.extended(&["Name"]).unwrap();
        assert!(extended.is_header_line("Name: x"));
    }

    #[test]
    fn test_same_line_word_boundary() {
        let patterns = HeaderPatterns::new("BP").unwrap();
        assert!(patterns.same_line.is_match("bp:130/80"));
        assert!(!patterns.same_line.is_match("SBP: 130"));
    }

    #[test]
    fn test_bare_and_inline() {
        let patterns = HeaderPatterns::new("Plan").unwrap();
        assert!(patterns.bare_line.is_match("x\nPlan:\ny"));
        assert!(!patterns.bare_line.is_match("Plan: review"));
        let caps = patterns.inline.captures("Plan: review\nmore").unwrap();
        assert_eq!(&caps[1], "review");
    }
}
