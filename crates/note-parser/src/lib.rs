//! Note Parser - structured fields from pasted clinical notes
//!
//! This crate provides:
//! - Header-anchored extraction for AVIXO-style exports (`Header: value`
//!   lines and multi-line sections), driven by a configurable header catalog
//! - Prefix-header accumulation for Lentor-style exports
//! - A fill/empty summary for every parse
//!
//! Parsing never fails: fields whose header is missing are simply absent.
//!
//! # Example
//!
//! ```ignore
//! use note_parser::{parse_document, parse_single_line_field};
//!
//! assert_eq!(parse_single_line_field("BP : 130/80", &["BP"]), "130/80");
//!
//! let note = parse_document(&pasted_text);
//! println!("{}", note.summary);
//! ```

mod catalog;
mod extract;
mod header;
mod lentor;
mod normalize;
mod note;

pub use catalog::{FieldShape, FieldSpec, HeaderCatalog};
pub use extract::{parse_document, parse_multi_line_field, parse_single_line_field, NoteParser};
pub use header::{header_pattern, HeaderSet};
pub use lentor::{normalize_flag, LentorField, LentorParser};
pub use normalize::normalize_line_endings;
pub use note::ParsedNote;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while building a parser
#[derive(Debug, Error)]
pub enum NoteParserError {
    #[error("Invalid header catalog: {0}")]
    InvalidCatalog(String),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Result type for note parser operations
pub type Result<T> = std::result::Result<T, NoteParserError>;

/// Export format of a pasted note
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteFormat {
    #[default]
    Avixo,
    Lentor,
}

impl NoteFormat {
    /// Parse `text` with the built-in parser for this format
    pub fn parse(self, text: &str) -> ParsedNote {
        match self {
            NoteFormat::Avixo => parse_document(text),
            NoteFormat::Lentor => LentorParser::default().parse(text),
        }
    }
}
