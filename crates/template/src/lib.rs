//! Template Engine - form templates and data binding
//!
//! This crate provides:
//! - Template JSON schema types (fields placed on a background's pixel grid)
//! - Field value resolution from any [`DataRecord`]
//! - Repeating-row layout for visit logs and attendance sheets
//! - Typed records for the built-in forms
//! - Multi-page form rendering through `pdf-core`
//!
//! # Example
//!
//! ```ignore
//! use template::{render_form, DirectoryImageSource, TemplateSet};
//! use pdf_core::DocumentRenderer;
//!
//! let set = TemplateSet::from_json(&std::fs::read_to_string("templates.json")?)?;
//! let images = DirectoryImageSource::new("backgrounds");
//! let record: serde_json::Value = serde_json::from_str(data_json)?;
//! let pdf_bytes = render_form(
//!     &set.document("medical_notes"),
//!     &record,
//!     &[] as &[template::VisitRow],
//!     &images,
//!     &DocumentRenderer::default(),
//! )?;
//! ```

mod binding;
mod forms;
mod images;
mod renderer;
mod rows;
mod schema;

pub use binding::{resolve_path, resolve_value, DataRecord, FieldValue, CHECK_GLYPH};
pub use forms::{MedicalNoteField, MedicalNoteRecord, VisitRow};
pub use images::{DirectoryImageSource, ImageSource, MemoryImageSource};
pub use renderer::{render_form, TemplateRenderer};
pub use rows::{offset_row_fields, RowLayout, ROW_PREFIX};
pub use schema::*;

use thiserror::Error;

/// Errors that can occur during template processing
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Failed to parse template: {0}")]
    ParseError(String),

    #[error("Invalid field: {0}")]
    InvalidField(String),

    #[error("Background image not found: {0}")]
    ImageNotFound(String),

    #[error("No template pages to render")]
    EmptyDocument,

    #[error("PDF error: {0}")]
    PdfError(#[from] pdf_core::PdfError),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type for template operations
pub type Result<T> = std::result::Result<T, TemplateError>;
