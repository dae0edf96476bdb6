//! Repeating rows (visit logs, attendance sheets)

use crate::binding::{resolve_value, DataRecord};
use crate::schema::{Template, TemplateField};
use crate::{Result, TemplateError};
use pdf_core::DrawInstruction;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Key prefix marking a field as part of the row prototype
pub const ROW_PREFIX: &str = "row.";

/// Prototype fields moved down to row `row_index`
///
/// Only `y` changes, by `row_index * row_height`.
pub fn offset_row_fields(
    prototype: &[TemplateField],
    row_index: usize,
    row_height: f64,
) -> Vec<TemplateField> {
    let dy = row_index as f64 * row_height;
    prototype
        .iter()
        .map(|field| {
            let mut field = field.clone();
            field.rect.y += dy;
            field
        })
        .collect()
}

fn default_prefix() -> String {
    ROW_PREFIX.to_string()
}

/// How a template lays out repeated records
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RowLayout {
    /// Fields whose key starts with this belong to the row prototype
    #[serde(default = "default_prefix")]
    pub prefix: String,

    /// Vertical distance between rows in template space
    pub row_height: f64,

    /// Rows past this many are not drawn
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_rows: Option<usize>,
}

impl RowLayout {
    pub fn new(row_height: f64) -> Self {
        Self {
            prefix: default_prefix(),
            row_height,
            max_rows: None,
        }
    }

    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.prefix = prefix.to_string();
        self
    }

    pub fn with_max_rows(mut self, max_rows: usize) -> Self {
        self.max_rows = Some(max_rows);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.prefix.is_empty() {
            return Err(TemplateError::InvalidField(
                "row prefix must not be empty".to_string(),
            ));
        }
        if self.row_height.is_nan() || self.row_height < 0.0 {
            return Err(TemplateError::InvalidField(
                "row height must not be negative".to_string(),
            ));
        }
        Ok(())
    }

    pub fn is_row_field(&self, field: &TemplateField) -> bool {
        field.key.starts_with(&self.prefix)
    }

    /// The template's row prototype fields
    pub fn prototype(&self, template: &Template) -> Vec<TemplateField> {
        template
            .fields
            .iter()
            .filter(|f| self.is_row_field(f))
            .cloned()
            .collect()
    }

    /// Key looked up in a row record (`row.clientName` -> `clientName`)
    pub fn row_key<'a>(&self, key: &'a str) -> &'a str {
        key.strip_prefix(self.prefix.as_str()).unwrap_or(key)
    }

    /// Draw instructions for `rows`, up to `max_rows`
    pub fn instructions<R: DataRecord>(
        &self,
        prototype: &[TemplateField],
        rows: &[R],
    ) -> Vec<DrawInstruction> {
        let limit = self.max_rows.unwrap_or(rows.len()).min(rows.len());
        if limit < rows.len() {
            debug!(
                rows = rows.len(),
                max_rows = limit,
                "dropping rows past the layout cap"
            );
        }

        let mut instructions = Vec::new();
        for (index, row) in rows.iter().take(limit).enumerate() {
            for field in offset_row_fields(prototype, index, self.row_height) {
                let text = resolve_value(row, self.row_key(&field.key));
                if !text.is_empty() {
                    instructions.push(field.instruction(text));
                }
            }
        }
        instructions
    }
}
