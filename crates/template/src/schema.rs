//! Template JSON schema types

use crate::rows::RowLayout;
use crate::{Result, TemplateError};
use pdf_core::{CompositorOptions, DrawInstruction, PageSize, SideCopy};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;

/// RGB Color for text
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Color {
    /// Red component (0.0 - 1.0)
    pub r: f64,
    /// Green component (0.0 - 1.0)
    pub g: f64,
    /// Blue component (0.0 - 1.0)
    pub b: f64,
}

impl Color {
    pub fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    pub fn black() -> Self {
        Self::rgb(0.0, 0.0, 0.0)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::black()
    }
}

impl From<Color> for pdf_core::Color {
    fn from(c: Color) -> Self {
        pdf_core::Color::rgb(c.r, c.g, c.b)
    }
}

/// Text alignment
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

impl From<Align> for pdf_core::Align {
    fn from(align: Align) -> Self {
        match align {
            Align::Left => pdf_core::Align::Left,
            Align::Center => pdf_core::Align::Center,
            Align::Right => pdf_core::Align::Right,
        }
    }
}

/// Rectangle in template space (the background's pixel grid, y down)
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

impl From<Rect> for pdf_core::Rect {
    fn from(r: Rect) -> Self {
        pdf_core::Rect::new(r.x, r.y, r.width, r.height)
    }
}

/// Field kind; only affects wrapping
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum FieldKind {
    #[default]
    SingleLine,
    MultiLine,
    DateTime,
    Choice,
}

impl FieldKind {
    pub fn is_multiline(self) -> bool {
        matches!(self, FieldKind::MultiLine)
    }
}

fn default_font_size() -> f64 {
    14.0
}

fn default_page_index() -> u32 {
    1
}

/// One named field on a template page
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TemplateField {
    /// Lookup key, e.g. `name` or `row.clientName`
    pub key: String,

    #[serde(default)]
    pub label: String,

    #[serde(default)]
    pub kind: FieldKind,

    pub rect: Rect,

    /// Font size in template-space units
    #[serde(default = "default_font_size")]
    pub font_size: f64,

    #[serde(default)]
    pub alignment: Align,

    /// Editor hint only, never rendered
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
}

impl TemplateField {
    pub fn new(key: &str, label: &str, kind: FieldKind, rect: Rect) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            kind,
            rect,
            font_size: default_font_size(),
            alignment: Align::Left,
            placeholder: None,
        }
    }

    pub fn with_font_size(mut self, font_size: f64) -> Self {
        self.font_size = font_size;
        self
    }

    pub fn with_alignment(mut self, alignment: Align) -> Self {
        self.alignment = alignment;
        self
    }

    /// Draw instruction placing `text` in this field
    pub fn instruction(&self, text: impl Into<String>) -> DrawInstruction {
        let rect = self.rect.into();
        let align = self.alignment.into();
        if self.kind.is_multiline() {
            DrawInstruction::multi_line(text, rect, self.font_size, align)
        } else {
            DrawInstruction::single_line(text, rect, self.font_size, align)
        }
    }
}

/// One page of one form variant
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    /// Form variant name, e.g. "Medical Notes page 1"
    pub name: String,

    /// Background image reference
    pub background: String,

    /// 1-based page position within its document
    #[serde(default = "default_page_index")]
    pub page_index: u32,

    #[serde(default)]
    pub fields: Vec<TemplateField>,

    /// Repeating rows on this page, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows: Option<RowLayout>,
}

impl Template {
    pub fn new(name: &str, background: &str, page_index: u32) -> Self {
        Self {
            name: name.to_string(),
            background: background.to_string(),
            page_index,
            fields: Vec::new(),
            rows: None,
        }
    }

    pub fn with_field(mut self, field: TemplateField) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_rows(mut self, rows: RowLayout) -> Self {
        self.rows = Some(rows);
        self
    }

    /// Parse and validate a single template
    pub fn from_json(json: &str) -> Result<Self> {
        let template: Self =
            serde_json::from_str(json).map_err(|e| TemplateError::ParseError(e.to_string()))?;
        template.validate()?;
        Ok(template)
    }

    /// Keys unique, sizes non-negative, font sizes positive
    pub fn validate(&self) -> Result<()> {
        let mut keys = HashSet::new();
        for field in &self.fields {
            if !keys.insert(field.key.as_str()) {
                return Err(TemplateError::InvalidField(format!(
                    "{}: duplicate key '{}'",
                    self.name, field.key
                )));
            }
            check_rect(&field.key, &field.rect)?;
            if field.font_size.is_nan() || field.font_size <= 0.0 {
                return Err(TemplateError::InvalidField(format!(
                    "{}: font size must be positive",
                    field.key
                )));
            }
        }
        if let Some(rows) = &self.rows {
            rows.validate()?;
        }
        Ok(())
    }

    pub fn field(&self, key: &str) -> Option<&TemplateField> {
        self.fields.iter().find(|f| f.key == key)
    }

    pub fn field_mut(&mut self, key: &str) -> Option<&mut TemplateField> {
        self.fields.iter_mut().find(|f| f.key == key)
    }

    /// Move or resize a field; the key stays the same
    pub fn set_rect(&mut self, key: &str, rect: Rect) -> Result<()> {
        check_rect(key, &rect)?;
        let field = self
            .field_mut(key)
            .ok_or_else(|| TemplateError::InvalidField(format!("no field '{key}'")))?;
        field.rect = rect;
        Ok(())
    }
}

fn check_rect(key: &str, rect: &Rect) -> Result<()> {
    if rect.width.is_nan() || rect.height.is_nan() || rect.width < 0.0 || rect.height < 0.0 {
        return Err(TemplateError::InvalidField(format!(
            "{key}: width and height must not be negative"
        )));
    }
    Ok(())
}

/// The persisted template collection
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct TemplateSet {
    pub templates: Vec<Template>,
}

impl TemplateSet {
    pub fn new(templates: Vec<Template>) -> Self {
        Self { templates }
    }

    /// Parse a JSON array of templates and validate each
    pub fn from_json(json: &str) -> Result<Self> {
        let set: Self =
            serde_json::from_str(json).map_err(|e| TemplateError::ParseError(e.to_string()))?;
        for template in &set.templates {
            template.validate()?;
        }
        Ok(set)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn get(&self, name: &str) -> Option<&Template> {
        self.templates.iter().find(|t| t.name == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Template> {
        self.templates.iter_mut().find(|t| t.name == name)
    }

    /// Pages of the document whose backgrounds share `prefix`, by page index
    pub fn document(&self, prefix: &str) -> Vec<&Template> {
        let mut pages: Vec<&Template> = self
            .templates
            .iter()
            .filter(|t| t.background.starts_with(prefix))
            .collect();
        pages.sort_by_key(|t| t.page_index);
        pages
    }
}

/// Output page size in points
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PageSizeConfig {
    pub width: f64,
    pub height: f64,
}

impl Default for PageSizeConfig {
    fn default() -> Self {
        Self {
            width: PageSize::A4.width,
            height: PageSize::A4.height,
        }
    }
}

fn default_line_spacing() -> f64 {
    1.2
}

/// Renderer settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RenderConfig {
    #[serde(default)]
    pub page_size: PageSizeConfig,

    /// Line height as a multiple of the font size
    #[serde(default = "default_line_spacing")]
    pub line_spacing: f64,

    #[serde(default)]
    pub text_color: Color,

    /// Directory receiving a copy of the last rendered document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub side_copy_dir: Option<PathBuf>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            page_size: PageSizeConfig::default(),
            line_spacing: default_line_spacing(),
            text_color: Color::default(),
            side_copy_dir: None,
        }
    }
}

impl RenderConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| TemplateError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Page dimensions must be positive and finite, line spacing positive
    pub fn validate(&self) -> Result<()> {
        let PageSizeConfig { width, height } = self.page_size;
        if !(width.is_finite() && height.is_finite()) || width <= 0.0 || height <= 0.0 {
            return Err(TemplateError::InvalidField(format!(
                "pageSize: must be positive, got {width}x{height}"
            )));
        }
        if !self.line_spacing.is_finite() || self.line_spacing <= 0.0 {
            return Err(TemplateError::InvalidField(format!(
                "lineSpacing: must be positive, got {}",
                self.line_spacing
            )));
        }
        Ok(())
    }

    pub fn compositor_options(&self) -> CompositorOptions {
        CompositorOptions {
            page_size: PageSize::new(self.page_size.width, self.page_size.height),
            line_spacing: self.line_spacing,
            text_color: self.text_color.into(),
        }
    }

    pub fn side_copy(&self) -> Option<SideCopy> {
        self.side_copy_dir.as_ref().map(SideCopy::in_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const TEMPLATES: &str = r#"[
        {
            "name": "Medical Notes page 2",
            "background": "medical_notes_p2",
            "pageIndex": 2,
            "fields": [
                {"key": "plan", "kind": "multiLine", "rect": {"x": 80, "y": 300, "width": 1000, "height": 400}}
            ]
        },
        {
            "name": "Medical Notes page 1",
            "background": "medical_notes_p1",
            "pageIndex": 1,
            "fields": [
                {"key": "name", "label": "Name", "rect": {"x": 120, "y": 210, "width": 400, "height": 28},
                 "fontSize": 16, "alignment": "center", "placeholder": "Patient name"}
            ]
        },
        {
            "name": "Visit Log",
            "background": "visit_log",
            "fields": []
        }
    ]"#;

    #[test]
    fn test_parse_template_set() {
        let set = TemplateSet::from_json(TEMPLATES).unwrap();
        assert_eq!(set.templates.len(), 3);

        let page1 = set.get("Medical Notes page 1").unwrap();
        let name = page1.field("name").unwrap();
        assert_eq!(name.font_size, 16.0);
        assert_eq!(name.alignment, Align::Center);
        assert_eq!(name.kind, FieldKind::SingleLine);
        assert_eq!(name.placeholder.as_deref(), Some("Patient name"));

        let plan = set.get("Medical Notes page 2").unwrap().field("plan").unwrap();
        assert_eq!(plan.font_size, 14.0);
        assert!(plan.kind.is_multiline());
        assert_eq!(set.get("Visit Log").unwrap().page_index, 1);
    }

    #[test]
    fn test_document_orders_by_page_index() {
        let set = TemplateSet::from_json(TEMPLATES).unwrap();
        let names: Vec<&str> = set
            .document("medical_notes")
            .iter()
            .map(|t| t.name.as_str())
            .collect();
        assert_eq!(names, vec!["Medical Notes page 1", "Medical Notes page 2"]);
        assert!(set.document("consent").is_empty());
    }

    #[test]
    fn test_json_roundtrip_keeps_shape() {
        let set = TemplateSet::from_json(TEMPLATES).unwrap();
        let again = TemplateSet::from_json(&set.to_json().unwrap()).unwrap();
        assert_eq!(set, again);
        assert!(set.to_json().unwrap().trim_start().starts_with('['));
    }

    #[test]
    fn test_validate_rejects_duplicates_and_negative_sizes() {
        let dup = Template::new("t", "bg", 1)
            .with_field(TemplateField::new("a", "A", FieldKind::SingleLine, Rect::default()))
            .with_field(TemplateField::new("a", "A", FieldKind::SingleLine, Rect::default()));
        assert!(matches!(dup.validate(), Err(TemplateError::InvalidField(_))));

        let negative = Template::new("t", "bg", 1).with_field(TemplateField::new(
            "a",
            "A",
            FieldKind::SingleLine,
            Rect::new(0.0, 0.0, -1.0, 10.0),
        ));
        assert!(negative.validate().is_err());

        let zero_font = Template::new("t", "bg", 1).with_field(
            TemplateField::new("a", "A", FieldKind::SingleLine, Rect::default()).with_font_size(0.0),
        );
        assert!(zero_font.validate().is_err());
    }

    #[test]
    fn test_set_rect_keeps_key() {
        let mut template = Template::new("t", "bg", 1).with_field(TemplateField::new(
            "name",
            "Name",
            FieldKind::SingleLine,
            Rect::new(0.0, 0.0, 10.0, 10.0),
        ));
        template
            .set_rect("name", Rect::new(5.0, 6.0, 70.0, 8.0))
            .unwrap();
        assert_eq!(template.field("name").unwrap().rect, Rect::new(5.0, 6.0, 70.0, 8.0));

        assert!(template.set_rect("missing", Rect::default()).is_err());
        assert!(template
            .set_rect("name", Rect::new(0.0, 0.0, 10.0, -2.0))
            .is_err());
    }

    #[test]
    fn test_field_instruction() {
        let field = TemplateField::new(
            "plan",
            "Plan",
            FieldKind::MultiLine,
            Rect::new(1.0, 2.0, 3.0, 4.0),
        )
        .with_alignment(Align::Right);
        let instruction = field.instruction("Review");

        assert!(instruction.multiline);
        assert_eq!(instruction.align, pdf_core::Align::Right);
        assert_eq!(instruction.rect, pdf_core::Rect::new(1.0, 2.0, 3.0, 4.0));
        assert!(!TemplateField::new("d", "D", FieldKind::DateTime, Rect::default())
            .instruction("x")
            .multiline);
    }

    #[test]
    fn test_render_config_defaults() {
        let config = RenderConfig::from_json("{}").unwrap();
        assert_eq!(config, RenderConfig::default());

        let options = config.compositor_options();
        assert_eq!(options.page_size, PageSize::A4);
        assert_eq!(options.line_spacing, 1.2);
        assert!(config.side_copy().is_none());
    }

    #[test]
    fn test_render_config_side_copy() {
        let config = RenderConfig::from_json(
            r#"{"pageSize": {"width": 612, "height": 792}, "sideCopyDir": "/tmp/notefill"}"#,
        )
        .unwrap();
        assert_eq!(config.compositor_options().page_size, PageSize::new(612.0, 792.0));
        assert_eq!(
            config.side_copy().unwrap().path(),
            std::path::Path::new("/tmp/notefill/last-render.pdf")
        );
    }

    #[test]
    fn test_render_config_rejects_degenerate_values() {
        for json in [
            r#"{"lineSpacing": 0}"#,
            r#"{"lineSpacing": -1.5}"#,
            r#"{"pageSize": {"width": 0, "height": 0}}"#,
            r#"{"pageSize": {"width": 595, "height": -842}}"#,
        ] {
            assert!(
                matches!(RenderConfig::from_json(json), Err(TemplateError::InvalidField(_))),
                "{json} should be rejected"
            );
        }
    }

    #[test]
    fn test_render_config_validate() {
        let mut config = RenderConfig::default();
        assert!(config.validate().is_ok());

        config.line_spacing = f64::NAN;
        assert!(config.validate().is_err());

        config.line_spacing = 1.0;
        config.page_size.width = f64::INFINITY;
        assert!(config.validate().is_err());
    }
}
