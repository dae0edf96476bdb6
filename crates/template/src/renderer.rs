//! Template rendering

use crate::binding::{resolve_value, DataRecord};
use crate::images::ImageSource;
use crate::schema::Template;
use crate::{Result, TemplateError};
use pdf_core::{BackgroundImage, DocumentRenderer, DrawInstruction, PageSpec};
use tracing::debug;

/// Template renderer
///
/// Turns one template plus a record (and optional repeated rows) into draw
/// instructions for the page compositor.
pub struct TemplateRenderer<'a> {
    /// The template to render
    template: &'a Template,
}

impl<'a> TemplateRenderer<'a> {
    /// Create a new renderer for a template
    pub fn new(template: &'a Template) -> Self {
        Self { template }
    }

    pub fn template(&self) -> &Template {
        self.template
    }

    /// Draw instructions for every field that has a value
    ///
    /// Row prototype fields are laid out once per row when the template has a
    /// row layout; without one every field is looked up in `record`.
    pub fn instructions<R, W>(&self, record: &R, rows: &[W]) -> Vec<DrawInstruction>
    where
        R: DataRecord + ?Sized,
        W: DataRecord,
    {
        let layout = self.template.rows.as_ref();

        let mut instructions: Vec<DrawInstruction> = self
            .template
            .fields
            .iter()
            .filter(|field| !layout.is_some_and(|l| l.is_row_field(field)))
            .filter_map(|field| {
                let text = resolve_value(record, &field.key);
                (!text.is_empty()).then(|| field.instruction(text))
            })
            .collect();

        if let Some(layout) = layout {
            let prototype = layout.prototype(self.template);
            instructions.extend(layout.instructions(&prototype, rows));
        }

        instructions
    }

    /// One page spec on `background`
    pub fn page<R, W>(&self, background: BackgroundImage, record: &R, rows: &[W]) -> PageSpec
    where
        R: DataRecord + ?Sized,
        W: DataRecord,
    {
        PageSpec::new(background, self.instructions(record, rows))
    }
}

/// Render a multi-page form
///
/// Pages are ordered by `page_index`; each page's background comes from
/// `images`. The same `rows` are offered to every page with a row layout.
pub fn render_form<R, W, S>(
    templates: &[&Template],
    record: &R,
    rows: &[W],
    images: &S,
    renderer: &DocumentRenderer,
) -> Result<Vec<u8>>
where
    R: DataRecord + ?Sized,
    W: DataRecord,
    S: ImageSource + ?Sized,
{
    if templates.is_empty() {
        return Err(TemplateError::EmptyDocument);
    }

    let mut ordered = templates.to_vec();
    ordered.sort_by_key(|t| t.page_index);

    let mut pages = Vec::with_capacity(ordered.len());
    for template in ordered {
        let background = images.load(&template.background)?;
        pages.push(TemplateRenderer::new(template).page(background, record, rows));
    }

    debug!(pages = pages.len(), "rendering form");
    Ok(renderer.render(&pages)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::VisitRow;
    use crate::rows::RowLayout;
    use crate::schema::{FieldKind, Rect, TemplateField};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn visit_log() -> Template {
        Template::new("Visit Log", "visit_log", 1)
            .with_field(TemplateField::new(
                "clinic",
                "Clinic",
                FieldKind::SingleLine,
                Rect::new(100.0, 50.0, 300.0, 30.0),
            ))
            .with_field(TemplateField::new(
                "row.clientName",
                "Client",
                FieldKind::SingleLine,
                Rect::new(100.0, 200.0, 300.0, 30.0),
            ))
            .with_field(TemplateField::new(
                "row.attended",
                "Attended",
                FieldKind::Choice,
                Rect::new(420.0, 200.0, 30.0, 30.0),
            ))
            .with_rows(RowLayout::new(40.0).with_max_rows(10))
    }

    #[test]
    fn test_static_and_row_fields() {
        let template = visit_log();
        let record = json!({"clinic": "Lentor"});
        let rows = vec![
            VisitRow::new("01/03", "Tan", true),
            VisitRow::new("01/03", "Lim", false),
        ];

        let instructions = TemplateRenderer::new(&template).instructions(&record, &rows);
        let placed: Vec<(&str, f64)> = instructions
            .iter()
            .map(|i| (i.text.as_str(), i.rect.y))
            .collect();

        assert_eq!(
            placed,
            vec![("Lentor", 50.0), ("Tan", 200.0), ("✓", 200.0), ("Lim", 240.0)]
        );
    }

    #[test]
    fn test_without_row_layout_keys_are_plain_paths() {
        let mut template = visit_log();
        template.rows = None;
        let record = json!({"row": {"clientName": "Goh"}});

        let instructions =
            TemplateRenderer::new(&template).instructions(&record, &[] as &[VisitRow]);
        assert_eq!(instructions.len(), 1);
        assert_eq!(instructions[0].text, "Goh");
    }

    #[test]
    fn test_placeholder_not_rendered() {
        let mut field = TemplateField::new(
            "nric",
            "NRIC",
            FieldKind::SingleLine,
            Rect::new(0.0, 0.0, 100.0, 20.0),
        );
        field.placeholder = Some("S1234567A".to_string());
        let template = Template::new("t", "bg", 1).with_field(field);

        let record: BTreeMap<String, String> = BTreeMap::new();
        let instructions =
            TemplateRenderer::new(&template).instructions(&record, &[] as &[VisitRow]);
        assert!(instructions.is_empty());
    }

    #[test]
    fn test_render_form_requires_pages() {
        let images = crate::images::MemoryImageSource::new();
        let result = render_form(
            &[],
            &json!({}),
            &[] as &[VisitRow],
            &images,
            &DocumentRenderer::default(),
        );
        assert!(matches!(result, Err(TemplateError::EmptyDocument)));
    }

    #[test]
    fn test_render_form_missing_background() {
        let template = visit_log();
        let images = crate::images::MemoryImageSource::new();
        let result = render_form(
            &[&template],
            &json!({}),
            &[] as &[VisitRow],
            &images,
            &DocumentRenderer::default(),
        );
        assert!(matches!(result, Err(TemplateError::ImageNotFound(_))));
    }
}
