//! WASM bindings for notefill
//!
//! This crate provides JavaScript-friendly API for:
//! - Loading form templates and their background images
//! - Rendering filled forms to PDF
//! - Extracting fields from pasted clinical notes
//!
//! # Example (JavaScript)
//!
//! ```javascript
//! import init, { FormTemplate, parseNote, fillEmpty } from 'notefill-wasm';
//!
//! await init();
//!
//! const form = FormTemplate.fromJson(templatesJson);
//! form.loadBackground('medical_notes_p1', p1Bytes);
//! form.loadBackground('medical_notes_p2', p2Bytes);
//!
//! // Only empty fields are filled from the pasted note
//! const record = fillEmpty(currentRecord, pastedText);
//! const pdf = form.render('medical_notes', record, []);
//!
//! const { fields, summary } = parseNote(pastedText);
//! ```

use note_parser::NoteFormat;
use pdf_core::{BackgroundImage, DocumentRenderer, PageFont};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use template::{MemoryImageSource, RenderConfig, TemplateSet};
use wasm_bindgen::prelude::*;

// Initialize panic hook for better error messages in browser console
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

fn js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Maps become plain objects, not `Map`s
fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    Ok(value.serialize(&serde_wasm_bindgen::Serializer::json_compatible())?)
}

/// Form templates plus everything needed to render them
#[wasm_bindgen]
pub struct FormTemplate {
    templates: TemplateSet,
    images: MemoryImageSource,
    font: Option<PageFont>,
    config: RenderConfig,
}

#[wasm_bindgen]
impl FormTemplate {
    /// Create an empty template collection
    #[wasm_bindgen(constructor)]
    pub fn new() -> FormTemplate {
        FormTemplate {
            templates: TemplateSet::default(),
            images: MemoryImageSource::new(),
            font: None,
            config: RenderConfig::default(),
        }
    }

    /// Create from the persisted template JSON array
    ///
    /// @param json - Template collection JSON string
    /// @returns FormTemplate instance
    #[wasm_bindgen(js_name = fromJson)]
    pub fn from_json(json: &str) -> Result<FormTemplate, JsValue> {
        let templates = TemplateSet::from_json(json).map_err(js_error)?;
        Ok(FormTemplate {
            templates,
            ..FormTemplate::new()
        })
    }

    /// Template collection as JSON, for persisting edits
    #[wasm_bindgen(js_name = toJson)]
    pub fn to_json(&self) -> Result<String, JsValue> {
        self.templates.to_json().map_err(js_error)
    }

    /// Set renderer options
    ///
    /// @param json - RenderConfig JSON (pageSize, lineSpacing, textColor)
    #[wasm_bindgen(js_name = setConfig)]
    pub fn set_config(&mut self, json: &str) -> Result<(), JsValue> {
        self.config = RenderConfig::from_json(json).map_err(js_error)?;
        Ok(())
    }

    /// Load a background image
    ///
    /// @param reference - Background reference used by the templates
    /// @param data - PNG or JPEG file bytes (Uint8Array)
    #[wasm_bindgen(js_name = loadBackground)]
    pub fn load_background(&mut self, reference: &str, data: &[u8]) -> Result<(), JsValue> {
        let image = BackgroundImage::from_bytes(data).map_err(js_error)?;
        self.images.insert(reference, image);
        Ok(())
    }

    /// Use a TrueType font instead of Helvetica
    ///
    /// @param name - Font name written to the PDF
    /// @param data - TTF file bytes (Uint8Array)
    #[wasm_bindgen(js_name = loadFont)]
    pub fn load_font(&mut self, name: &str, data: &[u8]) -> Result<(), JsValue> {
        self.font = Some(PageFont::truetype(name, data).map_err(js_error)?);
        Ok(())
    }

    /// Render every page whose background starts with `prefix`
    ///
    /// @param prefix - Background prefix naming the document, e.g. "medical_notes"
    /// @param data - Record object for binding
    /// @param rows - Optional array of row objects
    /// @returns PDF bytes (Uint8Array)
    pub fn render(&self, prefix: &str, data: JsValue, rows: JsValue) -> Result<Vec<u8>, JsValue> {
        let record: Value = serde_wasm_bindgen::from_value(data)?;
        let rows: Vec<Value> = if rows.is_undefined() || rows.is_null() {
            Vec::new()
        } else {
            serde_wasm_bindgen::from_value(rows)?
        };

        self.render_value(prefix, &record, &rows).map_err(js_error)
    }
}

impl FormTemplate {
    fn renderer(&self) -> DocumentRenderer {
        let mut renderer = DocumentRenderer::default().with_options(self.config.compositor_options());
        if let Some(font) = &self.font {
            renderer = renderer.with_font(font.clone());
        }
        if let Some(side_copy) = self.config.side_copy() {
            renderer = renderer.with_side_copy(side_copy);
        }
        renderer
    }

    fn render_value(&self, prefix: &str, record: &Value, rows: &[Value]) -> template::Result<Vec<u8>> {
        template::render_form(
            &self.templates.document(prefix),
            record,
            rows,
            &self.images,
            &self.renderer(),
        )
    }
}

impl Default for FormTemplate {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse an AVIXO note
///
/// @param text - Pasted note text
/// @returns { fields, filled, empty, summary }
#[wasm_bindgen(js_name = parseNote)]
pub fn parse_note(text: &str) -> Result<JsValue, JsValue> {
    to_js(&NoteFormat::Avixo.parse(text))
}

/// Parse a Lentor note
///
/// @param text - Pasted note text
/// @returns { fields, filled, empty, summary }
#[wasm_bindgen(js_name = parseLentorNote)]
pub fn parse_lentor_note(text: &str) -> Result<JsValue, JsValue> {
    to_js(&NoteFormat::Lentor.parse(text))
}

/// Extract one single-line field
///
/// @param text - Pasted note text
/// @param headers - Header synonyms in priority order
/// @returns The value, or "" when not found
#[wasm_bindgen(js_name = parseSingleLineField)]
pub fn parse_single_line_field(text: &str, headers: Vec<String>) -> String {
    let headers: Vec<&str> = headers.iter().map(String::as_str).collect();
    note_parser::parse_single_line_field(text, &headers)
}

/// Extract one multi-line section
///
/// @param text - Pasted note text
/// @param headers - Header synonyms in priority order
/// @returns The section text, or "" when not found
#[wasm_bindgen(js_name = parseMultiLineField)]
pub fn parse_multi_line_field(text: &str, headers: Vec<String>) -> String {
    let headers: Vec<&str> = headers.iter().map(String::as_str).collect();
    note_parser::parse_multi_line_field(text, &headers)
}

/// Fill the empty entries of a flat record from a pasted AVIXO note
///
/// @param record - Object of string values
/// @param text - Pasted note text
/// @returns The updated record
#[wasm_bindgen(js_name = fillEmpty)]
pub fn fill_empty(record: JsValue, text: &str) -> Result<JsValue, JsValue> {
    let mut record: BTreeMap<String, String> = if record.is_undefined() || record.is_null() {
        BTreeMap::new()
    } else {
        serde_wasm_bindgen::from_value(record)?
    };
    NoteFormat::Avixo.parse(text).merge_into(&mut record);
    to_js(&record)
}
