//! Multi-page document assembly

use crate::compositor::{
    ComposedPage, CompositorOptions, DrawInstruction, PageCompositor, BACKGROUND_IMAGE,
    FALLBACK_FONT, PRIMARY_FONT,
};
use crate::font::PageFont;
use crate::image::BackgroundImage;
use crate::{PdfError, Result};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Fixed filename of the side copy written after every render
pub const LAST_RENDER_FILENAME: &str = "last-render.pdf";

/// RGB Color (values 0.0 - 1.0)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Color {
    /// Create a new RGB color (values 0.0 - 1.0)
    pub fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    /// Create color from RGB values (0-255)
    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r as f64 / 255.0,
            g: g as f64 / 255.0,
            b: b as f64 / 255.0,
        }
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

/// One page to render: a background and the text placed on it
#[derive(Debug, Clone)]
pub struct PageSpec {
    pub background: BackgroundImage,
    pub instructions: Vec<DrawInstruction>,
}

impl PageSpec {
    pub fn new(background: BackgroundImage, instructions: Vec<DrawInstruction>) -> Self {
        Self {
            background,
            instructions,
        }
    }
}

/// Best-effort copy of the most recent render at a fixed location
///
/// Concurrent renders writing the same path race; the last writer wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SideCopy {
    path: PathBuf,
}

impl SideCopy {
    /// Side copy named [`LAST_RENDER_FILENAME`] inside `dir`
    pub fn in_dir<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            path: dir.as_ref().join(LAST_RENDER_FILENAME),
        }
    }

    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Overwrite the copy; failures are logged and reported as `false`
    pub fn write(&self, bytes: &[u8]) -> bool {
        match std::fs::write(&self.path, bytes) {
            Ok(()) => true,
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "failed to write side copy");
                false
            }
        }
    }

    /// Bytes of the last successful write, if any
    pub fn read_last(&self) -> Option<Vec<u8>> {
        std::fs::read(&self.path).ok()
    }
}

/// Sequences composed pages into a single PDF
///
/// # Example
/// ```ignore
/// let renderer = DocumentRenderer::default().with_side_copy(SideCopy::in_dir(cache_dir));
/// let bytes = renderer.render(&[PageSpec::new(background, instructions)])?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct DocumentRenderer {
    compositor: PageCompositor,
    side_copy: Option<SideCopy>,
}

impl DocumentRenderer {
    pub fn new(compositor: PageCompositor) -> Self {
        Self {
            compositor,
            side_copy: None,
        }
    }

    /// Use a different primary text font
    pub fn with_font(mut self, font: PageFont) -> Self {
        self.compositor.set_font(font);
        self
    }

    pub fn with_options(mut self, options: CompositorOptions) -> Self {
        self.compositor.set_options(options);
        self
    }

    pub fn with_side_copy(mut self, side_copy: SideCopy) -> Self {
        self.side_copy = Some(side_copy);
        self
    }

    pub fn compositor(&self) -> &PageCompositor {
        &self.compositor
    }

    pub fn side_copy(&self) -> Option<&SideCopy> {
        self.side_copy.as_ref()
    }

    /// Compose a single page without assembling a document
    pub fn compose_page(&self, page: &PageSpec) -> Result<ComposedPage> {
        self.compositor.compose(&page.background, &page.instructions)
    }

    /// Render pages, in order, into PDF bytes
    ///
    /// Fails with [`PdfError::EmptyDocument`] when `pages` is empty. The side
    /// copy, when configured, never causes a failure.
    pub fn render(&self, pages: &[PageSpec]) -> Result<Vec<u8>> {
        if pages.is_empty() {
            return Err(PdfError::EmptyDocument);
        }

        let composed = pages
            .iter()
            .map(|page| self.compose_page(page))
            .collect::<Result<Vec<_>>>()?;

        let bytes = self.assemble(&composed)?;

        if let Some(side_copy) = &self.side_copy {
            side_copy.write(&bytes);
        }

        debug!(pages = composed.len(), bytes = bytes.len(), "rendered document");

        Ok(bytes)
    }

    fn assemble(&self, pages: &[ComposedPage]) -> Result<Vec<u8>> {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();

        // fonts are shared by every page
        let used_chars: BTreeSet<char> = pages
            .iter()
            .flat_map(|page| page.used_chars.iter().copied())
            .collect();
        let font_id = self.compositor.font().embed(&mut doc, &used_chars);
        let fallback_id = pages
            .iter()
            .any(|page| page.uses_fallback)
            .then(|| self.compositor.fallback_font().embed(&mut doc, &BTreeSet::new()));

        let mut images = EmbeddedImages::default();
        let mut kids = Vec::with_capacity(pages.len());

        for page in pages {
            let image_id = images.object_id(&mut doc, &page.background);

            let mut fonts = Dictionary::new();
            fonts.set(PRIMARY_FONT, Object::Reference(font_id));
            if let Some(id) = fallback_id.filter(|_| page.uses_fallback) {
                fonts.set(FALLBACK_FONT, Object::Reference(id));
            }

            let mut xobjects = Dictionary::new();
            xobjects.set(BACKGROUND_IMAGE, Object::Reference(image_id));

            let content_id = doc.add_object(Stream::new(Dictionary::new(), page.content.clone()));

            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![
                    0.into(),
                    0.into(),
                    Object::Real(page.page_size.width as f32),
                    Object::Real(page.page_size.height as f32),
                ],
                "Resources" => dictionary! {
                    "XObject" => xobjects,
                    "Font" => fonts,
                },
                "Contents" => content_id,
            });
            kids.push(Object::Reference(page_id));
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer)
            .map_err(|e| PdfError::SaveError(e.to_string()))?;

        Ok(buffer)
    }
}

/// Background XObjects already added to a document
#[derive(Default)]
struct EmbeddedImages<'a> {
    by_key: BTreeMap<u64, Vec<(&'a BackgroundImage, ObjectId)>>,
}

impl<'a> EmbeddedImages<'a> {
    fn object_id(&mut self, doc: &mut Document, image: &'a BackgroundImage) -> ObjectId {
        self.object_id_for_key(doc, image.content_key(), image)
    }

    /// Reuse an object only for an equal image; keys may collide
    fn object_id_for_key(
        &mut self,
        doc: &mut Document,
        key: u64,
        image: &'a BackgroundImage,
    ) -> ObjectId {
        let embedded = self.by_key.entry(key).or_default();
        if let Some(&(_, id)) = embedded.iter().find(|(known, _)| *known == image) {
            return id;
        }

        let id = doc.add_object(image.to_pdf_stream());
        embedded.push((image, id));
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Align, Rect};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_color_from_rgb() {
        let color = Color::from_rgb(255, 0, 51);
        assert_eq!(color, Color::rgb(1.0, 0.0, 0.2));
        assert_eq!(Color::default(), Color::black());
    }

    #[test]
    fn test_empty_document() {
        let result = DocumentRenderer::default().render(&[]);
        assert!(matches!(result, Err(PdfError::EmptyDocument)));
    }

    #[test]
    fn test_identical_backgrounds_embedded_once() {
        let background = BackgroundImage::blank(10, 10).unwrap();
        let pages = vec![
            PageSpec::new(background.clone(), vec![]),
            PageSpec::new(background, vec![]),
        ];
        let bytes = DocumentRenderer::default().render(&pages).unwrap();
        let doc = Document::load_mem(&bytes).unwrap();

        let images = doc
            .objects
            .values()
            .filter(|obj| {
                obj.as_stream()
                    .ok()
                    .and_then(|s| s.dict.get(b"Subtype").ok())
                    .and_then(|s| s.as_name().ok())
                    == Some(b"Image".as_slice())
            })
            .count();
        assert_eq!(images, 1);
        assert_eq!(doc.get_pages().len(), 2);
    }

    #[test]
    fn test_colliding_image_keys_embed_both() {
        let white = BackgroundImage::blank(4, 4).unwrap();
        let black = BackgroundImage::from_rgb8(4, 4, &[0u8; 48]).unwrap();
        let mut doc = Document::with_version("1.7");
        let mut images = EmbeddedImages::default();

        let first = images.object_id_for_key(&mut doc, 7, &white);
        let second = images.object_id_for_key(&mut doc, 7, &black);
        let again = images.object_id_for_key(&mut doc, 7, &white);

        assert_ne!(first, second);
        assert_eq!(first, again);
        assert_eq!(doc.objects.len(), 2);
    }

    #[test]
    fn test_fallback_font_only_when_used() {
        let background = BackgroundImage::blank(100, 100).unwrap();
        let rect = Rect::new(0.0, 0.0, 50.0, 20.0);

        let plain = DocumentRenderer::default()
            .render(&[PageSpec::new(
                background.clone(),
                vec![DrawInstruction::single_line("A", rect, 10.0, Align::Left)],
            )])
            .unwrap();
        let checked = DocumentRenderer::default()
            .render(&[PageSpec::new(
                background,
                vec![DrawInstruction::single_line("✓", rect, 10.0, Align::Left)],
            )])
            .unwrap();

        let contains = |bytes: &[u8], needle: &[u8]| bytes.windows(needle.len()).any(|w| w == needle);
        assert!(!contains(&plain, b"ZapfDingbats"));
        assert!(contains(&checked, b"ZapfDingbats"));
    }

    #[test]
    fn test_side_copy_paths() {
        let copy = SideCopy::in_dir("/tmp/notefill");
        assert_eq!(copy.path(), Path::new("/tmp/notefill/last-render.pdf"));
    }

    #[test]
    fn test_side_copy_failure_is_swallowed() {
        let copy = SideCopy::new("/nonexistent-dir/for/sure/last-render.pdf");
        assert!(!copy.write(b"%PDF"));
        assert_eq!(copy.read_last(), None);

        let renderer = DocumentRenderer::default().with_side_copy(copy);
        let background = BackgroundImage::blank(10, 10).unwrap();
        assert!(renderer.render(&[PageSpec::new(background, vec![])]).is_ok());
    }
}
