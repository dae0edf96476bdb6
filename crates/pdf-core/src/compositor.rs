//! Page composition: background plus text draw instructions on one page

use crate::document::Color;
use crate::font::{PageFont, StandardFont};
use crate::geometry::{PageSize, PageTransform, Rect};
use crate::image::{fmt_num, generate_image_operators, BackgroundImage};
use crate::text::{
    calculate_x_offset, generate_text_operators, truncate_to_width, wrap_lines, TextRenderContext,
};
use crate::{Align, PdfError, Result};
use std::collections::BTreeSet;
use tracing::debug;

/// Resource name of the page background
pub(crate) const BACKGROUND_IMAGE: &str = "Im1";
/// Resource name of the primary text font
pub(crate) const PRIMARY_FONT: &str = "F1";
/// Resource name of the per-character fallback font
pub(crate) const FALLBACK_FONT: &str = "F2";

/// Drawn in place of characters no font can draw
const REPLACEMENT_CHAR: char = '?';

/// One piece of text to place on a page
///
/// The rectangle is in template space (the background's pixel grid).
#[derive(Debug, Clone, PartialEq)]
pub struct DrawInstruction {
    pub text: String,
    pub rect: Rect,
    /// Font size in template-space units
    pub font_size: f64,
    pub align: Align,
    /// Wrap at word boundaries and top-align instead of centering one line
    pub multiline: bool,
}

impl DrawInstruction {
    pub fn single_line(text: impl Into<String>, rect: Rect, font_size: f64, align: Align) -> Self {
        Self {
            text: text.into(),
            rect,
            font_size,
            align,
            multiline: false,
        }
    }

    pub fn multi_line(text: impl Into<String>, rect: Rect, font_size: f64, align: Align) -> Self {
        Self {
            text: text.into(),
            rect,
            font_size,
            align,
            multiline: true,
        }
    }
}

/// Page-level layout options
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompositorOptions {
    /// Fixed output page size
    pub page_size: PageSize,
    /// Line height as a multiple of the font size (multi-line text)
    pub line_spacing: f64,
    pub text_color: Color,
}

impl CompositorOptions {
    /// Reject options that would collapse the page or stack wrapped lines
    pub fn validate(&self) -> Result<()> {
        let PageSize { width, height } = self.page_size;
        if !(width.is_finite() && height.is_finite()) || width <= 0.0 || height <= 0.0 {
            return Err(PdfError::InvalidOptions(format!(
                "page size must be positive, got {width}x{height}"
            )));
        }
        if !self.line_spacing.is_finite() || self.line_spacing <= 0.0 {
            return Err(PdfError::InvalidOptions(format!(
                "line spacing must be positive, got {}",
                self.line_spacing
            )));
        }
        Ok(())
    }
}

impl Default for CompositorOptions {
    fn default() -> Self {
        Self {
            page_size: PageSize::A4,
            line_spacing: 1.2,
            text_color: Color::black(),
        }
    }
}

/// A page's content stream plus what the document needs to embed for it
#[derive(Debug, Clone)]
pub struct ComposedPage {
    pub page_size: PageSize,
    pub transform: PageTransform,
    pub background: BackgroundImage,
    /// Uncompressed content stream operators
    pub content: Vec<u8>,
    /// Characters drawn with the primary font
    pub used_chars: BTreeSet<char>,
    /// Whether any character fell back to the fallback font
    pub uses_fallback: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FontSlot {
    Primary,
    Fallback,
}

/// A run of consecutive characters drawn with the same font
#[derive(Debug)]
struct TextRun {
    text: String,
    slot: FontSlot,
}

/// Lays text out over a background on a fixed-size page
#[derive(Debug, Clone)]
pub struct PageCompositor {
    font: PageFont,
    fallback: PageFont,
    options: CompositorOptions,
}

impl Default for PageCompositor {
    fn default() -> Self {
        Self::new(PageFont::default(), CompositorOptions::default())
    }
}

impl PageCompositor {
    pub fn new(font: PageFont, options: CompositorOptions) -> Self {
        Self {
            font,
            fallback: PageFont::Standard(StandardFont::ZapfDingbats),
            options,
        }
    }

    pub fn font(&self) -> &PageFont {
        &self.font
    }

    pub(crate) fn fallback_font(&self) -> &PageFont {
        &self.fallback
    }

    pub fn options(&self) -> &CompositorOptions {
        &self.options
    }

    pub fn set_font(&mut self, font: PageFont) {
        self.font = font;
    }

    pub fn set_options(&mut self, options: CompositorOptions) {
        self.options = options;
    }

    /// Compose one page
    ///
    /// The background is letterboxed onto the page and every instruction is
    /// mapped through the same transform, font size included. Empty
    /// instructions are skipped.
    pub fn compose(
        &self,
        background: &BackgroundImage,
        instructions: &[DrawInstruction],
    ) -> Result<ComposedPage> {
        self.options.validate()?;
        let page_size = self.options.page_size;
        let transform = PageTransform::fit(background.width, background.height, page_size)?;

        let mut page = ComposedPage {
            page_size,
            transform,
            background: background.clone(),
            content: Vec::new(),
            used_chars: BTreeSet::new(),
            uses_fallback: false,
        };

        let bg = transform.background_rect(background.width, background.height);
        page.content.extend(generate_image_operators(
            BACKGROUND_IMAGE,
            bg.x,
            page_size.height - bg.max_y(),
            bg.width,
            bg.height,
        ));

        let mut drawn = 0usize;
        for instruction in instructions {
            if instruction.text.trim().is_empty() {
                continue;
            }

            let rect = transform.apply(&instruction.rect);
            let font_size = transform.scale_length(instruction.font_size);
            if font_size <= 0.0 {
                continue;
            }

            if instruction.multiline {
                self.draw_multi_line(&mut page, &instruction.text, &rect, font_size, instruction.align);
            } else {
                self.draw_single_line(&mut page, &instruction.text, &rect, font_size, instruction.align);
            }
            drawn += 1;
        }

        debug!(
            instructions = instructions.len(),
            drawn,
            scale = transform.scale,
            "composed page"
        );

        Ok(page)
    }

    /// Width of `text` in points, including fallback and replacement characters
    pub fn measure(&self, text: &str, font_size: f64) -> f64 {
        text.chars().map(|c| self.char_width(c, font_size)).sum()
    }

    fn char_width(&self, c: char, font_size: f64) -> f64 {
        let (c, slot) = self.resolve_char(c);
        self.slot_font(slot).char_width(c, font_size)
    }

    /// The character actually drawn for `c` and the font drawing it
    fn resolve_char(&self, c: char) -> (char, FontSlot) {
        if self.font.has_glyph(c) {
            (c, FontSlot::Primary)
        } else if self.fallback.has_glyph(c) {
            (c, FontSlot::Fallback)
        } else {
            (REPLACEMENT_CHAR, FontSlot::Primary)
        }
    }

    fn draw_single_line(
        &self,
        page: &mut ComposedPage,
        text: &str,
        rect: &Rect,
        font_size: f64,
        align: Align,
    ) {
        let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
        let ellipsis = if self.font.has_glyph('…') { "…" } else { "..." };
        let fitted = truncate_to_width(&text, rect.width, ellipsis, |c| self.char_width(c, font_size));
        if fitted.is_empty() {
            return;
        }

        let width = self.measure(&fitted, font_size);
        let x = rect.x + calculate_x_offset(width, rect.width, align);

        let text_height = self.font.text_height(font_size);
        let baseline = rect.y + (rect.height - text_height) / 2.0 + self.font.ascent(font_size);

        self.draw_line(page, &fitted, x, page.page_size.height - baseline, font_size);
    }

    fn draw_multi_line(
        &self,
        page: &mut ComposedPage,
        text: &str,
        rect: &Rect,
        font_size: f64,
        align: Align,
    ) {
        let lines = wrap_lines(text, rect.width, |s| self.measure(s, font_size));
        let line_height = font_size * self.options.line_spacing;
        let ascent = self.font.ascent(font_size);
        let page_height = page.page_size.height;

        page.content.extend(
            format!(
                "q\n{} {} {} {} re W n\n",
                fmt_num(rect.x),
                fmt_num(page_height - rect.max_y()),
                fmt_num(rect.width),
                fmt_num(rect.height)
            )
            .into_bytes(),
        );

        for (index, line) in lines.iter().enumerate() {
            let top = rect.y + index as f64 * line_height;
            // first line is always drawn, the clip handles what sticks out
            if index > 0 && top + line_height > rect.max_y() + f64::EPSILON {
                break;
            }
            if line.is_empty() {
                continue;
            }

            let width = self.measure(line, font_size);
            let x = rect.x + calculate_x_offset(width, rect.width, align);
            self.draw_line(page, line, x, page_height - (top + ascent), font_size);
        }

        page.content.extend_from_slice(b"Q\n");
    }

    /// Emit one line, switching fonts run by run
    fn draw_line(&self, page: &mut ComposedPage, text: &str, x: f64, y: f64, font_size: f64) {
        let mut cursor = x;

        for run in self.segment(text) {
            let font = self.slot_font(run.slot);
            let font_name = match run.slot {
                FontSlot::Primary => {
                    page.used_chars.extend(run.text.chars());
                    PRIMARY_FONT
                }
                FontSlot::Fallback => {
                    page.uses_fallback = true;
                    FALLBACK_FONT
                }
            };

            let ctx = TextRenderContext {
                font_name,
                font_size,
                color: self.options.text_color,
            };
            page.content
                .extend(generate_text_operators(&font.encode_hex(&run.text), cursor, y, &ctx));

            cursor += font.text_width(&run.text, font_size);
        }
    }

    fn slot_font(&self, slot: FontSlot) -> &PageFont {
        match slot {
            FontSlot::Primary => &self.font,
            FontSlot::Fallback => &self.fallback,
        }
    }

    /// Split text into runs by the font able to draw each character
    fn segment(&self, text: &str) -> Vec<TextRun> {
        let mut runs: Vec<TextRun> = Vec::new();

        for c in text.chars() {
            let (c, slot) = self.resolve_char(c);

            match runs.last_mut() {
                Some(run) if run.slot == slot => run.text.push(c),
                _ => runs.push(TextRun {
                    text: c.to_string(),
                    slot,
                }),
            }
        }

        runs
    }
}
