//! Template-space to page-space geometry

use crate::{PdfError, Result};

/// Axis-aligned rectangle with a top-left origin
///
/// Rectangles are authored in template space (the native pixel grid of a
/// background image) and mapped to page space by [`PageTransform`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
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

    /// Right edge
    pub fn max_x(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge (y grows downwards)
    pub fn max_y(&self) -> f64 {
        self.y + self.height
    }

    /// Same rectangle moved by `dx`, `dy`
    pub fn offset(&self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }
}

/// Output page size in points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width: f64,
    pub height: f64,
}

impl PageSize {
    /// ISO A4 rounded to whole points
    pub const A4: PageSize = PageSize {
        width: 595.0,
        height: 842.0,
    };

    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

impl Default for PageSize {
    fn default() -> Self {
        Self::A4
    }
}

/// Uniform scale plus centering offset from template space to page space
///
/// The background is letterboxed onto the page: one scale factor is used for
/// both axes so nothing is distorted, and the leftover space is split evenly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageTransform {
    pub scale: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

impl PageTransform {
    /// Fit a `width` x `height` background onto `page`
    pub fn fit(width: u32, height: u32, page: PageSize) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(PdfError::InvalidBackground { width, height });
        }

        let (w, h) = (width as f64, height as f64);
        let scale = (page.width / w).min(page.height / h);

        Ok(Self {
            scale,
            offset_x: (page.width - w * scale) / 2.0,
            offset_y: (page.height - h * scale) / 2.0,
        })
    }

    /// Map a template-space rectangle into page space
    pub fn apply(&self, rect: &Rect) -> Rect {
        Rect {
            x: rect.x * self.scale + self.offset_x,
            y: rect.y * self.scale + self.offset_y,
            width: rect.width * self.scale,
            height: rect.height * self.scale,
        }
    }

    /// Scale a template-space length (font sizes, line heights)
    pub fn scale_length(&self, length: f64) -> f64 {
        length * self.scale
    }

    /// Where the background itself lands on the page
    pub fn background_rect(&self, width: u32, height: u32) -> Rect {
        self.apply(&Rect::new(0.0, 0.0, width as f64, height as f64))
    }
}
