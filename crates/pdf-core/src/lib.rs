//! PDF Core - Page composition and document output
//!
//! This crate provides functionality for:
//! - Mapping template-space rectangles onto a fixed output page
//! - Composing a background image plus text draw instructions into one page
//! - Sequencing composed pages into a single PDF byte stream
//! - Standard (Helvetica/ZapfDingbats) and embedded TrueType fonts
//!
//! # Example
//!
//! ```ignore
//! use pdf_core::{Align, BackgroundImage, DocumentRenderer, DrawInstruction, PageSpec, Rect};
//!
//! let background = BackgroundImage::from_bytes(&std::fs::read("medical_notes_p1.png")?)?;
//! let page = PageSpec::new(background, vec![DrawInstruction::single_line(
//!     "John Tan",
//!     Rect::new(120.0, 210.0, 400.0, 28.0),
//!     14.0,
//!     Align::Left,
//! )]);
//! let bytes = DocumentRenderer::default().render(&[page])?;
//! ```

mod compositor;
mod document;
mod font;
mod geometry;
mod image;
mod text;

pub use compositor::{ComposedPage, CompositorOptions, DrawInstruction, PageCompositor};
pub use document::{Color, DocumentRenderer, PageSpec, SideCopy, LAST_RENDER_FILENAME};
pub use font::{FontData, PageFont, StandardFont};
pub use geometry::{PageSize, PageTransform, Rect};
pub use image::BackgroundImage;
pub use text::{truncate_to_width, wrap_lines};

use thiserror::Error;

/// Errors that can occur during PDF operations
#[derive(Debug, Error)]
pub enum PdfError {
    #[error("Cannot render a document with no pages")]
    EmptyDocument,

    #[error("Invalid background image: {width}x{height}")]
    InvalidBackground { width: u32, height: u32 },

    #[error("Failed to parse font: {0}")]
    FontParseError(String),

    #[error("Image error: {0}")]
    ImageError(String),

    #[error("Failed to save PDF: {0}")]
    SaveError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid render options: {0}")]
    InvalidOptions(String),
}

/// Result type for PDF operations
pub type Result<T> = std::result::Result<T, PdfError>;

/// Text alignment options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_align_default() {
        assert_eq!(Align::default(), Align::Left);
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            PdfError::EmptyDocument.to_string(),
            "Cannot render a document with no pages"
        );
        assert_eq!(
            PdfError::InvalidBackground {
                width: 0,
                height: 842
            }
            .to_string(),
            "Invalid background image: 0x842"
        );
        assert_eq!(
            PdfError::InvalidOptions("line spacing must be positive, got 0".to_string())
                .to_string(),
            "Invalid render options: line spacing must be positive, got 0"
        );
    }
}
