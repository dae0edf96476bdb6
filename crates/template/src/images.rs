//! Loading background images by reference

use crate::{Result, TemplateError};
use pdf_core::BackgroundImage;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Supplies the background named by a template
pub trait ImageSource {
    fn load(&self, reference: &str) -> Result<BackgroundImage>;
}

/// Extensions tried after the reference as given
const EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// Backgrounds stored as files under one directory
#[derive(Debug, Clone)]
pub struct DirectoryImageSource {
    root: PathBuf,
}

impl DirectoryImageSource {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// First existing file for `reference`
    fn find(&self, reference: &str) -> Option<PathBuf> {
        let exact = self.root.join(reference);
        if exact.is_file() {
            return Some(exact);
        }
        EXTENSIONS
            .iter()
            .map(|ext| self.root.join(format!("{reference}.{ext}")))
            .find(|path| path.is_file())
    }
}

impl ImageSource for DirectoryImageSource {
    fn load(&self, reference: &str) -> Result<BackgroundImage> {
        let path = self
            .find(reference)
            .ok_or_else(|| TemplateError::ImageNotFound(reference.to_string()))?;
        let data = std::fs::read(&path)?;
        Ok(BackgroundImage::from_bytes(&data)?)
    }
}

/// Backgrounds already in memory, keyed by reference
#[derive(Debug, Clone, Default)]
pub struct MemoryImageSource {
    images: BTreeMap<String, BackgroundImage>,
}

impl MemoryImageSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, reference: &str, image: BackgroundImage) {
        self.images.insert(reference.to_string(), image);
    }

    pub fn with_image(mut self, reference: &str, image: BackgroundImage) -> Self {
        self.insert(reference, image);
        self
    }

    pub fn contains(&self, reference: &str) -> bool {
        self.images.contains_key(reference)
    }
}

impl ImageSource for MemoryImageSource {
    fn load(&self, reference: &str) -> Result<BackgroundImage> {
        self.images
            .get(reference)
            .cloned()
            .ok_or_else(|| TemplateError::ImageNotFound(reference.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbImage::from_pixel(width, height, image::Rgb([255, 255, 255]));
        let mut bytes = Vec::new();
        img.write_to(
            &mut std::io::Cursor::new(&mut bytes),
            image::ImageFormat::Png,
        )
        .unwrap();
        bytes
    }

    #[test]
    fn test_directory_tries_extensions() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("medical_notes_p1.png"), png_bytes(4, 6)).unwrap();

        let source = DirectoryImageSource::new(dir.path());
        let image = source.load("medical_notes_p1").unwrap();
        assert_eq!((image.width, image.height), (4, 6));

        let exact = source.load("medical_notes_p1.png").unwrap();
        assert_eq!(exact.width, 4);
    }

    #[test]
    fn test_directory_missing_image() {
        let dir = tempfile::tempdir().unwrap();
        let source = DirectoryImageSource::new(dir.path());
        assert!(matches!(
            source.load("nothing"),
            Err(TemplateError::ImageNotFound(r)) if r == "nothing"
        ));
    }

    #[test]
    fn test_directory_bad_image_data() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("broken.png"), b"not an image").unwrap();

        let source = DirectoryImageSource::new(dir.path());
        assert!(matches!(
            source.load("broken"),
            Err(TemplateError::PdfError(_))
        ));
    }

    #[test]
    fn test_memory_source() {
        let source =
            MemoryImageSource::new().with_image("visit_log", BackgroundImage::blank(10, 20).unwrap());
        assert!(source.contains("visit_log"));
        assert_eq!(source.load("visit_log").unwrap().height, 20);
        assert!(source.load("other").is_err());
    }
}
