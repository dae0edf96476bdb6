//! Background images for composed pages

use crate::{PdfError, Result};
use image::{DynamicImage, ImageDecoder, ImageReader};
use lopdf::{Dictionary, Object, Stream};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::io::{Cursor, Write};

impl From<image::ImageError> for PdfError {
    fn from(err: image::ImageError) -> Self {
        PdfError::ImageError(err.to_string())
    }
}

/// Detected image format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ImageFormat {
    Jpeg,
    Png,
}

/// JPEG info including dimensions and color components
#[derive(Debug, Clone, Copy)]
struct JpegInfo {
    width: u32,
    height: u32,
    num_components: u8,
    /// An Adobe APP14 segment was seen before the frame header
    adobe: bool,
}

/// A page background ready to be embedded as an image XObject
///
/// `width` and `height` are the native pixel size, which is also the
/// template-space coordinate grid that field rectangles are authored in.
#[derive(Debug, Clone, PartialEq)]
pub struct BackgroundImage {
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Color space ("DeviceRGB", "DeviceGray", "DeviceCMYK")
    color_space: &'static str,
    /// Adobe CMYK JPEGs store inverted components
    inverted: bool,
    /// PDF filter ("DCTDecode" for JPEG, "FlateDecode" otherwise)
    filter: &'static str,
    /// Encoded image data
    data: Vec<u8>,
}

impl BackgroundImage {
    /// Load a background from JPEG or PNG file bytes
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        match detect_format(data)? {
            ImageFormat::Jpeg => Self::from_jpeg(data),
            ImageFormat::Png => Self::from_png(data),
        }
    }

    /// JPEG images are embedded directly with the DCTDecode filter
    pub fn from_jpeg(data: &[u8]) -> Result<Self> {
        let info = get_jpeg_info(data)?;

        let color_space = match info.num_components {
            1 => "DeviceGray",
            3 => "DeviceRGB",
            4 => "DeviceCMYK",
            n => {
                return Err(PdfError::ImageError(format!(
                    "Unsupported JPEG component count: {n}"
                )))
            }
        };

        Ok(Self {
            width: info.width,
            height: info.height,
            color_space,
            inverted: info.num_components == 4 && info.adobe,
            filter: "DCTDecode",
            data: data.to_vec(),
        })
    }

    /// PNG images are decoded, blended onto white and re-compressed
    pub fn from_png(data: &[u8]) -> Result<Self> {
        let reader = ImageReader::new(Cursor::new(data)).with_guessed_format()?;
        let decoder = reader.into_decoder()?;

        let (width, height) = decoder.dimensions();
        let color_type = decoder.color_type();
        let image = DynamicImage::from_decoder(decoder)?;

        let (raw_data, color_space) = match color_type {
            image::ColorType::L8 | image::ColorType::L16 => {
                (image.to_luma8().into_raw(), "DeviceGray")
            }
            image::ColorType::La8 | image::ColorType::La16 => {
                let gray = image
                    .to_luma_alpha8()
                    .pixels()
                    .map(|p| blend_on_white(p[0], p[1]))
                    .collect::<Vec<u8>>();
                (gray, "DeviceGray")
            }
            image::ColorType::Rgba8 | image::ColorType::Rgba16 => {
                let mut rgb = Vec::with_capacity((width * height * 3) as usize);
                for p in image.to_rgba8().pixels() {
                    rgb.push(blend_on_white(p[0], p[3]));
                    rgb.push(blend_on_white(p[1], p[3]));
                    rgb.push(blend_on_white(p[2], p[3]));
                }
                (rgb, "DeviceRGB")
            }
            _ => (image.to_rgb8().into_raw(), "DeviceRGB"),
        };

        Ok(Self {
            width,
            height,
            color_space,
            inverted: false,
            filter: "FlateDecode",
            data: deflate(&raw_data)?,
        })
    }

    /// Build a background from raw RGB8 pixels (row-major, 3 bytes per pixel)
    pub fn from_rgb8(width: u32, height: u32, pixels: &[u8]) -> Result<Self> {
        let expected = width as usize * height as usize * 3;
        if pixels.len() != expected {
            return Err(PdfError::ImageError(format!(
                "Expected {expected} bytes of RGB data, got {}",
                pixels.len()
            )));
        }

        Ok(Self {
            width,
            height,
            color_space: "DeviceRGB",
            inverted: false,
            filter: "FlateDecode",
            data: deflate(pixels)?,
        })
    }

    /// A plain white background of the given size
    pub fn blank(width: u32, height: u32) -> Result<Self> {
        Self::from_rgb8(width, height, &vec![255u8; width as usize * height as usize * 3])
    }

    /// Stable key for de-duplicating identical backgrounds in one document
    pub(crate) fn content_key(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.width.hash(&mut hasher);
        self.height.hash(&mut hasher);
        self.data.hash(&mut hasher);
        hasher.finish()
    }

    /// Convert to lopdf Stream object
    pub fn to_pdf_stream(&self) -> Stream {
        let mut dict = Dictionary::new();

        dict.set("Type", Object::Name(b"XObject".to_vec()));
        dict.set("Subtype", Object::Name(b"Image".to_vec()));
        dict.set("Width", self.width as i64);
        dict.set("Height", self.height as i64);
        dict.set(
            "ColorSpace",
            Object::Name(self.color_space.as_bytes().to_vec()),
        );
        dict.set("BitsPerComponent", 8);
        if self.inverted {
            let decode: Vec<Object> = [1i64, 0, 1, 0, 1, 0, 1, 0]
                .into_iter()
                .map(Object::Integer)
                .collect();
            dict.set("Decode", decode);
        }
        dict.set("Filter", Object::Name(self.filter.as_bytes().to_vec()));
        dict.set("Length", self.data.len() as i64);

        Stream::new(dict, self.data.clone())
    }
}

fn blend_on_white(value: u8, alpha: u8) -> u8 {
    let alpha = alpha as f32 / 255.0;
    (value as f32 * alpha + 255.0 * (1.0 - alpha)) as u8
}

fn deflate(raw: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(raw)?;
    Ok(encoder.finish()?)
}

/// Detect image format from magic bytes
fn detect_format(data: &[u8]) -> Result<ImageFormat> {
    if data.len() < 8 {
        return Err(PdfError::ImageError("Image data too short".to_string()));
    }

    if data[0] == 0xFF && data[1] == 0xD8 && data[2] == 0xFF {
        return Ok(ImageFormat::Jpeg);
    }

    if data[0..8] == [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A] {
        return Ok(ImageFormat::Png);
    }

    Err(PdfError::ImageError("Unknown image format".to_string()))
}

/// Get JPEG info from the first SOF segment
///
/// SOF layout: marker (2) + length (2) + precision (1) + height (2) +
/// width (2) + component count (1)
fn get_jpeg_info(data: &[u8]) -> Result<JpegInfo> {
    let mut adobe = false;
    let mut i = 2;
    while i + 10 < data.len() {
        if data[i] != 0xFF {
            i += 1;
            continue;
        }

        let marker = data[i + 1];

        if marker == 0xEE && data[i + 4..].starts_with(b"Adobe") {
            adobe = true;
        }

        // SOF0..SOF15, excluding DHT, JPG and DAC which share the range
        if (0xC0..=0xCF).contains(&marker) && marker != 0xC4 && marker != 0xC8 && marker != 0xCC {
            let height = u16::from_be_bytes([data[i + 5], data[i + 6]]) as u32;
            let width = u16::from_be_bytes([data[i + 7], data[i + 8]]) as u32;
            let num_components = data[i + 9];
            return Ok(JpegInfo {
                width,
                height,
                num_components,
                adobe,
            });
        }

        let length = u16::from_be_bytes([data[i + 2], data[i + 3]]) as usize;
        if length < 2 {
            break;
        }
        i += 2 + length;
    }

    Err(PdfError::ImageError(
        "Could not parse JPEG info".to_string(),
    ))
}

/// Generate operators to draw an image XObject
///
/// # Arguments
/// * `image_name` - Image resource name (e.g., "Im1")
/// * `x`, `y` - Lower-left corner in PDF coordinates
/// * `width`, `height` - Drawn size in points
pub(crate) fn generate_image_operators(
    image_name: &str,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
) -> Vec<u8> {
    format!(
        "q\n{} 0 0 {} {} {} cm\n/{image_name} Do\nQ\n",
        fmt_num(width),
        fmt_num(height),
        fmt_num(x),
        fmt_num(y)
    )
    .into_bytes()
}

/// Format a coordinate for a content stream (at most 3 decimals, no trailing zeros)
pub(crate) fn fmt_num(value: f64) -> String {
    let rounded = (value * 1000.0).round() / 1000.0;
    // avoid "-0"
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    let text = format!("{rounded:.3}");
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}
