//! Image decoding and the JPEG export used when capturing photos.

use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat};
use tracing::{debug, instrument};

use crate::error::{Result, ResultExt, StoreError};

/// JPEG quality used for captured photos (full quality).
pub const DEFAULT_JPEG_QUALITY: u8 = 100;

/// Format and size of a successfully decoded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedImage {
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
}

/// Decode encoded image bytes.
///
/// The whole image is decoded, so truncated or corrupt data is rejected
/// even when its header looks valid.
pub fn decode(bytes: &[u8]) -> Result<DecodedImage> {
    let format =
        image::guess_format(bytes).map_err(|e| StoreError::ImageDecode(e.to_string()))?;
    let img = image::load_from_memory_with_format(bytes, format)
        .map_err(|e| StoreError::ImageDecode(e.to_string()))?;

    Ok(DecodedImage {
        format,
        width: img.width(),
        height: img.height(),
    })
}

/// Encode an image as JPEG at the given quality (clamped to 1-100).
///
/// JPEG has no alpha channel, so the image is flattened to RGB first.
pub fn encode_jpeg(img: &DynamicImage, quality: u8) -> Result<Vec<u8>> {
    let rgb = img.to_rgb8();
    let mut out = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut out, quality.clamp(1, 100));
    encoder
        .encode_image(&rgb)
        .map_err(|e| StoreError::ImageDecode(format!("JPEG encoding failed: {e}")))?;
    Ok(out)
}

/// Produce the bytes for a newly picked photo.
///
/// Loads any supported image file and re-encodes it as JPEG.
#[instrument(skip_all, fields(path = %path.display(), quality = quality))]
pub fn capture_from_path(path: &Path, quality: u8) -> Result<Vec<u8>> {
    if !path.exists() {
        return Err(StoreError::ImageNotFound {
            path: path.display().to_string(),
        });
    }

    let img = image::open(path).map_err(|e| StoreError::ImageDecode(e.to_string()))?;
    let bytes = encode_jpeg(&img, quality)?;
    debug!(
        width = img.width(),
        height = img.height(),
        size_bytes = bytes.len(),
        "Captured image as JPEG"
    );
    Ok(bytes)
}

/// Read an image file as-is, checking that it decodes.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn capture_raw(path: &Path) -> Result<Vec<u8>> {
    if !path.exists() {
        return Err(StoreError::ImageNotFound {
            path: path.display().to_string(),
        });
    }

    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let decoded = decode(&bytes)?;
    debug!(format = ?decoded.format, size_bytes = bytes.len(), "Read raw image");
    Ok(bytes)
}
