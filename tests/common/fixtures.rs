//! Test fixture helpers for creating image data.
//!
//! Images are generated in memory with the `image` crate so no binary
//! fixtures need to live in the repository.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::codecs::jpeg::JpegEncoder;
use image::{ImageFormat, Rgb, RgbImage};
use tempfile::TempDir;

/// Encode a solid-color PNG.
///
/// # Panics
///
/// Panics if encoding fails.
#[must_use]
pub fn png_bytes(width: u32, height: u32, color: [u8; 3]) -> Vec<u8> {
    let img = RgbImage::from_pixel(width, height, Rgb(color));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png)
        .expect("Failed to encode PNG");
    out.into_inner()
}

/// Encode a solid-color JPEG, the shape of what the picker hands over.
///
/// # Panics
///
/// Panics if encoding fails.
#[must_use]
pub fn jpeg_bytes(width: u32, height: u32, color: [u8; 3]) -> Vec<u8> {
    let img = RgbImage::from_pixel(width, height, Rgb(color));
    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, 90)
        .encode_image(&img)
        .expect("Failed to encode JPEG");
    out
}

/// Source images in a temporary directory with automatic cleanup.
///
/// # Example
///
/// ```ignore
/// let picks = PickedImages::new();
/// let path = picks.png("pick.png", 8, 8);
/// // Directory is removed when `picks` is dropped
/// ```
pub struct PickedImages {
    /// The temporary directory containing the images.
    pub dir: TempDir,
}

impl Default for PickedImages {
    fn default() -> Self {
        Self::new()
    }
}

impl PickedImages {
    /// # Panics
    ///
    /// Panics if the temporary directory cannot be created.
    #[must_use]
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Write a PNG and return its path.
    #[must_use]
    pub fn png(&self, name: &str, width: u32, height: u32) -> PathBuf {
        self.write(name, &png_bytes(width, height, [40, 120, 200]))
    }

    /// Write arbitrary bytes and return the path.
    ///
    /// # Panics
    ///
    /// Panics if the file cannot be written.
    #[must_use]
    pub fn write(&self, name: &str, bytes: &[u8]) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, bytes)
            .unwrap_or_else(|_| panic!("Failed to write fixture at {path:?}"));
        path
    }

    /// Path to the temporary directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}
