//! Data types for the image store.

use std::fmt;
use std::path::PathBuf;

use image::ImageFormat;
use serde::Serialize;
use uuid::Uuid;

/// Identifier of a stored image. Doubles as the file stem on disk.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ImageId(String);

impl ImageId {
    /// Generate a fresh identifier from a random v4 UUID.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Borrow the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ImageId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ImageId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// One photo persisted by the image store.
#[derive(Debug, Clone)]
pub struct StoredImage {
    /// Unique identifier.
    pub id: ImageId,
    /// Location on disk, derived from `id`.
    pub path: PathBuf,
    /// Detected encoding, if recognised.
    pub format: Option<ImageFormat>,
    /// Encoded image bytes.
    pub bytes: Vec<u8>,
    /// Pixel dimensions, known once the image has been decoded.
    pub dimensions: Option<(u32, u32)>,
}

impl StoredImage {
    /// Get a serializable summary without the image bytes.
    #[must_use]
    pub fn summary(&self) -> ImageSummary {
        ImageSummary {
            id: self.id.clone(),
            path: self.path.clone(),
            format: self.format.map(format_name),
            size_bytes: self.bytes.len(),
            width: self.dimensions.map(|(w, _)| w),
            height: self.dimensions.map(|(_, h)| h),
        }
    }
}

/// Summary of a stored image for reporting.
#[derive(Debug, Clone, Serialize)]
pub struct ImageSummary {
    pub id: ImageId,
    pub path: PathBuf,
    pub format: Option<&'static str>,
    pub size_bytes: usize,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// A directory entry `list_all` could not present as an image.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedEntry {
    pub path: PathBuf,
    pub reason: String,
}

/// Result of enumerating the image directory.
///
/// Entries that are not readable images are skipped rather than failing the
/// whole listing; they are reported in `skipped`.
#[derive(Debug, Clone, Default)]
pub struct Listing {
    /// Decoded images, in directory enumeration order.
    pub images: Vec<StoredImage>,
    /// Entries left out of `images`.
    pub skipped: Vec<SkippedEntry>,
}

impl Listing {
    /// Number of images in the listing.
    #[must_use]
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// Check if no images were found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Number of entries that were skipped.
    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }
}

/// Outcome of a successful bulk delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeleteReport {
    /// Number of entries removed.
    pub removed: usize,
}

/// File extension used for a given format.
///
/// Unrecognised content is stored with a `.jpg` suffix.
#[must_use]
pub fn extension_for(format: Option<ImageFormat>) -> &'static str {
    format
        .and_then(|f| f.extensions_str().first().copied())
        .unwrap_or("jpg")
}

/// Short lowercase name of a format, for display.
#[must_use]
pub fn format_name(format: ImageFormat) -> &'static str {
    format.extensions_str().first().copied().unwrap_or("unknown")
}
