//! Local photo storage.
//!
//! Photos are kept as individual files in a single directory; the directory
//! listing is the index.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.local/share/bstore/
//! └── images/
//!     ├── 0b6f3c1e-....jpg
//!     └── 9d2a77f0-....png
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use bstore::media::{ImageStore, codec};
//!
//! let store = ImageStore::open("/path/to/images")?;
//! let bytes = codec::capture_from_path(Path::new("pick.png"), codec::DEFAULT_JPEG_QUALITY)?;
//! let saved = store.save(&bytes)?;
//!
//! let listing = store.list_all()?;
//! println!("{} images, {} skipped", listing.len(), listing.skipped_count());
//!
//! store.delete_all()?;
//! ```

pub mod codec;
mod schema;
mod store;

pub use schema::{
    DeleteReport, ImageId, ImageSummary, Listing, SkippedEntry, StoredImage, extension_for,
    format_name,
};
pub use store::ImageStore;
