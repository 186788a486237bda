//! Directory-backed image store.

use std::ffi::OsStr;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use image::ImageFormat;
use tracing::{debug, info, instrument, trace, warn};

use super::codec;
use super::schema::{
    DeleteReport, ImageId, Listing, SkippedEntry, StoredImage, extension_for,
};
use crate::error::{FailedRemoval, Result, StoreError};

/// Persists photos as individual files in one directory.
///
/// Each file is named `<id>.<ext>`; the directory listing itself is the
/// index, there is no manifest.
///
/// `save` and `list_all` share the directory; `delete_all` and `delete`
/// hold it exclusively so a listing never observes a half-deleted gallery.
#[derive(Debug)]
pub struct ImageStore {
    root: PathBuf,
    gate: RwLock<()>,
}

impl ImageStore {
    /// Create a store rooted at `root` without touching the filesystem.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            gate: RwLock::new(()),
        }
    }

    /// Create a store rooted at `root`, creating the directory if needed.
    #[instrument(skip_all, fields(root = %root.as_ref().display()))]
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref();
        fs::create_dir_all(root).map_err(|source| StoreError::Write {
            path: root.to_path_buf(),
            source,
        })?;
        debug!("Image directory ready");
        Ok(Self::new(root))
    }

    /// Directory holding the images.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn shared(&self) -> RwLockReadGuard<'_, ()> {
        self.gate.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn exclusive(&self) -> RwLockWriteGuard<'_, ()> {
        self.gate.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Store a new image and return it with its freshly generated id.
    ///
    /// The file is created with create-new semantics, so an existing file is
    /// never overwritten. Write failures are returned, not retried.
    #[instrument(skip_all, fields(size_bytes = bytes.len()))]
    pub fn save(&self, bytes: &[u8]) -> Result<StoredImage> {
        let _guard = self.shared();

        let format = image::guess_format(bytes).ok();
        let id = ImageId::generate();
        let path = self.root.join(format!("{id}.{}", extension_for(format)));
        trace!(path = %path.display(), "Writing image");

        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|source| StoreError::Write {
                path: path.clone(),
                source,
            })?;

        if let Err(source) = file.write_all(bytes).and_then(|()| file.sync_all()) {
            drop(file);
            if let Err(e) = fs::remove_file(&path) {
                warn!(path = %path.display(), error = %e, "Failed to remove partial image");
            }
            return Err(StoreError::Write { path, source });
        }

        info!(id = %id, path = %path.display(), "Image saved");
        Ok(StoredImage {
            id,
            path,
            format,
            bytes: bytes.to_vec(),
            dimensions: None,
        })
    }

    /// Read and decode every image in the directory.
    ///
    /// Entries that cannot be read or decoded are skipped and reported in
    /// [`Listing::skipped`]. Order follows directory enumeration and is not
    /// stable. Fails only when the directory cannot be enumerated.
    #[instrument(skip(self), fields(root = %self.root.display()))]
    pub fn list_all(&self) -> Result<Listing> {
        let _guard = self.shared();

        let entries = fs::read_dir(&self.root).map_err(|source| StoreError::List {
            path: self.root.clone(),
            source,
        })?;

        let mut listing = Listing::default();
        for entry in entries {
            let path = match entry {
                Ok(entry) => entry.path(),
                Err(e) => {
                    warn!(error = %e, "Failed to read directory entry");
                    listing.skipped.push(SkippedEntry {
                        path: self.root.clone(),
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            match load_image(&path) {
                Ok(image) => listing.images.push(image),
                Err(reason) => {
                    debug!(path = %path.display(), %reason, "Skipping entry");
                    listing.skipped.push(SkippedEntry { path, reason });
                }
            }
        }

        if listing.skipped_count() > 0 {
            warn!(
                skipped = listing.skipped_count(),
                "Some entries in the image directory are not readable images"
            );
        }
        debug!(count = listing.len(), "Listed images");
        Ok(listing)
    }

    /// Remove every entry in the directory.
    ///
    /// Keeps going after individual failures. If anything could not be
    /// removed, returns [`StoreError::Delete`] with the removed count and the
    /// entries left behind.
    #[instrument(skip(self), fields(root = %self.root.display()))]
    pub fn delete_all(&self) -> Result<DeleteReport> {
        let _guard = self.exclusive();

        let entries = fs::read_dir(&self.root).map_err(|source| StoreError::List {
            path: self.root.clone(),
            source,
        })?;

        let mut removed = 0;
        let mut failed = Vec::new();
        for entry in entries {
            let path = match entry {
                Ok(entry) => entry.path(),
                Err(e) => {
                    failed.push(FailedRemoval {
                        path: self.root.clone(),
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            match remove_entry(&path) {
                Ok(()) => {
                    trace!(path = %path.display(), "Removed entry");
                    removed += 1;
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to remove entry");
                    failed.push(FailedRemoval {
                        path,
                        reason: e.to_string(),
                    });
                }
            }
        }

        if failed.is_empty() {
            info!(removed, "All images deleted");
            Ok(DeleteReport { removed })
        } else {
            Err(StoreError::Delete { removed, failed })
        }
    }

    /// Remove the image with the given id.
    ///
    /// Only regular files named `<id>.<image extension>` are removed.
    /// Returns false when no such image exists.
    #[instrument(skip_all, fields(id = %id))]
    pub fn delete(&self, id: &ImageId) -> Result<bool> {
        let _guard = self.exclusive();

        let entries = fs::read_dir(&self.root).map_err(|source| StoreError::List {
            path: self.root.clone(),
            source,
        })?;

        let mut removed = 0;
        let mut failed = Vec::new();
        for entry in entries {
            let path = match entry {
                Ok(entry) => entry.path(),
                Err(e) => {
                    failed.push(FailedRemoval {
                        path: self.root.clone(),
                        reason: e.to_string(),
                    });
                    continue;
                }
            };
            if !is_image_file_for(&path, id) {
                continue;
            }
            match fs::remove_file(&path) {
                Ok(()) => removed += 1,
                Err(e) => failed.push(FailedRemoval {
                    path,
                    reason: e.to_string(),
                }),
            }
        }

        if !failed.is_empty() {
            return Err(StoreError::Delete { removed, failed });
        }
        if removed > 0 {
            info!("Image deleted");
        } else {
            debug!("Image not found for deletion");
        }
        Ok(removed > 0)
    }
}

/// Read one directory entry as an image, or explain why it is not one.
fn load_image(path: &Path) -> std::result::Result<StoredImage, String> {
    if !path.is_file() {
        return Err("not a regular file".to_string());
    }

    let id = path
        .file_stem()
        .and_then(OsStr::to_str)
        .map(ImageId::from)
        .ok_or_else(|| "file name is not valid UTF-8".to_string())?;

    let bytes = fs::read(path).map_err(|e| e.to_string())?;
    let decoded = codec::decode(&bytes).map_err(|e| e.to_string())?;

    Ok(StoredImage {
        id,
        path: path.to_path_buf(),
        format: Some(decoded.format),
        bytes,
        dimensions: Some((decoded.width, decoded.height)),
    })
}

/// Whether `path` is a regular file named `<id>.<ext>` with an image extension.
fn is_image_file_for(path: &Path, id: &ImageId) -> bool {
    path.is_file()
        && path.file_stem() == Some(OsStr::new(id.as_str()))
        && path
            .extension()
            .and_then(ImageFormat::from_extension)
            .is_some()
}

fn remove_entry(path: &Path) -> std::io::Result<()> {
    if path.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    }
}
