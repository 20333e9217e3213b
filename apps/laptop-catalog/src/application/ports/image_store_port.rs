//! Image Store Port (Driven Port)
//!
//! Interface for persisting uploaded laptop images.

use std::path::PathBuf;

use async_trait::async_trait;

use crate::domain::image::SavedImage;

/// Errors returned by an image store.
#[derive(Debug, thiserror::Error)]
pub enum ImageStoreError {
    /// The storage directory could not be created.
    #[error("cannot create image directory {path}: {source}")]
    CreateDir {
        /// Directory path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The image file could not be created.
    #[error("cannot create image file {path}: {source}")]
    Create {
        /// File path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The image payload could not be written.
    #[error("cannot write image to file {path}: {source}")]
    Write {
        /// File path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Image store port.
///
/// The owning laptop is validated by the caller, not by the store.
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Persist `data` as a new image of `laptop_id`.
    ///
    /// `image_type` is the file extension including the dot, e.g. `.jpg`.
    ///
    /// # Errors
    ///
    /// Returns an `ImageStoreError` on any I/O failure.
    async fn save(
        &self,
        laptop_id: &str,
        image_type: &str,
        data: Vec<u8>,
    ) -> Result<SavedImage, ImageStoreError>;

    /// Number of images saved so far.
    fn len(&self) -> usize;

    /// Whether no image has been saved.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
