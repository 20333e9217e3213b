//! Disk-backed image store.
//!
//! Each image is written to `<image_dir>/<image-id><image_type>`. The
//! bookkeeping index from image id to owner, type and path lives in memory
//! only.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use parking_lot::RwLock;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::application::ports::{ImageStore, ImageStoreError};
use crate::domain::image::{SavedImage, StoredImage};

/// Disk implementation of `ImageStore`.
#[derive(Debug)]
pub struct DiskImageStore {
    image_dir: PathBuf,
    images: RwLock<HashMap<String, StoredImage>>,
}

impl DiskImageStore {
    /// Create a store rooted at `image_dir`.
    ///
    /// The directory is created on the first save if it does not exist.
    #[must_use]
    pub fn new(image_dir: impl Into<PathBuf>) -> Self {
        Self {
            image_dir: image_dir.into(),
            images: RwLock::new(HashMap::new()),
        }
    }

    /// Root directory of the store.
    #[must_use]
    pub fn image_dir(&self) -> &Path {
        &self.image_dir
    }

    /// Bookkeeping record of a saved image.
    #[must_use]
    pub fn image_info(&self, image_id: &str) -> Option<StoredImage> {
        self.images.read().get(image_id).cloned()
    }

    async fn write_file(path: &Path, data: &[u8]) -> Result<(), ImageStoreError> {
        let mut file = fs::File::create(path)
            .await
            .map_err(|source| ImageStoreError::Create {
                path: path.to_path_buf(),
                source,
            })?;

        let written = async {
            file.write_all(data).await?;
            file.flush().await
        }
        .await;

        if let Err(source) = written {
            drop(file);
            if let Err(error) = fs::remove_file(path).await {
                tracing::warn!(path = %path.display(), %error, "Failed to remove partial image");
            }
            return Err(ImageStoreError::Write {
                path: path.to_path_buf(),
                source,
            });
        }

        Ok(())
    }
}

#[async_trait]
impl ImageStore for DiskImageStore {
    async fn save(
        &self,
        laptop_id: &str,
        image_type: &str,
        data: Vec<u8>,
    ) -> Result<SavedImage, ImageStoreError> {
        let image_id = Uuid::new_v4().to_string();

        fs::create_dir_all(&self.image_dir)
            .await
            .map_err(|source| ImageStoreError::CreateDir {
                path: self.image_dir.clone(),
                source,
            })?;

        let path = self.image_dir.join(format!("{image_id}{image_type}"));
        Self::write_file(&path, &data).await?;

        tracing::debug!(
            image_id = %image_id,
            laptop_id = %laptop_id,
            path = %path.display(),
            "Wrote image file"
        );

        self.images.write().insert(
            image_id.clone(),
            StoredImage {
                laptop_id: laptop_id.to_string(),
                image_type: image_type.to_string(),
                path,
            },
        );

        Ok(SavedImage {
            id: image_id,
            size: data.len(),
        })
    }

    fn len(&self) -> usize {
        self.images.read().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn save_writes_file_and_index() {
        let dir = tempfile::tempdir().unwrap();
        let store = DiskImageStore::new(dir.path());

        let saved = store
            .save("laptop-1", ".jpg", vec![1, 2, 3, 4])
            .await
            .unwrap();

        assert_eq!(saved.size, 4);
        let info = store.image_info(&saved.id).unwrap();
        assert_eq!(info.laptop_id, "laptop-1");
        assert_eq!(info.image_type, ".jpg");
        assert_eq!(info.path, dir.path().join(format!("{}.jpg", saved.id)));
        assert_eq!(std::fs::read(&info.path).unwrap(), vec![1, 2, 3, 4]);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn save_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("images").join("laptops");
        let store = DiskImageStore::new(&nested);

        let saved = store.save("laptop-1", ".png", Vec::new()).await.unwrap();

        assert_eq!(saved.size, 0);
        assert!(nested.join(format!("{}.png", saved.id)).exists());
    }

    #[tokio::test]
    async fn concurrent_saves_get_distinct_ids() {
        let dir = tempfile::tempdir().unwrap();
        let store = DiskImageStore::new(dir.path());

        let (a, b) = tokio::join!(
            store.save("laptop-1", ".jpg", vec![1]),
            store.save("laptop-1", ".jpg", vec![2]),
        );

        assert_ne!(a.unwrap().id, b.unwrap().id);
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn unwritable_root_is_create_dir_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"file").unwrap();
        let store = DiskImageStore::new(blocker.join("images"));

        let err = store.save("laptop-1", ".jpg", vec![1]).await.unwrap_err();

        assert!(matches!(err, ImageStoreError::CreateDir { .. }));
        assert!(store.is_empty());
    }

    #[test]
    fn unknown_image_has_no_info() {
        let store = DiskImageStore::new("img");
        assert_eq!(store.image_dir(), Path::new("img"));
        assert!(store.image_info("missing").is_none());
    }
}
