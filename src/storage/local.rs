//! Local directory blob backend.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tracing::info;
use uuid::Uuid;

use super::{Blob, BlobStore, content_type_for_extension, validate_blob_name};
use crate::error::{AppError, AppResult};

/// Stores each blob as a file named after it inside `root`.
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
}

impl LocalBlobStore {
    /// Open the directory, creating it if needed.
    pub async fn new(root: impl AsRef<Path>) -> AppResult<Self> {
        let root = root.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&root).await.map_err(|e| {
            AppError::Storage(format!(
                "Failed to create upload directory {}: {}",
                root.display(),
                e
            ))
        })?;

        info!("Local blob storage initialized: dir={}", root.display());

        Ok(Self { root })
    }

    fn path_for(&self, name: &str) -> AppResult<PathBuf> {
        validate_blob_name(name)?;
        Ok(self.root.join(name))
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn put(&self, name: &str, data: Vec<u8>, _content_type: Option<&str>) -> AppResult<()> {
        let path = self.path_for(name)?;
        let tmp = self.root.join(format!(".{}.tmp", Uuid::new_v4()));

        let write = async {
            let mut file = tokio::fs::File::create(&tmp).await?;
            file.write_all(&data).await?;
            file.sync_all().await?;
            tokio::fs::rename(&tmp, &path).await
        };

        if let Err(e) = write.await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(AppError::Storage(format!(
                "Failed to write blob {}: {}",
                name, e
            )));
        }

        Ok(())
    }

    async fn get(&self, name: &str) -> AppResult<Blob> {
        let path = self.path_for(name)?;
        let data = tokio::fs::read(&path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => AppError::NotFound(format!("Blob {}", name)),
            _ => AppError::Storage(format!("Failed to read blob {}: {}", name, e)),
        })?;

        let content_type = Path::new(name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| content_type_for_extension(ext).to_string());

        Ok(Blob { data, content_type })
    }

    async fn delete(&self, name: &str) -> AppResult<()> {
        let path = self.path_for(name)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::Storage(format!(
                "Failed to delete blob {}: {}",
                name, e
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[actix_rt::test]
    async fn test_put_get_delete() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path()).await.unwrap();

        store
            .put("abc_photo.png", b"png-bytes".to_vec(), Some("image/png"))
            .await
            .unwrap();

        let blob = store.get("abc_photo.png").await.unwrap();
        assert_eq!(blob.data, b"png-bytes");
        assert_eq!(blob.content_type.as_deref(), Some("image/png"));

        store.delete("abc_photo.png").await.unwrap();
        assert!(matches!(
            store.get("abc_photo.png").await,
            Err(AppError::NotFound(_))
        ));
    }

    #[actix_rt::test]
    async fn test_delete_missing_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path()).await.unwrap();
        assert!(store.delete("never_written.pdf").await.is_ok());
    }

    #[actix_rt::test]
    async fn test_put_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path()).await.unwrap();
        store.put("x_a.pdf", vec![1, 2, 3], None).await.unwrap();

        let names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["x_a.pdf".to_string()]);
    }

    #[actix_rt::test]
    async fn test_rejects_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path()).await.unwrap();
        assert!(matches!(
            store.put("../escape.pdf", vec![], None).await,
            Err(AppError::InvalidInput(_))
        ));
    }
}
