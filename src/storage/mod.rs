//! Blob storage for uploaded evidence files.
//!
//! Blobs are keyed by the server-generated stored name. Two backends: a
//! local directory and an S3-compatible bucket (AWS S3 or MinIO).

mod local;
mod s3;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{StorageBackend, StorageSettings};
use crate::error::{AppError, AppResult};

pub use local::LocalBlobStore;
pub use s3::S3BlobStore;

/// Blob contents as returned by [`BlobStore::get`].
#[derive(Debug, Clone)]
pub struct Blob {
    pub data: Vec<u8>,
    pub content_type: Option<String>,
}

/// Named blob storage.
///
/// `put` must be durable before it returns. `delete` of an absent blob is
/// not an error.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn put(&self, name: &str, data: Vec<u8>, content_type: Option<&str>) -> AppResult<()>;

    /// Fetch a blob. Missing blobs are `NotFound`.
    async fn get(&self, name: &str) -> AppResult<Blob>;

    async fn delete(&self, name: &str) -> AppResult<()>;
}

/// Build the configured backend.
pub async fn from_settings(settings: &StorageSettings) -> AppResult<Arc<dyn BlobStore>> {
    match settings.backend {
        StorageBackend::Local => Ok(Arc::new(LocalBlobStore::new(&settings.upload_dir).await?)),
        StorageBackend::S3 => Ok(Arc::new(S3BlobStore::new(&settings.s3).await?)),
    }
}

/// Stored names are restricted to `[A-Za-z0-9._-]`.
pub fn validate_blob_name(name: &str) -> AppResult<()> {
    let allowed = |c: char| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-');
    if name.is_empty() || name == "." || name == ".." || !name.chars().all(allowed) {
        return Err(AppError::InvalidInput(format!("Invalid blob name: {:?}", name)));
    }
    Ok(())
}

/// Get the content type for a file based on its extension (with or without
/// the leading dot).
pub fn content_type_for_extension(ext: &str) -> &'static str {
    match ext.trim_start_matches('.').to_lowercase().as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "pdf" => "application/pdf",
        _ => "application/octet-stream",
    }
}
