//! Attachment ledger: comments and evidence files of an incident.
//!
//! The parent's `comments_count` and `files_count` are always recomputed
//! from the live child set after a mutation, never incremented, so
//! concurrent writers converge on the right value. A recompute that finds
//! the parent gone means a cascade delete ran after authorization; the
//! writer then removes what it just added.

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use super::incidents::IncidentRegistry;
use super::policy::Operation;
use super::{advance_past, now_micros};
use crate::error::{AppError, AppResult};
use crate::models::{Comment, FileAttachment, Incident, UserIdentity};
use crate::storage::{Blob, BlobStore, content_type_for_extension};
use crate::store::{CommentRepository, FileRepository, IncidentRepository, Repositories};

/// Maximum number of files attached to one incident.
pub const MAX_FILES_PER_INCIDENT: u64 = 10;

/// Maximum size of one uploaded file (5 MiB).
pub const MAX_FILE_SIZE: usize = 5 * 1024 * 1024;

/// Accepted extensions, lower-case with the leading dot.
pub const ALLOWED_EXTENSIONS: [&str; 4] = [".jpg", ".jpeg", ".png", ".pdf"];

const MAX_STORED_SUFFIX_LEN: usize = 100;

/// An uploaded file as received from the client.
#[derive(Debug, Clone)]
pub struct UploadPayload {
    /// Client-supplied file name
    pub filename: String,
    /// Client-supplied MIME type, if any
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

/// Extension of the final path component, lower-cased and including the
/// dot. Leading dots do not start an extension, so `.pdf` has none.
pub fn file_extension(filename: &str) -> Option<String> {
    let base = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
    let stem = base.trim_start_matches('.');
    stem.rfind('.')
        .filter(|idx| idx + 1 < stem.len())
        .map(|idx| stem[idx..].to_lowercase())
}

/// Collision-resistant blob name: a random UUID followed by a sanitized
/// copy of the client file name.
fn stored_name_for(original: &str) -> String {
    let base = original.rsplit(['/', '\\']).next().unwrap_or(original);
    let mut sanitized: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if sanitized.len() > MAX_STORED_SUFFIX_LEN {
        // Keep the tail so the extension survives
        sanitized = sanitized[sanitized.len() - MAX_STORED_SUFFIX_LEN..].to_string();
    }
    if sanitized.trim_matches('.').is_empty() {
        sanitized = "file".to_string();
    }

    format!("{}_{}", Uuid::new_v4().simple(), sanitized)
}

fn quota_exceeded() -> AppError {
    AppError::QuotaExceeded(format!(
        "Maximum of {} files per incident reached",
        MAX_FILES_PER_INCIDENT
    ))
}

/// Delete a blob, logging instead of failing. An orphaned blob is an
/// accepted degraded state.
pub(crate) async fn remove_blob_best_effort(blobs: &dyn BlobStore, name: &str) {
    if let Err(e) = blobs.delete(name).await {
        warn!(blob = %name, error = %e, "Failed to delete blob; leaving it orphaned");
    }
}

#[derive(Clone)]
pub struct AttachmentLedger {
    registry: IncidentRegistry,
    incidents: Arc<dyn IncidentRepository>,
    comments: Arc<dyn CommentRepository>,
    files: Arc<dyn FileRepository>,
    blobs: Arc<dyn BlobStore>,
}

impl AttachmentLedger {
    pub fn new(repos: &Repositories, blobs: Arc<dyn BlobStore>, registry: IncidentRegistry) -> Self {
        Self {
            registry,
            incidents: repos.incidents.clone(),
            comments: repos.comments.clone(),
            files: repos.files.clone(),
            blobs,
        }
    }

    pub async fn add_comment(
        &self,
        incident_id: Uuid,
        caller: &UserIdentity,
        message: String,
    ) -> AppResult<Comment> {
        let incident = self
            .registry
            .authorize_on(incident_id, caller, Operation::CreateComment)
            .await?;

        let comment = Comment {
            id: Uuid::now_v7(),
            incident_id,
            user_id: caller.id,
            username: caller.username.clone(),
            message,
            is_admin: caller.is_admin(),
            created_at: now_micros(),
        };
        self.comments.insert_comment(&comment).await?;

        if self
            .recompute_comments_count(incident_id, Some(&incident))
            .await?
            .is_none()
        {
            // Parent deleted concurrently; the cascade already ran
            self.comments.delete_comments_for_incident(incident_id).await?;
            return Err(AppError::NotFound("Incident".into()));
        }

        Ok(comment)
    }

    /// Comments of an incident, oldest first.
    pub async fn list_comments(
        &self,
        incident_id: Uuid,
        caller: &UserIdentity,
    ) -> AppResult<Vec<Comment>> {
        self.registry
            .authorize_on(incident_id, caller, Operation::ReadComments)
            .await?;
        self.comments.list_comments(incident_id).await
    }

    /// Validate and store an evidence file.
    ///
    /// Checks run in a fixed order and the first failure wins: incident
    /// exists, caller authorized, file quota, size, extension. The blob is
    /// written before the record is inserted, so a record never points at
    /// a missing blob.
    ///
    /// The quota is checked again once the record is in. Concurrent uploads
    /// racing for the last slot may all roll back, but the limit holds.
    pub async fn upload_file(
        &self,
        incident_id: Uuid,
        caller: &UserIdentity,
        payload: UploadPayload,
    ) -> AppResult<FileAttachment> {
        let incident = self
            .registry
            .authorize_on(incident_id, caller, Operation::UploadFile)
            .await?;

        if self.files.count_files(incident_id).await? >= MAX_FILES_PER_INCIDENT {
            return Err(quota_exceeded());
        }

        if payload.data.len() > MAX_FILE_SIZE {
            return Err(AppError::PayloadTooLarge(format!(
                "File exceeds the maximum size of {} bytes",
                MAX_FILE_SIZE
            )));
        }

        let extension = file_extension(&payload.filename)
            .filter(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()))
            .ok_or_else(|| {
                AppError::UnsupportedMediaType(format!(
                    "Only {} files are accepted",
                    ALLOWED_EXTENSIONS.join(", ")
                ))
            })?;

        let stored_name = stored_name_for(&payload.filename);
        let content_type = payload
            .content_type
            .filter(|ct| !ct.is_empty())
            .unwrap_or_else(|| content_type_for_extension(&extension).to_string());
        let file_size = payload.data.len() as u64;

        self.blobs
            .put(&stored_name, payload.data, Some(&content_type))
            .await?;

        let record = FileAttachment {
            id: Uuid::now_v7(),
            incident_id,
            filename: stored_name,
            original_name: payload.filename,
            file_type: extension,
            file_size,
            upload_date: now_micros(),
        };

        if let Err(e) = self.files.insert_file(&record).await {
            remove_blob_best_effort(self.blobs.as_ref(), &record.filename).await;
            return Err(e);
        }

        if self.files.count_files(incident_id).await? > MAX_FILES_PER_INCIDENT {
            self.discard_file(&record).await?;
            return Err(quota_exceeded());
        }

        if self
            .recompute_files_count(incident_id, Some(&incident))
            .await?
            .is_none()
        {
            self.discard_file(&record).await?;
            return Err(AppError::NotFound("Incident".into()));
        }

        info!(
            incident_id = %incident_id,
            file_id = %record.id,
            size = record.file_size,
            by = %caller.username,
            "File uploaded"
        );

        Ok(record)
    }

    /// Roll back a just-inserted file: record, blob, then the parent's
    /// count if the parent still exists.
    async fn discard_file(&self, record: &FileAttachment) -> AppResult<()> {
        self.files.delete_file(record.id).await?;
        remove_blob_best_effort(self.blobs.as_ref(), &record.filename).await;
        self.recompute_files_count(record.incident_id, None).await?;
        warn!(
            incident_id = %record.incident_id,
            file_id = %record.id,
            "Upload rolled back"
        );
        Ok(())
    }

    /// Files of an incident, newest first.
    pub async fn list_files(
        &self,
        incident_id: Uuid,
        caller: &UserIdentity,
    ) -> AppResult<Vec<FileAttachment>> {
        self.registry
            .authorize_on(incident_id, caller, Operation::ReadFiles)
            .await?;
        self.files.list_files(incident_id).await
    }

    async fn resolve_file(&self, file_id: Uuid) -> AppResult<FileAttachment> {
        self.files
            .find_file(file_id)
            .await?
            .ok_or_else(|| AppError::NotFound("File".into()))
    }

    /// Metadata and bytes of a file, authorized against the parent incident.
    pub async fn file_content(
        &self,
        file_id: Uuid,
        caller: &UserIdentity,
    ) -> AppResult<(FileAttachment, Blob)> {
        let file = self.resolve_file(file_id).await?;
        self.registry
            .authorize_on(file.incident_id, caller, Operation::ReadFiles)
            .await?;

        let blob = self.blobs.get(&file.filename).await?;
        Ok((file, blob))
    }

    /// Remove a file. Authorization is against the parent incident's owner.
    pub async fn delete_file(&self, file_id: Uuid, caller: &UserIdentity) -> AppResult<()> {
        let file = self.resolve_file(file_id).await?;
        let incident = self
            .registry
            .authorize_on(file.incident_id, caller, Operation::DeleteFile)
            .await?;

        remove_blob_best_effort(self.blobs.as_ref(), &file.filename).await;

        if !self.files.delete_file(file.id).await? {
            return Err(AppError::NotFound("File".into()));
        }

        self.recompute_files_count(file.incident_id, Some(&incident))
            .await?;

        info!(
            incident_id = %file.incident_id,
            file_id = %file.id,
            by = %caller.username,
            "File deleted"
        );
        Ok(())
    }

    /// Store the live comment count on the incident. With `touched`, the
    /// incident's `updated_at` is refreshed past its previous value.
    /// `None` when the incident no longer exists.
    pub async fn recompute_comments_count(
        &self,
        incident_id: Uuid,
        touched: Option<&Incident>,
    ) -> AppResult<Option<u64>> {
        let count = self.comments.count_comments(incident_id).await?;
        let updated = self
            .incidents
            .set_comments_count(incident_id, count, touched.map(|i| advance_past(i.updated_at)))
            .await?;
        Ok(updated.then_some(count))
    }

    /// Store the live file count on the incident. With `touched`, the
    /// incident's `updated_at` is refreshed past its previous value.
    /// `None` when the incident no longer exists.
    pub async fn recompute_files_count(
        &self,
        incident_id: Uuid,
        touched: Option<&Incident>,
    ) -> AppResult<Option<u64>> {
        let count = self.files.count_files(incident_id).await?;
        let updated = self
            .incidents
            .set_files_count(incident_id, count, touched.map(|i| advance_past(i.updated_at)))
            .await?;
        Ok(updated.then_some(count))
    }

    /// Recompute both counts of every incident without touching
    /// `updated_at`. Returns how many incidents had a stale count.
    pub async fn reconcile_all(&self) -> AppResult<usize> {
        let mut corrected = 0;
        for incident in self.incidents.list_incidents(None).await? {
            let comments = self.recompute_comments_count(incident.id, None).await?;
            let files = self.recompute_files_count(incident.id, None).await?;
            // Deleted since the listing
            let (Some(comments), Some(files)) = (comments, files) else {
                continue;
            };
            if comments != incident.comments_count || files != incident.files_count {
                corrected += 1;
            }
        }
        Ok(corrected)
    }
}
