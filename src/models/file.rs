//! Evidence file attachment models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Metadata of a file attached to an incident. The bytes live in the blob
/// store under `filename`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FileAttachment {
    pub id: Uuid,
    pub incident_id: Uuid,
    /// Server-generated stored-name.
    pub filename: String,
    /// Client-supplied name.
    pub original_name: String,
    /// Lower-cased extension including the dot, e.g. ".pdf".
    pub file_type: String,
    pub file_size: u64,
    pub upload_date: DateTime<Utc>,
}

/// Response for a successful upload.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FileUploadResponse {
    pub message: String,
    pub file_id: Uuid,
    pub file: FileAttachment,
}
