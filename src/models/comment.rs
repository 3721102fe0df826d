//! Comment models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// A comment on an incident. Immutable once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Comment {
    pub id: Uuid,
    pub incident_id: Uuid,
    pub user_id: Uuid,
    pub username: String,
    pub message: String,
    /// Author's role at the moment of writing; not re-derived later.
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

/// Comment creation request body.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateCommentRequest {
    pub message: String,
}
