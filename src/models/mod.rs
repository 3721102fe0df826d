//! Domain models for the occurrence book.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub mod comment;
pub mod file;
pub mod incident;
pub mod user;

// Re-export commonly used types
pub use comment::{Comment, CreateCommentRequest};
pub use file::{FileAttachment, FileUploadResponse};
pub use incident::{
    CreateIncidentRequest, Incident, IncidentPatch, IncidentStatus, Severity, StatusUpdateRequest,
};
pub use user::{
    LoginRequest, PasswordUpdateRequest, RegisterRequest, Role, SessionClaims, TokenResponse,
    UserIdentity, UserRecord, UserResponse,
};

/// Plain acknowledgement body.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
