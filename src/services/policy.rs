//! Authorization policy.
//!
//! Admins may do everything. Other callers may touch an incident and its
//! children only when they own it, and may never change status or delete
//! an incident. Callers resolve the target first so a missing resource is
//! reported as `NotFound` before any permission decision.

use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::UserIdentity;

/// Operations subject to the policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Read,
    WriteFields,
    CreateComment,
    ReadComments,
    UploadFile,
    ReadFiles,
    DeleteFile,
    StatusTransition,
    DeleteIncident,
}

impl Operation {
    pub const ALL: [Operation; 9] = [
        Self::Read,
        Self::WriteFields,
        Self::CreateComment,
        Self::ReadComments,
        Self::UploadFile,
        Self::ReadFiles,
        Self::DeleteFile,
        Self::StatusTransition,
        Self::DeleteIncident,
    ];

    /// Operations reserved to admins regardless of ownership.
    pub fn is_admin_only(&self) -> bool {
        matches!(self, Self::StatusTransition | Self::DeleteIncident)
    }
}

/// Pure access decision.
pub fn can_access(identity: &UserIdentity, operation: Operation, owner: Uuid) -> bool {
    if identity.is_admin() {
        return true;
    }
    if operation.is_admin_only() {
        return false;
    }
    identity.id == owner
}

/// [`can_access`] as a `Result`, denying with `Forbidden`.
pub fn authorize(identity: &UserIdentity, operation: Operation, owner: Uuid) -> AppResult<()> {
    if can_access(identity, operation, owner) {
        Ok(())
    } else {
        tracing::debug!(
            user = %identity.username,
            ?operation,
            "Access denied"
        );
        Err(AppError::Forbidden)
    }
}
