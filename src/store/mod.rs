//! Repository interfaces over the keyed document collections.
//!
//! Each collection (users, incidents, comments, files) is a trait so the
//! core services can run against PostgreSQL ([`crate::db::DbPool`]) or the
//! in-memory [`MemoryStore`]. Every method is a single-record operation or a
//! single equality-filtered query; none of them spans collections.

mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{Comment, FileAttachment, Incident, IncidentPatch, IncidentStatus, UserRecord};

pub use memory::MemoryStore;

/// User accounts.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new account. A duplicate username or email is a `Conflict`.
    async fn insert_user(&self, user: &UserRecord) -> AppResult<()>;

    async fn find_user_by_username(&self, username: &str) -> AppResult<Option<UserRecord>>;

    async fn find_user_by_id(&self, id: Uuid) -> AppResult<Option<UserRecord>>;

    /// Single combined existence query, exact case-sensitive match.
    async fn username_or_email_exists(&self, username: &str, email: &str) -> AppResult<bool>;

    /// Replace the stored hash. Returns false if the user does not exist.
    async fn update_password_hash(
        &self,
        id: Uuid,
        password_hash: &str,
        updated_at: DateTime<Utc>,
    ) -> AppResult<bool>;
}

/// Incident records.
#[async_trait]
pub trait IncidentRepository: Send + Sync {
    async fn insert_incident(&self, incident: &Incident) -> AppResult<()>;

    async fn find_incident(&self, id: Uuid) -> AppResult<Option<Incident>>;

    /// All incidents, or only those created by `owner`, newest first.
    async fn list_incidents(&self, owner: Option<Uuid>) -> AppResult<Vec<Incident>>;

    /// Set the supplied fields plus `updated_at`; returns the stored record
    /// afterwards, or `None` if it does not exist.
    async fn update_incident_fields(
        &self,
        id: Uuid,
        patch: &IncidentPatch,
        updated_at: DateTime<Utc>,
    ) -> AppResult<Option<Incident>>;

    async fn set_incident_status(
        &self,
        id: Uuid,
        status: IncidentStatus,
        updated_at: DateTime<Utc>,
    ) -> AppResult<bool>;

    /// Store a recomputed `comments_count`, optionally touching `updated_at`.
    async fn set_comments_count(
        &self,
        id: Uuid,
        count: u64,
        updated_at: Option<DateTime<Utc>>,
    ) -> AppResult<bool>;

    /// Store a recomputed `files_count`, optionally touching `updated_at`.
    async fn set_files_count(
        &self,
        id: Uuid,
        count: u64,
        updated_at: Option<DateTime<Utc>>,
    ) -> AppResult<bool>;

    async fn delete_incident(&self, id: Uuid) -> AppResult<bool>;
}

/// Comments, keyed by id and filtered by parent incident.
#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn insert_comment(&self, comment: &Comment) -> AppResult<()>;

    /// Comments of an incident, oldest first.
    async fn list_comments(&self, incident_id: Uuid) -> AppResult<Vec<Comment>>;

    async fn count_comments(&self, incident_id: Uuid) -> AppResult<u64>;

    async fn delete_comments_for_incident(&self, incident_id: Uuid) -> AppResult<u64>;
}

/// File attachment metadata, keyed by id and filtered by parent incident.
#[async_trait]
pub trait FileRepository: Send + Sync {
    async fn insert_file(&self, file: &FileAttachment) -> AppResult<()>;

    async fn find_file(&self, id: Uuid) -> AppResult<Option<FileAttachment>>;

    /// Files of an incident, newest first.
    async fn list_files(&self, incident_id: Uuid) -> AppResult<Vec<FileAttachment>>;

    async fn count_files(&self, incident_id: Uuid) -> AppResult<u64>;

    async fn delete_file(&self, id: Uuid) -> AppResult<bool>;
}

/// The four collections, injected into every component that needs them.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub incidents: Arc<dyn IncidentRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub files: Arc<dyn FileRepository>,
}

impl Repositories {
    /// Use one backend for all four collections.
    pub fn from_shared<S>(store: Arc<S>) -> Self
    where
        S: UserRepository + IncidentRepository + CommentRepository + FileRepository + 'static,
    {
        Self {
            users: store.clone(),
            incidents: store.clone(),
            comments: store.clone(),
            files: store,
        }
    }

    /// Fresh in-memory backend.
    pub fn in_memory() -> Self {
        Self::from_shared(Arc::new(MemoryStore::new()))
    }
}
