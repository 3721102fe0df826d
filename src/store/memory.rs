//! In-memory repository backend used by tests and local experiments.
//!
//! Locks are only held for the duration of a single synchronous map
//! operation, never across an await point.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{CommentRepository, FileRepository, IncidentRepository, UserRepository};
use crate::error::{AppError, AppResult};
use crate::models::{Comment, FileAttachment, Incident, IncidentPatch, IncidentStatus, UserRecord};

#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<Uuid, UserRecord>>,
    incidents: RwLock<HashMap<Uuid, Incident>>,
    comments: RwLock<HashMap<Uuid, Comment>>,
    files: RwLock<HashMap<Uuid, FileAttachment>>,
}

fn read<T>(lock: &RwLock<T>) -> AppResult<RwLockReadGuard<'_, T>> {
    lock.read()
        .map_err(|_| AppError::Database("In-memory store lock poisoned".to_string()))
}

fn write<T>(lock: &RwLock<T>) -> AppResult<RwLockWriteGuard<'_, T>> {
    lock.write()
        .map_err(|_| AppError::Database("In-memory store lock poisoned".to_string()))
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn insert_user(&self, user: &UserRecord) -> AppResult<()> {
        let mut users = write(&self.users)?;
        if users
            .values()
            .any(|u| u.username == user.username || u.email == user.email)
        {
            return Err(AppError::Conflict(
                "Username or email already registered".to_string(),
            ));
        }
        users.insert(user.id, user.clone());
        Ok(())
    }

    async fn find_user_by_username(&self, username: &str) -> AppResult<Option<UserRecord>> {
        Ok(read(&self.users)?
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn find_user_by_id(&self, id: Uuid) -> AppResult<Option<UserRecord>> {
        Ok(read(&self.users)?.get(&id).cloned())
    }

    async fn username_or_email_exists(&self, username: &str, email: &str) -> AppResult<bool> {
        Ok(read(&self.users)?
            .values()
            .any(|u| u.username == username || u.email == email))
    }

    async fn update_password_hash(
        &self,
        id: Uuid,
        password_hash: &str,
        updated_at: DateTime<Utc>,
    ) -> AppResult<bool> {
        let mut users = write(&self.users)?;
        match users.get_mut(&id) {
            Some(user) => {
                user.password_hash = password_hash.to_string();
                user.updated_at = updated_at;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl IncidentRepository for MemoryStore {
    async fn insert_incident(&self, incident: &Incident) -> AppResult<()> {
        write(&self.incidents)?.insert(incident.id, incident.clone());
        Ok(())
    }

    async fn find_incident(&self, id: Uuid) -> AppResult<Option<Incident>> {
        Ok(read(&self.incidents)?.get(&id).cloned())
    }

    async fn list_incidents(&self, owner: Option<Uuid>) -> AppResult<Vec<Incident>> {
        let mut incidents: Vec<Incident> = read(&self.incidents)?
            .values()
            .filter(|i| owner.is_none_or(|o| i.created_by == o))
            .cloned()
            .collect();
        incidents.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(incidents)
    }

    async fn update_incident_fields(
        &self,
        id: Uuid,
        patch: &IncidentPatch,
        updated_at: DateTime<Utc>,
    ) -> AppResult<Option<Incident>> {
        let mut incidents = write(&self.incidents)?;
        Ok(incidents.get_mut(&id).map(|incident| {
            patch.apply_to(incident);
            incident.updated_at = updated_at;
            incident.clone()
        }))
    }

    async fn set_incident_status(
        &self,
        id: Uuid,
        status: IncidentStatus,
        updated_at: DateTime<Utc>,
    ) -> AppResult<bool> {
        let mut incidents = write(&self.incidents)?;
        match incidents.get_mut(&id) {
            Some(incident) => {
                incident.status = status;
                incident.updated_at = updated_at;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn set_comments_count(
        &self,
        id: Uuid,
        count: u64,
        updated_at: Option<DateTime<Utc>>,
    ) -> AppResult<bool> {
        let mut incidents = write(&self.incidents)?;
        match incidents.get_mut(&id) {
            Some(incident) => {
                incident.comments_count = count;
                if let Some(ts) = updated_at {
                    incident.updated_at = ts;
                }
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn set_files_count(
        &self,
        id: Uuid,
        count: u64,
        updated_at: Option<DateTime<Utc>>,
    ) -> AppResult<bool> {
        let mut incidents = write(&self.incidents)?;
        match incidents.get_mut(&id) {
            Some(incident) => {
                incident.files_count = count;
                if let Some(ts) = updated_at {
                    incident.updated_at = ts;
                }
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_incident(&self, id: Uuid) -> AppResult<bool> {
        Ok(write(&self.incidents)?.remove(&id).is_some())
    }
}

#[async_trait]
impl CommentRepository for MemoryStore {
    async fn insert_comment(&self, comment: &Comment) -> AppResult<()> {
        write(&self.comments)?.insert(comment.id, comment.clone());
        Ok(())
    }

    async fn list_comments(&self, incident_id: Uuid) -> AppResult<Vec<Comment>> {
        let mut comments: Vec<Comment> = read(&self.comments)?
            .values()
            .filter(|c| c.incident_id == incident_id)
            .cloned()
            .collect();
        comments.sort_by(|a, b| (a.created_at, a.id).cmp(&(b.created_at, b.id)));
        Ok(comments)
    }

    async fn count_comments(&self, incident_id: Uuid) -> AppResult<u64> {
        Ok(read(&self.comments)?
            .values()
            .filter(|c| c.incident_id == incident_id)
            .count() as u64)
    }

    async fn delete_comments_for_incident(&self, incident_id: Uuid) -> AppResult<u64> {
        let mut comments = write(&self.comments)?;
        let before = comments.len();
        comments.retain(|_, c| c.incident_id != incident_id);
        Ok((before - comments.len()) as u64)
    }
}

#[async_trait]
impl FileRepository for MemoryStore {
    async fn insert_file(&self, file: &FileAttachment) -> AppResult<()> {
        let mut files = write(&self.files)?;
        if files.values().any(|f| f.filename == file.filename) {
            return Err(AppError::Conflict(format!(
                "Stored name {} already in use",
                file.filename
            )));
        }
        files.insert(file.id, file.clone());
        Ok(())
    }

    async fn find_file(&self, id: Uuid) -> AppResult<Option<FileAttachment>> {
        Ok(read(&self.files)?.get(&id).cloned())
    }

    async fn list_files(&self, incident_id: Uuid) -> AppResult<Vec<FileAttachment>> {
        let mut files: Vec<FileAttachment> = read(&self.files)?
            .values()
            .filter(|f| f.incident_id == incident_id)
            .cloned()
            .collect();
        files.sort_by(|a, b| (b.upload_date, b.id).cmp(&(a.upload_date, a.id)));
        Ok(files)
    }

    async fn count_files(&self, incident_id: Uuid) -> AppResult<u64> {
        Ok(read(&self.files)?
            .values()
            .filter(|f| f.incident_id == incident_id)
            .count() as u64)
    }

    async fn delete_file(&self, id: Uuid) -> AppResult<bool> {
        Ok(write(&self.files)?.remove(&id).is_some())
    }
}
