//! Incident registry: incident records and the status workflow.
//!
//! Status moves freely between the four states, admin only. Field edits
//! never touch `status` and status changes never touch other fields; both
//! refresh `updated_at`.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use super::attachments::remove_blob_best_effort;
use super::policy::{self, Operation};
use super::{advance_past, now_micros};
use crate::error::{AppError, AppResult};
use crate::models::{CreateIncidentRequest, Incident, IncidentPatch, IncidentStatus, UserIdentity};
use crate::storage::BlobStore;
use crate::store::{CommentRepository, FileRepository, IncidentRepository, Repositories};

#[derive(Clone)]
pub struct IncidentRegistry {
    incidents: Arc<dyn IncidentRepository>,
    comments: Arc<dyn CommentRepository>,
    files: Arc<dyn FileRepository>,
    blobs: Arc<dyn BlobStore>,
}

impl IncidentRegistry {
    pub fn new(repos: &Repositories, blobs: Arc<dyn BlobStore>) -> Self {
        Self {
            incidents: repos.incidents.clone(),
            comments: repos.comments.clone(),
            files: repos.files.clone(),
            blobs,
        }
    }

    /// File a new incident owned by `owner`, in status `nova`.
    pub async fn create(
        &self,
        request: CreateIncidentRequest,
        owner: &UserIdentity,
    ) -> AppResult<Incident> {
        let now = now_micros();
        let incident = Incident {
            id: Uuid::now_v7(),
            title: request.title,
            description: request.description,
            category: request.category,
            location: request.location,
            people_involved: request.people_involved,
            severity: request.severity,
            status: IncidentStatus::Nova,
            created_by: owner.id,
            created_by_username: owner.username.clone(),
            created_at: now,
            updated_at: now,
            comments_count: 0,
            files_count: 0,
        };

        self.incidents.insert_incident(&incident).await?;

        info!(
            incident_id = %incident.id,
            owner = %owner.username,
            severity = %incident.severity,
            "Incident created"
        );

        Ok(incident)
    }

    /// Every incident for admins, own incidents otherwise; newest first.
    pub async fn list(&self, caller: &UserIdentity) -> AppResult<Vec<Incident>> {
        let owner = if caller.is_admin() {
            None
        } else {
            Some(caller.id)
        };
        self.incidents.list_incidents(owner).await
    }

    /// Look up an incident without any access check.
    pub async fn resolve(&self, id: Uuid) -> AppResult<Incident> {
        self.incidents
            .find_incident(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Incident".into()))
    }

    /// Resolve, then authorize `operation` against the incident's owner.
    pub async fn authorize_on(
        &self,
        id: Uuid,
        caller: &UserIdentity,
        operation: Operation,
    ) -> AppResult<Incident> {
        let incident = self.resolve(id).await?;
        policy::authorize(caller, operation, incident.created_by)?;
        Ok(incident)
    }

    pub async fn get(&self, id: Uuid, caller: &UserIdentity) -> AppResult<Incident> {
        self.authorize_on(id, caller, Operation::Read).await
    }

    /// Apply the supplied fields. An empty patch only refreshes `updated_at`.
    pub async fn update_fields(
        &self,
        id: Uuid,
        caller: &UserIdentity,
        patch: &IncidentPatch,
    ) -> AppResult<Incident> {
        let current = self.authorize_on(id, caller, Operation::WriteFields).await?;

        self.incidents
            .update_incident_fields(id, patch, advance_past(current.updated_at))
            .await?
            .ok_or_else(|| AppError::NotFound("Incident".into()))
    }

    pub async fn set_status(
        &self,
        id: Uuid,
        caller: &UserIdentity,
        status: IncidentStatus,
    ) -> AppResult<()> {
        let current = self
            .authorize_on(id, caller, Operation::StatusTransition)
            .await?;

        if !self
            .incidents
            .set_incident_status(id, status, advance_past(current.updated_at))
            .await?
        {
            return Err(AppError::NotFound("Incident".into()));
        }

        info!(
            incident_id = %id,
            from = %current.status,
            to = %status,
            by = %caller.username,
            "Incident status changed"
        );
        Ok(())
    }

    /// Delete an incident and everything attached to it.
    ///
    /// The incident record goes first so no new children can be authorized
    /// against it; comments and file records follow, and blobs are removed
    /// best-effort.
    pub async fn delete(&self, id: Uuid, caller: &UserIdentity) -> AppResult<()> {
        self.authorize_on(id, caller, Operation::DeleteIncident)
            .await?;

        if !self.incidents.delete_incident(id).await? {
            return Err(AppError::NotFound("Incident".into()));
        }

        let comments_removed = self.comments.delete_comments_for_incident(id).await?;

        let files = self.files.list_files(id).await?;
        for file in &files {
            remove_blob_best_effort(self.blobs.as_ref(), &file.filename).await;
            self.files.delete_file(file.id).await?;
        }

        info!(
            incident_id = %id,
            comments_removed,
            files_removed = files.len(),
            by = %caller.username,
            "Incident deleted"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Role, Severity};
    use crate::services::attachments::{AttachmentLedger, UploadPayload};
    use crate::storage::LocalBlobStore;

    fn identity(name: &str, role: Role) -> UserIdentity {
        UserIdentity {
            id: Uuid::new_v4(),
            username: name.into(),
            email: format!("{}@x.com", name),
            role,
        }
    }

    fn request(severity: Severity) -> CreateIncidentRequest {
        CreateIncidentRequest {
            title: "Barulho".into(),
            description: "Festa até tarde".into(),
            category: "barulho".into(),
            location: "204".into(),
            people_involved: "Bloco B".into(),
            severity,
        }
    }

    async fn registry() -> (tempfile::TempDir, IncidentRegistry) {
        let dir = tempfile::tempdir().unwrap();
        let blobs: Arc<dyn BlobStore> = Arc::new(LocalBlobStore::new(dir.path()).await.unwrap());
        (dir, IncidentRegistry::new(&Repositories::in_memory(), blobs))
    }

    async fn tick() {
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
    }

    #[actix_rt::test]
    async fn test_create_defaults() {
        let (_dir, registry) = registry().await;
        let alice = identity("alice", Role::User);
        let incident = registry.create(request(Severity::Alta), &alice).await.unwrap();

        assert_eq!(incident.status, IncidentStatus::Nova);
        assert_eq!(incident.created_by, alice.id);
        assert_eq!(incident.created_by_username, "alice");
        assert_eq!((incident.comments_count, incident.files_count), (0, 0));
        assert_eq!(incident.created_at, incident.updated_at);
    }

    #[actix_rt::test]
    async fn test_list_scoping_and_order() {
        let (_dir, registry) = registry().await;
        let alice = identity("alice", Role::User);
        let bob = identity("bob", Role::User);
        let admin = identity("root", Role::Admin);

        let a1 = registry.create(request(Severity::Baixa), &alice).await.unwrap();
        tick().await;
        let b1 = registry.create(request(Severity::Media), &bob).await.unwrap();
        tick().await;
        let a2 = registry.create(request(Severity::Alta), &alice).await.unwrap();

        let mine: Vec<Uuid> = registry.list(&alice).await.unwrap().iter().map(|i| i.id).collect();
        assert_eq!(mine, vec![a2.id, a1.id]);

        let all: Vec<Uuid> = registry.list(&admin).await.unwrap().iter().map(|i| i.id).collect();
        assert_eq!(all.len(), 3);
        assert!(all.contains(&b1.id));
    }

    #[actix_rt::test]
    async fn test_not_found_before_forbidden() {
        let (_dir, registry) = registry().await;
        let alice = identity("alice", Role::User);
        let bob = identity("bob", Role::User);
        let incident = registry.create(request(Severity::Media), &alice).await.unwrap();

        assert!(matches!(
            registry.get(incident.id, &bob).await,
            Err(AppError::Forbidden)
        ));
        assert!(matches!(
            registry.get(Uuid::new_v4(), &bob).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            registry.set_status(Uuid::new_v4(), &bob, IncidentStatus::Resolvida).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            registry.delete(Uuid::new_v4(), &bob).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[actix_rt::test]
    async fn test_status_transitions_admin_only() {
        let (_dir, registry) = registry().await;
        let alice = identity("alice", Role::User);
        let admin = identity("root", Role::Admin);
        let incident = registry.create(request(Severity::Media), &alice).await.unwrap();

        assert!(matches!(
            registry.set_status(incident.id, &alice, IncidentStatus::Resolvida).await,
            Err(AppError::Forbidden)
        ));

        for from in IncidentStatus::ALL {
            for to in IncidentStatus::ALL {
                registry.set_status(incident.id, &admin, from).await.unwrap();
                let before = registry.resolve(incident.id).await.unwrap();
                registry.set_status(incident.id, &admin, to).await.unwrap();
                let after = registry.get(incident.id, &alice).await.unwrap();
                assert_eq!(after.status, to);
                assert!(after.updated_at > before.updated_at);
                assert_eq!(after.title, before.title);
            }
        }
    }

    #[actix_rt::test]
    async fn test_empty_patch_only_bumps_updated_at() {
        let (_dir, registry) = registry().await;
        let alice = identity("alice", Role::User);
        let incident = registry.create(request(Severity::Media), &alice).await.unwrap();

        let updated = registry
            .update_fields(incident.id, &alice, &IncidentPatch::default())
            .await
            .unwrap();

        assert!(updated.updated_at > incident.updated_at);
        let mut expected = incident.clone();
        expected.updated_at = updated.updated_at;
        assert_eq!(updated, expected);
    }

    #[actix_rt::test]
    async fn test_patch_applies_only_supplied_fields() {
        let (_dir, registry) = registry().await;
        let alice = identity("alice", Role::User);
        let incident = registry.create(request(Severity::Media), &alice).await.unwrap();

        let patch = IncidentPatch {
            title: Some("Barulho excessivo".into()),
            severity: Some(Severity::Alta),
            ..Default::default()
        };
        let updated = registry.update_fields(incident.id, &alice, &patch).await.unwrap();
        assert_eq!(updated.title, "Barulho excessivo");
        assert_eq!(updated.severity, Severity::Alta);
        assert_eq!(updated.description, incident.description);
        assert_eq!(updated.status, IncidentStatus::Nova);
    }

    #[actix_rt::test]
    async fn test_delete_cascades() {
        let dir = tempfile::tempdir().unwrap();
        let blobs: Arc<dyn BlobStore> = Arc::new(LocalBlobStore::new(dir.path()).await.unwrap());
        let repos = Repositories::in_memory();
        let registry = IncidentRegistry::new(&repos, blobs.clone());
        let ledger = AttachmentLedger::new(&repos, blobs.clone(), registry.clone());

        let alice = identity("alice", Role::User);
        let admin = identity("root", Role::Admin);
        let incident = registry.create(request(Severity::Media), &alice).await.unwrap();
        ledger.add_comment(incident.id, &alice, "oi".into()).await.unwrap();
        let file = ledger
            .upload_file(
                incident.id,
                &alice,
                UploadPayload {
                    filename: "foto.png".into(),
                    content_type: None,
                    data: vec![1, 2, 3],
                },
            )
            .await
            .unwrap();

        assert!(matches!(
            registry.delete(incident.id, &alice).await,
            Err(AppError::Forbidden)
        ));
        registry.delete(incident.id, &admin).await.unwrap();

        assert!(matches!(
            registry.resolve(incident.id).await,
            Err(AppError::NotFound(_))
        ));
        assert_eq!(repos.comments.count_comments(incident.id).await.unwrap(), 0);
        assert_eq!(repos.files.count_files(incident.id).await.unwrap(), 0);
        assert!(matches!(
            blobs.get(&file.filename).await,
            Err(AppError::NotFound(_))
        ));
    }
}
