//! Access-controlled façade composed of the credential store, token
//! service, incident registry and attachment ledger.
//!
//! Handlers call into [`OccurrenceService`] only; every incident or
//! attachment operation takes the resolved caller identity.

use std::sync::Arc;

use secrecy::SecretString;
use uuid::Uuid;

use super::attachments::{AttachmentLedger, UploadPayload};
use super::credentials::CredentialStore;
use super::incidents::IncidentRegistry;
use super::tokens::TokenService;
use crate::config::TokenSettings;
use crate::error::AppResult;
use crate::models::{
    Comment, CreateIncidentRequest, FileAttachment, Incident, IncidentPatch, IncidentStatus,
    LoginRequest, PasswordUpdateRequest, RegisterRequest, TokenResponse, UserIdentity,
};
use crate::storage::{Blob, BlobStore};
use crate::store::Repositories;

#[derive(Clone)]
pub struct OccurrenceService {
    credentials: CredentialStore,
    tokens: TokenService,
    registry: IncidentRegistry,
    ledger: AttachmentLedger,
}

impl OccurrenceService {
    pub fn new(repos: Repositories, blobs: Arc<dyn BlobStore>, tokens: &TokenSettings) -> Self {
        let credentials = CredentialStore::new(repos.users.clone());
        let tokens = TokenService::new(tokens, credentials.clone());
        let registry = IncidentRegistry::new(&repos, blobs.clone());
        let ledger = AttachmentLedger::new(&repos, blobs, registry.clone());

        Self {
            credentials,
            tokens,
            registry,
            ledger,
        }
    }

    fn token_response(&self, identity: UserIdentity) -> AppResult<TokenResponse> {
        Ok(TokenResponse {
            access_token: self.tokens.issue(&identity.username)?,
            token_type: "bearer".to_string(),
            user: identity.into(),
        })
    }

    /// Seed the admin account on first startup.
    pub async fn bootstrap(&self) -> AppResult<bool> {
        self.credentials.ensure_bootstrap_admin().await
    }

    pub async fn register(&self, request: RegisterRequest) -> AppResult<TokenResponse> {
        let identity = self
            .credentials
            .register(&request.username, &request.email, &request.password)
            .await?;
        self.token_response(identity)
    }

    pub async fn login(&self, request: LoginRequest) -> AppResult<TokenResponse> {
        let identity = self
            .credentials
            .authenticate(&request.username, &request.password)
            .await?;
        self.token_response(identity)
    }

    /// Map a bearer token to the caller's current identity.
    pub async fn authenticate_bearer(&self, token: &SecretString) -> AppResult<UserIdentity> {
        self.tokens.validate(token).await
    }

    pub async fn change_password(
        &self,
        caller: &UserIdentity,
        request: PasswordUpdateRequest,
    ) -> AppResult<()> {
        self.credentials
            .change_password(caller, &request.current_password, &request.new_password)
            .await
    }

    pub async fn create_incident(
        &self,
        caller: &UserIdentity,
        request: CreateIncidentRequest,
    ) -> AppResult<Incident> {
        self.registry.create(request, caller).await
    }

    pub async fn list_incidents(&self, caller: &UserIdentity) -> AppResult<Vec<Incident>> {
        self.registry.list(caller).await
    }

    pub async fn get_incident(&self, caller: &UserIdentity, id: Uuid) -> AppResult<Incident> {
        self.registry.get(id, caller).await
    }

    pub async fn update_incident(
        &self,
        caller: &UserIdentity,
        id: Uuid,
        patch: IncidentPatch,
    ) -> AppResult<Incident> {
        self.registry.update_fields(id, caller, &patch).await
    }

    pub async fn set_status(
        &self,
        caller: &UserIdentity,
        id: Uuid,
        status: IncidentStatus,
    ) -> AppResult<()> {
        self.registry.set_status(id, caller, status).await
    }

    pub async fn delete_incident(&self, caller: &UserIdentity, id: Uuid) -> AppResult<()> {
        self.registry.delete(id, caller).await
    }

    pub async fn add_comment(
        &self,
        caller: &UserIdentity,
        incident_id: Uuid,
        message: String,
    ) -> AppResult<Comment> {
        self.ledger.add_comment(incident_id, caller, message).await
    }

    pub async fn list_comments(
        &self,
        caller: &UserIdentity,
        incident_id: Uuid,
    ) -> AppResult<Vec<Comment>> {
        self.ledger.list_comments(incident_id, caller).await
    }

    pub async fn upload_file(
        &self,
        caller: &UserIdentity,
        incident_id: Uuid,
        payload: UploadPayload,
    ) -> AppResult<FileAttachment> {
        self.ledger.upload_file(incident_id, caller, payload).await
    }

    pub async fn list_files(
        &self,
        caller: &UserIdentity,
        incident_id: Uuid,
    ) -> AppResult<Vec<FileAttachment>> {
        self.ledger.list_files(incident_id, caller).await
    }

    pub async fn file_content(
        &self,
        caller: &UserIdentity,
        file_id: Uuid,
    ) -> AppResult<(FileAttachment, Blob)> {
        self.ledger.file_content(file_id, caller).await
    }

    pub async fn delete_file(&self, caller: &UserIdentity, file_id: Uuid) -> AppResult<()> {
        self.ledger.delete_file(file_id, caller).await
    }

    /// Recompute the denormalized counts of every incident.
    pub async fn reconcile_counts(&self) -> AppResult<usize> {
        self.ledger.reconcile_all().await
    }
}
