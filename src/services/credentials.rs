//! Credential store: registration, password verification and the
//! bootstrap admin account.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use tracing::info;
use uuid::Uuid;

use super::{advance_past, now_micros};
use crate::auth::password;
use crate::error::{AppError, AppResult};
use crate::models::{Role, UserIdentity, UserRecord};
use crate::store::UserRepository;

/// Username of the account seeded on first startup.
pub const BOOTSTRAP_ADMIN_USERNAME: &str = "admin";

/// Well-known initial password of the seeded admin.
///
/// This is an operational bootstrap so a fresh deployment can be
/// administered at all. It is not a secure default: change the password
/// through `PUT /api/change-password` right after the first deployment.
pub const BOOTSTRAP_ADMIN_PASSWORD: &str = "admin123";

const BOOTSTRAP_ADMIN_EMAIL: &str = "admin@occurrence-book.local";

#[derive(Clone)]
pub struct CredentialStore {
    users: Arc<dyn UserRepository>,
}

/// Run argon2 hashing on the blocking pool.
async fn hash_blocking(plain: &SecretString) -> AppResult<String> {
    let plain = SecretString::from(plain.expose_secret().to_owned());
    tokio::task::spawn_blocking(move || password::hash_password(plain.expose_secret()))
        .await
        .map_err(|e| AppError::Internal(format!("Password hashing task failed: {}", e)))?
}

/// Run argon2 verification on the blocking pool.
async fn verify_blocking(plain: &SecretString, hash: &str) -> AppResult<bool> {
    let plain = SecretString::from(plain.expose_secret().to_owned());
    let hash = hash.to_owned();
    tokio::task::spawn_blocking(move || password::verify_password(plain.expose_secret(), &hash))
        .await
        .map_err(|e| AppError::Internal(format!("Password verification task failed: {}", e)))?
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    }
}

impl CredentialStore {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// Create a `user` account.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        plain_password: &SecretString,
    ) -> AppResult<UserIdentity> {
        if username.trim().is_empty() {
            return Err(AppError::InvalidInput("username must not be empty".into()));
        }
        if !is_plausible_email(email) {
            return Err(AppError::InvalidInput(format!("invalid email address '{}'", email)));
        }
        if plain_password.expose_secret().is_empty() {
            return Err(AppError::InvalidInput("password must not be empty".into()));
        }

        if self.users.username_or_email_exists(username, email).await? {
            return Err(AppError::Conflict(
                "Username or email already registered".into(),
            ));
        }

        let now = now_micros();
        let record = UserRecord {
            id: Uuid::new_v4(),
            username: username.to_string(),
            email: email.to_string(),
            password_hash: hash_blocking(plain_password).await?,
            role: Role::User,
            created_at: now,
            updated_at: now,
        };

        // The unique indexes still catch a concurrent registration.
        self.users.insert_user(&record).await?;

        info!(user = %record.username, "User registered");

        Ok(record.identity())
    }

    /// Verify a username/password pair. Both failure cases produce the same
    /// `InvalidCredentials` error.
    pub async fn authenticate(
        &self,
        username: &str,
        plain_password: &SecretString,
    ) -> AppResult<UserIdentity> {
        let user = self
            .users
            .find_user_by_username(username)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !verify_blocking(plain_password, &user.password_hash).await? {
            return Err(AppError::InvalidCredentials);
        }

        Ok(user.identity())
    }

    pub async fn change_password(
        &self,
        identity: &UserIdentity,
        current_password: &SecretString,
        new_password: &SecretString,
    ) -> AppResult<()> {
        let user = self
            .users
            .find_user_by_id(identity.id)
            .await?
            .ok_or_else(|| AppError::NotFound("User".into()))?;

        if !verify_blocking(current_password, &user.password_hash).await? {
            return Err(AppError::InvalidCredentials);
        }
        if new_password.expose_secret().is_empty() {
            return Err(AppError::InvalidInput("new password must not be empty".into()));
        }

        let hash = hash_blocking(new_password).await?;
        if !self
            .users
            .update_password_hash(user.id, &hash, advance_past(user.updated_at))
            .await?
        {
            return Err(AppError::NotFound("User".into()));
        }

        info!(user = %user.username, "Password changed");
        Ok(())
    }

    /// Current identity for a username, if the account exists.
    pub async fn resolve_username(&self, username: &str) -> AppResult<Option<UserIdentity>> {
        Ok(self
            .users
            .find_user_by_username(username)
            .await?
            .map(|u| u.identity()))
    }

    /// Seed the admin account if it does not exist yet. Returns whether an
    /// account was created.
    pub async fn ensure_bootstrap_admin(&self) -> AppResult<bool> {
        if self
            .users
            .find_user_by_username(BOOTSTRAP_ADMIN_USERNAME)
            .await?
            .is_some()
        {
            return Ok(false);
        }

        let initial = SecretString::from(BOOTSTRAP_ADMIN_PASSWORD.to_string());
        let now = now_micros();
        let record = UserRecord {
            id: Uuid::new_v4(),
            username: BOOTSTRAP_ADMIN_USERNAME.to_string(),
            email: BOOTSTRAP_ADMIN_EMAIL.to_string(),
            password_hash: hash_blocking(&initial).await?,
            role: Role::Admin,
            created_at: now,
            updated_at: now,
        };

        match self.users.insert_user(&record).await {
            Ok(()) => {
                tracing::warn!(
                    "Bootstrap admin '{}' created with the well-known initial password; change it now",
                    BOOTSTRAP_ADMIN_USERNAME
                );
                Ok(true)
            }
            // Another instance seeded it first
            Err(AppError::Conflict(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }
}
