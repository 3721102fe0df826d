//! Bearer token issuing and validation.
//!
//! Tokens are stateless HS256 JWTs whose subject is the username. There is
//! no server-side revocation; logout is a client-side discard.

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};

use super::credentials::CredentialStore;
use crate::config::TokenSettings;
use crate::error::{AppError, AppResult};
use crate::models::{SessionClaims, UserIdentity};

#[derive(Clone)]
pub struct TokenService {
    secret: SecretString,
    ttl: chrono::Duration,
    credentials: CredentialStore,
}

impl TokenService {
    pub fn new(settings: &TokenSettings, credentials: CredentialStore) -> Self {
        Self {
            secret: settings.secret.clone(),
            ttl: chrono::Duration::minutes(settings.ttl_minutes),
            credentials,
        }
    }

    /// Issue a token for `username`, valid for the configured lifetime.
    pub fn issue(&self, username: &str) -> AppResult<String> {
        self.issue_at(username, Utc::now())
    }

    /// Issue a token as if the current time were `now`.
    pub fn issue_at(&self, username: &str, now: DateTime<Utc>) -> AppResult<String> {
        let exp = now + self.ttl;
        let claims = SessionClaims {
            sub: Some(username.to_string()),
            exp: exp.timestamp().max(0) as usize,
            iat: now.timestamp().max(0) as usize,
        };

        let key = EncodingKey::from_secret(self.secret.expose_secret().as_bytes());
        encode(&Header::new(Algorithm::HS256), &claims, &key)
            .map_err(|e| AppError::Internal(format!("Failed to create access token: {}", e)))
    }

    /// Check signature, expiry and subject, then resolve the subject to a
    /// current identity.
    pub async fn validate(&self, token: &SecretString) -> AppResult<UserIdentity> {
        let key = DecodingKey::from_secret(self.secret.expose_secret().as_bytes());
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_aud = false;

        let data = decode::<SessionClaims>(token.expose_secret(), &key, &validation)
            .map_err(|e| AppError::Unauthenticated(format!("invalid token: {}", e)))?;

        let username = data
            .claims
            .sub
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AppError::Unauthenticated("token has no subject".into()))?;

        self.credentials
            .resolve_username(&username)
            .await?
            .ok_or_else(|| AppError::Unauthenticated("subject no longer exists".into()))
    }
}
