//! API endpoint modules.
//!
//! Handlers are thin: extract, call [`crate::services::OccurrenceService`],
//! serialize. All routes are mounted under `/api`.

pub mod auth;
pub mod comments;
pub mod files;
pub mod health;
pub mod incidents;
pub mod openapi;

use actix_web::web;

use crate::error::AppError;

pub use openapi::ApiDoc;

/// Register every route plus the body/path error mapping.
///
/// Malformed JSON and unknown enum literals become `InvalidInput`; a path
/// segment that is not a valid identifier cannot name an existing resource,
/// so it becomes `NotFound`.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| AppError::InvalidInput(err.to_string()).into()),
    )
    .app_data(
        web::PathConfig::default()
            .error_handler(|_err, _req| AppError::NotFound("Resource".to_string()).into()),
    )
    .configure(health::configure_routes)
    .configure(auth::configure_routes)
    .configure(incidents::configure_routes)
    .configure(comments::configure_routes)
    .configure(files::configure_routes);
}
