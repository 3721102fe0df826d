//! OpenAPI documentation configuration.

use utoipa::OpenApi;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};

use crate::{api, error, models};

/// OpenAPI documentation.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Occurrence Book Server",
        version = "0.1.0",
        description = "API server for filing residential incident reports, attaching comments and evidence files, and triaging them through a status workflow"
    ),
    servers(
        (url = "/", description = "Local server")
    ),
    paths(
        // Health endpoints
        api::health::health,
        api::health::ready,
        // Account endpoints
        api::auth::register,
        api::auth::login,
        api::auth::me,
        api::auth::change_password,
        // Incident endpoints
        api::incidents::create_incident,
        api::incidents::list_incidents,
        api::incidents::get_incident,
        api::incidents::update_incident,
        api::incidents::update_status,
        api::incidents::delete_incident,
        // Comment endpoints
        api::comments::add_comment,
        api::comments::list_comments,
        // File endpoints
        api::files::upload_file,
        api::files::list_files,
        api::files::download_file,
        api::files::delete_file,
    ),
    components(
        schemas(
            // Common
            error::ErrorResponse,
            models::MessageResponse,
            // Health
            api::health::HealthResponse,
            api::health::ReadyResponse,
            // Accounts
            models::Role,
            models::RegisterRequest,
            models::LoginRequest,
            models::PasswordUpdateRequest,
            models::TokenResponse,
            models::UserResponse,
            // Incidents
            models::Severity,
            models::IncidentStatus,
            models::Incident,
            models::CreateIncidentRequest,
            models::IncidentPatch,
            models::StatusUpdateRequest,
            // Comments
            models::Comment,
            models::CreateCommentRequest,
            // Files
            models::FileAttachment,
            models::FileUploadResponse,
            api::files::UploadForm,
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Auth", description = "Registration, login and password management"),
        (name = "Incidents", description = "Incident reports and status workflow"),
        (name = "Comments", description = "Incident comments"),
        (name = "Files", description = "Incident evidence files")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Add bearer token security scheme.
struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
