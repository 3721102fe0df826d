//! Incident endpoints.

use actix_web::{HttpResponse, delete, get, post, put, web};
use uuid::Uuid;

use crate::auth::BearerAuth;
use crate::error::AppResult;
use crate::models::{
    CreateIncidentRequest, Incident, IncidentPatch, MessageResponse, StatusUpdateRequest,
};
use crate::services::OccurrenceService;

/// File a new incident. Status starts at `nova`.
#[utoipa::path(
    post,
    path = "/api/incidents",
    tag = "Incidents",
    request_body = CreateIncidentRequest,
    responses(
        (status = 200, description = "Incident created", body = Incident),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 401, description = "Unauthenticated", body = crate::error::ErrorResponse),
    ),
    security(("bearer" = []))
)]
#[post("/incidents")]
pub async fn create_incident(
    auth: BearerAuth,
    service: web::Data<OccurrenceService>,
    body: web::Json<CreateIncidentRequest>,
) -> AppResult<HttpResponse> {
    let incident = service
        .create_incident(&auth.identity, body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(incident))
}

/// All incidents for admins, own incidents otherwise; newest first.
#[utoipa::path(
    get,
    path = "/api/incidents",
    tag = "Incidents",
    responses(
        (status = 200, description = "Visible incidents", body = Vec<Incident>),
        (status = 401, description = "Unauthenticated", body = crate::error::ErrorResponse),
    ),
    security(("bearer" = []))
)]
#[get("/incidents")]
pub async fn list_incidents(
    auth: BearerAuth,
    service: web::Data<OccurrenceService>,
) -> AppResult<HttpResponse> {
    let incidents = service.list_incidents(&auth.identity).await?;
    Ok(HttpResponse::Ok().json(incidents))
}

#[utoipa::path(
    get,
    path = "/api/incidents/{id}",
    tag = "Incidents",
    params(("id" = Uuid, Path, description = "Incident ID")),
    responses(
        (status = 200, description = "Incident", body = Incident),
        (status = 403, description = "Not the owner", body = crate::error::ErrorResponse),
        (status = 404, description = "Incident not found", body = crate::error::ErrorResponse),
    ),
    security(("bearer" = []))
)]
#[get("/incidents/{id}")]
pub async fn get_incident(
    auth: BearerAuth,
    service: web::Data<OccurrenceService>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let incident = service
        .get_incident(&auth.identity, path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(incident))
}

/// Edit incident fields. Null or absent fields are kept; `status` is ignored.
#[utoipa::path(
    put,
    path = "/api/incidents/{id}",
    tag = "Incidents",
    params(("id" = Uuid, Path, description = "Incident ID")),
    request_body = IncidentPatch,
    responses(
        (status = 200, description = "Updated incident", body = Incident),
        (status = 403, description = "Not the owner", body = crate::error::ErrorResponse),
        (status = 404, description = "Incident not found", body = crate::error::ErrorResponse),
    ),
    security(("bearer" = []))
)]
#[put("/incidents/{id}")]
pub async fn update_incident(
    auth: BearerAuth,
    service: web::Data<OccurrenceService>,
    path: web::Path<Uuid>,
    body: web::Json<IncidentPatch>,
) -> AppResult<HttpResponse> {
    let incident = service
        .update_incident(&auth.identity, path.into_inner(), body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(incident))
}

/// Move an incident to any status. Admin only.
#[utoipa::path(
    put,
    path = "/api/incidents/{id}/status",
    tag = "Incidents",
    params(("id" = Uuid, Path, description = "Incident ID")),
    request_body = StatusUpdateRequest,
    responses(
        (status = 200, description = "Status updated", body = MessageResponse),
        (status = 403, description = "Admin only", body = crate::error::ErrorResponse),
        (status = 404, description = "Incident not found", body = crate::error::ErrorResponse),
    ),
    security(("bearer" = []))
)]
#[put("/incidents/{id}/status")]
pub async fn update_status(
    auth: BearerAuth,
    service: web::Data<OccurrenceService>,
    path: web::Path<Uuid>,
    body: web::Json<StatusUpdateRequest>,
) -> AppResult<HttpResponse> {
    service
        .set_status(&auth.identity, path.into_inner(), body.status)
        .await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("Status updated successfully")))
}

/// Delete an incident with its comments and files. Admin only.
#[utoipa::path(
    delete,
    path = "/api/incidents/{id}",
    tag = "Incidents",
    params(("id" = Uuid, Path, description = "Incident ID")),
    responses(
        (status = 200, description = "Incident deleted", body = MessageResponse),
        (status = 403, description = "Admin only", body = crate::error::ErrorResponse),
        (status = 404, description = "Incident not found", body = crate::error::ErrorResponse),
    ),
    security(("bearer" = []))
)]
#[delete("/incidents/{id}")]
pub async fn delete_incident(
    auth: BearerAuth,
    service: web::Data<OccurrenceService>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    service
        .delete_incident(&auth.identity, path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("Incident deleted successfully")))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(create_incident)
        .service(list_incidents)
        .service(get_incident)
        .service(update_incident)
        .service(update_status)
        .service(delete_incident);
}
