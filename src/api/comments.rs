//! Comment endpoints.

use actix_web::{HttpResponse, get, post, web};
use uuid::Uuid;

use crate::auth::BearerAuth;
use crate::error::AppResult;
use crate::models::{Comment, CreateCommentRequest};
use crate::services::OccurrenceService;

#[utoipa::path(
    post,
    path = "/api/incidents/{id}/comments",
    tag = "Comments",
    params(("id" = Uuid, Path, description = "Incident ID")),
    request_body = CreateCommentRequest,
    responses(
        (status = 200, description = "Comment added", body = Comment),
        (status = 403, description = "Not the owner", body = crate::error::ErrorResponse),
        (status = 404, description = "Incident not found", body = crate::error::ErrorResponse),
    ),
    security(("bearer" = []))
)]
#[post("/incidents/{id}/comments")]
pub async fn add_comment(
    auth: BearerAuth,
    service: web::Data<OccurrenceService>,
    path: web::Path<Uuid>,
    body: web::Json<CreateCommentRequest>,
) -> AppResult<HttpResponse> {
    let comment = service
        .add_comment(&auth.identity, path.into_inner(), body.into_inner().message)
        .await?;
    Ok(HttpResponse::Ok().json(comment))
}

/// Comments of an incident, oldest first.
#[utoipa::path(
    get,
    path = "/api/incidents/{id}/comments",
    tag = "Comments",
    params(("id" = Uuid, Path, description = "Incident ID")),
    responses(
        (status = 200, description = "Comments", body = Vec<Comment>),
        (status = 403, description = "Not the owner", body = crate::error::ErrorResponse),
        (status = 404, description = "Incident not found", body = crate::error::ErrorResponse),
    ),
    security(("bearer" = []))
)]
#[get("/incidents/{id}/comments")]
pub async fn list_comments(
    auth: BearerAuth,
    service: web::Data<OccurrenceService>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let comments = service
        .list_comments(&auth.identity, path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(comments))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(add_comment).service(list_comments);
}
