//! Evidence file endpoints: multipart upload, listing, download, deletion.

use actix_multipart::{Field, Multipart};
use actix_web::http::header;
use actix_web::{HttpResponse, delete, get, post, web};
use futures_util::StreamExt;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::BearerAuth;
use crate::error::{AppError, AppResult};
use crate::models::{FileAttachment, FileUploadResponse, MessageResponse};
use crate::services::attachments::MAX_FILE_SIZE;
use crate::services::{OccurrenceService, UploadPayload};
use crate::storage::content_type_for_extension;

/// Multipart form field carrying the file.
const FILE_FIELD: &str = "file";

/// Multipart upload body (documentation only).
#[derive(Serialize, ToSchema)]
pub struct UploadForm {
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}

async fn drain_field(field: &mut Field) -> AppResult<()> {
    while let Some(chunk) = field.next().await {
        chunk.map_err(|e| AppError::InvalidInput(format!("Read error: {}", e)))?;
    }
    Ok(())
}

/// Read the `file` field. At most one byte past the size limit is kept, so
/// an oversized upload is still recognized without buffering all of it.
async fn read_upload(payload: &mut Multipart) -> AppResult<UploadPayload> {
    while let Some(item) = payload.next().await {
        let mut field =
            item.map_err(|e| AppError::InvalidInput(format!("Multipart error: {}", e)))?;

        if field.name() != Some(FILE_FIELD) {
            drain_field(&mut field).await?;
            continue;
        }

        let filename = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .unwrap_or_default()
            .to_string();
        let content_type = field.content_type().map(|m| m.essence_str().to_string());

        let mut data = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(|e| AppError::InvalidInput(format!("Read error: {}", e)))?;
            let room = (MAX_FILE_SIZE + 1).saturating_sub(data.len());
            data.extend_from_slice(&chunk[..chunk.len().min(room)]);
        }

        return Ok(UploadPayload {
            filename,
            content_type,
            data,
        });
    }

    Err(AppError::InvalidInput(format!(
        "Missing multipart field '{}'",
        FILE_FIELD
    )))
}

/// Attach a file (.jpg, .jpeg, .png or .pdf, at most 5 MiB, at most 10 per
/// incident).
#[utoipa::path(
    post,
    path = "/api/incidents/{id}/files",
    tag = "Files",
    params(("id" = Uuid, Path, description = "Incident ID")),
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "File uploaded", body = FileUploadResponse),
        (status = 400, description = "File limit reached or malformed form", body = crate::error::ErrorResponse),
        (status = 403, description = "Not the owner", body = crate::error::ErrorResponse),
        (status = 404, description = "Incident not found", body = crate::error::ErrorResponse),
        (status = 413, description = "File too large", body = crate::error::ErrorResponse),
        (status = 415, description = "File type not allowed", body = crate::error::ErrorResponse),
    ),
    security(("bearer" = []))
)]
#[post("/incidents/{id}/files")]
pub async fn upload_file(
    auth: BearerAuth,
    service: web::Data<OccurrenceService>,
    path: web::Path<Uuid>,
    mut payload: Multipart,
) -> AppResult<HttpResponse> {
    let upload = read_upload(&mut payload).await?;
    let file = service
        .upload_file(&auth.identity, path.into_inner(), upload)
        .await?;

    Ok(HttpResponse::Ok().json(FileUploadResponse {
        message: "File uploaded successfully".to_string(),
        file_id: file.id,
        file,
    }))
}

/// Files of an incident, newest first.
#[utoipa::path(
    get,
    path = "/api/incidents/{id}/files",
    tag = "Files",
    params(("id" = Uuid, Path, description = "Incident ID")),
    responses(
        (status = 200, description = "Files", body = Vec<FileAttachment>),
        (status = 403, description = "Not the owner", body = crate::error::ErrorResponse),
        (status = 404, description = "Incident not found", body = crate::error::ErrorResponse),
    ),
    security(("bearer" = []))
)]
#[get("/incidents/{id}/files")]
pub async fn list_files(
    auth: BearerAuth,
    service: web::Data<OccurrenceService>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let files = service
        .list_files(&auth.identity, path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(files))
}

/// Download a file's bytes.
#[utoipa::path(
    get,
    path = "/api/files/{id}/content",
    tag = "Files",
    params(("id" = Uuid, Path, description = "File ID")),
    responses(
        (status = 200, description = "File contents"),
        (status = 403, description = "Not the owner", body = crate::error::ErrorResponse),
        (status = 404, description = "File not found", body = crate::error::ErrorResponse),
    ),
    security(("bearer" = []))
)]
#[get("/files/{id}/content")]
pub async fn download_file(
    auth: BearerAuth,
    service: web::Data<OccurrenceService>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let (file, blob) = service
        .file_content(&auth.identity, path.into_inner())
        .await?;

    let content_type = blob
        .content_type
        .unwrap_or_else(|| content_type_for_extension(&file.file_type).to_string());

    Ok(HttpResponse::Ok()
        .content_type(content_type)
        .insert_header((
            header::CONTENT_DISPOSITION,
            format!(
                "inline; filename*=UTF-8''{}",
                urlencoding::encode(&file.original_name)
            ),
        ))
        .body(blob.data))
}

/// Remove a file. Authorized against the parent incident.
#[utoipa::path(
    delete,
    path = "/api/files/{id}",
    tag = "Files",
    params(("id" = Uuid, Path, description = "File ID")),
    responses(
        (status = 200, description = "File deleted", body = MessageResponse),
        (status = 403, description = "Not the owner", body = crate::error::ErrorResponse),
        (status = 404, description = "File not found", body = crate::error::ErrorResponse),
    ),
    security(("bearer" = []))
)]
#[delete("/files/{id}")]
pub async fn delete_file(
    auth: BearerAuth,
    service: web::Data<OccurrenceService>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    service
        .delete_file(&auth.identity, path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("File deleted successfully")))
}

/// Configure file routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(upload_file)
        .service(list_files)
        .service(download_file)
        .service(delete_file);
}
