//! Liveness and readiness probes for container orchestration.
//!
//! Neither route requires a bearer token.

use actix_web::{HttpResponse, get, web};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::db::DbPool;
use crate::error::ErrorResponse;

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    status: &'static str,
    /// RFC 3339 server time
    timestamp: String,
}

#[derive(Serialize, ToSchema)]
pub struct ReadyResponse {
    status: &'static str,
    /// `connected`, or `in_memory` when no database is wired in
    database: &'static str,
}

/// The process is up and serving requests.
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "Health",
    responses((status = 200, description = "Process alive", body = HealthResponse))
)]
#[get("/health")]
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy",
        timestamp: Utc::now().to_rfc3339(),
    })
}

/// The backing store answers. Test and in-memory deployments register no
/// `DbPool` and are always ready.
#[utoipa::path(
    get,
    path = "/api/ready",
    tag = "Health",
    responses(
        (status = 200, description = "Accepting traffic", body = ReadyResponse),
        (status = 503, description = "Database unreachable", body = ErrorResponse)
    )
)]
#[get("/ready")]
pub async fn ready(pool: Option<web::Data<DbPool>>) -> HttpResponse {
    let database = match pool {
        None => "in_memory",
        Some(pool) => match pool.ping().await {
            Ok(()) => "connected",
            Err(e) => {
                tracing::warn!("Readiness probe failed: {}", e);
                return HttpResponse::ServiceUnavailable().json(ErrorResponse {
                    error: "NOT_READY".to_string(),
                    message: "Database connection failed".to_string(),
                });
            }
        },
    };

    HttpResponse::Ok().json(ReadyResponse {
        status: "ready",
        database,
    })
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(health).service(ready);
}
