//! Account endpoints: registration, login, current user, password change.

use actix_web::{HttpResponse, get, post, put, web};

use crate::auth::BearerAuth;
use crate::error::AppResult;
use crate::models::{
    LoginRequest, MessageResponse, PasswordUpdateRequest, RegisterRequest, UserResponse,
};
use crate::services::OccurrenceService;

/// Register a new account and receive a bearer token.
#[utoipa::path(
    post,
    path = "/api/register",
    tag = "Auth",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Account created", body = crate::models::TokenResponse),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 409, description = "Username or email already registered", body = crate::error::ErrorResponse),
    )
)]
#[post("/register")]
pub async fn register(
    service: web::Data<OccurrenceService>,
    body: web::Json<RegisterRequest>,
) -> AppResult<HttpResponse> {
    let token = service.register(body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(token))
}

/// Exchange username and password for a bearer token.
#[utoipa::path(
    post,
    path = "/api/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = crate::models::TokenResponse),
        (status = 401, description = "Incorrect username or password", body = crate::error::ErrorResponse),
    )
)]
#[post("/login")]
pub async fn login(
    service: web::Data<OccurrenceService>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let token = service.login(body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(token))
}

/// Identity of the bearer.
#[utoipa::path(
    get,
    path = "/api/me",
    tag = "Auth",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Unauthenticated", body = crate::error::ErrorResponse),
    ),
    security(("bearer" = []))
)]
#[get("/me")]
pub async fn me(auth: BearerAuth) -> HttpResponse {
    HttpResponse::Ok().json(UserResponse::from(auth.identity))
}

/// Change the caller's password. Existing tokens stay valid until expiry.
#[utoipa::path(
    put,
    path = "/api/change-password",
    tag = "Auth",
    request_body = PasswordUpdateRequest,
    responses(
        (status = 200, description = "Password updated", body = MessageResponse),
        (status = 401, description = "Current password incorrect or unauthenticated", body = crate::error::ErrorResponse),
    ),
    security(("bearer" = []))
)]
#[put("/change-password")]
pub async fn change_password(
    auth: BearerAuth,
    service: web::Data<OccurrenceService>,
    body: web::Json<PasswordUpdateRequest>,
) -> AppResult<HttpResponse> {
    service
        .change_password(&auth.identity, body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("Password updated successfully")))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(register)
        .service(login)
        .service(me)
        .service(change_password);
}
