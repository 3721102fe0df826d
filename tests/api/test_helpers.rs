//! Shared test helpers for the HTTP suite.

use std::sync::Arc;

use actix_web::dev::ServiceResponse;
use actix_web::{App, test, web};
use occurrence_book_lib::api;
use occurrence_book_lib::config::TokenSettings;
use occurrence_book_lib::services::OccurrenceService;
use occurrence_book_lib::services::credentials::{
    BOOTSTRAP_ADMIN_PASSWORD, BOOTSTRAP_ADMIN_USERNAME,
};
use occurrence_book_lib::storage::{BlobStore, LocalBlobStore};
use occurrence_book_lib::store::Repositories;
use secrecy::SecretString;
use serde_json::{Value, json};
use tempfile::TempDir;

const BOUNDARY: &str = "----occurrence-book-test-boundary";

/// Build the app with a seeded admin. Keep the returned directory alive for
/// the duration of the test; it holds the uploaded blobs.
pub async fn create_test_app() -> (
    TempDir,
    impl actix_web::dev::Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
) {
    let dir = tempfile::tempdir().expect("tempdir");
    let blobs: Arc<dyn BlobStore> = Arc::new(
        LocalBlobStore::new(dir.path())
            .await
            .expect("local blob store"),
    );
    let service = OccurrenceService::new(
        Repositories::in_memory(),
        blobs,
        &TokenSettings {
            secret: SecretString::from("api-test-secret".to_string()),
            ttl_minutes: 30,
        },
    );
    service.bootstrap().await.expect("bootstrap admin");

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(service))
            .service(web::scope("/api").configure(api::configure_routes)),
    )
    .await;

    (dir, app)
}

/// Send a request and decode the JSON body (Null when the body is empty or
/// not JSON).
pub async fn send<S>(app: &S, req: actix_http::Request) -> (u16, Value)
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = ServiceResponse,
            Error = actix_web::Error,
        >,
{
    let resp = test::call_service(app, req).await;
    let status = resp.status().as_u16();
    let bytes = test::read_body(resp).await;
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

/// Register a user and return their bearer token.
pub async fn register<S>(app: &S, username: &str) -> String
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = ServiceResponse,
            Error = actix_web::Error,
        >,
{
    let req = test::TestRequest::post()
        .uri("/api/register")
        .set_json(json!({
            "username": username,
            "email": format!("{}@example.com", username),
            "password": "s3cret-pass",
        }))
        .to_request();
    let (status, body) = send(app, req).await;
    assert_eq!(status, 200, "register {} failed: {}", username, body);
    body["access_token"].as_str().expect("token").to_string()
}

/// Log in as the seeded administrator.
pub async fn admin_token<S>(app: &S) -> String
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = ServiceResponse,
            Error = actix_web::Error,
        >,
{
    let req = test::TestRequest::post()
        .uri("/api/login")
        .set_json(json!({
            "username": BOOTSTRAP_ADMIN_USERNAME,
            "password": BOOTSTRAP_ADMIN_PASSWORD,
        }))
        .to_request();
    let (status, body) = send(app, req).await;
    assert_eq!(status, 200, "admin login failed: {}", body);
    body["access_token"].as_str().expect("token").to_string()
}

pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token))
}

/// File an incident and return its JSON.
pub async fn create_incident<S>(app: &S, token: &str, severity: &str) -> Value
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = ServiceResponse,
            Error = actix_web::Error,
        >,
{
    let req = test::TestRequest::post()
        .uri("/api/incidents")
        .insert_header(bearer(token))
        .set_json(json!({
            "title": "Barulho",
            "description": "Festa até tarde",
            "type": "barulho",
            "location": "Apto 204",
            "people_involved": "Vizinhos do bloco B",
            "severity": severity,
        }))
        .to_request();
    let (status, body) = send(app, req).await;
    assert_eq!(status, 200, "create incident failed: {}", body);
    body
}

/// Build a multipart request carrying one `file` field.
pub fn upload_request(uri: &str, token: &str, filename: &str, data: &[u8]) -> actix_http::Request {
    let mut body = Vec::with_capacity(data.len() + 256);
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\n",
            filename
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

    test::TestRequest::post()
        .uri(uri)
        .insert_header(bearer(token))
        .insert_header((
            "Content-Type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        ))
        .set_payload(body)
        .to_request()
}
