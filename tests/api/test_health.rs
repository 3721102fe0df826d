//! Liveness and readiness probes.

use actix_web::test;

use super::test_helpers::*;

#[actix_rt::test]
async fn test_health_and_ready_without_database() {
    let (_dir, app) = create_test_app().await;

    let (status, body) = send(&app, test::TestRequest::get().uri("/api/health").to_request()).await;
    assert_eq!(status, 200);
    assert_eq!(body["status"], "healthy");

    let (status, body) = send(&app, test::TestRequest::get().uri("/api/ready").to_request()).await;
    assert_eq!(status, 200);
    assert_eq!(body["database"], "in_memory");
}
