//! Registration, login, token and password scenarios.

use actix_web::test;
use serde_json::json;

use super::test_helpers::*;

#[actix_rt::test]
async fn test_register_returns_usable_token() {
    let (_dir, app) = create_test_app().await;
    let token = register(&app, "alice").await;

    let req = test::TestRequest::get()
        .uri("/api/me")
        .insert_header(bearer(&token))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, 200);
    assert_eq!(body["username"], "alice");
    assert_eq!(body["role"], "user");
}

#[actix_rt::test]
async fn test_duplicate_registration_conflicts() {
    let (_dir, app) = create_test_app().await;
    register(&app, "alice").await;

    let req = test::TestRequest::post()
        .uri("/api/register")
        .set_json(json!({
            "username": "alice",
            "email": "other@example.com",
            "password": "whatever1",
        }))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, 409);
    assert_eq!(body["error"], "CONFLICT");
}

#[actix_rt::test]
async fn test_login_failures_are_indistinguishable() {
    let (_dir, app) = create_test_app().await;
    register(&app, "alice").await;

    let wrong_password = test::TestRequest::post()
        .uri("/api/login")
        .set_json(json!({ "username": "alice", "password": "nope" }))
        .to_request();
    let (status_a, body_a) = send(&app, wrong_password).await;

    let unknown_user = test::TestRequest::post()
        .uri("/api/login")
        .set_json(json!({ "username": "mallory", "password": "nope" }))
        .to_request();
    let (status_b, body_b) = send(&app, unknown_user).await;

    assert_eq!(status_a, 401);
    assert_eq!(body_a["error"], "INVALID_CREDENTIALS");
    assert_eq!((status_a, &body_a), (status_b, &body_b));
}

#[actix_rt::test]
async fn test_missing_or_bad_token_is_unauthenticated() {
    let (_dir, app) = create_test_app().await;

    let req = test::TestRequest::get().uri("/api/incidents").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
    assert_eq!(
        resp.headers().get("WWW-Authenticate").unwrap(),
        "Bearer"
    );

    let req = test::TestRequest::get()
        .uri("/api/incidents")
        .insert_header(bearer("not-a-jwt"))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, 401);
    assert_eq!(body["error"], "UNAUTHENTICATED");
}

#[actix_rt::test]
async fn test_change_password_flow() {
    let (_dir, app) = create_test_app().await;
    let token = register(&app, "alice").await;

    let req = test::TestRequest::put()
        .uri("/api/change-password")
        .insert_header(bearer(&token))
        .set_json(json!({ "current_password": "wrong", "new_password": "next-pass" }))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, 401);
    assert_eq!(body["error"], "INVALID_CREDENTIALS");

    let req = test::TestRequest::put()
        .uri("/api/change-password")
        .insert_header(bearer(&token))
        .set_json(json!({ "current_password": "s3cret-pass", "new_password": "next-pass" }))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, 200);
    assert_eq!(body["message"], "Password updated successfully");

    let req = test::TestRequest::post()
        .uri("/api/login")
        .set_json(json!({ "username": "alice", "password": "next-pass" }))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, 200);
}

#[actix_rt::test]
async fn test_malformed_body_is_invalid_input() {
    let (_dir, app) = create_test_app().await;

    let req = test::TestRequest::post()
        .uri("/api/register")
        .insert_header(("Content-Type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "INVALID_INPUT");
}
