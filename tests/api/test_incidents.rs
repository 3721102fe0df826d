//! Incident lifecycle, status workflow and access scenarios.

use actix_web::test;
use serde_json::json;

use super::test_helpers::*;

#[actix_rt::test]
async fn test_new_incident_defaults() {
    let (_dir, app) = create_test_app().await;
    let alice = register(&app, "alice").await;

    let incident = create_incident(&app, &alice, "alta").await;
    assert_eq!(incident["status"], "nova");
    assert_eq!(incident["severity"], "alta");
    assert_eq!(incident["type"], "barulho");
    assert_eq!(incident["created_by_username"], "alice");
    assert_eq!(incident["comments_count"], 0);
    assert_eq!(incident["files_count"], 0);
}

#[actix_rt::test]
async fn test_admin_status_change_visible_to_owner() {
    let (_dir, app) = create_test_app().await;
    let alice = register(&app, "alice").await;
    let admin = admin_token(&app).await;
    let incident = create_incident(&app, &alice, "media").await;
    let id = incident["id"].as_str().unwrap();

    let req = test::TestRequest::put()
        .uri(&format!("/api/incidents/{}/status", id))
        .insert_header(bearer(&alice))
        .set_json(json!({ "status": "resolvida" }))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, 403);
    assert_eq!(body["error"], "FORBIDDEN");

    let req = test::TestRequest::put()
        .uri(&format!("/api/incidents/{}/status", id))
        .insert_header(bearer(&admin))
        .set_json(json!({ "status": "em_andamento" }))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, 200);
    assert_eq!(body["message"], "Status updated successfully");

    let req = test::TestRequest::get()
        .uri(&format!("/api/incidents/{}", id))
        .insert_header(bearer(&alice))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, 200);
    assert_eq!(body["status"], "em_andamento");
    assert_eq!(body["title"], incident["title"]);
}

#[actix_rt::test]
async fn test_unknown_status_literal_rejected() {
    let (_dir, app) = create_test_app().await;
    let alice = register(&app, "alice").await;
    let admin = admin_token(&app).await;
    let incident = create_incident(&app, &alice, "baixa").await;

    let req = test::TestRequest::put()
        .uri(&format!("/api/incidents/{}/status", incident["id"].as_str().unwrap()))
        .insert_header(bearer(&admin))
        .set_json(json!({ "status": "fechada" }))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "INVALID_INPUT");
}

#[actix_rt::test]
async fn test_list_is_scoped_to_owner() {
    let (_dir, app) = create_test_app().await;
    let alice = register(&app, "alice").await;
    let bob = register(&app, "bob").await;
    let admin = admin_token(&app).await;

    create_incident(&app, &alice, "baixa").await;
    create_incident(&app, &bob, "media").await;
    create_incident(&app, &alice, "alta").await;

    let list = |token: String| {
        test::TestRequest::get()
            .uri("/api/incidents")
            .insert_header(bearer(&token))
            .to_request()
    };

    let (_, mine) = send(&app, list(alice.clone())).await;
    let mine = mine.as_array().unwrap();
    assert_eq!(mine.len(), 2);
    assert!(mine.iter().all(|i| i["created_by_username"] == "alice"));

    let (_, all) = send(&app, list(admin)).await;
    assert_eq!(all.as_array().unwrap().len(), 3);
}

#[actix_rt::test]
async fn test_not_found_takes_precedence_over_forbidden() {
    let (_dir, app) = create_test_app().await;
    let alice = register(&app, "alice").await;
    let bob = register(&app, "bob").await;
    let incident = create_incident(&app, &alice, "media").await;

    let req = test::TestRequest::get()
        .uri(&format!("/api/incidents/{}", incident["id"].as_str().unwrap()))
        .insert_header(bearer(&bob))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, 403);

    let req = test::TestRequest::get()
        .uri(&format!("/api/incidents/{}", uuid::Uuid::new_v4()))
        .insert_header(bearer(&bob))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, 404);
    assert_eq!(body["error"], "NOT_FOUND");

    let req = test::TestRequest::get()
        .uri("/api/incidents/not-a-uuid")
        .insert_header(bearer(&bob))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, 404);
}

#[actix_rt::test]
async fn test_field_update_keeps_status() {
    let (_dir, app) = create_test_app().await;
    let alice = register(&app, "alice").await;
    let incident = create_incident(&app, &alice, "media").await;

    let req = test::TestRequest::put()
        .uri(&format!("/api/incidents/{}", incident["id"].as_str().unwrap()))
        .insert_header(bearer(&alice))
        .set_json(json!({ "title": "Barulho excessivo", "status": "resolvida" }))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, 200);
    assert_eq!(body["title"], "Barulho excessivo");
    assert_eq!(body["status"], "nova");
    assert_eq!(body["description"], incident["description"]);
}

#[actix_rt::test]
async fn test_delete_is_admin_only() {
    let (_dir, app) = create_test_app().await;
    let alice = register(&app, "alice").await;
    let admin = admin_token(&app).await;
    let incident = create_incident(&app, &alice, "media").await;
    let uri = format!("/api/incidents/{}", incident["id"].as_str().unwrap());

    let req = test::TestRequest::delete()
        .uri(&uri)
        .insert_header(bearer(&alice))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, 403);

    let req = test::TestRequest::delete()
        .uri(&uri)
        .insert_header(bearer(&admin))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, 200);
    assert_eq!(body["message"], "Incident deleted successfully");

    let req = test::TestRequest::get()
        .uri(&uri)
        .insert_header(bearer(&admin))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, 404);
}

#[actix_rt::test]
async fn test_field_update_forbids_non_owner_and_misses_unknown_incident() {
    let (_dir, app) = create_test_app().await;
    let alice = register(&app, "alice").await;
    let bob = register(&app, "bob").await;
    let incident = create_incident(&app, &alice, "media").await;
    let owned = incident["id"].as_str().unwrap().to_string();
    let missing = uuid::Uuid::new_v4().to_string();

    for (target, expected) in [(&owned, 403), (&missing, 404)] {
        let req = test::TestRequest::put()
            .uri(&format!("/api/incidents/{}", target))
            .insert_header(bearer(&bob))
            .set_json(json!({ "title": "Sequestrado" }))
            .to_request();
        let (status, _) = send(&app, req).await;
        assert_eq!(status, expected, "PUT on {}", target);
    }

    let req = test::TestRequest::get()
        .uri(&format!("/api/incidents/{}", owned))
        .insert_header(bearer(&alice))
        .to_request();
    let (_, body) = send(&app, req).await;
    assert_eq!(body["title"], "Barulho");
}
