//! Comment and evidence file scenarios.

use actix_web::test;
use serde_json::json;

use super::test_helpers::*;

#[actix_rt::test]
async fn test_comments_update_count_and_role_flag() {
    let (_dir, app) = create_test_app().await;
    let alice = register(&app, "alice").await;
    let admin = admin_token(&app).await;
    let incident = create_incident(&app, &alice, "media").await;
    let id = incident["id"].as_str().unwrap();
    let uri = format!("/api/incidents/{}/comments", id);

    for (token, message) in [(&alice, "Aconteceu de novo"), (&admin, "Vamos verificar")] {
        let req = test::TestRequest::post()
            .uri(&uri)
            .insert_header(bearer(token))
            .set_json(json!({ "message": message }))
            .to_request();
        let (status, _) = send(&app, req).await;
        assert_eq!(status, 200);
    }

    let req = test::TestRequest::get()
        .uri(&uri)
        .insert_header(bearer(&alice))
        .to_request();
    let (status, comments) = send(&app, req).await;
    assert_eq!(status, 200);
    let comments = comments.as_array().unwrap();
    assert_eq!(comments.len(), 2);
    assert_eq!(comments[0]["message"], "Aconteceu de novo");
    assert_eq!(comments[0]["is_admin"], false);
    assert_eq!(comments[1]["is_admin"], true);

    let req = test::TestRequest::get()
        .uri(&format!("/api/incidents/{}", id))
        .insert_header(bearer(&alice))
        .to_request();
    let (_, body) = send(&app, req).await;
    assert_eq!(body["comments_count"], 2);
}

#[actix_rt::test]
async fn test_upload_download_and_delete_file() {
    let (_dir, app) = create_test_app().await;
    let alice = register(&app, "alice").await;
    let incident = create_incident(&app, &alice, "media").await;
    let id = incident["id"].as_str().unwrap();

    let req = upload_request(
        &format!("/api/incidents/{}/files", id),
        &alice,
        "Foto Portao.PNG",
        b"\x89PNG fake image",
    );
    let (status, body) = send(&app, req).await;
    assert_eq!(status, 200, "upload failed: {}", body);
    assert_eq!(body["message"], "File uploaded successfully");
    assert_eq!(body["file"]["file_type"], ".png");
    assert_eq!(body["file"]["original_name"], "Foto Portao.PNG");
    assert_eq!(body["file"]["file_size"], 15);
    let file_id = body["file_id"].as_str().unwrap().to_string();

    let req = test::TestRequest::get()
        .uri(&format!("/api/files/{}/content", file_id))
        .insert_header(bearer(&alice))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    assert!(
        resp.headers()
            .get("Content-Disposition")
            .unwrap()
            .to_str()
            .unwrap()
            .starts_with("inline; filename*=UTF-8''Foto%20Port")
    );
    let bytes = test::read_body(resp).await;
    assert_eq!(&bytes[..], b"\x89PNG fake image");

    let req = test::TestRequest::delete()
        .uri(&format!("/api/files/{}", file_id))
        .insert_header(bearer(&alice))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, 200);
    assert_eq!(body["message"], "File deleted successfully");

    let req = test::TestRequest::get()
        .uri(&format!("/api/incidents/{}", id))
        .insert_header(bearer(&alice))
        .to_request();
    let (_, body) = send(&app, req).await;
    assert_eq!(body["files_count"], 0);
}

#[actix_rt::test]
async fn test_eleventh_upload_exceeds_quota() {
    let (_dir, app) = create_test_app().await;
    let alice = register(&app, "alice").await;
    let incident = create_incident(&app, &alice, "alta").await;
    let id = incident["id"].as_str().unwrap();
    let uri = format!("/api/incidents/{}/files", id);

    for n in 0..10 {
        let req = upload_request(&uri, &alice, &format!("doc{}.pdf", n), b"%PDF-1.4");
        let (status, body) = send(&app, req).await;
        assert_eq!(status, 200, "upload {} failed: {}", n, body);
    }

    let req = upload_request(&uri, &alice, "doc10.pdf", b"%PDF-1.4");
    let (status, body) = send(&app, req).await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "QUOTA_EXCEEDED");

    let req = test::TestRequest::get()
        .uri(&format!("/api/incidents/{}", id))
        .insert_header(bearer(&alice))
        .to_request();
    let (_, body) = send(&app, req).await;
    assert_eq!(body["files_count"], 10);
}

#[actix_rt::test]
async fn test_size_checked_before_extension() {
    let (_dir, app) = create_test_app().await;
    let alice = register(&app, "alice").await;
    let incident = create_incident(&app, &alice, "media").await;
    let uri = format!("/api/incidents/{}/files", incident["id"].as_str().unwrap());

    let big = vec![0u8; 6 * 1024 * 1024];
    let (status, body) = send(&app, upload_request(&uri, &alice, "dump.txt", &big)).await;
    assert_eq!(status, 413);
    assert_eq!(body["error"], "PAYLOAD_TOO_LARGE");

    let (status, body) = send(&app, upload_request(&uri, &alice, "notes.txt", b"hi")).await;
    assert_eq!(status, 415);
    assert_eq!(body["error"], "UNSUPPORTED_MEDIA_TYPE");
}

#[actix_rt::test]
async fn test_other_users_files_are_forbidden() {
    let (_dir, app) = create_test_app().await;
    let alice = register(&app, "alice").await;
    let bob = register(&app, "bob").await;
    let incident = create_incident(&app, &alice, "media").await;
    let id = incident["id"].as_str().unwrap();

    let req = upload_request(&format!("/api/incidents/{}/files", id), &alice, "a.jpg", b"jpg");
    let (_, body) = send(&app, req).await;
    let file_id = body["file_id"].as_str().unwrap().to_string();

    let req = test::TestRequest::get()
        .uri(&format!("/api/files/{}/content", file_id))
        .insert_header(bearer(&bob))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, 403);

    let req = upload_request(&format!("/api/incidents/{}/files", id), &bob, "b.jpg", b"jpg");
    let (status, _) = send(&app, req).await;
    assert_eq!(status, 403);

    let req = test::TestRequest::get()
        .uri(&format!("/api/files/{}/content", uuid::Uuid::new_v4()))
        .insert_header(bearer(&bob))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, 404);
}

#[actix_rt::test]
async fn test_delete_incident_removes_attachments() {
    let (_dir, app) = create_test_app().await;
    let alice = register(&app, "alice").await;
    let admin = admin_token(&app).await;
    let incident = create_incident(&app, &alice, "media").await;
    let id = incident["id"].as_str().unwrap();

    let req = upload_request(&format!("/api/incidents/{}/files", id), &alice, "a.pdf", b"pdf");
    let (_, body) = send(&app, req).await;
    let file_id = body["file_id"].as_str().unwrap().to_string();

    let req = test::TestRequest::delete()
        .uri(&format!("/api/incidents/{}", id))
        .insert_header(bearer(&admin))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, 200);

    let req = test::TestRequest::get()
        .uri(&format!("/api/files/{}/content", file_id))
        .insert_header(bearer(&admin))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, 404);
}

#[actix_rt::test]
async fn test_attachment_routes_forbid_non_owner_and_miss_unknown_incident() {
    let (_dir, app) = create_test_app().await;
    let alice = register(&app, "alice").await;
    let bob = register(&app, "bob").await;
    let incident = create_incident(&app, &alice, "media").await;
    let owned = incident["id"].as_str().unwrap().to_string();
    let missing = uuid::Uuid::new_v4().to_string();

    for (target, expected) in [(&owned, 403), (&missing, 404)] {
        let requests = [
            (
                "POST comments",
                test::TestRequest::post()
                    .uri(&format!("/api/incidents/{}/comments", target))
                    .insert_header(bearer(&bob))
                    .set_json(json!({ "message": "intruso" }))
                    .to_request(),
            ),
            (
                "GET comments",
                test::TestRequest::get()
                    .uri(&format!("/api/incidents/{}/comments", target))
                    .insert_header(bearer(&bob))
                    .to_request(),
            ),
            (
                "GET files",
                test::TestRequest::get()
                    .uri(&format!("/api/incidents/{}/files", target))
                    .insert_header(bearer(&bob))
                    .to_request(),
            ),
        ];

        for (name, req) in requests {
            let (status, _) = send(&app, req).await;
            assert_eq!(status, expected, "{} on {}", name, target);
        }
    }

    let req = test::TestRequest::get()
        .uri(&format!("/api/incidents/{}", owned))
        .insert_header(bearer(&alice))
        .to_request();
    let (_, body) = send(&app, req).await;
    assert_eq!(body["comments_count"], 0);
}
