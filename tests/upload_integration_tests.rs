use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use serde_json::Value;
use std::time::Duration;

mod common;

use common::{ScriptedClassifier, TestApp, TestUser};

const BOUNDARY: &str = "mood-diary-test-boundary";

fn multipart_body(file_name: &str, content_type: &str, data: &[u8], title: Option<&str>) -> Vec<u8> {
    let mut body = Vec::new();
    if let Some(title) = title {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"title\"\r\n\r\n{title}\r\n"
            )
            .as_bytes(),
        );
    }
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

async fn upload(app: &TestApp, user: &TestUser, body: Vec<u8>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/upload")
        .header(header::AUTHORIZATION, common::bearer(&user.token))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();
    app.send(request).await
}

/// Polls until the upload reaches a terminal state.
async fn wait_for_result(app: &TestApp, user: &TestUser, upload_id: &str) -> Value {
    for _ in 0..50 {
        let (status, body) = app
            .get(&format!("/upload/progress/{upload_id}"), &user.token)
            .await;
        assert_eq!(status, StatusCode::OK);
        if body["status"] == "completed" || body["status"] == "error" {
            return body;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    panic!("upload {upload_id} never finished");
}

#[tokio::test]
async fn test_upload_becomes_diary_entry() {
    let app = match common::setup_test_app().await {
        Ok(app) => app,
        Err(e) => {
            eprintln!("Skipping test_upload_becomes_diary_entry: {e}");
            return;
        }
    };

    let user = app.signed_up_user("uploader").await;
    let body = multipart_body("holiday.txt", "text/plain", b"We went to the beach!", None);

    let (status, accepted) = upload(&app, &user, body).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    let upload_id = accepted["upload_id"].as_str().unwrap().to_string();

    let result = wait_for_result(&app, &user, &upload_id).await;
    assert_eq!(result["status"], "completed");
    assert_eq!(result["progress"], 100);

    let diary_id = result["diary_id"].as_str().unwrap();
    let (status, entry) = app.get(&format!("/diary?id={diary_id}"), &user.token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(entry["title"], "holiday");
    assert_eq!(entry["content"], "We went to the beach!");
    assert_eq!(entry["emotion"]["dominant_label"], "joy");

    // terminal records are handed out once
    let (status, _) = app
        .get(&format!("/upload/progress/{upload_id}"), &user.token)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_upload_uses_explicit_title() {
    let app = match common::setup_test_app().await {
        Ok(app) => app,
        Err(e) => {
            eprintln!("Skipping test_upload_uses_explicit_title: {e}");
            return;
        }
    };

    let user = app.signed_up_user("titled").await;
    let body = multipart_body("x.csv", "text/csv", b"day,mood\nmon,great", Some("Weekly log"));

    let (status, accepted) = upload(&app, &user, body).await;
    assert_eq!(status, StatusCode::ACCEPTED);

    let result = wait_for_result(&app, &user, accepted["upload_id"].as_str().unwrap()).await;
    let (_, entry) = app
        .get(&format!("/diary?id={}", result["diary_id"].as_str().unwrap()), &user.token)
        .await;
    assert_eq!(entry["title"], "Weekly log");
}

#[tokio::test]
async fn test_upload_rejects_bad_files() {
    let app = match common::setup_test_app().await {
        Ok(app) => app,
        Err(e) => {
            eprintln!("Skipping test_upload_rejects_bad_files: {e}");
            return;
        }
    };

    let user = app.signed_up_user("rejected").await;

    let (status, body) = upload(&app, &user, multipart_body("cat.png", "image/png", b"\x89PNG", None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Unsupported file type: image/png");

    let (status, _) = upload(&app, &user, multipart_body("blank.txt", "text/plain", b"   ", None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let oversized = vec![b'a'; app.state.config.upload_max_bytes + 1];
    let (status, _) = upload(&app, &user, multipart_body("big.txt", "text/plain", &oversized, None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(app.classifier.calls(), 0);
}

#[tokio::test]
async fn test_failed_ingestion_is_reported() {
    let app = match common::setup_test_app_with(ScriptedClassifier::failing()).await {
        Ok(app) => app,
        Err(e) => {
            eprintln!("Skipping test_failed_ingestion_is_reported: {e}");
            return;
        }
    };

    let user = app.signed_up_user("unlucky").await;
    let body = multipart_body("note.txt", "text/plain", b"Nobody will read this", None);

    let (status, accepted) = upload(&app, &user, body).await;
    assert_eq!(status, StatusCode::ACCEPTED);

    let result = wait_for_result(&app, &user, accepted["upload_id"].as_str().unwrap()).await;
    assert_eq!(result["status"], "error");
    assert!(result["error"].as_str().unwrap().starts_with("Emotion analysis failed"));
    assert!(result.get("diary_id").is_none());

    let (_, list) = app.get("/diary", &user.token).await;
    assert_eq!(list["diaries"], serde_json::json!([]));
}

#[tokio::test]
async fn test_progress_is_private() {
    let app = match common::setup_test_app().await {
        Ok(app) => app,
        Err(e) => {
            eprintln!("Skipping test_progress_is_private: {e}");
            return;
        }
    };

    let owner = app.signed_up_user("private").await;
    let snoop = app.signed_up_user("snoop").await;
    let upload_id = app.state.uploads.start(owner.id).await;

    let (status, _) = app
        .get(&format!("/upload/progress/{upload_id}"), &snoop.token)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app
        .get(&format!("/upload/progress/{upload_id}"), &owner.token)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "received");
}
