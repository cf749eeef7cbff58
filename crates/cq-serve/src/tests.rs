use crate::{AppState, app};
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use cq_core::types::ids::UserId;
use tower::ServiceExt;

fn test_app() -> (Router, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let state = AppState {
        db_path: dir.path().join("civiq.db").to_string_lossy().into_owned(),
        uploads_dir: dir.path().join("uploads"),
    };
    (app(state), dir)
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    actor: (&str, &str),
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("x-user-id", actor.0)
        .header("x-role", actor.1);
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn create_request(app: &Router, user: &str) -> String {
    let (status, created) = send(
        app,
        "POST",
        "/api/requests",
        (user, "Citizen"),
        Some(serde_json::json!({
            "title": "Broken streetlight",
            "latitude": 41.0,
            "longitude": 29.0
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    created["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn cross_user_listing_is_staff_only() {
    let (app, _dir) = test_app();
    let citizen = UserId::generate().to_string();
    let operator = UserId::generate().to_string();
    create_request(&app, &citizen).await;

    let (status, body) = send(&app, "GET", "/api/requests", (&citizen, "Citizen"), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "forbidden");

    let (status, body) = send(&app, "GET", "/api/requests", (&operator, "Operator"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_count"], 1);
}

#[tokio::test]
async fn transitions_are_mounted_under_requests() {
    let (app, _dir) = test_app();
    let citizen = UserId::generate().to_string();
    let operator = UserId::generate().to_string();
    let id = create_request(&app, &citizen).await;

    let resolve = format!("/api/requests/{id}/resolve");
    let (status, _) = send(&app, "POST", &resolve, (&citizen, "Citizen"), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app, "POST", &resolve, (&operator, "Operator"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/requests/{id}/reopen"),
        (&operator, "Operator"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn assist_reads_are_creator_or_staff() {
    let (app, _dir) = test_app();
    let requester = UserId::generate().to_string();
    let stranger = UserId::generate().to_string();
    let operator = UserId::generate().to_string();

    let (status, created) = send(
        &app,
        "POST",
        "/api/assists",
        (&requester, "Citizen"),
        Some(serde_json::json!({
            "kind": "Grocery",
            "elder_name": "Ayşe K.",
            "address": "12 Elm Street",
            "latitude": 41.0,
            "longitude": 29.0
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let uri = format!("/api/assists/{}", created["id"].as_str().unwrap());

    let (status, body) = send(&app, "GET", &uri, (&stranger, "Citizen"), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "forbidden");

    let (status, body) = send(&app, "GET", &uri, (&requester, "Citizen"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["elder_name"], "Ayşe K.");

    let (status, _) = send(&app, "GET", &uri, (&operator, "Operator"), None).await;
    assert_eq!(status, StatusCode::OK);
}
