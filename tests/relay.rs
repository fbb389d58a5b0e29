//! Relay server integration tests

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use tower::ServiceExt;
use uplift::relay::{self, ROUTES, RelayState};
use uplift::SharedSecret;

mod common;
use common::RecordingRunner;

const SECRET: &str = "correct-horse";

fn build_test_router(runner: Arc<RecordingRunner>) -> axum::Router {
    let state = Arc::new(RelayState {
        secret: Arc::new(SharedSecret::new(SECRET)),
        runner,
    });
    relay::router(state)
}

fn form_post(path: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(path)
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_string(response: axum::response::Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(body.to_vec()).unwrap()
}

#[tokio::test]
async fn test_tvon_with_correct_secret() {
    let runner = Arc::new(RecordingRunner::default());
    let app = build_test_router(runner.clone());

    let response = app
        .oneshot(form_post("/tvon", &format!("secret={SECRET}")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "OK");
    assert_eq!(runner.actions(), vec!["tvon"]);
}

#[tokio::test]
async fn test_soundbarinput_with_wrong_secret() {
    let runner = Arc::new(RecordingRunner::default());
    let app = build_test_router(runner.clone());

    let response = app
        .oneshot(form_post("/soundbarinput", "secret=guess"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(!body_string(response).await.contains("guess"));
    assert!(runner.actions().is_empty());
}

#[tokio::test]
async fn test_missing_secret_rejected() {
    let runner = Arc::new(RecordingRunner::default());
    let app = build_test_router(runner.clone());

    let response = app.oneshot(form_post("/soundbaron", "")).await.unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(runner.actions().is_empty());
}

#[tokio::test]
async fn test_unreadable_form_is_forbidden() {
    let no_content_type = Request::builder()
        .method("POST")
        .uri("/tvon")
        .body(Body::empty())
        .unwrap();
    let json_body = Request::builder()
        .method("POST")
        .uri("/tvon")
        .header("content-type", "application/json")
        .body(Body::from(format!(r#"{{"secret":"{SECRET}"}}"#)))
        .unwrap();
    let duplicate_field = form_post("/tvon", "secret=nope&SECRET=nope");

    for request in [no_content_type, json_body, duplicate_field] {
        let runner = Arc::new(RecordingRunner::default());
        let app = build_test_router(runner.clone());

        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let json: serde_json::Value =
            serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(json["error"]["code"], "forbidden");
        assert!(runner.actions().is_empty());
    }
}

#[tokio::test]
async fn test_every_route_runs_its_action_once() {
    for route in ROUTES {
        let runner = Arc::new(RecordingRunner::default());
        let app = build_test_router(runner.clone());

        let response = app
            .oneshot(form_post(route.path, &format!("secret={SECRET}")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK, "{}", route.path);
        assert_eq!(runner.actions(), vec![route.action]);
    }
}

#[tokio::test]
async fn test_uppercase_field_accepted() {
    let runner = Arc::new(RecordingRunner::default());
    let app = build_test_router(runner.clone());

    let response = app
        .oneshot(form_post("/tvinput/hdmi", &format!("SECRET={SECRET}")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(runner.actions(), vec!["hdmi_input"]);
}

#[tokio::test]
async fn test_hardware_failure_surfaces() {
    let runner = Arc::new(RecordingRunner::failing());
    let app = build_test_router(runner.clone());

    let response = app
        .oneshot(form_post("/tvinput/tv", &format!("secret={SECRET}")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let json: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(json["error"]["code"], "hardware_failed");
    assert_eq!(runner.actions(), vec!["tv_input"]);
}

#[tokio::test]
async fn test_get_not_allowed() {
    let runner = Arc::new(RecordingRunner::default());
    let app = build_test_router(runner.clone());

    let response = app
        .oneshot(Request::builder().uri("/tvon").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert!(runner.actions().is_empty());
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = build_test_router(Arc::new(RecordingRunner::default()));

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(json["status"], "ok");
}
