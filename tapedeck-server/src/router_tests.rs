//! Tests for the router builder.

use crate::error::BuildError;
use crate::router::TapedeckRouter;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use tapedeck_core::{AgentConfig, ReplayProducer};
use tower::ServiceExt;

fn config() -> AgentConfig {
    AgentConfig::new(ReplayProducer::new(vec![]))
}

fn post(uri: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(r#"{"input": "hi"}"#))
        .unwrap()
}

#[test]
fn test_build_without_endpoints_fails() {
    let result = TapedeckRouter::new(config()).build();
    assert!(matches!(result, Err(BuildError::NoEndpoints)));

    let nested = TapedeckRouter::new(config()).with_cors().build_nested("/agent");
    assert!(matches!(nested, Err(BuildError::NoEndpoints)));
}

#[tokio::test]
async fn test_stream_path_is_routed() {
    let app = TapedeckRouter::new(config())
        .with_stream("/api/agent")
        .build()
        .unwrap();

    let response = app.clone().oneshot(post("/api/agent")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.oneshot(post("/api/other")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_only_post_is_accepted() {
    let app = TapedeckRouter::new(config())
        .with_stream("/api/agent")
        .build()
        .unwrap();

    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/agent")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_build_nested_prefixes_routes() {
    let app = TapedeckRouter::new(config())
        .with_stream("/stream")
        .build_nested("/agent")
        .unwrap();

    let response = app.clone().oneshot(post("/agent/stream")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.oneshot(post("/stream")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_cors_preflight() {
    let app = TapedeckRouter::new(config())
        .with_stream("/api/agent")
        .with_cors()
        .build()
        .unwrap();

    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/agent")
        .header("Origin", "http://localhost:5173")
        .header("Access-Control-Request-Method", "POST")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .unwrap(),
        "*"
    );
}
