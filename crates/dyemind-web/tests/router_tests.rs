//! Router-level tests. These exercise routing, extraction and input
//! validation without touching any upstream service.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use tower::util::ServiceExt;

use dyemind_core::CoreConfig;
use dyemind_web::router::build_router;
use dyemind_web::state::AppState;

fn app() -> axum::Router {
    let state = AppState::from_config(&CoreConfig::default()).expect("state from defaults");
    build_router(state)
}

#[tokio::test]
async fn test_health_is_ok() {
    let response = app()
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_search_rejects_empty_query() {
    let response = app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/search")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"query": "   "}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_ask_rejects_empty_question() {
    let response = app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/ask")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"question": ""}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let response = app()
        .oneshot(
            Request::builder()
                .uri("/api/nope")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
