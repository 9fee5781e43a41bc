use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use blog_server::config::DatabaseConfig;
use blog_server::{app, open_store, AppState, StartupError};
use serde_json::Value;
use tower::ServiceExt;

fn memory_state() -> AppState {
    let config = DatabaseConfig {
        path: ":memory:".to_string(),
        ..DatabaseConfig::default()
    };
    AppState {
        pool: open_store(&config).unwrap(),
        expose_errors: true,
    }
}

#[tokio::test]
async fn health_check_returns_ok() {
    let app = app(memory_state());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn cors_allows_any_origin() {
    let app = app(memory_state());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/posts")
                .method(Method::OPTIONS)
                .header(header::ORIGIN, "http://example.com")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "*"
    );
}

#[tokio::test]
async fn unknown_method_is_rejected() {
    let app = app(memory_state());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/posts")
                .method(Method::DELETE)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[test]
fn open_store_is_idempotent_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let config = DatabaseConfig {
        path: dir.path().join("blog.db").to_string_lossy().into_owned(),
        ..DatabaseConfig::default()
    };

    drop(open_store(&config).unwrap());
    let pool = open_store(&config).unwrap();

    let conn = pool.get().unwrap();
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM posts", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 0);
}

#[test]
fn unopenable_store_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let config = DatabaseConfig {
        path: dir
            .path()
            .join("no-such-dir")
            .join("blog.db")
            .to_string_lossy()
            .into_owned(),
        connection_timeout_ms: 200,
        ..DatabaseConfig::default()
    };

    let err = open_store(&config).expect_err("opening inside a missing directory should fail");
    assert!(matches!(err, StartupError::Pool(_)), "{err}");
}
