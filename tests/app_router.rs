use axum::{
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;

use cho_cuu_nong::{app::build_app, config::AppConfig, state::AppState};

// The pool never connects; these requests are answered before any query runs.
fn app(cors_origins: Vec<String>) -> axum::Router {
    let database_url = "postgres://localhost/unused".to_string();
    let pool = PgPoolOptions::new()
        .connect_lazy(&database_url)
        .expect("lazy pool");
    let config = AppConfig {
        database_url,
        host: "127.0.0.1".into(),
        port: 0,
        jwt_secret: "test-secret".into(),
        jwt_ttl_hours: 1,
        upload_service_url: "http://127.0.0.1:9".into(),
        functions_url: "http://127.0.0.1:9".into(),
        http_timeout_secs: 1,
        max_body_bytes: 1024,
        cors_origins,
    };
    build_app(AppState::new(pool, config).expect("state"))
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
    serde_json::from_slice(&bytes).expect("json")
}

#[tokio::test]
async fn health_is_served_with_a_request_id() {
    let response = app(Vec::new())
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
    let body = json_body(response).await;
    assert_eq!(body["data"]["status"], "ok");
    assert_eq!(body["data"]["service"], "cho-cuu-nong");
}

#[tokio::test]
async fn incoming_request_id_is_echoed() {
    let response = app(Vec::new())
        .oneshot(
            Request::get("/health")
                .header("x-request-id", "abc-123")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.headers()["x-request-id"], "abc-123");
}

#[tokio::test]
async fn unknown_path_gets_json_404() {
    let response = app(Vec::new())
        .oneshot(Request::get("/nope").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = json_body(response).await;
    assert_eq!(body["data"]["path"], "/nope");
}

#[tokio::test]
async fn protected_route_without_token_is_401() {
    let response = app(Vec::new())
        .oneshot(Request::get("/api/orders").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = json_body(response).await;
    assert_eq!(body["message"], "Vui lòng đăng nhập để tiếp tục");
}

#[tokio::test]
async fn configured_origin_is_allowed() {
    let response = app(vec!["https://chocuunong.vn".into()])
        .oneshot(
            Request::get("/health")
                .header(header::ORIGIN, "https://chocuunong.vn")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "https://chocuunong.vn"
    );
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let response = app(Vec::new())
        .oneshot(
            Request::post("/api/auth/sign-in")
                .header(header::CONTENT_TYPE, "application/json")
                .header(header::CONTENT_LENGTH, "4096")
                .body(Body::from(vec![b' '; 4096]))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}
