use axum::{body::to_bytes, http::StatusCode, response::IntoResponse};
use cho_cuu_nong::{
    error::AppError,
    lifecycle::{OrderStatus, TransitionError},
};
use serde_json::Value;

async fn body_of(err: AppError) -> (StatusCode, Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn invalid_transition_is_unprocessable() {
    let (status, body) =
        body_of(TransitionError::Terminal(OrderStatus::Cancelled).into()).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["message"], "Không thể cập nhật trạng thái đơn hàng");
    assert!(
        body["data"]["error"]
            .as_str()
            .unwrap()
            .contains("cancelled")
    );
}

#[tokio::test]
async fn conflict_carries_detail() {
    let (status, body) =
        body_of(AppError::Conflict("order is shipping, expected pending".into())).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Dữ liệu đã thay đổi, vui lòng tải lại");
    assert!(body["data"]["error"].as_str().unwrap().contains("expected pending"));
}

#[tokio::test]
async fn not_found_and_auth_statuses() {
    assert_eq!(body_of(AppError::NotFound).await.0, StatusCode::NOT_FOUND);
    assert_eq!(
        body_of(AppError::Unauthorized("no token".into())).await.0,
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(body_of(AppError::Forbidden).await.0, StatusCode::FORBIDDEN);
}
