use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::{
    clients::{chat_relay::RelayError, upload::UploadError},
    lifecycle::TransitionError,
    response::{ApiResponse, Meta},
};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not Found")]
    NotFound,

    #[error("Bad Request {0}")]
    BadRequest(String),

    #[error("Unauthorized {0}")]
    Unauthorized(String),

    #[error("Forbidden")]
    Forbidden,

    #[error("Conflict {0}")]
    Conflict(String),

    #[error("Invalid status transition: {0}")]
    InvalidTransition(#[from] TransitionError),

    #[error("Upload service error: {0}")]
    Upload(#[from] UploadError),

    #[error("AI chat relay error: {0}")]
    Relay(#[from] RelayError),

    #[error("Database error")]
    DbError(#[from] sqlx::Error),

    #[error("ORM error")]
    OrmError(#[from] sea_orm::DbErr),

    #[error("Internal Server Error")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::InvalidTransition(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Upload(_) | AppError::Relay(_) => StatusCode::BAD_GATEWAY,
            AppError::DbError(_) | AppError::OrmError(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Copy shown to the end user.
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::NotFound => "Không tìm thấy dữ liệu",
            AppError::BadRequest(_) => "Yêu cầu không hợp lệ",
            AppError::Unauthorized(_) => "Vui lòng đăng nhập để tiếp tục",
            AppError::Forbidden => "Bạn không có quyền thực hiện thao tác này",
            AppError::Conflict(_) => "Dữ liệu đã thay đổi, vui lòng tải lại",
            AppError::InvalidTransition(_) => "Không thể cập nhật trạng thái đơn hàng",
            AppError::Upload(_) => "Đã xảy ra lỗi trong quá trình tải tệp lên",
            AppError::Relay(_) => "Trợ lý ảo hiện không phản hồi",
            AppError::DbError(_) | AppError::OrmError(_) | AppError::Internal(_) => {
                "Có lỗi xảy ra, vui lòng thử lại"
            }
        }
    }
}

#[derive(Serialize)]
struct ErrorData {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = ?self, "request failed");
        } else {
            tracing::debug!(error = %self, "request rejected");
        }

        let body = ApiResponse {
            message: self.user_message().to_string(),
            data: Some(ErrorData {
                error: self.to_string(),
            }),
            meta: Some(Meta::empty()),
        };

        (status, axum::Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
