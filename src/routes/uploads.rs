use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, Query, State},
    routing::{get, post},
};

use crate::{
    clients::upload::UploadFile,
    dto::uploads::{PruneRequest, PruneResult, UploadFilesResponse, UploadRecordList},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::FileContentType,
    response::ApiResponse,
    routes::params::UploadQuery,
    services::upload_service,
    state::AppState,
};

const DEFAULT_SAVE_DIR: &str = "uploads";

pub fn router(max_body_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/", post(upload_files).layer(DefaultBodyLimit::max(max_body_bytes)))
        .route("/records", get(list_records))
        .route("/prune", post(prune))
}

/// Multipart form: one or more `files` parts plus optional `saveDir`,
/// `content_type` and `ref` text fields.
#[utoipa::path(
    post,
    path = "/api/uploads",
    request_body(content = String, content_type = "multipart/form-data", description = "files, saveDir, content_type, ref"),
    responses(
        (status = 200, description = "Stored URLs and their records", body = ApiResponse<UploadFilesResponse>),
        (status = 400, description = "No files in the form"),
        (status = 502, description = "Upload service failed")
    ),
    tag = "Uploads"
)]
pub async fn upload_files(
    State(state): State<AppState>,
    user: AuthUser,
    mut multipart: Multipart,
) -> AppResult<Json<ApiResponse<UploadFilesResponse>>> {
    let mut files = Vec::new();
    let mut save_dir = DEFAULT_SAVE_DIR.to_string();
    let mut content_type = FileContentType::Uncategorized;
    let mut reference = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "files" | "file" => {
                let file_name = field.file_name().unwrap_or("file").to_string();
                let mime = field.content_type().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.body_text()))?;
                files.push(UploadFile {
                    file_name,
                    content_type: mime,
                    bytes: bytes.to_vec(),
                });
            }
            "saveDir" | "save_dir" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.body_text()))?;
                if !value.trim().is_empty() {
                    save_dir = value.trim().to_string();
                }
            }
            "content_type" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.body_text()))?;
                content_type = value.trim().parse().map_err(AppError::BadRequest)?;
            }
            "ref" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.body_text()))?;
                reference = Some(value.trim().to_string()).filter(|v| !v.is_empty());
            }
            _ => {}
        }
    }

    if files.is_empty() {
        return Err(AppError::BadRequest("No files to upload".into()));
    }

    let resp =
        upload_service::upload_files(&state, &user, files, &save_dir, content_type, reference)
            .await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/uploads/records",
    params(
        ("user_id" = Option<uuid::Uuid>, Query),
        ("ref" = Option<String>, Query),
        ("content_type" = Option<String>, Query, description = "uncategorized | product_image | payment_qr"),
        ("start_date" = Option<String>, Query, description = "RFC 3339"),
        ("end_date" = Option<String>, Query, description = "RFC 3339"),
        ("search" = Option<String>, Query, description = "URL substring"),
        ("limit" = Option<u64>, Query),
        ("offset" = Option<u64>, Query),
        ("order" = Option<String>, Query, description = "asc | desc by upload time"),
    ),
    responses(
        (status = 200, description = "Upload records", body = ApiResponse<UploadRecordList>)
    ),
    tag = "Uploads"
)]
pub async fn list_records(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<UploadQuery>,
) -> AppResult<Json<ApiResponse<UploadRecordList>>> {
    let resp = upload_service::list_upload_records(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/uploads/prune",
    request_body = PruneRequest,
    responses(
        (status = 200, description = "Records removed", body = ApiResponse<PruneResult>)
    ),
    tag = "Uploads"
)]
pub async fn prune(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<PruneRequest>,
) -> AppResult<Json<ApiResponse<PruneResult>>> {
    let resp = upload_service::prune_by_ref(&state, &user, payload).await?;
    Ok(Json(resp))
}
