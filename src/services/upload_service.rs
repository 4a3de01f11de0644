use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use uuid::Uuid;

use crate::{
    clients::upload::UploadFile,
    dto::uploads::{PruneRequest, PruneResult, UploadFilesResponse, UploadRecordList},
    entity::cloud_uploads::{ActiveModel as UploadActive, Column, Entity as CloudUploads},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{FileContentType, UploadRecord},
    response::{ApiResponse, Meta},
    routes::params::{SortOrder, UploadQuery},
    state::AppState,
};

const MAX_LIST_LIMIT: u64 = 100;

/// Forward files to the upload service and record every URL it returns.
///
/// The service may accept only some of the files; the response counts the
/// rest as `missing`. A record that fails to insert leaves an orphaned object
/// behind, which is logged rather than failing the request.
pub async fn upload_files(
    state: &AppState,
    user: &AuthUser,
    files: Vec<UploadFile>,
    save_dir: &str,
    content_type: FileContentType,
    reference: Option<String>,
) -> AppResult<ApiResponse<UploadFilesResponse>> {
    let sent = files.len();
    let uploaded = match state.uploads.upload(&user.token, files, save_dir).await {
        Ok(files) => files,
        Err(err) => {
            tracing::error!(error = %err, save_dir, "upload service call failed");
            return Err(err.into());
        }
    };

    let mut records = Vec::with_capacity(uploaded.len());
    for info in &uploaded {
        let inserted = UploadActive {
            id: Set(Uuid::new_v4()),
            user_id: Set(Some(user.user_id)),
            url: Set(info.url.clone()),
            content_type: Set(content_type.as_str().to_string()),
            reference: Set(reference.clone()),
            upload_at: NotSet,
        }
        .insert(&state.orm)
        .await;

        match inserted {
            Ok(record) => records.push(UploadRecord::from(record)),
            Err(err) => {
                tracing::warn!(error = %err, url = %info.url, "orphaned upload: record insert failed");
            }
        }
    }

    let missing = sent.saturating_sub(uploaded.len());
    if missing > 0 {
        tracing::warn!(sent, returned = uploaded.len(), "upload service dropped files");
    }

    Ok(ApiResponse::success(
        "Tải tệp lên thành công!",
        UploadFilesResponse {
            files: uploaded,
            records,
            missing,
        },
        Some(Meta::empty()),
    ))
}

pub async fn list_upload_records(
    state: &AppState,
    query: UploadQuery,
) -> AppResult<ApiResponse<UploadRecordList>> {
    let mut condition = Condition::all();
    if let Some(user_id) = query.user_id {
        condition = condition.add(Column::UserId.eq(user_id));
    }
    if let Some(reference) = query.reference.as_deref().filter(|r| !r.is_empty()) {
        condition = condition.add(Column::Reference.eq(reference));
    }
    if let Some(content_type) = query.content_type {
        condition = condition.add(Column::ContentType.eq(content_type.as_str()));
    }
    if let Some(start) = query.start_date {
        condition = condition.add(Column::UploadAt.gte(start));
    }
    if let Some(end) = query.end_date {
        condition = condition.add(Column::UploadAt.lte(end));
    }
    if let (Some(start), Some(end)) = (query.start_date, query.end_date) {
        if start > end {
            return Err(AppError::BadRequest("start_date is after end_date".into()));
        }
    }
    if let Some(search) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        condition = condition.add(Expr::col(Column::Url).ilike(format!("%{}%", search)));
    }

    let mut finder = CloudUploads::find().filter(condition);
    finder = match query.order.unwrap_or(SortOrder::Desc) {
        SortOrder::Asc => finder.order_by_asc(Column::UploadAt),
        SortOrder::Desc => finder.order_by_desc(Column::UploadAt),
    };

    let total = finder.clone().count(&state.orm).await? as i64;
    let (limit, offset) = query.window(MAX_LIST_LIMIT);

    let items = finder
        .limit(limit)
        .offset(offset)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(UploadRecord::from)
        .collect();

    let meta = Meta::new(((offset / limit) as i64).saturating_add(1), limit as i64, total);
    Ok(ApiResponse::success("OK", UploadRecordList { items }, Some(meta)))
}

/// Delete the caller's records under `ref` whose URL is no longer kept.
pub async fn prune_by_ref(
    state: &AppState,
    user: &AuthUser,
    payload: PruneRequest,
) -> AppResult<ApiResponse<PruneResult>> {
    if payload.reference.trim().is_empty() {
        return Err(AppError::BadRequest("ref is required".into()));
    }

    let mut condition = Condition::all()
        .add(Column::UserId.eq(user.user_id))
        .add(Column::Reference.eq(payload.reference.as_str()));
    if !payload.keep_urls.is_empty() {
        condition = condition.add(Column::Url.is_not_in(payload.keep_urls));
    }

    let result = CloudUploads::delete_many()
        .filter(condition)
        .exec(&state.orm)
        .await?;

    tracing::info!(reference = %payload.reference, deleted = result.rows_affected, "upload records pruned");

    Ok(ApiResponse::success(
        "OK",
        PruneResult {
            deleted: result.rows_affected,
        },
        Some(Meta::empty()),
    ))
}
