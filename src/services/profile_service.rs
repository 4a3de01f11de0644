use chrono::Utc;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};

use crate::{
    dto::profile::UpdateProfileRequest,
    entity::profiles::{ActiveModel as ProfileActive, Entity as Profiles},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::Profile,
    response::{ApiResponse, Meta},
    state::AppState,
};

pub async fn get_profile(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<Profile>> {
    let profile = Profiles::find_by_id(user.user_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success("OK", profile.into(), Some(Meta::empty())))
}

fn trimmed(value: String) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Patch the caller's profile. Absent fields are left alone, blank ones are cleared.
pub async fn update_profile(
    state: &AppState,
    user: &AuthUser,
    payload: UpdateProfileRequest,
) -> AppResult<ApiResponse<Profile>> {
    let profile = Profiles::find_by_id(user.user_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    if let Some(phone) = payload.phone.as_deref().map(str::trim).filter(|p| !p.is_empty()) {
        if !phone.chars().all(|c| c.is_ascii_digit() || c == '+' || c == ' ') {
            return Err(AppError::BadRequest("Phone number is invalid".into()));
        }
    }

    let mut active: ProfileActive = profile.into();
    if let Some(v) = payload.full_name {
        active.full_name = Set(trimmed(v));
    }
    if let Some(v) = payload.phone {
        active.phone = Set(trimmed(v));
    }
    if let Some(v) = payload.address {
        active.address = Set(trimmed(v));
    }
    if let Some(v) = payload.shop_description {
        active.shop_description = Set(trimmed(v));
    }
    if let Some(v) = payload.payment_description {
        active.payment_description = Set(trimmed(v));
    }
    if let Some(v) = payload.avatar_url {
        active.avatar_url = Set(trimmed(v));
    }
    active.updated_at = Set(Utc::now().into());
    let profile = active.update(&state.orm).await?;

    Ok(ApiResponse::success(
        "Cập nhật thông tin thành công!",
        profile.into(),
        Some(Meta::empty()),
    ))
}
