use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set, TransactionTrait,
    ActiveValue::NotSet,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::auth::{Claims, CurrentSession, SessionResponse, SignInRequest, SignUpRequest, SignUpResponse},
    entity::{
        profiles::{ActiveModel as ProfileActive, Entity as Profiles},
        sessions::{ActiveModel as SessionActive, Entity as Sessions},
        users::{ActiveModel as UserActive, Column as UserCol, Entity as Users},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::UserType,
    response::{ApiResponse, Meta},
    state::AppState,
};

const MIN_PASSWORD_LEN: usize = 6;

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?
        .to_string();
    Ok(hash)
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Create credentials and the matching profile row in one transaction.
pub async fn sign_up(
    state: &AppState,
    payload: SignUpRequest,
) -> AppResult<ApiResponse<SignUpResponse>> {
    let SignUpRequest {
        email,
        password,
        full_name,
        user_type,
    } = payload;
    let email = normalize_email(&email);

    if email.is_empty() || !email.contains('@') {
        return Err(AppError::BadRequest("A valid email is required".into()));
    }
    if password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::BadRequest(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    if user_type == UserType::Admin {
        return Err(AppError::BadRequest(
            "user_type must be buyer or seller".into(),
        ));
    }

    let exist = Users::find()
        .filter(UserCol::Email.eq(email.as_str()))
        .one(&state.orm)
        .await?;
    if exist.is_some() {
        return Err(AppError::BadRequest("Email is already taken".to_string()));
    }

    let password_hash = hash_password(&password)?;

    let txn = state.orm.begin().await?;
    let user = UserActive {
        id: Set(Uuid::new_v4()),
        email: Set(email),
        password_hash: Set(password_hash),
        created_at: NotSet,
    }
    .insert(&txn)
    .await?;

    let full_name = full_name.trim().to_string();
    let profile = ProfileActive {
        id: Set(user.id),
        full_name: Set(Some(full_name).filter(|n| !n.is_empty())),
        user_type: Set(user_type.as_str().to_string()),
        is_verified: Set(false),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;

    audit::record(
        &state.pool,
        user.id,
        "user_sign_up",
        "users",
        serde_json::json!({ "user_id": user.id, "user_type": user_type }),
    )
    .await;
    tracing::info!(user_id = %user.id, user_type = %user_type, "user signed up");

    Ok(ApiResponse::success(
        "Đăng ký thành công!",
        SignUpResponse {
            user: user.into(),
            profile: profile.into(),
        },
        None,
    ))
}

/// Verify credentials, open a session row and issue a token bound to it.
pub async fn sign_in(
    state: &AppState,
    payload: SignInRequest,
) -> AppResult<ApiResponse<SessionResponse>> {
    let SignInRequest { email, password } = payload;
    let email = normalize_email(&email);

    let user = Users::find()
        .filter(UserCol::Email.eq(email.as_str()))
        .one(&state.orm)
        .await?;
    let user = match user {
        Some(u) => u,
        None => return Err(AppError::BadRequest("Invalid email or password".into())),
    };

    let parsed_hash = PasswordHash::new(&user.password_hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;

    if Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_err()
    {
        return Err(AppError::BadRequest("Invalid email or password".into()));
    }

    let profile = Profiles::find_by_id(user.id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("profile missing for user")))?;

    let expires_at = Utc::now()
        .checked_add_signed(Duration::hours(state.config.jwt_ttl_hours))
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

    let session = SessionActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.id),
        created_at: NotSet,
        expires_at: Set(expires_at.into()),
        revoked_at: Set(None),
    }
    .insert(&state.orm)
    .await?;

    let claims = Claims {
        sub: user.id.to_string(),
        sid: session.id.to_string(),
        role: profile.user_type.clone(),
        exp: expires_at.timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(state.config.jwt_secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?;

    audit::record(
        &state.pool,
        user.id,
        "user_sign_in",
        "sessions",
        serde_json::json!({ "session_id": session.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Đăng nhập thành công!",
        SessionResponse {
            token,
            session_id: session.id,
            expires_at,
            user: user.into(),
            profile: profile.into(),
        },
        Some(Meta::empty()),
    ))
}

/// Restore the caller's session details.
pub async fn current_session(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<CurrentSession>> {
    let session = Sessions::find_by_id(user.session_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Session not found".into()))?;
    let account = Users::find_by_id(user.user_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    let profile = Profiles::find_by_id(user.user_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(ApiResponse::success(
        "OK",
        CurrentSession {
            session_id: session.id,
            expires_at: session.expires_at.with_timezone(&Utc),
            user: account.into(),
            profile: profile.into(),
        },
        Some(Meta::empty()),
    ))
}

/// Revoke the caller's session; its token stops working immediately.
pub async fn sign_out(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let session = Sessions::find_by_id(user.session_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Session not found".into()))?;

    let mut active: SessionActive = session.into();
    active.revoked_at = Set(Some(Utc::now().into()));
    active.update(&state.orm).await?;

    audit::record(
        &state.pool,
        user.user_id,
        "user_sign_out",
        "sessions",
        serde_json::json!({ "session_id": user.session_id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Đăng xuất thành công!",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}
